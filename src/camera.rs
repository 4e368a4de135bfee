use scene_common::{transform::WorldMatrix, CameraObject, RenderSettings};
use ultraviolet::Vec3;

use crate::document::{format_float, format_matrix, format_vector, Element};

/// Nori looks down +z, the host cameras look down -z.
const HANDEDNESS_SCALE: Vec3 = Vec3::new(1.0, 1.0, -1.0);

/// Builds the `<camera>` element. `thin_lens` adds the depth of field parameters.
pub fn camera_element(camera: &CameraObject, render: &RenderSettings, thin_lens: bool) -> Element {
    let camera_type = if thin_lens { "thin_lens" } else { "perspective" };
    let (width, height) = render.scaled_resolution();

    let mut element = Element::typed("camera", camera_type)
        .with_child(Element::entry(
            "float",
            "fov",
            format_float(camera.angle.to_degrees()),
        ))
        .with_child(Element::entry("float", "nearClip", format_float(camera.clip_start)))
        .with_child(Element::entry("float", "farClip", format_float(camera.clip_end)))
        .with_child(Element::entry("integer", "width", width.to_string()))
        .with_child(Element::entry("integer", "height", height.to_string()))
        .with_child(to_world_transform(
            &camera.world_matrix,
            Some(Element::new("scale").with_attr("value", format_vector(HANDEDNESS_SCALE))),
        ));

    if thin_lens {
        element.push_child(Element::entry(
            "float",
            "focalDist",
            format_float(camera.dof.focus_distance),
        ));
        element.push_child(Element::entry(
            "float",
            "fstop",
            format_float(1.0 / camera.dof.aperture_fstop),
        ));
    }
    element
}

/// `<transform name="toWorld">` with an optional leading sub-transform.
pub fn to_world_transform(matrix: &WorldMatrix, pre: Option<Element>) -> Element {
    Element::new("transform")
        .with_attr("name", "toWorld")
        .with_children(pre)
        .with_child(Element::new("matrix").with_attr("value", format_matrix(matrix)))
}
