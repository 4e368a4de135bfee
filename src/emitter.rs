use scene_common::{LightKind, LightObject, NodeKind, ShaderGraph, World};
use ultraviolet::Vec3;

use crate::{
    asset_stager::AssetStager,
    document::{format_point, Element},
    error::{MaterialError, StagingError},
    material::NodeReader,
};

/// Turns the environment map around the up axis to match Nori's convention.
pub const ENVIRONMENT_ROTATION: &str = "180";

fn radiance_entry(radiance: Vec3) -> Element {
    Element::entry("color", "radiance", format_point(radiance))
}

/// Only point lights have a Nori counterpart, everything else is skipped.
pub fn light_emitter(light: &LightObject) -> Option<Element> {
    match light.kind {
        LightKind::Point => {
            let radiance = Vec3::from(light.color) * light.energy;
            Some(
                Element::typed("emitter", "pointlight")
                    .with_child(Element::entry(
                        "point",
                        "position",
                        format_point(light.world_matrix.translation()),
                    ))
                    .with_child(radiance_entry(radiance)),
            )
        }
        kind => {
            log::warn!(
                "Light source type ({:?}) of {:?} is not supported",
                kind,
                light.name
            );
            None
        }
    }
}

/// Area emitter for a material with an "Emission" node.
pub fn area_emitter(material_name: &str, graph: &ShaderGraph) -> Option<Element> {
    try_area_emitter(graph).unwrap_or_else(|err| {
        log::warn!("Ignoring emission of {:?}: {}", material_name, err);
        None
    })
}

fn try_area_emitter(graph: &ShaderGraph) -> Result<Option<Element>, MaterialError> {
    let Some(emission) = NodeReader::new(graph, "Emission") else {
        return Ok(None);
    };
    let color = Vec3::from(emission.rgb("Color")?);
    let strength = emission.float("Strength")?;
    Ok(Some(
        Element::typed("emitter", "area").with_child(radiance_entry(color * strength)),
    ))
}

/// Environment emitter for a world driven by an "Environment Texture" node.
pub fn environment_emitter(
    world: &World,
    scale: f32,
    stager: &mut AssetStager,
) -> Option<Element> {
    let graph = world.graph.as_ref()?;
    let texture = match &graph.node("Environment Texture")?.kind {
        NodeKind::EnvironmentTexture(texture) | NodeKind::ImageTexture(texture) => texture,
        NodeKind::Shader => {
            log::warn!("\"Environment Texture\" node has no image, skipping the environment");
            return None;
        }
    };

    let filename = match texture
        .image
        .as_deref()
        .ok_or(StagingError::NoImage)
        .and_then(|image| stager.stage(image))
    {
        Ok(filename) => filename,
        Err(err) => {
            log::warn!("Skipping the environment map: {}", err);
            return None;
        }
    };

    let strength = background_strength(graph) * scale;
    Some(
        Element::typed("emitter", "environment")
            .with_child(Element::entry("string", "filename", filename.as_str()))
            .with_child(Element::entry("float", "rotate", ENVIRONMENT_ROTATION))
            .with_child(radiance_entry(Vec3::broadcast(strength))),
    )
}

fn background_strength(graph: &ShaderGraph) -> f32 {
    let Some(background) = NodeReader::new(graph, "Background") else {
        return 1.0;
    };
    background.float("Strength").unwrap_or_else(|err| {
        log::warn!("Using background strength 1: {}", err);
        1.0
    })
}

#[cfg(test)]
mod tests {
    use scene_common::{
        transform::WorldMatrix, ImageTexture, NodeInput, ShaderNode, SocketValue,
    };

    use super::*;

    fn point_light(color: [f32; 3], energy: f32) -> LightObject {
        LightObject {
            name: "Light".into(),
            kind: LightKind::Point,
            color,
            energy,
            world_matrix: WorldMatrix::from_translation(Vec3::new(4.0, 1.0, 5.9)),
            visible: true,
        }
    }

    #[test]
    fn point_light_radiance_is_color_times_energy() {
        let emitter = light_emitter(&point_light([1.0, 0.0, 0.0], 10.0)).unwrap();
        assert_eq!(emitter.attr("type"), Some("pointlight"));
        assert_eq!(
            emitter.named("radiance").unwrap().attr("value"),
            Some("10.000000,0.000000,0.000000")
        );
        assert_eq!(
            emitter.named("position").unwrap().attr("value"),
            Some("4.000000,1.000000,5.900000")
        );
    }

    #[test]
    fn other_lights_are_skipped() {
        let mut light = point_light([1.0; 3], 1.0);
        for kind in [LightKind::Sun, LightKind::Spot, LightKind::Area] {
            light.kind = kind;
            assert!(light_emitter(&light).is_none());
        }
    }

    #[test]
    fn emission_becomes_area_emitter() {
        let graph = ShaderGraph::new().with_node(
            "Emission",
            ShaderNode::shader()
                .with_value("Color", SocketValue::Rgba([1.0, 0.5, 0.25, 1.0]))
                .with_value("Strength", SocketValue::Float(4.0)),
        );
        let emitter = area_emitter("Lamp", &graph).unwrap();
        assert_eq!(emitter.attr("type"), Some("area"));
        assert_eq!(
            emitter.named("radiance").unwrap().attr("value"),
            Some("4.000000,2.000000,1.000000")
        );
    }

    #[test]
    fn malformed_emission_is_skipped() {
        let graph = ShaderGraph::new().with_node(
            "Emission",
            ShaderNode::shader().with_value("Color", SocketValue::Rgb([1.0, 1.0, 1.0])),
        );
        assert!(area_emitter("Lamp", &graph).is_none());
        assert!(area_emitter("Lamp", &ShaderGraph::new()).is_none());
    }

    fn world(image: &str, strength: f32) -> World {
        World {
            graph: Some(
                ShaderGraph::new()
                    .with_node(
                        "Environment Texture",
                        ShaderNode::environment_texture(ImageTexture::new(image)),
                    )
                    .with_node(
                        "Background",
                        ShaderNode::shader()
                            .with_input(
                                "Color",
                                NodeInput::linked(
                                    SocketValue::Rgba([1.0; 4]),
                                    "Environment Texture",
                                ),
                            )
                            .with_value("Strength", SocketValue::Float(strength)),
                    ),
            ),
        }
    }

    #[test]
    fn environment_map_is_staged_and_rotated() {
        let source = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(output.path().join("textures")).unwrap();
        std::fs::write(source.path().join("sky.exr"), b"exr").unwrap();
        let mut stager = AssetStager::new(output.path(), "textures")
            .with_base_dir(Some(source.path().to_path_buf()));

        let emitter = environment_emitter(&world("sky.exr", 2.0), 50.0, &mut stager).unwrap();

        assert_eq!(emitter.attr("type"), Some("environment"));
        let value = |name: &str| emitter.named(name).and_then(|e| e.attr("value"));
        assert_eq!(value("filename"), Some("textures/sky.exr"));
        assert_eq!(value("rotate"), Some("180"));
        assert_eq!(value("radiance"), Some("100.000000,100.000000,100.000000"));
    }

    #[test]
    fn missing_environment_image_skips_the_emitter() {
        let output = tempfile::tempdir().unwrap();
        let mut stager = AssetStager::new(output.path(), "textures");
        assert!(environment_emitter(&world("/nope/sky.exr", 1.0), 50.0, &mut stager).is_none());
        assert!(environment_emitter(&World::default(), 50.0, &mut stager).is_none());
    }
}
