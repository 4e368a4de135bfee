use std::{collections::HashMap, path::Path};

use gltf::{
    camera::Projection,
    image::Source,
    khr_lights_punctual::Kind,
    mesh::Mode,
    texture::{MagFilter, WrappingMode},
};
use scene_common::{
    transform::WorldMatrix, CameraObject, DepthOfField, ImageTexture, LightKind, LightObject,
    Material, MaterialSlot, MeshGeometry, MeshObject, NodeInput, SceneSnapshot, ShaderGraph,
    ShaderNode, SocketValue,
};
use ultraviolet::{Mat4, Vec4};

use crate::error::LoadError;

use super::SceneLoader;

/// glTF has no notion of a far plane for infinite projections.
const DEFAULT_FAR_CLIP: f32 = 1000.0;

/// Imports `.gltf` and `.glb` files. Images are not decoded, only their URIs
/// are handed on to the exporter.
#[derive(Default)]
pub struct GltfSceneLoader;

struct SceneLoadingData {
    scene: SceneSnapshot,
    buffers: Vec<gltf::buffer::Data>,
    /// Slots built so far, by glTF material index. `None` is the default material.
    material_slots: HashMap<Option<usize>, MaterialSlot>,
}

impl SceneLoader for GltfSceneLoader {
    fn load_scene(&mut self, path: &Path) -> Result<SceneSnapshot, LoadError> {
        let gltf::Gltf { document, blob } = gltf::Gltf::open(path)?;
        let buffers = gltf::import_buffers(&document, path.parent(), blob)?;

        let scene = document
            .default_scene()
            .or_else(|| document.scenes().next())
            .ok_or_else(|| LoadError::NoScene(path.to_path_buf()))?;

        let mut loading_data = SceneLoadingData {
            scene: SceneSnapshot::new(),
            buffers,
            material_slots: HashMap::new(),
        };
        loading_data.scene.base_dir = path.parent().map(Path::to_path_buf);
        for node in scene.nodes() {
            load_node(&mut loading_data, &node, WorldMatrix::IDENTITY);
        }
        Ok(loading_data.scene)
    }
}

fn node_matrix(node: &gltf::Node<'_>) -> WorldMatrix {
    // Column-major, like ultraviolet.
    let [c0, c1, c2, c3] = node.transform().matrix();
    Mat4::new(
        Vec4::from(c0),
        Vec4::from(c1),
        Vec4::from(c2),
        Vec4::from(c3),
    )
    .into()
}

fn node_name(node: &gltf::Node<'_>, fallback: Option<&str>, prefix: &str) -> String {
    node.name()
        .or(fallback)
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}{}", prefix, node.index()))
}

fn load_node(loading_data: &mut SceneLoadingData, node: &gltf::Node<'_>, parent: WorldMatrix) {
    let world_matrix = parent * node_matrix(node);

    for child in node.children() {
        load_node(loading_data, &child, world_matrix);
    }

    if let Some(camera) = node.camera() {
        load_camera(loading_data, node, &camera, world_matrix);
    }

    if let Some(light) = node.light() {
        let kind = match light.kind() {
            Kind::Point => LightKind::Point,
            Kind::Directional => LightKind::Sun,
            Kind::Spot { .. } => LightKind::Spot,
        };
        loading_data.scene.lights.push(LightObject {
            name: node_name(node, light.name(), "Light"),
            kind,
            color: light.color(),
            energy: light.intensity(),
            world_matrix,
            visible: true,
        });
    }

    if let Some(mesh) = node.mesh() {
        let mesh_object = load_mesh(loading_data, node, &mesh, world_matrix);
        loading_data.scene.meshes.push(mesh_object);
    }
}

fn load_camera(
    loading_data: &mut SceneLoadingData,
    node: &gltf::Node<'_>,
    camera: &gltf::Camera<'_>,
    world_matrix: WorldMatrix,
) {
    let name = node_name(node, camera.name(), "Camera");
    let Projection::Perspective(perspective) = camera.projection() else {
        log::warn!("Orthographic camera {:?} is not supported", name);
        return;
    };

    // The exporter expects the horizontal field of view.
    let angle = match perspective.aspect_ratio() {
        Some(aspect) => {
            let render = &mut loading_data.scene.render;
            render.resolution_y = (render.resolution_x as f32 / aspect).round() as u32;
            2.0 * ((perspective.yfov() * 0.5).tan() * aspect).atan()
        }
        None => perspective.yfov(),
    };

    loading_data.scene.cameras.push(CameraObject {
        name,
        angle,
        clip_start: perspective.znear(),
        clip_end: perspective.zfar().unwrap_or(DEFAULT_FAR_CLIP),
        world_matrix,
        dof: DepthOfField::default(),
    });
}

/// All triangle primitives of a glTF mesh become one object, each distinct
/// material one slot.
fn load_mesh(
    loading_data: &mut SceneLoadingData,
    node: &gltf::Node<'_>,
    mesh: &gltf::Mesh<'_>,
    world_matrix: WorldMatrix,
) -> MeshObject {
    let name = node_name(node, mesh.name(), "Mesh");
    let mut geometry = MeshGeometry::default();
    let mut has_tex_coords = false;
    let mut material_indices = Vec::new();

    for primitive in mesh.primitives() {
        if primitive.mode() != Mode::Triangles {
            log::warn!(
                "Skipping {:?} primitive of {:?}, only triangles are supported",
                primitive.mode(),
                name
            );
            continue;
        }

        let reader = primitive
            .reader(|buffer| loading_data.buffers.get(buffer.index()).map(|v| &v.0[..]));
        let Some(positions) = reader.read_positions() else {
            log::warn!("Skipping primitive of {:?} without positions", name);
            continue;
        };

        let base = geometry.positions.len() as u32;
        geometry.positions.extend(positions);
        let vertex_count = geometry.positions.len() - base as usize;

        match reader.read_tex_coords(0) {
            Some(tex_coords) => {
                has_tex_coords = true;
                // glTF puts the texture origin at the top left.
                geometry
                    .tex_coords
                    .extend(tex_coords.into_f32().map(|[u, v]| [u, 1.0 - v]));
            }
            None => geometry
                .tex_coords
                .extend(std::iter::repeat([0.0, 0.0]).take(vertex_count)),
        }

        let indices: Vec<u32> = reader
            .read_indices()
            .map(|indices| indices.into_u32().collect())
            .unwrap_or_else(|| (0..vertex_count as u32).collect());
        geometry.faces.extend(
            indices
                .chunks_exact(3)
                .map(|triangle| triangle.iter().map(|i| i + base).collect()),
        );

        let material = primitive.material();
        if !material_indices.contains(&material.index()) {
            material_indices.push(material.index());
            load_material(loading_data, &material);
        }
    }

    if !has_tex_coords {
        geometry.tex_coords.clear();
    }

    let material_slots = material_indices
        .iter()
        .filter_map(|index| loading_data.material_slots.get(index).cloned())
        .collect();

    MeshObject {
        material_slots,
        world_matrix,
        ..MeshObject::new(name, geometry)
    }
}

fn load_material(loading_data: &mut SceneLoadingData, material: &gltf::Material<'_>) {
    // material.index() returns None when the material is the default material
    let Some(index) = material.index() else {
        loading_data
            .material_slots
            .entry(None)
            .or_insert_with(|| MaterialSlot {
                name: "Default".into(),
                material: None,
            });
        return;
    };
    if loading_data.material_slots.contains_key(&Some(index)) {
        return;
    }

    let name = material
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("Material{}", index));
    let material_pbr = material.pbr_metallic_roughness();
    let base_color = material_pbr.base_color_factor();

    let mut base_color_input = NodeInput::constant(SocketValue::Rgba(base_color));
    let mut graph = ShaderGraph::new();
    if let Some(texture) = material_pbr
        .base_color_texture()
        .and_then(|info| image_texture(&name, &info.texture()))
    {
        graph = graph.with_node("Image Texture", ShaderNode::image_texture(texture));
        base_color_input = NodeInput::linked(SocketValue::Rgba(base_color), "Image Texture");
    }

    graph = graph.with_node(
        "Principled BSDF",
        principled_defaults()
            .with_input("Base Color", base_color_input)
            .with_value("Metallic", SocketValue::Float(material_pbr.metallic_factor()))
            .with_value(
                "Roughness",
                SocketValue::Float(material_pbr.roughness_factor()),
            ),
    );

    let emissive_strength = material.emissive_strength().unwrap_or(1.0);
    let emissive_factor = material.emissive_factor();
    if emissive_factor.iter().any(|&v| v > 0.0) && emissive_strength > 0.0 {
        graph = graph.with_node(
            "Emission",
            ShaderNode::shader()
                .with_value("Color", SocketValue::Rgb(emissive_factor))
                .with_value("Strength", SocketValue::Float(emissive_strength)),
        );
    }

    let slot = MaterialSlot {
        name: name.clone(),
        material: Some(
            Material::new(name)
                .with_diffuse_color(base_color)
                .with_graph(graph),
        ),
    };
    loading_data.material_slots.insert(Some(index), slot);
}

/// Inputs a Principled BSDF carries that glTF has no counterpart for.
fn principled_defaults() -> ShaderNode {
    ShaderNode::shader()
        .with_value("Subsurface Weight", SocketValue::Float(0.0))
        .with_value("Specular IOR Level", SocketValue::Float(0.5))
        .with_value("Specular Tint", SocketValue::Rgba([1.0; 4]))
        .with_value("Anisotropic", SocketValue::Float(0.0))
        .with_value("Sheen Weight", SocketValue::Float(0.0))
        .with_value("Sheen Tint", SocketValue::Rgba([1.0; 4]))
        .with_value("Coat Weight", SocketValue::Float(0.0))
        .with_value("Coat Roughness", SocketValue::Float(0.03))
}

fn image_texture(material_name: &str, texture: &gltf::Texture<'_>) -> Option<ImageTexture> {
    let uri = match texture.source().source() {
        Source::Uri { uri, .. } if !uri.starts_with("data:") => uri,
        _ => {
            log::warn!(
                "Base color texture of {:?} is embedded, only external images can be exported",
                material_name
            );
            return None;
        }
    };

    let sampler = texture.sampler();
    let mut image = ImageTexture::new(uri);
    if sampler.mag_filter() == Some(MagFilter::Nearest) {
        image.interpolation = "Closest".into();
    }
    image.extension = match sampler.wrap_s() {
        WrappingMode::Repeat => "REPEAT",
        WrappingMode::ClampToEdge => "EXTEND",
        WrappingMode::MirroredRepeat => "MIRROR",
    }
    .into();
    Some(image)
}
