use scene_common::{ImageTexture, NodeInput, NodeKind, ShaderGraph};

use crate::{
    asset_stager::AssetStager,
    document::{format_rgb, Element},
    error::StagingError,
};

/// What feeds a color socket.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ColorInput<'a> {
    Constant([f32; 3]),
    /// An image texture node, with the socket's own value to fall back to.
    Texture {
        texture: &'a ImageTexture,
        fallback: [f32; 3],
    },
}

impl<'a> ColorInput<'a> {
    /// Anything linked to a node other than an image texture counts as constant.
    pub fn from_socket(graph: &'a ShaderGraph, input: &NodeInput, value: [f32; 3]) -> Self {
        match graph.upstream(input).map(|node| &node.kind) {
            Some(NodeKind::ImageTexture(texture)) => ColorInput::Texture {
                texture,
                fallback: value,
            },
            _ => ColorInput::Constant(value),
        }
    }

    pub fn constant_value(&self) -> [f32; 3] {
        match *self {
            ColorInput::Constant(value) => value,
            ColorInput::Texture { fallback, .. } => fallback,
        }
    }
}

/// Turns color sockets into `color` entries or `textmap` textures.
pub struct ColorResolver<'a> {
    stager: &'a mut AssetStager,
    export_textures: bool,
}

impl<'a> ColorResolver<'a> {
    pub fn new(stager: &'a mut AssetStager, export_textures: bool) -> Self {
        Self {
            stager,
            export_textures,
        }
    }

    pub fn resolve(&mut self, name: &str, input: ColorInput<'_>) -> Element {
        let constant = || Element::entry("color", name, format_rgb(input.constant_value()));
        match input {
            ColorInput::Texture { texture, .. } if self.export_textures => {
                self.try_texture(name, texture).unwrap_or_else(|err| {
                    log::warn!("Using constant color for {:?}: {}", name, err);
                    constant()
                })
            }
            _ => constant(),
        }
    }

    pub fn try_texture(
        &mut self,
        name: &str,
        texture: &ImageTexture,
    ) -> Result<Element, StagingError> {
        let image = texture.image.as_deref().ok_or(StagingError::NoImage)?;
        let filename = self.stager.stage(image)?;

        Ok(Element::typed("texture", "textmap")
            .with_attr("name", name)
            .with_child(Element::entry("string", "filename", filename.as_str()))
            .with_child(Element::entry(
                "string",
                "interpolation",
                texture.interpolation.as_str(),
            ))
            .with_child(Element::entry(
                "string",
                "extension",
                texture.extension.as_str(),
            ))
            .with_child(Element::entry(
                "string",
                "projection",
                texture.projection.as_str(),
            )))
    }
}

#[cfg(test)]
mod tests {
    use scene_common::{ShaderNode, SocketValue};

    use super::*;

    fn textured_graph(image: &str) -> ShaderGraph {
        ShaderGraph::new()
            .with_node(
                "Image Texture",
                ShaderNode::image_texture(ImageTexture::new(image)),
            )
            .with_node(
                "Diffuse BSDF",
                ShaderNode::shader().with_input(
                    "Color",
                    NodeInput::linked(SocketValue::Rgba([0.2, 0.4, 0.6, 1.0]), "Image Texture"),
                ),
            )
    }

    fn color_input(graph: &ShaderGraph) -> ColorInput<'_> {
        let input = graph.node("Diffuse BSDF").unwrap().input("Color").unwrap();
        ColorInput::from_socket(graph, input, input.value.as_rgb().unwrap())
    }

    #[test]
    fn constant_input_is_a_color_entry() {
        let output = tempfile::tempdir().unwrap();
        let mut stager = AssetStager::new(output.path(), "textures");
        let element =
            ColorResolver::new(&mut stager, true).resolve("albedo", ColorInput::Constant([0.5; 3]));

        assert_eq!(element.tag(), "color");
        assert_eq!(element.attr("name"), Some("albedo"));
        assert_eq!(element.attr("value"), Some("0.500000,0.500000,0.500000"));
    }

    #[test]
    fn disabled_textures_give_a_color_entry() {
        let output = tempfile::tempdir().unwrap();
        let mut stager = AssetStager::new(output.path(), "textures");
        let graph = textured_graph("wood.png");

        let element = ColorResolver::new(&mut stager, false).resolve("albedo", color_input(&graph));

        assert_eq!(element.tag(), "color");
        assert_eq!(element.attr("value"), Some("0.200000,0.400000,0.600000"));
        assert_eq!(stager.staged_count(), 0);
    }

    #[test]
    fn linked_image_becomes_textmap() {
        let source = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(output.path().join("textures")).unwrap();
        std::fs::write(source.path().join("wood.png"), b"png").unwrap();
        let mut stager = AssetStager::new(output.path(), "textures")
            .with_base_dir(Some(source.path().to_path_buf()));
        let graph = textured_graph("//wood.png");

        let element = ColorResolver::new(&mut stager, true).resolve("albedo", color_input(&graph));

        assert_eq!(element.tag(), "texture");
        assert_eq!(element.attr("type"), Some("textmap"));
        assert_eq!(element.attr("name"), Some("albedo"));
        let value = |name: &str| element.named(name).and_then(|e| e.attr("value"));
        assert_eq!(value("filename"), Some("textures/wood.png"));
        assert_eq!(value("interpolation"), Some("Linear"));
        assert_eq!(value("extension"), Some("REPEAT"));
        assert_eq!(value("projection"), Some("FLAT"));
    }

    #[test]
    fn unreadable_image_falls_back_to_color() {
        let output = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(output.path().join("textures")).unwrap();
        let mut stager = AssetStager::new(output.path(), "textures");
        let graph = textured_graph("/definitely/not/here.png");

        let element = ColorResolver::new(&mut stager, true).resolve("albedo", color_input(&graph));

        assert_eq!(element.tag(), "color");
        assert_eq!(element.attr("value"), Some("0.200000,0.400000,0.600000"));
    }

    #[test]
    fn non_texture_upstream_is_constant() {
        let graph = ShaderGraph::new()
            .with_node("Mix", ShaderNode::shader())
            .with_node(
                "Diffuse BSDF",
                ShaderNode::shader().with_input(
                    "Color",
                    NodeInput::linked(SocketValue::Rgb([1.0, 0.0, 0.0]), "Mix"),
                ),
            );
        let input = graph.node("Diffuse BSDF").unwrap().input("Color").unwrap();
        assert_eq!(
            ColorInput::from_socket(&graph, input, [1.0, 0.0, 0.0]),
            ColorInput::Constant([1.0, 0.0, 0.0])
        );
    }
}
