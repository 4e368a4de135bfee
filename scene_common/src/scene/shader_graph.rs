use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A material or world node tree, keyed by node name.
///
/// Only node presence and the first link of an input are ever looked at, so
/// this is a flat map rather than a real graph.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ShaderGraph {
    pub nodes: BTreeMap<String, ShaderNode>,
}

impl ShaderGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node(mut self, name: impl Into<String>, node: ShaderNode) -> Self {
        self.nodes.insert(name.into(), node);
        self
    }

    pub fn node(&self, name: &str) -> Option<&ShaderNode> {
        self.nodes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// The node feeding `input`, if the link points at a node that exists.
    pub fn upstream(&self, input: &NodeInput) -> Option<&ShaderNode> {
        input
            .links
            .first()
            .and_then(|link| self.nodes.get(&link.from_node))
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ShaderNode {
    #[serde(default)]
    pub kind: NodeKind,
    #[serde(default)]
    pub inputs: BTreeMap<String, NodeInput>,
}

impl ShaderNode {
    pub fn shader() -> Self {
        Self::default()
    }

    pub fn image_texture(texture: ImageTexture) -> Self {
        Self {
            kind: NodeKind::ImageTexture(texture),
            inputs: BTreeMap::new(),
        }
    }

    pub fn environment_texture(texture: ImageTexture) -> Self {
        Self {
            kind: NodeKind::EnvironmentTexture(texture),
            inputs: BTreeMap::new(),
        }
    }

    pub fn with_input(mut self, name: impl Into<String>, input: NodeInput) -> Self {
        self.inputs.insert(name.into(), input);
        self
    }

    pub fn with_value(self, name: impl Into<String>, value: SocketValue) -> Self {
        self.with_input(name, NodeInput::constant(value))
    }

    pub fn input(&self, name: &str) -> Option<&NodeInput> {
        self.inputs.get(name)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    /// BSDFs, emission, background and anything else we only read inputs from.
    #[default]
    Shader,
    ImageTexture(ImageTexture),
    EnvironmentTexture(ImageTexture),
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ImageTexture {
    /// Path of the image file as the host stores it. `None` when no image is assigned.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "ImageTexture::default_interpolation")]
    pub interpolation: String,
    #[serde(default = "ImageTexture::default_extension")]
    pub extension: String,
    #[serde(default = "ImageTexture::default_projection")]
    pub projection: String,
}

impl ImageTexture {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: Some(image.into()),
            interpolation: Self::default_interpolation(),
            extension: Self::default_extension(),
            projection: Self::default_projection(),
        }
    }

    fn default_interpolation() -> String {
        "Linear".into()
    }

    fn default_extension() -> String {
        "REPEAT".into()
    }

    fn default_projection() -> String {
        "FLAT".into()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct NodeInput {
    #[serde(default)]
    pub value: SocketValue,
    #[serde(default)]
    pub links: Vec<NodeLink>,
}

impl NodeInput {
    pub fn constant(value: SocketValue) -> Self {
        Self {
            value,
            links: Vec::new(),
        }
    }

    pub fn linked(value: SocketValue, from_node: impl Into<String>) -> Self {
        Self {
            value,
            links: vec![NodeLink {
                from_node: from_node.into(),
            }],
        }
    }

    pub fn is_linked(&self) -> bool {
        !self.links.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct NodeLink {
    pub from_node: String,
}

/// Unlinked default value of a socket.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SocketValue {
    Float(f32),
    Rgb([f32; 3]),
    Rgba([f32; 4]),
}

impl SocketValue {
    pub fn as_float(&self) -> Option<f32> {
        match *self {
            SocketValue::Float(v) => Some(v),
            _ => None,
        }
    }

    /// Color sockets drop their alpha, a float socket is read as grey.
    pub fn as_rgb(&self) -> Option<[f32; 3]> {
        match *self {
            SocketValue::Float(v) => Some([v; 3]),
            SocketValue::Rgb(rgb) => Some(rgb),
            SocketValue::Rgba([r, g, b, _]) => Some([r, g, b]),
        }
    }
}

impl Default for SocketValue {
    fn default() -> Self {
        SocketValue::Float(0.0)
    }
}
