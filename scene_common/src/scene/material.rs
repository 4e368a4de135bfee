use serde::{Deserialize, Serialize};

use super::ShaderGraph;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MaterialSlot {
    pub name: String,
    #[serde(default)]
    pub material: Option<Material>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Material {
    pub name: String,
    /// Flat viewport color, used whenever the graph does not say anything better.
    #[serde(default = "Material::default_diffuse_color")]
    pub diffuse_color: [f32; 4],
    #[serde(default)]
    pub graph: Option<ShaderGraph>,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            diffuse_color: Self::default_diffuse_color(),
            graph: None,
        }
    }

    pub fn with_graph(mut self, graph: ShaderGraph) -> Self {
        self.graph = Some(graph);
        self
    }

    pub fn with_diffuse_color(mut self, color: [f32; 4]) -> Self {
        self.diffuse_color = color;
        self
    }

    fn default_diffuse_color() -> [f32; 4] {
        [0.8, 0.8, 0.8, 1.0]
    }
}
