mod camera;
mod light;
mod material;
mod mesh;
mod shader_graph;
mod world;

pub use camera::*;
pub use light::*;
pub use material::*;
pub use mesh::*;
pub use shader_graph::*;
pub use world::*;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Read-only view of the host scene at export time.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct SceneSnapshot {
    /// Directory that relative asset paths (and Blender style `//` paths) are resolved against.
    #[serde(default)]
    pub base_dir: Option<PathBuf>,
    #[serde(default)]
    pub render: RenderSettings,
    #[serde(default)]
    pub cameras: Vec<CameraObject>,
    #[serde(default)]
    pub lights: Vec<LightObject>,
    #[serde(default)]
    pub meshes: Vec<MeshObject>,
    #[serde(default)]
    pub world: Option<World>,
}

impl SceneSnapshot {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct RenderSettings {
    pub resolution_x: u32,
    pub resolution_y: u32,
    /// Scale applied to the base resolution, in percent.
    pub resolution_percentage: u32,
}

impl RenderSettings {
    /// Final image size, truncated like the host does it.
    pub fn scaled_resolution(&self) -> (u32, u32) {
        let percent = self.resolution_percentage as f64 / 100.0;
        (
            (self.resolution_x as f64 * percent) as u32,
            (self.resolution_y as f64 * percent) as u32,
        )
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            resolution_x: 1920,
            resolution_y: 1080,
            resolution_percentage: 100,
        }
    }
}

pub(crate) fn default_true() -> bool {
    true
}
