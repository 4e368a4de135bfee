use serde::{Deserialize, Serialize};

use crate::transform::WorldMatrix;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CameraObject {
    pub name: String,
    /// Field of view in radians.
    pub angle: f32,
    pub clip_start: f32,
    pub clip_end: f32,
    #[serde(default)]
    pub world_matrix: WorldMatrix,
    #[serde(default)]
    pub dof: DepthOfField,
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct DepthOfField {
    pub focus_distance: f32,
    pub aperture_fstop: f32,
}

impl Default for DepthOfField {
    fn default() -> Self {
        Self {
            focus_distance: 10.0,
            aperture_fstop: 2.8,
        }
    }
}
