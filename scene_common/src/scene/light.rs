use serde::{Deserialize, Serialize};

use crate::transform::WorldMatrix;

use super::default_true;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LightObject {
    pub name: String,
    pub kind: LightKind,
    pub color: [f32; 3],
    /// Power scalar, multiplied into the color.
    pub energy: f32,
    #[serde(default)]
    pub world_matrix: WorldMatrix,
    #[serde(default = "default_true")]
    pub visible: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LightKind {
    Point,
    Sun,
    Spot,
    Area,
}
