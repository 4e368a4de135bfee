use serde::{Deserialize, Serialize};

use super::ShaderGraph;

/// The world background. Only its shading graph matters to the exporter.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct World {
    #[serde(default)]
    pub graph: Option<ShaderGraph>,
}
