use std::path::Path;

use scene_common::SceneSnapshot;

use crate::error::LoadError;

use super::SceneLoader;

/// Reads a scene snapshot serialized as JSON by a host side plugin.
#[derive(Default)]
pub struct SnapshotLoader;

impl SnapshotLoader {
    pub fn from_str(json: &str, path: &Path) -> Result<SceneSnapshot, LoadError> {
        let mut scene: SceneSnapshot =
            serde_json::from_str(json).map_err(|source| LoadError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        if scene.base_dir.is_none() {
            scene.base_dir = path.parent().map(Path::to_path_buf);
        }
        Ok(scene)
    }
}

impl SceneLoader for SnapshotLoader {
    fn load_scene(&mut self, path: &Path) -> Result<SceneSnapshot, LoadError> {
        let json = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str(&json, path)
    }
}
