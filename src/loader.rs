mod gltf_loader;
mod snapshot_loader;

pub use gltf_loader::GltfSceneLoader;
pub use snapshot_loader::SnapshotLoader;

use std::path::Path;

use scene_common::SceneSnapshot;

use crate::error::LoadError;

/// Turns a host scene file into the snapshot the exporter walks.
pub trait SceneLoader {
    fn load_scene(&mut self, path: &Path) -> Result<SceneSnapshot, LoadError>;
}

/// Picks a loader by file extension. Anything that is not glTF is read as a
/// JSON snapshot.
pub fn loader_for(path: &Path) -> Box<dyn SceneLoader> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("gltf" | "glb") => Box::new(GltfSceneLoader),
        _ => Box::new(SnapshotLoader),
    }
}

pub fn load_scene(path: impl AsRef<Path>) -> Result<SceneSnapshot, LoadError> {
    let path = path.as_ref();
    log::info!("Loading {:?}", path);
    loader_for(path).load_scene(path)
}
