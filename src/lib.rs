pub mod asset_stager;
pub mod camera;
pub mod color_texture;
pub mod config_loader;
pub mod document;
pub mod emitter;
pub mod error;
pub mod export_session;
pub mod geometry;
pub mod loader;
pub mod material;
pub mod scene_writer;

use std::path::PathBuf;

pub use config_loader::ExportOptions;
pub use error::ExportError;
pub use export_session::ExportSession;
pub use scene_common::*;
pub use scene_writer::{ExportSummary, SceneWriter};

/// Exports `scene` to the Nori scene file `scene_path`, with meshes and
/// textures written next to it.
pub fn export_scene(
    scene: &SceneSnapshot,
    scene_path: impl Into<PathBuf>,
    options: ExportOptions,
) -> Result<ExportSummary, ExportError> {
    let session = ExportSession::new(scene_path, options, scene.base_dir.clone());
    SceneWriter::new(session).write(scene)
}
