use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use relative_path::{RelativePath, RelativePathBuf};

use crate::{
    asset_stager::AssetStager,
    config_loader::ExportOptions,
    error::ExportError,
    geometry::{GeometryWriter, ObjWriter},
};

pub const MESH_DIR: &str = "meshes";
pub const TEXTURE_DIR: &str = "textures";

/// State of a single export run. Created per invocation and consumed by it,
/// nothing survives between two exports.
pub struct ExportSession {
    scene_path: PathBuf,
    output_dir: PathBuf,
    mesh_dir: RelativePathBuf,
    /// Lowercased, so names that only differ in case do not collide on
    /// case-insensitive file systems.
    used_mesh_files: HashSet<String>,
    pub(crate) options: ExportOptions,
    pub(crate) stager: AssetStager,
    pub(crate) geometry_writer: Box<dyn GeometryWriter>,
}

impl ExportSession {
    /// `scene_path` is the XML file to write; meshes and textures go next to it.
    pub fn new(
        scene_path: impl Into<PathBuf>,
        options: ExportOptions,
        base_dir: Option<PathBuf>,
    ) -> Self {
        let scene_path = scene_path.into();
        let output_dir = match scene_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let stager = AssetStager::new(&output_dir, TEXTURE_DIR).with_base_dir(base_dir);
        let geometry_writer = Box::new(ObjWriter::new(options.triangulate_meshes));
        Self {
            scene_path,
            output_dir,
            mesh_dir: RelativePath::new(MESH_DIR).to_relative_path_buf(),
            used_mesh_files: HashSet::new(),
            options,
            stager,
            geometry_writer,
        }
    }

    pub fn with_geometry_writer(mut self, writer: Box<dyn GeometryWriter>) -> Self {
        self.geometry_writer = writer;
        self
    }

    pub fn scene_path(&self) -> &Path {
        &self.scene_path
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Creates the mesh and texture folders.
    pub fn create_directories(&self) -> Result<(), ExportError> {
        for dir in [
            self.mesh_dir.to_path(&self.output_dir),
            self.stager.texture_dir_path(),
        ] {
            std::fs::create_dir_all(&dir)
                .map_err(|source| ExportError::CreateDirectory { path: dir, source })?;
        }
        Ok(())
    }

    /// Where the geometry of `mesh_name` goes, relative to the output directory.
    /// Unique within the session: a second `Chair` gets `Chair.001`.
    pub fn mesh_file(&mut self, mesh_name: &str) -> RelativePathBuf {
        let stem: String = mesh_name
            .chars()
            .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
            .collect();
        let extension = self.geometry_writer.extension();

        let mut file = self.mesh_dir.join(format!("{}.{}", stem, extension));
        let mut suffix = 1;
        while !self.used_mesh_files.insert(file.as_str().to_lowercase()) {
            file = self
                .mesh_dir
                .join(format!("{}.{:03}.{}", stem, suffix, extension));
            suffix += 1;
        }
        if suffix > 1 {
            log::warn!("Several objects are named {:?}, writing {}", mesh_name, file);
        }
        file
    }

    pub fn absolute(&self, relative: &RelativePath) -> PathBuf {
        relative.to_path(&self.output_dir)
    }
}
