use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use relative_path::{RelativePath, RelativePathBuf};

use crate::error::StagingError;

/// Copies external images into the export's texture folder.
///
/// Lives for exactly one export. Each destination is copied at most once, so a
/// texture shared by many materials is only staged the first time.
pub struct AssetStager {
    output_dir: PathBuf,
    base_dir: Option<PathBuf>,
    texture_dir: RelativePathBuf,
    /// Destination (relative to the output directory) to the source it was copied from.
    staged: HashMap<RelativePathBuf, PathBuf>,
}

impl AssetStager {
    pub fn new(output_dir: impl Into<PathBuf>, texture_dir: impl AsRef<RelativePath>) -> Self {
        Self {
            output_dir: output_dir.into(),
            base_dir: None,
            texture_dir: texture_dir.as_ref().to_relative_path_buf(),
            staged: HashMap::new(),
        }
    }

    /// Directory relative asset paths are resolved against.
    pub fn with_base_dir(mut self, base_dir: Option<PathBuf>) -> Self {
        self.base_dir = base_dir;
        self
    }

    pub fn texture_dir(&self) -> &RelativePath {
        &self.texture_dir
    }

    /// Absolute location of the staging folder.
    pub fn texture_dir_path(&self) -> PathBuf {
        self.texture_dir.to_path(&self.output_dir)
    }

    pub fn staged_count(&self) -> usize {
        self.staged.len()
    }

    pub fn is_staged(&self, destination: &RelativePath) -> bool {
        self.staged.contains_key(destination)
    }

    /// Copies `source` into the texture folder and returns its path relative to the
    /// output directory, always with forward slashes.
    pub fn stage(&mut self, source: &str) -> Result<RelativePathBuf, StagingError> {
        let source_path = self.resolve_source(source);
        let file_name = source_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| StagingError::NoFileName(source_path.clone()))?;
        let relative = self.texture_dir.join(file_name);

        if let Some(previous) = self.staged.get(&relative) {
            if *previous != source_path {
                log::warn!(
                    "{:?} and {:?} share the destination {}, keeping the first one",
                    previous,
                    source_path,
                    relative
                );
            }
            return Ok(relative);
        }

        let destination = relative.to_path(&self.output_dir);
        if !is_same_file(&source_path, &destination) {
            log::debug!("Copying texture {:?} to {:?}", source_path, destination);
            std::fs::copy(&source_path, &destination).map_err(|source| StagingError::Copy {
                source_path: source_path.clone(),
                destination: destination.clone(),
                source,
            })?;
        }

        self.staged.insert(relative.clone(), source_path);
        Ok(relative)
    }

    fn resolve_source(&self, source: &str) -> PathBuf {
        let source = source.trim().replace('\\', "/");
        let (path, host_relative) = match source.strip_prefix("//") {
            Some(rest) => (PathBuf::from(rest), true),
            None => (PathBuf::from(&source), false),
        };
        match &self.base_dir {
            Some(base_dir) if host_relative || path.is_relative() => base_dir.join(path),
            _ => path,
        }
    }
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
