use std::path::PathBuf;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Everything the user can toggle for an export.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportOptions {
    /// Export point lights and emissive surfaces, and render with `path_mis`.
    pub export_lights: bool,
    /// Translate node graphs into BSDFs instead of using flat viewport colors.
    pub export_material_colors: bool,
    /// Only has an effect together with `export_material_colors`.
    pub export_textures: bool,
    /// Bake world transforms into the geometry files.
    pub export_meshes_in_world_space: bool,
    pub triangulate_meshes: bool,
    pub sample_count: u32,
    pub use_thin_lens_camera: bool,
    pub environment_map_scale: f32,
    /// Map Principled BSDFs to the extended `disney` model instead of `roughsubstrate`.
    pub disney_bsdf: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            export_lights: true,
            export_material_colors: true,
            export_textures: true,
            export_meshes_in_world_space: true,
            triangulate_meshes: true,
            sample_count: 32,
            use_thin_lens_camera: false,
            environment_map_scale: 50.0,
            disney_bsdf: false,
        }
    }
}

impl ExportOptions {
    pub fn from_str(value: &str) -> serde_json::Result<Self> {
        serde_json::from_str(value)
    }
}

pub struct ConfigFileLoader {
    pub path: PathBuf,
    config: Option<ExportOptions>,
}

impl ConfigFileLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: None,
        }
    }

    /// Reads the options file. A missing file is created with the defaults.
    pub fn load_config(&mut self) -> anyhow::Result<&mut ExportOptions> {
        let config = match std::fs::read_to_string(&self.path) {
            Ok(content) => ExportOptions::from_str(&content)
                .with_context(|| format!("Invalid export options in {:?}", self.path))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No options file at {:?}, writing defaults", self.path);
                self.config = Some(ExportOptions::default());
                self.save_config()?;
                ExportOptions::default()
            }
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to read {:?}", self.path));
            }
        };
        Ok(self.config.insert(config))
    }

    pub fn get_or_load_config(&mut self) -> anyhow::Result<&mut ExportOptions> {
        if self.config.is_none() {
            self.load_config()?;
        }
        self.config
            .as_mut()
            .ok_or_else(|| anyhow::format_err!("Export options were not loaded"))
    }

    pub fn save_config(&self) -> anyhow::Result<()> {
        if let Some(config) = &self.config {
            let content = serde_json::to_string_pretty(config)?;
            std::fs::write(&self.path, content)
                .with_context(|| format!("Failed to write {:?}", self.path))?;
        }
        Ok(())
    }
}
