use std::path::PathBuf;

use clap::Parser;
use env_logger::Env;
use nori_export::{config_loader::ConfigFileLoader, export_scene, loader, ExportOptions};

/// Exports a scene snapshot (JSON) or a glTF file to a Nori scene.
#[derive(Parser, Debug)]
#[command(name = "nori-export", version, about)]
struct Args {
    /// Scene to export, `.gltf`/`.glb` or a JSON snapshot
    scene: PathBuf,

    /// Nori scene file to write. Meshes and textures go next to it.
    output: PathBuf,

    /// Export options file, created with the defaults if it does not exist
    #[arg(long)]
    config: Option<PathBuf>,

    /// Samples per pixel
    #[arg(long)]
    samples: Option<u32>,

    /// Skip light sources and emissive materials
    #[arg(long)]
    no_lights: bool,

    /// Use constant colors instead of image textures
    #[arg(long)]
    no_textures: bool,

    /// Export a thin lens camera with depth of field
    #[arg(long)]
    thin_lens: bool,

    /// Keep meshes in object space and write their transforms to the scene
    #[arg(long)]
    local_space: bool,
}

impl Args {
    fn apply(&self, options: &mut ExportOptions) {
        if let Some(samples) = self.samples {
            options.sample_count = samples;
        }
        if self.no_lights {
            options.export_lights = false;
        }
        if self.no_textures {
            options.export_textures = false;
        }
        if self.thin_lens {
            options.use_thin_lens_camera = true;
        }
        if self.local_space {
            options.export_meshes_in_world_space = false;
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let mut options = match &args.config {
        Some(path) => ConfigFileLoader::new(path).get_or_load_config()?.clone(),
        None => ExportOptions::default(),
    };
    args.apply(&mut options);

    let scene = loader::load_scene(&args.scene)?;
    let summary = export_scene(&scene, &args.output, options)?;
    log::info!(
        "Exported {} meshes and {} textures to {:?}",
        summary.mesh_files.len(),
        summary.staged_textures,
        summary.scene_file
    );
    Ok(())
}
