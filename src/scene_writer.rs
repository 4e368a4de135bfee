use std::path::PathBuf;

use relative_path::{RelativePath, RelativePathBuf};
use scene_common::{CameraObject, MeshObject, SceneSnapshot};

use crate::{
    camera::{camera_element, to_world_transform},
    config_loader::ExportOptions,
    document::{Document, Element},
    emitter::{area_emitter, environment_emitter, light_emitter},
    error::ExportError,
    export_session::ExportSession,
    material::{default_bsdf, MaterialTranslator},
};

/// What an export produced.
#[derive(Debug)]
pub struct ExportSummary {
    pub scene_file: PathBuf,
    pub document: Document,
    pub mesh_files: Vec<RelativePathBuf>,
    pub staged_textures: usize,
}

/// Walks a snapshot once and writes the Nori scene:
///  1) integrator
///  2) sampler
///  3) one camera
///  4) light sources
///  5) meshes, with their BSDFs and area emitters
///  6) environment map
pub struct SceneWriter {
    session: ExportSession,
}

impl SceneWriter {
    pub fn new(session: ExportSession) -> Self {
        Self { session }
    }

    pub fn write(mut self, scene: &SceneSnapshot) -> Result<ExportSummary, ExportError> {
        let options = self.session.options().clone();
        validate_scene(scene, &options)?;
        self.session.create_directories()?;

        let mut document = Document::new();
        document.push(integrator_element(&options));
        document.push(sampler_element(&options));

        if let Some(camera) = select_camera(&scene.cameras) {
            document.push(camera_element(
                camera,
                &scene.render,
                options.use_thin_lens_camera,
            ));
        }

        if options.export_lights {
            for light in scene.lights.iter().filter(|light| light.visible) {
                if let Some(emitter) = light_emitter(light) {
                    document.push(emitter);
                }
            }
        }

        let meshes: Vec<&MeshObject> = scene
            .meshes
            .iter()
            .filter(|mesh| mesh.visible && mesh.kind.has_geometry())
            .collect();
        let mut mesh_files = Vec::with_capacity(meshes.len());
        for (index, mesh) in meshes.iter().enumerate() {
            log::info!("[{}/{}] Exporting {}", index + 1, meshes.len(), mesh.name);
            let mesh_file = self.session.mesh_file(&mesh.name);
            for element in self.mesh_elements(mesh, &mesh_file, &options) {
                document.push(element);
            }

            let destination = self.session.absolute(&mesh_file);
            self.session
                .geometry_writer
                .write_mesh(mesh, &destination, options.export_meshes_in_world_space)
                .map_err(|source| ExportError::Geometry {
                    mesh: mesh.name.clone(),
                    source,
                })?;
            mesh_files.push(mesh_file);
        }

        if let Some(world) = &scene.world {
            if let Some(environment) = environment_emitter(
                world,
                options.environment_map_scale,
                &mut self.session.stager,
            ) {
                document.push(environment);
            }
        }

        let scene_file = self.session.scene_path().to_path_buf();
        std::fs::write(&scene_file, document.to_xml_string()).map_err(|source| {
            ExportError::WriteScene {
                path: scene_file.clone(),
                source,
            }
        })?;
        log::info!("Wrote {:?}", scene_file);

        Ok(ExportSummary {
            scene_file,
            document,
            mesh_files,
            staged_textures: self.session.stager.staged_count(),
        })
    }

    /// One `<mesh>` per material slot, all sharing the same geometry file.
    fn mesh_elements(
        &mut self,
        mesh: &MeshObject,
        mesh_file: &RelativePath,
        options: &ExportOptions,
    ) -> Vec<Element> {
        let mesh_entry = || {
            let element = Element::typed("mesh", "obj").with_child(Element::entry(
                "string",
                "filename",
                mesh_file.as_str(),
            ));
            if options.export_meshes_in_world_space {
                element
            } else {
                element.with_child(to_world_transform(&mesh.world_matrix, None))
            }
        };

        if !mesh.has_material() {
            return vec![mesh_entry().with_child(default_bsdf())];
        }

        let mut translator = MaterialTranslator::new(options, &mut self.session.stager);
        mesh.material_slots
            .iter()
            .map(|slot| {
                log::debug!("MESH: {} BSDF: {}", mesh.name, slot.name);
                let mut element = mesh_entry().with_child(translator.translate(slot));
                if options.export_lights {
                    let emitter = slot.material.as_ref().and_then(|material| {
                        let graph = material.graph.as_ref()?;
                        area_emitter(&material.name, graph)
                    });
                    if let Some(emitter) = emitter {
                        element.push_child(emitter);
                    }
                }
                element
            })
            .collect()
    }
}

fn integrator_element(options: &ExportOptions) -> Element {
    let integrator = if options.export_lights {
        "path_mis"
    } else {
        "normals"
    };
    Element::typed("integrator", integrator)
}

fn sampler_element(options: &ExportOptions) -> Element {
    Element::typed("sampler", "independent").with_child(Element::entry(
        "integer",
        "sampleCount",
        options.sample_count.to_string(),
    ))
}

/// Nori renders through exactly one camera.
fn select_camera(cameras: &[CameraObject]) -> Option<&CameraObject> {
    match cameras {
        [] => {
            log::warn!("No camera to export");
            None
        }
        [camera] => Some(camera),
        [camera, ignored @ ..] => {
            log::warn!(
                "Multiple cameras are not supported, exporting {:?} and ignoring {} others",
                camera.name,
                ignored.len()
            );
            Some(camera)
        }
    }
}

/// Rejects snapshots we cannot write a consistent scene for. Runs before any
/// file is touched.
fn validate_scene(scene: &SceneSnapshot, options: &ExportOptions) -> Result<(), ExportError> {
    let matrices = scene
        .meshes
        .iter()
        .map(|m| (&m.name, &m.world_matrix))
        .chain(scene.lights.iter().map(|l| (&l.name, &l.world_matrix)))
        .chain(scene.cameras.iter().map(|c| (&c.name, &c.world_matrix)));
    for (name, matrix) in matrices {
        if !matrix.is_finite() {
            return Err(ExportError::MalformedScene(format!(
                "{:?} has a non-finite transform",
                name
            )));
        }
    }

    for camera in &scene.cameras {
        let values = [camera.angle, camera.clip_start, camera.clip_end];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ExportError::MalformedScene(format!(
                "Camera {:?} has non-finite settings",
                camera.name
            )));
        }
        // fstop is written as 1 / f-stop
        let dof = &camera.dof;
        if options.use_thin_lens_camera
            && !(dof.aperture_fstop.is_finite()
                && dof.aperture_fstop > 0.0
                && dof.focus_distance.is_finite())
        {
            return Err(ExportError::MalformedScene(format!(
                "Camera {:?} needs a positive f-stop and a finite focus distance for a thin lens",
                camera.name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, path::Path, rc::Rc};

    use scene_common::{transform::WorldMatrix, DepthOfField, MeshGeometry};

    use super::*;
    use crate::{error::GeometryError, geometry::GeometryWriter};

    /// Remembers what it was asked to write instead of touching the disk.
    #[derive(Clone, Default)]
    struct RecordingWriter {
        written: Rc<RefCell<Vec<(String, PathBuf, bool)>>>,
    }

    impl GeometryWriter for RecordingWriter {
        fn write_mesh(
            &mut self,
            mesh: &MeshObject,
            destination: &Path,
            world_space: bool,
        ) -> Result<(), GeometryError> {
            self.written.borrow_mut().push((
                mesh.name.clone(),
                destination.to_path_buf(),
                world_space,
            ));
            Ok(())
        }

        fn extension(&self) -> &'static str {
            "ply"
        }
    }

    fn camera(name: &str) -> CameraObject {
        CameraObject {
            name: name.into(),
            angle: 0.8,
            clip_start: 0.1,
            clip_end: 100.0,
            world_matrix: WorldMatrix::IDENTITY,
            dof: DepthOfField::default(),
        }
    }

    #[test]
    fn first_camera_is_selected() {
        assert!(select_camera(&[]).is_none());
        let cameras = [camera("A"), camera("B")];
        assert_eq!(select_camera(&cameras).unwrap().name, "A");
    }

    #[test]
    fn integrator_depends_on_lights() {
        let mut options = ExportOptions::default();
        assert_eq!(integrator_element(&options).attr("type"), Some("path_mis"));
        options.export_lights = false;
        assert_eq!(integrator_element(&options).attr("type"), Some("normals"));
    }

    #[test]
    fn non_finite_transform_is_rejected() {
        let mut scene = SceneSnapshot::new();
        let mut bad = camera("Broken");
        bad.world_matrix.rows[0][0] = f32::INFINITY;
        scene.cameras.push(bad);
        assert!(matches!(
            validate_scene(&scene, &ExportOptions::default()),
            Err(ExportError::MalformedScene(_))
        ));
    }

    #[test]
    fn zero_fstop_is_rejected_for_thin_lens() {
        let mut scene = SceneSnapshot::new();
        let mut pinhole = camera("Pinhole");
        pinhole.dof.aperture_fstop = 0.0;
        scene.cameras.push(pinhole);

        assert!(validate_scene(&scene, &ExportOptions::default()).is_ok());
        let thin_lens = ExportOptions {
            use_thin_lens_camera: true,
            ..ExportOptions::default()
        };
        assert!(matches!(
            validate_scene(&scene, &thin_lens),
            Err(ExportError::MalformedScene(_))
        ));
    }

    #[test]
    fn geometry_goes_through_the_session_writer() {
        let dir = tempfile::tempdir().unwrap();
        let writer = RecordingWriter::default();
        let session =
            ExportSession::new(dir.path().join("scene.xml"), ExportOptions::default(), None)
                .with_geometry_writer(Box::new(writer.clone()));

        let mut scene = SceneSnapshot::new();
        for _ in 0..2 {
            scene
                .meshes
                .push(MeshObject::new("Chair", MeshGeometry::unit_quad()));
        }
        let summary = SceneWriter::new(session).write(&scene).unwrap();

        let files: Vec<_> = summary.mesh_files.iter().map(|f| f.as_str()).collect();
        assert_eq!(files, vec!["meshes/Chair.ply", "meshes/Chair.001.ply"]);

        let written = writer.written.borrow();
        assert_eq!(written.len(), 2);
        assert_eq!(written[0].1, dir.path().join("meshes").join("Chair.ply"));
        assert_eq!(written[1].1, dir.path().join("meshes").join("Chair.001.ply"));
        assert!(written.iter().all(|(name, _, world_space)| name == "Chair" && *world_space));
    }
}
