use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use scene_common::{MeshGeometry, MeshObject};
use ultraviolet::Vec3;

use crate::error::GeometryError;

/// Persists the vertex and face data of one mesh.
pub trait GeometryWriter {
    /// With `world_space` the object transform is baked into the positions,
    /// otherwise positions stay in object-local space.
    fn write_mesh(
        &mut self,
        mesh: &MeshObject,
        destination: &Path,
        world_space: bool,
    ) -> Result<(), GeometryError>;

    /// File extension of the written meshes, without the dot.
    fn extension(&self) -> &'static str;
}

/// Wavefront OBJ output, as read by Nori's `obj` mesh plugin.
pub struct ObjWriter {
    pub triangulate: bool,
}

impl ObjWriter {
    pub fn new(triangulate: bool) -> Self {
        Self { triangulate }
    }

    pub fn write_obj(
        &self,
        out: &mut impl Write,
        mesh: &MeshObject,
        world_space: bool,
    ) -> Result<(), GeometryError> {
        let geometry = &mesh.geometry;
        validate_faces(geometry)?;
        let has_tex_coords =
            !geometry.tex_coords.is_empty() && geometry.tex_coords.len() == geometry.positions.len();
        if !geometry.tex_coords.is_empty() && !has_tex_coords {
            log::warn!(
                "{:?} has {} texture coordinates for {} vertices, leaving them out",
                mesh.name,
                geometry.tex_coords.len(),
                geometry.positions.len()
            );
        }

        writeln!(out, "# OBJ file")?;
        for position in &geometry.positions {
            let mut position = Vec3::from(*position);
            if world_space {
                position = mesh.world_matrix.transform_point(position);
            }
            writeln!(out, "v {:.4} {:.4} {:.4}", position.x, position.y, position.z)?;
        }
        if has_tex_coords {
            for [u, v] in &geometry.tex_coords {
                writeln!(out, "vt {:.4} {:.4}", u, v)?;
            }
        }

        let degenerate = geometry.faces.iter().filter(|face| face.len() < 3).count();
        if degenerate > 0 {
            log::warn!(
                "Skipping {} faces of {:?} with fewer than three corners",
                degenerate,
                mesh.name
            );
        }

        for face in geometry.faces.iter().filter(|face| face.len() >= 3) {
            for polygon in self.split_face(face) {
                write!(out, "f")?;
                for index in polygon {
                    let index = index + 1;
                    if has_tex_coords {
                        write!(out, " {index}/{index}")?;
                    } else {
                        write!(out, " {index}")?;
                    }
                }
                writeln!(out)?;
            }
        }
        Ok(())
    }

    /// Fan triangulation, good enough for the convex polygons hosts produce.
    fn split_face(&self, face: &[u32]) -> Vec<Vec<u32>> {
        if !self.triangulate || face.len() <= 3 {
            return vec![face.to_vec()];
        }
        (1..face.len() - 1)
            .map(|i| vec![face[0], face[i], face[i + 1]])
            .collect()
    }
}

fn validate_faces(geometry: &MeshGeometry) -> Result<(), GeometryError> {
    let vertex_count = geometry.positions.len();
    for (face_index, face) in geometry.faces.iter().enumerate() {
        if let Some(&index) = face.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(GeometryError::InvalidIndex {
                face: face_index,
                index,
                vertex_count,
            });
        }
    }
    Ok(())
}

impl GeometryWriter for ObjWriter {
    fn write_mesh(
        &mut self,
        mesh: &MeshObject,
        destination: &Path,
        world_space: bool,
    ) -> Result<(), GeometryError> {
        let mut out = BufWriter::new(File::create(destination)?);
        self.write_obj(&mut out, mesh, world_space)?;
        out.flush()?;
        Ok(())
    }

    fn extension(&self) -> &'static str {
        "obj"
    }
}
