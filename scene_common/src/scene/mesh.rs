use serde::{Deserialize, Serialize};

use crate::transform::WorldMatrix;

use super::{default_true, MaterialSlot};

/// A mesh-like object, with instancing and modifiers already resolved by the host.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MeshObject {
    pub name: String,
    #[serde(default)]
    pub kind: ObjectKind,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub world_matrix: WorldMatrix,
    #[serde(default)]
    pub material_slots: Vec<MaterialSlot>,
    #[serde(default)]
    pub geometry: MeshGeometry,
}

impl MeshObject {
    pub fn new(name: impl Into<String>, geometry: MeshGeometry) -> Self {
        Self {
            name: name.into(),
            kind: ObjectKind::Mesh,
            visible: true,
            world_matrix: WorldMatrix::IDENTITY,
            material_slots: Vec::new(),
            geometry,
        }
    }

    /// The first slot decides whether the object counts as having a material at all.
    pub fn has_material(&self) -> bool {
        self.material_slots
            .first()
            .map_or(false, |slot| slot.material.is_some())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    #[default]
    Mesh,
    Curve,
    Font,
    Meta,
    Surface,
    /// Has no geometry, never exported.
    Empty,
}

impl ObjectKind {
    pub fn has_geometry(&self) -> bool {
        !matches!(self, ObjectKind::Empty)
    }
}

/// Vertex and face data in object-local coordinates.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct MeshGeometry {
    pub positions: Vec<[f32; 3]>,
    /// Either empty or one entry per position.
    #[serde(default)]
    pub tex_coords: Vec<[f32; 2]>,
    /// Polygons as zero-based position indices.
    pub faces: Vec<Vec<u32>>,
}

impl MeshGeometry {
    pub fn unit_quad() -> Self {
        Self {
            positions: vec![
                [-1.0, -1.0, 0.0],
                [1.0, -1.0, 0.0],
                [1.0, 1.0, 0.0],
                [-1.0, 1.0, 0.0],
            ],
            tex_coords: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
            faces: vec![vec![0, 1, 2, 3]],
        }
    }
}
