use std::ops::Mul;

use serde::{Deserialize, Serialize};
use ultraviolet::{Mat4, Vec3, Vec4};

/// An affine object-to-world matrix, stored row-major like the host tools hand it out.
/// `rows[r][c]`, the translation lives in the last column.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct WorldMatrix {
    pub rows: [[f32; 4]; 4],
}

impl WorldMatrix {
    pub const IDENTITY: WorldMatrix = WorldMatrix {
        rows: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    pub fn from_rows(rows: [[f32; 4]; 4]) -> Self {
        Self { rows }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        let mut matrix = Self::IDENTITY;
        matrix.rows[0][3] = translation.x;
        matrix.rows[1][3] = translation.y;
        matrix.rows[2][3] = translation.z;
        matrix
    }

    /// World-space location of the object origin.
    pub fn translation(&self) -> Vec3 {
        Vec3::new(self.rows[0][3], self.rows[1][3], self.rows[2][3])
    }

    pub fn is_finite(&self) -> bool {
        self.rows.iter().flatten().all(|v| v.is_finite())
    }

    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        Mat4::from(*self).transform_point3(point)
    }

    /// Row-major iteration, the order the scene file expects.
    pub fn values(&self) -> impl Iterator<Item = f32> + '_ {
        self.rows.iter().flat_map(|row| row.iter().copied())
    }
}

impl Default for WorldMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<WorldMatrix> for Mat4 {
    fn from(matrix: WorldMatrix) -> Self {
        let r = matrix.rows;
        let column = |c: usize| Vec4::new(r[0][c], r[1][c], r[2][c], r[3][c]);
        Mat4::new(column(0), column(1), column(2), column(3))
    }
}

impl From<Mat4> for WorldMatrix {
    fn from(matrix: Mat4) -> Self {
        let mut rows = [[0.0; 4]; 4];
        for (c, column) in matrix.cols.iter().enumerate() {
            rows[0][c] = column.x;
            rows[1][c] = column.y;
            rows[2][c] = column.z;
            rows[3][c] = column.w;
        }
        Self { rows }
    }
}

impl Mul<WorldMatrix> for WorldMatrix {
    type Output = WorldMatrix;

    fn mul(self, rhs: WorldMatrix) -> Self::Output {
        (Mat4::from(self) * Mat4::from(rhs)).into()
    }
}
