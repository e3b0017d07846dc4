//! Math utilities and types
//!
//! Provides the transform and matrix types the trackers and scene graph share.
//! All matrices use nalgebra's column-vector convention: a point is transformed
//! as `M * p` and the translation lives in the fourth column.

pub use nalgebra::{
    Vector3,
    Matrix3, Matrix4,
    UnitQuaternion,
};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = UnitQuaternion<f32>;

/// Transform representing position, rotation, and scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Builder pattern: Set rotation
    #[must_use]
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Builder pattern: Set scale
    #[must_use]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Builder pattern: Set uniform scale
    #[must_use]
    pub fn with_uniform_scale(self, scale: f32) -> Self {
        self.with_scale(Vec3::new(scale, scale, scale))
    }

    /// Convert to a transformation matrix (T * R * S)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Apply this transform to a point
    pub fn transform_point(&self, point: Point3) -> Point3 {
        self.to_matrix().transform_point(&point)
    }

    /// Create a transform from a transformation matrix
    ///
    /// Assumes the matrix has no shear. Zero scale on any axis leaves the
    /// rotation undefined and yields non-finite rotation components.
    pub fn from_matrix(matrix: Mat4) -> Self {
        let position = Vec3::new(matrix.m14, matrix.m24, matrix.m34);

        let scale_x = Vec3::new(matrix.m11, matrix.m21, matrix.m31).magnitude();
        let scale_y = Vec3::new(matrix.m12, matrix.m22, matrix.m32).magnitude();
        let scale_z = Vec3::new(matrix.m13, matrix.m23, matrix.m33).magnitude();
        let scale = Vec3::new(scale_x, scale_y, scale_z);

        let rotation_matrix = Mat3::new(
            matrix.m11 / scale_x, matrix.m12 / scale_y, matrix.m13 / scale_z,
            matrix.m21 / scale_x, matrix.m22 / scale_y, matrix.m23 / scale_z,
            matrix.m31 / scale_x, matrix.m32 / scale_y, matrix.m33 / scale_z,
        );
        let rotation = Quat::from_matrix(&rotation_matrix);

        Self {
            position,
            rotation,
            scale,
        }
    }
}

/// Extension trait for Mat4 with the operations motion tracking needs
pub trait Mat4Ext {
    /// Inverse without a singularity guard
    ///
    /// A singular matrix has no inverse; every component of the result is NaN.
    fn inverse_or_nan(&self) -> Mat4;

    /// True when every component is finite
    fn is_finite_matrix(&self) -> bool;

    /// Translation column of an affine matrix
    fn translation(&self) -> Vec3;

    /// Column-major `[[f32; 4]; 4]` array, the layout GPU uniform blocks expect
    fn to_cols_array_2d(&self) -> [[f32; 4]; 4];
}

impl Mat4Ext for Mat4 {
    fn inverse_or_nan(&self) -> Mat4 {
        self.try_inverse()
            .unwrap_or_else(|| Mat4::from_element(f32::NAN))
    }

    fn is_finite_matrix(&self) -> bool {
        self.iter().all(|v| v.is_finite())
    }

    fn translation(&self) -> Vec3 {
        Vec3::new(self.m14, self.m24, self.m34)
    }

    fn to_cols_array_2d(&self) -> [[f32; 4]; 4] {
        let s = self.as_slice();
        [
            [s[0], s[1], s[2], s[3]],
            [s[4], s[5], s[6], s[7]],
            [s[8], s[9], s[10], s[11]],
            [s[12], s[13], s[14], s[15]],
        ]
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;
}
