//! Math utilities and types
//!
//! Provides the rigid-transform and matrix helpers used by pose tracking and
//! view composition. All types are thin aliases over `nalgebra`.

pub use nalgebra::{
    Vector2, Vector3, Vector4,
    Matrix3, Matrix4,
    Quaternion,
    Unit,
};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Rigid transform (orientation + position) of a tracked viewpoint
///
/// Poses are produced by the device session once per eye per frame and are
/// never mutated afterwards; every operation returns a new value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// Orientation quaternion
    pub orientation: Quat,

    /// Position in tracking space (meters)
    pub position: Vec3,
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl Pose {
    /// Identity pose at the tracking origin
    pub fn identity() -> Self {
        Self {
            orientation: Quat::identity(),
            position: Vec3::zeros(),
        }
    }

    /// Create a pose from orientation and position
    pub fn new(orientation: Quat, position: Vec3) -> Self {
        Self { orientation, position }
    }

    /// Create a pose with only a position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    /// Homogeneous matrix, translation applied after rotation
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position) * self.orientation.to_homogeneous()
    }

    /// Recover a pose from a rigid homogeneous matrix
    ///
    /// Any scale or shear in the upper 3x3 block is ignored by the
    /// quaternion extraction; callers must pass rigid transforms.
    pub fn from_matrix(matrix: &Mat4) -> Self {
        let rotation = matrix.rotation_block();
        let translation = matrix.translation_column();
        Self {
            orientation: Quat::from_matrix(&rotation),
            position: translation.xyz(),
        }
    }

    /// Inverse rigid transform
    pub fn inverse(&self) -> Self {
        let orientation = self.orientation.inverse();
        Self {
            position: orientation * (-self.position),
            orientation,
        }
    }

    /// Apply `other` in this pose's local frame
    pub fn compose(&self, other: &Pose) -> Pose {
        Pose {
            orientation: self.orientation * other.orientation,
            position: self.position + self.orientation * other.position,
        }
    }
}

/// Extension trait for Mat4 with block accessors used by view composition
pub trait Mat4Ext {
    /// Off-axis OpenGL projection from half-angle tangents of a field of view
    ///
    /// Clip range is [-1, 1] in depth, right-handed view space looking down -Z.
    fn from_fov_tangents(up: f32, down: f32, left: f32, right: f32, near: f32, far: f32) -> Mat4;

    /// Upper-left 3x3 block
    fn rotation_block(&self) -> Mat3;

    /// Fourth column (translation + w)
    fn translation_column(&self) -> Vec4;

    /// Copy of this matrix with the upper-left 3x3 block replaced
    fn with_rotation_block(&self, rotation: &Mat3) -> Mat4;

    /// Copy of this matrix with the fourth column replaced
    fn with_translation_column(&self, column: &Vec4) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn from_fov_tangents(up: f32, down: f32, left: f32, right: f32, near: f32, far: f32) -> Mat4 {
        let l = -near * left;
        let r = near * right;
        let b = -near * down;
        let t = near * up;

        let mut result = Mat4::zeros();
        result[(0, 0)] = 2.0 * near / (r - l);
        result[(0, 2)] = (r + l) / (r - l);
        result[(1, 1)] = 2.0 * near / (t - b);
        result[(1, 2)] = (t + b) / (t - b);
        result[(2, 2)] = -(far + near) / (far - near);
        result[(2, 3)] = -(2.0 * far * near) / (far - near);
        result[(3, 2)] = -1.0;
        result
    }

    fn rotation_block(&self) -> Mat3 {
        self.fixed_view::<3, 3>(0, 0).into_owned()
    }

    fn translation_column(&self) -> Vec4 {
        self.column(3).into_owned()
    }

    fn with_rotation_block(&self, rotation: &Mat3) -> Mat4 {
        let mut result = *self;
        result.fixed_view_mut::<3, 3>(0, 0).copy_from(rotation);
        result
    }

    fn with_translation_column(&self, column: &Vec4) -> Mat4 {
        let mut result = *self;
        result.set_column(3, column);
        result
    }
}
