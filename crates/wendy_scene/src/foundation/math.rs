//! Math utilities and types
//!
//! Provides the fundamental math types for 3D scene management, built on
//! nalgebra. All coordinates follow Y-up right-handed conventions with
//! cameras looking down negative Z.

pub use nalgebra::{Matrix3, Matrix4, Quaternion, Unit, Vector2, Vector3, Vector4};

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

/// Composable transform with position, rotation and uniform scale
///
/// Composition follows the parent ∘ child convention: `a * b` is the
/// transform that applies `b` first and `a` second. Scene-graph world
/// transforms are accumulated this way from the root down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform3 {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion (kept normalized)
    pub rotation: Quat,

    /// Uniform scale factor
    pub scale: f32,
}

impl Default for Transform3 {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: 1.0,
        }
    }
}

impl Transform3 {
    /// Create a new transform from all components
    pub fn new(position: Vec3, rotation: Quat, scale: f32) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

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

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Apply this transform to a point
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.rotation * (point * self.scale)
    }

    /// Apply the rotation and scale of this transform to a vector,
    /// ignoring translation
    pub fn transform_vector(&self, vector: Vec3) -> Vec3 {
        self.rotation * (vector * self.scale)
    }

    /// Apply only the rotation of this transform to a normal,
    /// preserving its length
    pub fn transform_normal(&self, normal: Vec3) -> Vec3 {
        self.rotation * normal
    }

    /// Get the inverse transform
    ///
    /// Applying the inverse after the forward transform (or vice versa)
    /// returns any point to where it started, within floating-point
    /// tolerance. A degenerate scale of zero inverts to infinity; the
    /// result is well-formed but produces degenerate bounds downstream.
    pub fn inverse(&self) -> Self {
        let inv_scale = 1.0 / self.scale;
        let inv_rotation = self.rotation.inverse();
        let inv_position = inv_rotation * (-self.position * inv_scale);

        Self {
            position: inv_position,
            rotation: inv_rotation,
            scale: inv_scale,
        }
    }

    /// Convert to a transformation matrix (TRS order)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_scaling(self.scale)
    }
}

impl std::ops::Mul for Transform3 {
    type Output = Self;

    /// Compose two transforms, applying `rhs` first and `self` second
    fn mul(self, rhs: Self) -> Self {
        let mut rotation = self.rotation * rhs.rotation;
        rotation.renormalize();

        Self {
            position: self.position + self.rotation * (rhs.position * self.scale),
            rotation,
            scale: self.scale * rhs.scale,
        }
    }
}

impl std::ops::MulAssign for Transform3 {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Convert degrees to radians
pub fn degrees_to_radians(degrees: f32) -> f32 {
    degrees * constants::DEG_TO_RAD
}

/// Convert radians to degrees
pub fn radians_to_degrees(radians: f32) -> f32 {
    radians * constants::RAD_TO_DEG
}
