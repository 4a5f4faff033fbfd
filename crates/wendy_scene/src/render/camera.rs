//! Perspective camera
//!
//! The camera is an external collaborator of the scene graph: a camera node
//! pushes its accumulated world transform into the camera each frame, and
//! the graph reads back only the frustum for culling. Cameras look down
//! their local -Z axis in a Y-up right-handed space.

use crate::foundation::bounds::Frustum;
use crate::foundation::math::{Mat4, Transform3, Vec3};

/// Perspective camera with a world transform and projection parameters
#[derive(Debug, Clone)]
pub struct Camera {
    transform: Transform3,
    fov: f32,
    aspect_ratio: f32,
    near_z: f32,
    far_z: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            transform: Transform3::identity(),
            fov: std::f32::consts::FRAC_PI_2,
            aspect_ratio: 4.0 / 3.0,
            near_z: 0.1,
            far_z: 1000.0,
        }
    }
}

impl Camera {
    /// Create a camera with default projection parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the world transform
    pub fn transform(&self) -> &Transform3 {
        &self.transform
    }

    /// Set the world transform
    ///
    /// Called by the owning camera node every frame after the scene graph
    /// has settled world transforms.
    pub fn set_transform(&mut self, transform: Transform3) {
        self.transform = transform;
    }

    /// Get the vertical field of view, in radians
    pub fn fov(&self) -> f32 {
        self.fov
    }

    /// Set the vertical field of view, in radians
    pub fn set_fov(&mut self, fov: f32) {
        self.fov = fov;
    }

    /// Get the aspect ratio
    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    /// Set the aspect ratio
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }

    /// Get the near clip distance
    pub fn near_z(&self) -> f32 {
        self.near_z
    }

    /// Get the far clip distance
    pub fn far_z(&self) -> f32 {
        self.far_z
    }

    /// Set the near and far clip distances
    pub fn set_depth_range(&mut self, near_z: f32, far_z: f32) {
        self.near_z = near_z;
        self.far_z = far_z;
    }

    /// Get the world-to-camera transform
    pub fn view_transform(&self) -> Transform3 {
        self.transform.inverse()
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Mat4 {
        self.view_transform().to_matrix()
    }

    /// Get the perspective projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::new_perspective(self.aspect_ratio, self.fov, self.near_z, self.far_z)
    }

    /// Get the combined view-projection matrix
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Get the world-space view frustum
    pub fn frustum(&self) -> Frustum {
        Frustum::from_matrix(&self.view_projection())
    }

    /// Normalized distance from the camera to a world-space point
    ///
    /// Used as the depth component of render queue sort keys.
    pub fn normalized_depth(&self, point: Vec3) -> f32 {
        ((point - self.transform.position).norm() / self.far_z).clamp(0.0, 1.0)
    }
}
