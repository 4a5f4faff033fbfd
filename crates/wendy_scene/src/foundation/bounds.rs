//! Bounding volumes and frustum culling primitives
//!
//! Scene bounds are sphere-based: cheap to transform through a
//! position/rotation/uniform-scale hierarchy and cheap to test against a
//! frustum. The frustum extraction follows the Gribb-Hartmann method.

use crate::foundation::math::{Mat4, Transform3, Vec3};

/// Bounding sphere
///
/// A sphere with a negative radius is *empty*: it contains nothing,
/// intersects nothing, and is the identity element of [`Sphere::envelop`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    /// Center of the sphere
    pub center: Vec3,
    /// Radius of the sphere; negative means empty
    pub radius: f32,
}

impl Default for Sphere {
    fn default() -> Self {
        Self::empty()
    }
}

impl Sphere {
    /// Create a new sphere from center and radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Create an empty sphere
    pub fn empty() -> Self {
        Self {
            center: Vec3::zeros(),
            radius: -1.0,
        }
    }

    /// Check whether this sphere is empty
    pub fn is_empty(&self) -> bool {
        self.radius < 0.0
    }

    /// Check whether this sphere contains a point
    pub fn contains_point(&self, point: Vec3) -> bool {
        if self.is_empty() {
            return false;
        }

        (point - self.center).norm_squared() <= self.radius * self.radius
    }

    /// Check whether this sphere fully contains another sphere
    pub fn contains_sphere(&self, other: &Self) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }

        (other.center - self.center).norm() + other.radius <= self.radius
    }

    /// Check whether this sphere intersects another sphere
    pub fn intersects(&self, other: &Self) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }

        let combined = self.radius + other.radius;
        (other.center - self.center).norm_squared() <= combined * combined
    }

    /// Grow this sphere the minimal amount needed to contain a point
    ///
    /// Enveloping a point already inside is a no-op. An empty sphere
    /// becomes a zero-radius sphere at the point.
    pub fn envelop_point(&mut self, point: Vec3) {
        if self.is_empty() {
            self.center = point;
            self.radius = 0.0;
            return;
        }

        let offset = point - self.center;
        let distance = offset.norm();
        if distance <= self.radius {
            return;
        }

        let radius = (distance + self.radius) * 0.5;
        self.center += offset * ((radius - self.radius) / distance);
        self.radius = radius;
    }

    /// Grow this sphere the minimal amount needed to contain another sphere
    ///
    /// Enveloping an already-contained sphere is a no-op; enveloping into
    /// an empty sphere yields exactly the other sphere.
    pub fn envelop(&mut self, other: &Self) {
        if other.is_empty() {
            return;
        }

        if self.is_empty() || other.contains_sphere(self) {
            *self = *other;
            return;
        }

        if self.contains_sphere(other) {
            return;
        }

        let offset = other.center - self.center;
        let distance = offset.norm();

        let radius = (distance + self.radius + other.radius) * 0.5;
        if distance > 0.0 {
            self.center += offset * ((radius - self.radius) / distance);
        }
        self.radius = radius;
    }

    /// Return this sphere transformed by the given transform
    ///
    /// The center goes through the full transform; the radius is scaled by
    /// the transform's uniform scale. An empty sphere stays empty.
    pub fn transformed_by(&self, transform: &Transform3) -> Self {
        if self.is_empty() {
            return *self;
        }

        Self {
            center: transform.transform_point(self.center),
            radius: self.radius * transform.scale,
        }
    }
}

/// Plane defined by normal and distance from origin
#[derive(Debug, Clone, Copy)]
pub struct Plane {
    /// Normal vector (normalized)
    pub normal: Vec3,
    /// Distance from origin along the normal
    pub distance: f32,
}

impl Plane {
    /// Create a new plane from a normal and a distance, normalizing both
    pub fn new(normal: Vec3, distance: f32) -> Self {
        let length = normal.norm();
        Self {
            normal: normal / length,
            distance: distance / length,
        }
    }

    /// Calculate the signed distance from this plane to a point
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(&point) + self.distance
    }
}

/// View frustum for visibility culling
///
/// Six planes with normals pointing into the volume.
#[derive(Debug, Clone)]
pub struct Frustum {
    /// The planes defining the frustum (left, right, bottom, top, near, far)
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Create a frustum from six planes
    pub fn new(planes: [Plane; 6]) -> Self {
        Self { planes }
    }

    /// Extract frustum planes from a view-projection matrix
    ///
    /// Uses the Gribb-Hartmann method: each clip plane is a sum or
    /// difference of the fourth matrix row with one of the other rows.
    pub fn from_matrix(matrix: &Mat4) -> Self {
        let row = |i: usize| {
            Vec3::new(matrix[(i, 0)], matrix[(i, 1)], matrix[(i, 2)])
        };
        let w = |i: usize| matrix[(i, 3)];

        let planes = [
            Plane::new(row(3) + row(0), w(3) + w(0)), // left
            Plane::new(row(3) - row(0), w(3) - w(0)), // right
            Plane::new(row(3) + row(1), w(3) + w(1)), // bottom
            Plane::new(row(3) - row(1), w(3) - w(1)), // top
            Plane::new(row(3) + row(2), w(3) + w(2)), // near
            Plane::new(row(3) - row(2), w(3) - w(2)), // far
        ];

        Self { planes }
    }

    /// Check whether a point lies inside the frustum
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.signed_distance(point) >= 0.0)
    }

    /// Check whether a sphere is inside or intersects the frustum
    ///
    /// Empty spheres intersect nothing.
    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        if sphere.is_empty() {
            return false;
        }

        // Outside as soon as the sphere is fully behind any plane
        for plane in &self.planes {
            if plane.signed_distance(sphere.center) < -sphere.radius {
                return false;
            }
        }

        true
    }
}
