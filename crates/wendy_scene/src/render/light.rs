//! Light sources attached to the scene graph
//!
//! Lights are shared resources: one light description may be referenced by
//! several light nodes at once. During enqueue each referencing node attaches
//! the light to the scene at its own world transform.

use std::rc::Rc;

use crate::foundation::math::{Transform3, Vec3};

/// Kind of a light source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    /// Infinitely distant light with a direction only
    Directional,
    /// Omnidirectional light with a radius of influence
    Point,
    /// Cone light with a direction and a radius of influence
    Spot,
}

/// Shared light source description
#[derive(Debug, Clone)]
pub struct Light {
    kind: LightKind,
    color: Vec3,
    radius: f32,
}

impl Light {
    /// Create a new light
    pub fn new(kind: LightKind, color: Vec3, radius: f32) -> Self {
        Self {
            kind,
            color,
            radius,
        }
    }

    /// Get the kind of this light
    pub fn kind(&self) -> LightKind {
        self.kind
    }

    /// Get the color of this light
    pub fn color(&self) -> Vec3 {
        self.color
    }

    /// Get the radius of influence of this light
    pub fn radius(&self) -> f32 {
        self.radius
    }
}

/// A light placed in the world for the current frame
#[derive(Debug, Clone)]
pub struct AttachedLight {
    light: Rc<Light>,
    position: Vec3,
    direction: Vec3,
}

impl AttachedLight {
    /// Place a light at the given world transform
    pub fn new(light: Rc<Light>, world: &Transform3) -> Self {
        Self {
            light,
            position: world.position,
            // Lights shine down their local -Z axis
            direction: world.transform_normal(-Vec3::z()),
        }
    }

    /// Get the light description
    pub fn light(&self) -> &Rc<Light> {
        &self.light
    }

    /// Get the world-space position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Get the world-space direction
    pub fn direction(&self) -> Vec3 {
        self.direction
    }
}
