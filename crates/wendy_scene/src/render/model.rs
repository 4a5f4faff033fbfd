//! Renderable models
//!
//! A model is a shared resource pairing geometry ranges with materials,
//! plus a precomputed bounding sphere. Model nodes submit one draw
//! operation per geometry and pass of the technique matching the scene's
//! current phase.

use std::rc::Rc;

use crate::foundation::bounds::Sphere;
use crate::foundation::math::Transform3;
use crate::render::camera::Camera;
use crate::render::material::Material;
use crate::render::queue::{GeometryRange, Scene};

/// Geometry range with its material
#[derive(Debug, Clone)]
pub struct ModelGeometry {
    /// Geometry to draw
    pub range: GeometryRange,
    /// Material applied to this geometry
    pub material: Rc<Material>,
}

impl ModelGeometry {
    /// Create a new model geometry
    pub fn new(range: GeometryRange, material: Rc<Material>) -> Self {
        Self { range, material }
    }
}

/// Shared renderable model
#[derive(Debug, Clone)]
pub struct Model {
    geometries: Vec<ModelGeometry>,
    bounds: Sphere,
}

impl Model {
    /// Create a model from its geometries and bounding sphere
    pub fn new(geometries: Vec<ModelGeometry>, bounds: Sphere) -> Self {
        Self { geometries, bounds }
    }

    /// Get the geometries of this model
    pub fn geometries(&self) -> &[ModelGeometry] {
        &self.geometries
    }

    /// Get the bounding sphere of this model, in model space
    pub fn bounding_sphere(&self) -> Sphere {
        self.bounds
    }

    /// Submit draw operations for this model at the given world transform
    ///
    /// Consults each material's technique for the scene's current phase;
    /// geometries whose material has no passes in that phase are skipped.
    pub fn enqueue(&self, scene: &mut Scene, camera: &Camera, world: &Transform3) {
        let matrix = world.to_matrix();
        let depth = camera.normalized_depth(world.position);

        for geometry in &self.geometries {
            let technique = geometry.material.technique(scene.phase());

            for pass in technique.passes() {
                scene.enqueue(geometry.range, matrix, depth, *pass);
            }
        }
    }
}
