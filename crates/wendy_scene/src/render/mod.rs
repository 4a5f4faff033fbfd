//! Rendering data model and renderer contract
//!
//! This module holds everything a renderer needs to consume a frame: the
//! per-frame [`Scene`] with its sorted operation queues and lights, the
//! shared [`Model`]/[`Light`]/[`Material`] resources that scene-graph nodes
//! reference, and the [`Camera`] whose frustum drives culling.
//!
//! The actual GPU backends (forward and deferred renderers) live outside
//! this crate; they implement [`Renderer`] and must treat the scene as
//! read-only.

pub mod camera;
pub mod light;
pub mod material;
pub mod model;
pub mod queue;

pub use camera::Camera;
pub use light::{AttachedLight, Light, LightKind};
pub use material::{BlendMode, Material, Pass, Phase, Technique};
pub use model::{Model, ModelGeometry};
pub use queue::{GeometryRange, Operation, Queue, Scene, SortKey};

/// Contract a renderer must satisfy to consume a collected frame
///
/// Given a populated scene and a camera, a renderer reads
/// [`Scene::opaque_queue`], [`Scene::blended_queue`] and [`Scene::lights`]
/// and issues draw calls in key order. The driver clears the scene
/// afterwards; renderers never mutate it.
pub trait Renderer {
    /// Render one frame from the collected scene
    fn render(&mut self, scene: &Scene, camera: &Camera);
}
