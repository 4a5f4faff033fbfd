//! # Wendy Scene
//!
//! The scene-graph and render-queue core of a 3D engine.
//!
//! ## Features
//!
//! - **Scene Graph**: Hierarchical transform nodes with lazy world-transform
//!   and bounding-sphere caches
//! - **Frustum Culling**: Per-subtree visibility tests during enqueue
//! - **Render Queues**: Draw operations batched by packed sort keys, opaque
//!   front-to-back and blended back-to-front
//! - **Node Kinds**: Camera, light and model nodes built on a shared
//!   plain-node core
//!
//! ## Quick Start
//!
//! ```rust
//! use wendy_scene::prelude::*;
//! use std::rc::Rc;
//!
//! let mut graph = Graph::new();
//! let model = Rc::new(Model::new(Vec::new(), Sphere::new(Vec3::zeros(), 1.0)));
//!
//! let node = graph.create_model_node(model);
//! graph.add_root_node(node);
//! graph.set_local_position(node, Vec3::new(0.0, 0.0, -5.0));
//!
//! let camera = Camera::new();
//! let mut scene = Scene::new();
//!
//! graph.update();
//! graph.enqueue(&mut scene, &camera);
//! // hand `scene` to a Renderer, then:
//! scene.remove_operations();
//! scene.detach_lights();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod render;
pub mod scene;

/// Common imports for crate users
pub mod prelude {
    pub use crate::{
        foundation::{
            bounds::{Frustum, Plane, Sphere},
            math::{Mat4, Quat, Transform3, Vec3},
        },
        render::{
            BlendMode, Camera, GeometryRange, Light, LightKind, Material, Model, ModelGeometry,
            Pass, Phase, Renderer, Scene,
        },
        scene::{Graph, GraphConfig, NodeKey, NodeKind, SceneGraphError},
    };
}
