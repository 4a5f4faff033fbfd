//! Scene graph nodes
//!
//! Nodes live in an arena owned by their [`Graph`](crate::scene::Graph) and
//! are addressed by stable [`NodeKey`]s. Rather than an open class
//! hierarchy, node behavior is a closed set of kinds; the graph dispatches
//! per-frame update and enqueue over the kind tag.

use std::cell::RefCell;
use std::rc::Rc;

use crate::foundation::bounds::Sphere;
use crate::foundation::math::{Transform3, Vec3};
use crate::render::{Camera, Light, Model};

slotmap::new_key_type! {
    /// Stable handle to a node in a graph's arena
    pub struct NodeKey;
}

bitflags::bitflags! {
    /// Invalidation markers for a node's cached derived values
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DirtyFlags: u8 {
        /// The cached world transform must be recomputed before next read
        const WORLD = 1;
        /// The cached total bounds must be recomputed before next read
        const BOUNDS = 1 << 1;
    }
}

/// Kind of a scene graph node, with its kind-specific payload
///
/// The referenced camera, light and model resources are shared: one model
/// may be attached to many model nodes at once. The camera is behind a
/// `RefCell` because the graph writes its transform during update.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Grouping node with no content of its own
    Plain,
    /// Node that pushes its world transform into a camera every frame
    Camera(Rc<RefCell<Camera>>),
    /// Node that attaches a light during enqueue
    Light(Rc<Light>),
    /// Node that submits a model's draw operations during enqueue
    Model {
        /// The model to draw
        model: Rc<Model>,
        /// Whether the model renders into shadow maps
        casts_shadows: bool,
    },
}

impl NodeKind {
    /// Whether nodes of this kind join the graph's per-frame update list
    pub(crate) fn needs_update(&self) -> bool {
        matches!(self, Self::Camera(_) | Self::Light(_))
    }

    /// Local bounds implied by the kind's content
    pub(crate) fn initial_bounds(&self) -> Sphere {
        match self {
            Self::Light(light) => Sphere::new(Vec3::zeros(), light.radius()),
            Self::Model { model, .. } => model.bounding_sphere(),
            _ => Sphere::empty(),
        }
    }
}

/// Hierarchical scene graph element
///
/// Owns a local transform and local bounds, plus lazily recomputed caches
/// of the world transform and the aggregate bounds of its subtree.
#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) needs_update: bool,
    pub(crate) parent: Option<NodeKey>,
    pub(crate) children: Vec<NodeKey>,
    pub(crate) in_graph: bool,
    pub(crate) local: Transform3,
    pub(crate) world: Transform3,
    pub(crate) local_bounds: Sphere,
    pub(crate) total_bounds: Sphere,
    pub(crate) dirty: DirtyFlags,
}

impl Node {
    pub(crate) fn new(kind: NodeKind) -> Self {
        let needs_update = kind.needs_update();
        let local_bounds = kind.initial_bounds();

        Self {
            kind,
            needs_update,
            parent: None,
            children: Vec::new(),
            in_graph: false,
            local: Transform3::identity(),
            world: Transform3::identity(),
            local_bounds,
            total_bounds: local_bounds,
            dirty: DirtyFlags::all(),
        }
    }
}
