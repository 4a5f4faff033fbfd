//! Scene graph container and per-frame pipeline
//!
//! The graph owns the node arena and drives the two per-frame entry points:
//! [`Graph::update`], which settles derived state for nodes that track
//! external resources, and [`Graph::enqueue`], which walks the roots,
//! frustum-culls subtrees by their world-space bounds, and pushes draw
//! operations and lights into the frame's [`Scene`].
//!
//! Two invalidation directions keep the caches correct:
//! - world-transform dirtiness propagates *downward*: moving a node moves
//!   its whole subtree, so the subtree is marked eagerly;
//! - bounds dirtiness propagates *upward*: aggregate bounds summarize a
//!   subtree, so every ancestor up to the root is marked.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::foundation::bounds::{Frustum, Sphere};
use crate::foundation::math::{Quat, Transform3, Vec3};
use crate::render::{Camera, Light, Model, Phase, Scene};
use crate::scene::node::{DirtyFlags, Node, NodeKey, NodeKind};

/// Scene graph errors
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneGraphError {
    /// The requested attachment would make a node an ancestor of itself
    #[error("attaching this child would create a cycle")]
    WouldCreateCycle,
}

/// Graph behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Cull subtrees against the camera frustum during enqueue
    pub enable_culling: bool,

    /// Node arena capacity reserved up front
    pub initial_node_capacity: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            enable_culling: true,
            initial_node_capacity: 256,
        }
    }
}

impl GraphConfig {
    /// Load a configuration from a `.toml` or `.ron` file
    pub fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        if !path.ends_with(".toml") && !path.ends_with(".ron") {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        }

        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        }
    }

    /// Save this configuration to a `.toml` or `.ron` file
    pub fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),
}

/// Top-level container of a scene's node hierarchy
///
/// Owns every node exclusively through its arena: a node belongs to its
/// parent, root nodes belong to the graph, and destroying a node destroys
/// its whole subtree. Nodes start standalone and only participate in the
/// frame pipeline once attached under a root.
///
/// The per-frame driver sequence is `update()`, then `enqueue()`, then hand
/// the scene to a renderer, then clear the scene.
///
/// Methods taking a [`NodeKey`] panic when handed a key whose node has been
/// destroyed, with the exception of [`destroy_node`](Self::destroy_node),
/// which is idempotent.
#[derive(Debug, Default)]
pub struct Graph {
    nodes: SlotMap<NodeKey, Node>,
    roots: Vec<NodeKey>,
    updated: Vec<NodeKey>,
    config: GraphConfig,
}

impl Graph {
    /// Create an empty graph with the default configuration
    pub fn new() -> Self {
        Self::with_config(GraphConfig::default())
    }

    /// Create an empty graph with the given configuration
    pub fn with_config(config: GraphConfig) -> Self {
        Self {
            nodes: SlotMap::with_capacity_and_key(config.initial_node_capacity),
            roots: Vec::new(),
            updated: Vec::new(),
            config,
        }
    }

    /// Get the configuration of this graph
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    // --- node lifecycle ---------------------------------------------------

    /// Create a standalone node of the given kind
    ///
    /// The node joins the frame pipeline once attached via
    /// [`add_root_node`](Self::add_root_node) or
    /// [`add_child`](Self::add_child).
    pub fn create_node(&mut self, kind: NodeKind) -> NodeKey {
        self.nodes.insert(Node::new(kind))
    }

    /// Create a standalone grouping node
    pub fn create_plain_node(&mut self) -> NodeKey {
        self.create_node(NodeKind::Plain)
    }

    /// Create a standalone camera node
    pub fn create_camera_node(&mut self, camera: Rc<RefCell<Camera>>) -> NodeKey {
        self.create_node(NodeKind::Camera(camera))
    }

    /// Create a standalone light node
    ///
    /// Its local bounds are a sphere of the light's radius at the origin.
    pub fn create_light_node(&mut self, light: Rc<Light>) -> NodeKey {
        self.create_node(NodeKind::Light(light))
    }

    /// Create a standalone model node
    ///
    /// Its local bounds are the model's bounding sphere. Model nodes do not
    /// cast shadows until [`set_casts_shadows`](Self::set_casts_shadows).
    pub fn create_model_node(&mut self, model: Rc<Model>) -> NodeKey {
        self.create_node(NodeKind::Model {
            model,
            casts_shadows: false,
        })
    }

    /// Check whether a key refers to a live node
    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Get the number of live nodes, attached or not
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get the root nodes in attachment order
    pub fn roots(&self) -> &[NodeKey] {
        &self.roots
    }

    /// Attach a node as a root of this graph
    ///
    /// Detaches the node from any previous parent first. The node's whole
    /// subtree joins the frame pipeline.
    pub fn add_root_node(&mut self, key: NodeKey) {
        self.remove_from_parent(key);
        self.roots.push(key);
        self.set_attached(key, true);
    }

    /// Attach a node as the last child of another node
    ///
    /// Fails without any mutation if the attachment would create a cycle,
    /// that is when `child` is `parent` itself or one of its ancestors. On
    /// success the child is detached from any previous owner, its subtree
    /// inherits the parent's graph membership, its world transform is
    /// invalidated and the parent's aggregate bounds are invalidated.
    pub fn add_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), SceneGraphError> {
        if parent == child || self.is_child_of(parent, child) {
            return Err(SceneGraphError::WouldCreateCycle);
        }

        self.remove_from_parent(child);

        self.nodes[parent].children.push(child);
        self.nodes[child].parent = Some(parent);

        let attached = self.nodes[parent].in_graph;
        self.set_attached(child, attached);

        self.invalidate_world_transform(child);
        self.invalidate_bounds(parent);
        Ok(())
    }

    /// Detach a node from its parent or from the graph's root list
    ///
    /// Idempotent: detaching an already standalone node is a no-op. The
    /// node's subtree leaves the frame pipeline but stays alive.
    pub fn remove_from_parent(&mut self, key: NodeKey) {
        if let Some(parent) = self.nodes[key].parent {
            self.nodes[parent].children.retain(|&c| c != key);
            self.invalidate_bounds(parent);

            self.nodes[key].parent = None;
            self.invalidate_world_transform(key);
            self.set_attached(key, false);
        } else if self.nodes[key].in_graph {
            self.roots.retain(|&r| r != key);
            self.set_attached(key, false);
        }
    }

    /// Destroy a node and its whole subtree, children first
    ///
    /// Idempotent: destroying an already destroyed key is a no-op.
    pub fn destroy_node(&mut self, key: NodeKey) {
        if !self.nodes.contains_key(key) {
            return;
        }

        self.remove_from_parent(key);
        self.destroy_children(key);
        self.nodes.remove(key);
    }

    /// Destroy all children of a node, recursively
    pub fn destroy_children(&mut self, key: NodeKey) {
        while let Some(&child) = self.nodes[key].children.last() {
            self.destroy_node(child);
        }
    }

    /// Destroy every root node and its subtree
    pub fn destroy_root_nodes(&mut self) {
        debug!("Destroying {} root nodes", self.roots.len());

        while let Some(&root) = self.roots.last() {
            self.destroy_node(root);
        }
    }

    /// Check whether a node is a descendant of another node
    pub fn is_child_of(&self, key: NodeKey, ancestor: NodeKey) -> bool {
        let mut current = self.nodes[key].parent;

        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.nodes[parent].parent;
        }

        false
    }

    /// Check whether a node is attached to this graph's root hierarchy
    pub fn is_attached(&self, key: NodeKey) -> bool {
        self.nodes[key].in_graph
    }

    /// Get the parent of a node
    pub fn parent(&self, key: NodeKey) -> Option<NodeKey> {
        self.nodes[key].parent
    }

    /// Get the children of a node in attachment order
    pub fn children(&self, key: NodeKey) -> &[NodeKey] {
        &self.nodes[key].children
    }

    /// Check whether a node takes part in per-frame update
    pub fn needs_update(&self, key: NodeKey) -> bool {
        self.nodes[key].needs_update
    }

    // --- transforms and bounds --------------------------------------------

    /// Get the local transform of a node
    pub fn local_transform(&self, key: NodeKey) -> Transform3 {
        self.nodes[key].local
    }

    /// Set the local transform of a node
    pub fn set_local_transform(&mut self, key: NodeKey, transform: Transform3) {
        self.nodes[key].local = transform;
        self.touch_local(key);
    }

    /// Set the local position of a node
    pub fn set_local_position(&mut self, key: NodeKey, position: Vec3) {
        self.nodes[key].local.position = position;
        self.touch_local(key);
    }

    /// Set the local rotation of a node
    pub fn set_local_rotation(&mut self, key: NodeKey, rotation: Quat) {
        self.nodes[key].local.rotation = rotation;
        self.touch_local(key);
    }

    /// Set the local uniform scale of a node
    pub fn set_local_scale(&mut self, key: NodeKey, scale: f32) {
        self.nodes[key].local.scale = scale;
        self.touch_local(key);
    }

    /// Get the local bounds of a node
    pub fn local_bounds(&self, key: NodeKey) -> Sphere {
        self.nodes[key].local_bounds
    }

    /// Set the local bounds of a node
    ///
    /// Normally driven by the node's content (light radius, model bounding
    /// sphere); exposed for nodes whose content changes in place.
    pub fn set_local_bounds(&mut self, key: NodeKey, bounds: Sphere) {
        self.nodes[key].local_bounds = bounds;
        self.invalidate_bounds(key);
    }

    /// Get the world transform of a node
    ///
    /// Lazily recomputed by composing the parent chain; ancestors cache
    /// their own results, so the amortized cost is proportional to the
    /// number of nodes whose local transform actually changed.
    pub fn world_transform(&mut self, key: NodeKey) -> Transform3 {
        if !self.nodes[key].dirty.contains(DirtyFlags::WORLD) {
            return self.nodes[key].world;
        }

        let world = match self.nodes[key].parent {
            Some(parent) => self.world_transform(parent) * self.nodes[key].local,
            None => self.nodes[key].local,
        };

        let node = &mut self.nodes[key];
        node.world = world;
        node.dirty.remove(DirtyFlags::WORLD);
        world
    }

    /// Get the total bounds of a node's subtree, in the node's local space
    ///
    /// Lazily recomputed as the local bounds enveloping each child's total
    /// bounds transformed by that child's local transform.
    pub fn total_bounds(&mut self, key: NodeKey) -> Sphere {
        if !self.nodes[key].dirty.contains(DirtyFlags::BOUNDS) {
            return self.nodes[key].total_bounds;
        }

        let mut bounds = self.nodes[key].local_bounds;
        let children = self.nodes[key].children.clone();
        for child in children {
            let child_bounds = self.total_bounds(child).transformed_by(&self.nodes[child].local);
            bounds.envelop(&child_bounds);
        }

        let node = &mut self.nodes[key];
        node.total_bounds = bounds;
        node.dirty.remove(DirtyFlags::BOUNDS);
        bounds
    }

    /// Get the total bounds of a node's subtree in world space
    pub fn world_bounds(&mut self, key: NodeKey) -> Sphere {
        let world = self.world_transform(key);
        self.total_bounds(key).transformed_by(&world)
    }

    // --- node content ------------------------------------------------------

    /// Replace the model of a model node and refresh its local bounds
    ///
    /// A no-op on nodes of any other kind.
    pub fn set_model(&mut self, key: NodeKey, model: Rc<Model>) {
        let bounds = model.bounding_sphere();

        if let NodeKind::Model { model: current, .. } = &mut self.nodes[key].kind {
            *current = model;
            self.set_local_bounds(key, bounds);
        }
    }

    /// Replace the light of a light node and refresh its local bounds
    ///
    /// A no-op on nodes of any other kind.
    pub fn set_light(&mut self, key: NodeKey, light: Rc<Light>) {
        let bounds = Sphere::new(Vec3::zeros(), light.radius());

        if let NodeKind::Light(current) = &mut self.nodes[key].kind {
            *current = light;
            self.set_local_bounds(key, bounds);
        }
    }

    /// Replace the camera of a camera node
    ///
    /// A no-op on nodes of any other kind.
    pub fn set_camera(&mut self, key: NodeKey, camera: Rc<RefCell<Camera>>) {
        if let NodeKind::Camera(current) = &mut self.nodes[key].kind {
            *current = camera;
        }
    }

    /// Set whether a model node renders into shadow maps
    ///
    /// A no-op on nodes of any other kind.
    pub fn set_casts_shadows(&mut self, key: NodeKey, enabled: bool) {
        if let NodeKind::Model { casts_shadows, .. } = &mut self.nodes[key].kind {
            *casts_shadows = enabled;
        }
    }

    /// Check whether a model node renders into shadow maps
    pub fn casts_shadows(&self, key: NodeKey) -> bool {
        matches!(
            self.nodes[key].kind,
            NodeKind::Model {
                casts_shadows: true,
                ..
            }
        )
    }

    // --- per-frame pipeline -----------------------------------------------

    /// Settle derived external state for the frame
    ///
    /// Visits only the attached nodes that track external resources, such
    /// as camera nodes pushing their world transform into their camera; the
    /// rest of the tree is untouched. Must complete before
    /// [`enqueue`](Self::enqueue) reads world transforms.
    pub fn update(&mut self) {
        let updated = self.updated.clone();
        for key in updated {
            self.update_node(key);
        }
    }

    fn update_node(&mut self, key: NodeKey) {
        let children = self.nodes[key].children.clone();
        for child in children {
            self.update_node(child);
        }

        if let NodeKind::Camera(camera) = self.nodes[key].kind.clone() {
            let world = self.world_transform(key);
            camera.borrow_mut().set_transform(world);
        }
    }

    /// Collect the frame's draw operations and lights into a scene
    ///
    /// Walks the roots, culling each subtree against the camera frustum by
    /// its world-space total bounds before descending. Surviving light
    /// nodes attach their light; surviving model nodes submit their draw
    /// operations, except non-casters while the scene is in the shadow-map
    /// phase.
    pub fn enqueue(&mut self, scene: &mut Scene, camera: &Camera) {
        let frustum = camera.frustum();
        let roots = self.roots.clone();
        let mut culled = 0usize;

        for root in roots {
            if self.is_visible(root, &frustum) {
                self.enqueue_node(root, scene, camera, &frustum);
            } else {
                culled += 1;
            }
        }

        trace!("Culled {culled} root subtrees during enqueue");
    }

    fn enqueue_node(&mut self, key: NodeKey, scene: &mut Scene, camera: &Camera, frustum: &Frustum) {
        let children = self.nodes[key].children.clone();
        for child in children {
            if self.is_visible(child, frustum) {
                self.enqueue_node(child, scene, camera, frustum);
            }
        }

        match self.nodes[key].kind.clone() {
            NodeKind::Light(light) => {
                let world = self.world_transform(key);
                scene.attach_light(light, &world);
            }
            NodeKind::Model {
                model,
                casts_shadows,
            } => {
                if scene.phase() == Phase::Shadowmap && !casts_shadows {
                    return;
                }

                let world = self.world_transform(key);
                model.enqueue(scene, camera, &world);
            }
            _ => {}
        }
    }

    fn is_visible(&mut self, key: NodeKey, frustum: &Frustum) -> bool {
        if !self.config.enable_culling {
            return true;
        }

        let bounds = self.world_bounds(key);
        frustum.intersects_sphere(&bounds)
    }

    /// Collect the roots whose world bounds intersect a sphere
    ///
    /// Queries at root granularity only: children of an intersecting root
    /// are not inspected or reported.
    pub fn query_sphere(&mut self, volume: &Sphere, nodes: &mut Vec<NodeKey>) {
        let roots = self.roots.clone();
        for root in roots {
            if self.world_bounds(root).intersects(volume) {
                nodes.push(root);
            }
        }
    }

    /// Collect the roots whose world bounds intersect a frustum
    ///
    /// Root granularity only, like [`query_sphere`](Self::query_sphere).
    pub fn query_frustum(&mut self, frustum: &Frustum, nodes: &mut Vec<NodeKey>) {
        let roots = self.roots.clone();
        for root in roots {
            if frustum.intersects_sphere(&self.world_bounds(root)) {
                nodes.push(root);
            }
        }
    }

    // --- invalidation ------------------------------------------------------

    fn touch_local(&mut self, key: NodeKey) {
        // The node's own bounds are independent of its local transform;
        // only the parent's aggregate changes.
        if let Some(parent) = self.nodes[key].parent {
            self.invalidate_bounds(parent);
        }

        self.invalidate_world_transform(key);
    }

    fn invalidate_world_transform(&mut self, key: NodeKey) {
        self.nodes[key].dirty.insert(DirtyFlags::WORLD);

        let children = self.nodes[key].children.clone();
        for child in children {
            self.invalidate_world_transform(child);
        }
    }

    fn invalidate_bounds(&mut self, key: NodeKey) {
        let mut current = Some(key);
        while let Some(node) = current {
            self.nodes[node].dirty.insert(DirtyFlags::BOUNDS);
            current = self.nodes[node].parent;
        }
    }

    fn set_attached(&mut self, key: NodeKey, attached: bool) {
        let (was_attached, needs_update) = {
            let node = &self.nodes[key];
            (node.in_graph, node.needs_update)
        };

        if was_attached && needs_update {
            self.updated.retain(|&k| k != key);
        }

        self.nodes[key].in_graph = attached;

        if attached && needs_update {
            self.updated.push(key);
        }

        let children = self.nodes[key].children.clone();
        for child in children {
            self.set_attached(child, attached);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{BlendMode, GeometryRange, LightKind, Material, ModelGeometry, Pass};
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    fn unit_model() -> Rc<Model> {
        Rc::new(Model::new(
            vec![ModelGeometry::new(
                GeometryRange::new(0, 0, 36),
                Rc::new(Material::with_pass(Pass::new(1, BlendMode::Opaque))),
            )],
            Sphere::new(Vec3::zeros(), 1.0),
        ))
    }

    fn point_light(radius: f32) -> Rc<Light> {
        Rc::new(Light::new(LightKind::Point, Vec3::new(1.0, 1.0, 1.0), radius))
    }

    #[test]
    fn test_world_transform_composes_parent_chain() {
        let mut graph = Graph::new();
        let root = graph.create_plain_node();
        let child = graph.create_plain_node();
        graph.add_root_node(root);
        graph.add_child(root, child).unwrap();

        graph.set_local_position(root, Vec3::new(1.0, 0.0, 0.0));
        graph.set_local_position(child, Vec3::new(0.0, 1.0, 0.0));

        assert_relative_eq!(
            graph.world_transform(child).position,
            Vec3::new(1.0, 1.0, 0.0),
            epsilon = EPSILON
        );

        // Moving the parent after a cached read reaches the child lazily
        graph.set_local_position(root, Vec3::new(5.0, 0.0, 0.0));
        assert_relative_eq!(
            graph.world_transform(child).position,
            Vec3::new(5.0, 1.0, 0.0),
            epsilon = EPSILON
        );
    }

    #[test]
    fn test_world_transform_applies_parent_rotation_and_scale() {
        let mut graph = Graph::new();
        let root = graph.create_plain_node();
        let child = graph.create_plain_node();
        graph.add_root_node(root);
        graph.add_child(root, child).unwrap();

        graph.set_local_rotation(
            root,
            Quat::from_axis_angle(&Vec3::y_axis(), std::f32::consts::FRAC_PI_2),
        );
        graph.set_local_scale(root, 2.0);
        graph.set_local_position(child, Vec3::new(1.0, 0.0, 0.0));

        // +X scaled to 2 and rotated 90 degrees around Y lands on -Z
        assert_relative_eq!(
            graph.world_transform(child).position,
            Vec3::new(0.0, 0.0, -2.0),
            epsilon = EPSILON
        );
    }

    #[test]
    fn test_add_child_establishes_ancestry_once() {
        let mut graph = Graph::new();
        let parent = graph.create_plain_node();
        let child = graph.create_plain_node();
        graph.add_root_node(parent);
        graph.add_child(parent, child).unwrap();

        assert!(graph.is_child_of(child, parent));
        assert_eq!(graph.parent(child), Some(parent));

        // The parent appears exactly once in the ancestor chain
        let mut occurrences = 0;
        let mut current = graph.parent(child);
        while let Some(node) = current {
            if node == parent {
                occurrences += 1;
            }
            current = graph.parent(node);
        }
        assert_eq!(occurrences, 1);
    }

    #[test]
    fn test_add_child_reparents() {
        let mut graph = Graph::new();
        let a = graph.create_plain_node();
        let b = graph.create_plain_node();
        let child = graph.create_plain_node();
        graph.add_root_node(a);
        graph.add_root_node(b);
        graph.add_child(a, child).unwrap();

        graph.add_child(b, child).unwrap();

        assert_eq!(graph.parent(child), Some(b));
        assert!(graph.children(a).is_empty());
        assert_eq!(graph.children(b), &[child]);
    }

    #[test]
    fn test_add_child_rejects_cycles_without_mutation() {
        let mut graph = Graph::new();
        let a = graph.create_plain_node();
        let b = graph.create_plain_node();
        graph.add_root_node(a);
        graph.add_child(a, b).unwrap();

        assert_eq!(
            graph.add_child(b, a),
            Err(SceneGraphError::WouldCreateCycle)
        );

        // Tree unchanged: a is still b's parent, b is not a's parent
        assert_eq!(graph.parent(b), Some(a));
        assert_eq!(graph.parent(a), None);
        assert!(graph.is_child_of(b, a));
        assert!(!graph.is_child_of(a, b));
        assert_eq!(graph.roots(), &[a]);

        // Self-attachment is also a cycle
        assert_eq!(
            graph.add_child(a, a),
            Err(SceneGraphError::WouldCreateCycle)
        );
    }

    #[test]
    fn test_remove_from_parent_is_idempotent() {
        let mut graph = Graph::new();
        let parent = graph.create_plain_node();
        let child = graph.create_plain_node();
        graph.add_root_node(parent);
        graph.add_child(parent, child).unwrap();

        graph.remove_from_parent(child);
        assert_eq!(graph.parent(child), None);
        assert!(graph.children(parent).is_empty());
        assert!(!graph.is_attached(child));

        graph.remove_from_parent(child);
        assert_eq!(graph.parent(child), None);
        assert!(graph.children(parent).is_empty());
        assert!(!graph.is_attached(child));
    }

    #[test]
    fn test_leaf_total_bounds_equal_local_bounds() {
        let mut graph = Graph::new();
        let node = graph.create_plain_node();
        let bounds = Sphere::new(Vec3::new(1.0, 2.0, 3.0), 4.0);
        graph.set_local_bounds(node, bounds);

        assert_eq!(graph.total_bounds(node), bounds);

        // Still true after moving the node; local bounds are transform independent
        graph.set_local_position(node, Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(graph.total_bounds(node), bounds);
    }

    #[test]
    fn test_bounds_propagate_upward_lazily() {
        let mut graph = Graph::new();
        let root = graph.create_plain_node();
        let child = graph.create_plain_node();
        let grandchild = graph.create_plain_node();
        graph.add_root_node(root);
        graph.add_child(root, child).unwrap();
        graph.add_child(child, grandchild).unwrap();

        // Warm the caches first
        assert!(graph.total_bounds(root).is_empty());

        let bounds = Sphere::new(Vec3::new(2.0, 0.0, 0.0), 1.0);
        graph.set_local_bounds(grandchild, bounds);

        // No explicit calls on root or child in between
        assert_eq!(graph.total_bounds(root), bounds);
    }

    #[test]
    fn test_total_bounds_compose_through_child_transforms() {
        let mut graph = Graph::new();
        let root = graph.create_plain_node();
        let child = graph.create_plain_node();
        graph.add_root_node(root);
        graph.add_child(root, child).unwrap();

        graph.set_local_position(child, Vec3::new(3.0, 0.0, 0.0));
        graph.set_local_bounds(child, Sphere::new(Vec3::zeros(), 1.0));

        let total = graph.total_bounds(root);
        assert_relative_eq!(total.center, Vec3::new(3.0, 0.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(total.radius, 1.0, epsilon = EPSILON);
    }

    #[test]
    fn test_world_bounds_scale_with_node() {
        let mut graph = Graph::new();
        let node = graph.create_model_node(unit_model());
        graph.add_root_node(node);
        graph.set_local_scale(node, 2.0);
        graph.set_local_position(node, Vec3::new(1.0, 0.0, 0.0));

        let bounds = graph.world_bounds(node);
        assert_relative_eq!(bounds.radius, 2.0, epsilon = EPSILON);
        assert_relative_eq!(bounds.center, Vec3::new(1.0, 0.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_enqueue_culls_by_world_bounds() {
        let mut graph = Graph::new();
        let visible = graph.create_model_node(unit_model());
        let hidden = graph.create_model_node(unit_model());
        graph.add_root_node(visible);
        graph.add_root_node(hidden);

        // Camera at (0,0,10) looking down -Z sees the origin but not (0,0,50)
        let mut camera = Camera::new();
        camera.set_transform(Transform3::from_position(Vec3::new(0.0, 0.0, 10.0)));
        graph.set_local_position(hidden, Vec3::new(0.0, 0.0, 50.0));

        let mut scene = Scene::new();
        graph.update();
        graph.enqueue(&mut scene, &camera);

        assert_eq!(scene.opaque_queue().len(), 1);
    }

    #[test]
    fn test_enqueue_without_culling_submits_everything() {
        let mut graph = Graph::with_config(GraphConfig {
            enable_culling: false,
            ..GraphConfig::default()
        });
        let visible = graph.create_model_node(unit_model());
        let hidden = graph.create_model_node(unit_model());
        graph.add_root_node(visible);
        graph.add_root_node(hidden);
        graph.set_local_position(hidden, Vec3::new(0.0, 0.0, 50.0));

        let mut camera = Camera::new();
        camera.set_transform(Transform3::from_position(Vec3::new(0.0, 0.0, 10.0)));

        let mut scene = Scene::new();
        graph.enqueue(&mut scene, &camera);

        assert_eq!(scene.opaque_queue().len(), 2);
    }

    #[test]
    fn test_enqueue_culls_children_individually() {
        let mut graph = Graph::new();
        let root = graph.create_plain_node();
        let near = graph.create_model_node(unit_model());
        let far = graph.create_model_node(unit_model());
        graph.add_root_node(root);
        graph.add_child(root, near).unwrap();
        graph.add_child(root, far).unwrap();
        graph.set_local_position(far, Vec3::new(0.0, 0.0, 50.0));

        let mut camera = Camera::new();
        camera.set_transform(Transform3::from_position(Vec3::new(0.0, 0.0, 10.0)));

        let mut scene = Scene::new();
        graph.enqueue(&mut scene, &camera);

        // The root's aggregate bounds intersect, but only the near child survives
        assert_eq!(scene.opaque_queue().len(), 1);
    }

    #[test]
    fn test_enqueue_attaches_lights() {
        let mut graph = Graph::new();
        let node = graph.create_light_node(point_light(5.0));
        graph.add_root_node(node);
        graph.set_local_position(node, Vec3::new(3.0, 0.0, 0.0));

        let mut camera = Camera::new();
        camera.set_transform(Transform3::from_position(Vec3::new(0.0, 0.0, 10.0)));

        let mut scene = Scene::new();
        graph.enqueue(&mut scene, &camera);

        assert_eq!(scene.lights().len(), 1);
        assert_relative_eq!(
            scene.lights()[0].position(),
            Vec3::new(3.0, 0.0, 0.0),
            epsilon = EPSILON
        );
    }

    #[test]
    fn test_update_syncs_nested_camera_nodes() {
        let mut graph = Graph::new();
        let camera = Rc::new(RefCell::new(Camera::new()));

        let root = graph.create_plain_node();
        let middle = graph.create_plain_node();
        let camera_node = graph.create_camera_node(Rc::clone(&camera));
        graph.add_root_node(root);
        graph.add_child(root, middle).unwrap();
        graph.add_child(middle, camera_node).unwrap();

        graph.set_local_position(root, Vec3::new(1.0, 0.0, 0.0));
        graph.set_local_position(middle, Vec3::new(0.0, 2.0, 0.0));
        graph.set_local_position(camera_node, Vec3::new(0.0, 0.0, 3.0));

        graph.update();
        assert_relative_eq!(
            camera.borrow().transform().position,
            Vec3::new(1.0, 2.0, 3.0),
            epsilon = EPSILON
        );

        // Detached camera nodes stop receiving updates
        graph.remove_from_parent(camera_node);
        graph.set_local_position(root, Vec3::new(9.0, 0.0, 0.0));
        graph.update();
        assert_relative_eq!(
            camera.borrow().transform().position,
            Vec3::new(1.0, 2.0, 3.0),
            epsilon = EPSILON
        );
    }

    #[test]
    fn test_standalone_nodes_are_not_updated() {
        let mut graph = Graph::new();
        let camera = Rc::new(RefCell::new(Camera::new()));
        let camera_node = graph.create_camera_node(Rc::clone(&camera));
        graph.set_local_position(camera_node, Vec3::new(7.0, 0.0, 0.0));

        graph.update();
        assert_relative_eq!(
            camera.borrow().transform().position,
            Vec3::zeros(),
            epsilon = EPSILON
        );

        graph.add_root_node(camera_node);
        graph.update();
        assert_relative_eq!(
            camera.borrow().transform().position,
            Vec3::new(7.0, 0.0, 0.0),
            epsilon = EPSILON
        );
    }

    #[test]
    fn test_update_list_follows_reparenting() {
        let mut graph = Graph::new();
        let camera = Rc::new(RefCell::new(Camera::new()));

        let old_root = graph.create_plain_node();
        let new_root = graph.create_plain_node();
        let camera_node = graph.create_camera_node(Rc::clone(&camera));
        graph.add_root_node(old_root);
        graph.add_root_node(new_root);
        graph.add_child(old_root, camera_node).unwrap();

        graph.set_local_position(new_root, Vec3::new(0.0, 5.0, 0.0));
        graph.add_child(new_root, camera_node).unwrap();

        graph.update();
        assert_relative_eq!(
            camera.borrow().transform().position,
            Vec3::new(0.0, 5.0, 0.0),
            epsilon = EPSILON
        );
    }

    #[test]
    fn test_query_reports_roots_only() {
        let mut graph = Graph::new();
        let near_root = graph.create_model_node(unit_model());
        let far_root = graph.create_model_node(unit_model());
        let near_child = graph.create_model_node(unit_model());
        graph.add_root_node(near_root);
        graph.add_root_node(far_root);
        graph.add_child(near_root, near_child).unwrap();
        graph.set_local_position(far_root, Vec3::new(100.0, 0.0, 0.0));

        let mut found = Vec::new();
        graph.query_sphere(&Sphere::new(Vec3::zeros(), 5.0), &mut found);

        // Root granularity: the intersecting child is not reported separately
        assert_eq!(found, vec![near_root]);
    }

    #[test]
    fn test_query_frustum_matches_enqueue_culling() {
        let mut graph = Graph::new();
        let visible = graph.create_model_node(unit_model());
        let hidden = graph.create_model_node(unit_model());
        graph.add_root_node(visible);
        graph.add_root_node(hidden);
        graph.set_local_position(hidden, Vec3::new(0.0, 0.0, 50.0));

        let mut camera = Camera::new();
        camera.set_transform(Transform3::from_position(Vec3::new(0.0, 0.0, 10.0)));

        let mut found = Vec::new();
        graph.query_frustum(&camera.frustum(), &mut found);
        assert_eq!(found, vec![visible]);
    }

    #[test]
    fn test_destroy_node_removes_subtree() {
        let mut graph = Graph::new();
        let root = graph.create_plain_node();
        let child = graph.create_plain_node();
        let grandchild = graph.create_plain_node();
        graph.add_root_node(root);
        graph.add_child(root, child).unwrap();
        graph.add_child(child, grandchild).unwrap();

        graph.destroy_node(child);

        assert!(graph.contains(root));
        assert!(!graph.contains(child));
        assert!(!graph.contains(grandchild));
        assert!(graph.children(root).is_empty());

        // Destroying a stale key is a no-op
        graph.destroy_node(child);
    }

    #[test]
    fn test_destroy_root_nodes_clears_update_list() {
        let mut graph = Graph::new();
        let camera = Rc::new(RefCell::new(Camera::new()));
        let camera_node = graph.create_camera_node(Rc::clone(&camera));
        graph.add_root_node(camera_node);
        graph.destroy_root_nodes();

        assert_eq!(graph.node_count(), 0);
        assert!(graph.roots().is_empty());

        // No stale entries left behind
        graph.update();
    }

    #[test]
    fn test_light_node_bounds_follow_light_radius() {
        let mut graph = Graph::new();
        let node = graph.create_light_node(point_light(5.0));

        assert_relative_eq!(graph.local_bounds(node).radius, 5.0, epsilon = EPSILON);

        graph.set_light(node, point_light(8.0));
        assert_relative_eq!(graph.local_bounds(node).radius, 8.0, epsilon = EPSILON);
    }

    #[test]
    fn test_set_model_refreshes_bounds() {
        let mut graph = Graph::new();
        let node = graph.create_model_node(unit_model());

        let bigger = Rc::new(Model::new(Vec::new(), Sphere::new(Vec3::zeros(), 3.0)));
        graph.set_model(node, bigger);
        assert_relative_eq!(graph.local_bounds(node).radius, 3.0, epsilon = EPSILON);
    }

    #[test]
    fn test_graph_config_defaults() {
        let config = GraphConfig::default();
        assert!(config.enable_culling);
        assert_eq!(config.initial_node_capacity, 256);
    }

    #[test]
    fn test_graph_config_parses_partial_input() {
        let config: GraphConfig = ron::from_str("(enable_culling: false)").unwrap();
        assert!(!config.enable_culling);
        assert_eq!(config.initial_node_capacity, 256);

        let config: GraphConfig = toml::from_str("initial_node_capacity = 64").unwrap();
        assert!(config.enable_culling);
        assert_eq!(config.initial_node_capacity, 64);
    }

    #[test]
    fn test_graph_config_file_round_trip() {
        let config = GraphConfig {
            enable_culling: false,
            initial_node_capacity: 64,
        };

        for extension in ["ron", "toml"] {
            let path = std::env::temp_dir()
                .join(format!("wendy_graph_config_round_trip.{extension}"))
                .to_string_lossy()
                .into_owned();

            config.save_to_file(&path).unwrap();
            let loaded = GraphConfig::load_from_file(&path).unwrap();
            std::fs::remove_file(&path).unwrap();

            assert!(!loaded.enable_culling);
            assert_eq!(loaded.initial_node_capacity, 64);
        }
    }

    #[test]
    fn test_graph_config_rejects_unknown_extension() {
        let config = GraphConfig::default();

        assert!(matches!(
            config.save_to_file("config.yaml"),
            Err(ConfigError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            GraphConfig::load_from_file("config.yaml"),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }
}
