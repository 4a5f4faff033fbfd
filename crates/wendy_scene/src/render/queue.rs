//! Per-frame render queues
//!
//! Collects draw operations and lights submitted during scene-graph enqueue
//! and hands them to a renderer in sorted order. Sorting minimizes GPU state
//! changes: opaque operations group by state and then run front-to-back,
//! blended operations run back-to-front. The insertion index lives in the
//! low bits of every key, so ordering is a deterministic total order and the
//! same submissions always produce the same batching.

use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

use log::warn;

use crate::foundation::math::{Mat4, Transform3};
use crate::render::light::{AttachedLight, Light};
use crate::render::material::{Pass, Phase};

/// Range of GPU geometry to draw
///
/// An opaque handle into vertex data owned by the excluded backend layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GeometryRange {
    /// Identifier of the vertex buffer
    pub buffer: u32,
    /// First vertex of the range
    pub start: u32,
    /// Number of vertices in the range
    pub count: u32,
}

impl GeometryRange {
    /// Create a new geometry range
    pub fn new(buffer: u32, start: u32, count: u32) -> Self {
        Self {
            buffer,
            start,
            count,
        }
    }
}

/// Single draw operation within a queue
#[derive(Debug, Clone)]
pub struct Operation {
    /// Geometry to draw
    pub range: GeometryRange,
    /// World-space model matrix
    pub transform: Mat4,
    /// Render pass state to apply before drawing
    pub pass: Pass,
}

const DEPTH_BITS: u32 = 24;
const DEPTH_MAX: u32 = (1 << DEPTH_BITS) - 1;
const INDEX_MASK: u64 = 0xffff;

/// Packed sort key for a draw operation
///
/// The key value encodes the full sort criteria, so ordering a frame is a
/// single `u64` sort over the key list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SortKey(u64);

impl SortKey {
    /// Build a key for the opaque queue: state, then front-to-back depth
    pub fn opaque(state_id: u16, depth: f32, index: u16) -> Self {
        Self(
            (u64::from(state_id) << 40)
                | (u64::from(quantize_depth(depth)) << 16)
                | u64::from(index),
        )
    }

    /// Build a key for the blended queue: back-to-front depth, then state
    pub fn blended(state_id: u16, depth: f32, index: u16) -> Self {
        Self(
            (u64::from(DEPTH_MAX - quantize_depth(depth)) << 32)
                | (u64::from(state_id) << 16)
                | u64::from(index),
        )
    }

    /// Index of the operation this key refers to
    pub fn index(self) -> usize {
        (self.0 & INDEX_MASK) as usize
    }
}

fn quantize_depth(depth: f32) -> u32 {
    (depth.clamp(0.0, 1.0) * DEPTH_MAX as f32) as u32
}

/// Sorted list of draw operations for one queue
///
/// Operations append in submission order; the key list sorts lazily on
/// first read after a mutation.
#[derive(Debug, Default)]
pub struct Queue {
    operations: Vec<Operation>,
    keys: RefCell<Vec<SortKey>>,
    sorted: Cell<bool>,
}

impl Queue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an operation with its sort key
    pub fn attach(&mut self, operation: Operation, key: SortKey) {
        self.operations.push(operation);
        self.keys.get_mut().push(key);
        self.sorted.set(false);
    }

    /// Get the operations in submission order
    ///
    /// Renderers index into this list through [`SortKey::index`].
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Get the sort keys in sorted order
    pub fn keys(&self) -> Ref<'_, [SortKey]> {
        if !self.sorted.get() {
            self.keys.borrow_mut().sort_unstable();
            self.sorted.set(true);
        }

        Ref::map(self.keys.borrow(), Vec::as_slice)
    }

    /// Get the number of operations in this queue
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Check whether this queue holds no operations
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Remove all operations
    pub fn clear(&mut self) {
        self.operations.clear();
        self.keys.get_mut().clear();
        self.sorted.set(true);
    }
}

/// Per-frame collection of draw operations and lights
///
/// Filled by [`Graph::enqueue`](crate::scene::Graph::enqueue), consumed by a
/// [`Renderer`](crate::render::Renderer), then cleared with
/// [`remove_operations`](Self::remove_operations) and
/// [`detach_lights`](Self::detach_lights) before the next frame.
#[derive(Debug, Default)]
pub struct Scene {
    opaque: Queue,
    blended: Queue,
    lights: Vec<AttachedLight>,
    phase: Phase,
}

impl Scene {
    /// Create an empty scene for the default phase
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a draw operation, routed by the blending of its pass
    ///
    /// `depth` is the normalized camera distance used for depth ordering.
    /// Operations beyond the 16-bit per-queue capacity are dropped with a
    /// warning rather than corrupting sort keys.
    pub fn enqueue(&mut self, range: GeometryRange, transform: Mat4, depth: f32, pass: Pass) {
        let queue = if pass.is_blended() {
            &mut self.blended
        } else {
            &mut self.opaque
        };

        let Ok(index) = u16::try_from(queue.len()) else {
            warn!("Render queue overflow; dropping operation");
            return;
        };

        let key = if pass.is_blended() {
            SortKey::blended(pass.state_id, depth, index)
        } else {
            SortKey::opaque(pass.state_id, depth, index)
        };

        queue.attach(
            Operation {
                range,
                transform,
                pass,
            },
            key,
        );
    }

    /// Record a light for this frame at the given world transform
    pub fn attach_light(&mut self, light: Rc<Light>, world: &Transform3) {
        self.lights.push(AttachedLight::new(light, world));
    }

    /// Get the opaque operation queue
    pub fn opaque_queue(&self) -> &Queue {
        &self.opaque
    }

    /// Get the blended operation queue
    pub fn blended_queue(&self) -> &Queue {
        &self.blended
    }

    /// Get the lights attached this frame
    pub fn lights(&self) -> &[AttachedLight] {
        &self.lights
    }

    /// Get the current render phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Set the current render phase
    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    /// Remove all operations from both queues
    ///
    /// Idempotent; called once per frame after rendering.
    pub fn remove_operations(&mut self) {
        self.opaque.clear();
        self.blended.clear();
    }

    /// Detach all lights
    ///
    /// Idempotent; called once per frame after rendering.
    pub fn detach_lights(&mut self) {
        self.lights.clear();
    }
}
