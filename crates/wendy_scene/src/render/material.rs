//! Multi-technique material descriptors
//!
//! A material carries one technique per render phase. Models consult the
//! technique for the scene's current phase when enqueueing; a phase with no
//! passes means the material does not render in that phase.

/// Render phase a scene can be collected for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Normal color rendering
    #[default]
    Default,
    /// Shadow map generation
    Shadowmap,
}

/// Number of render phases
pub const PHASE_COUNT: usize = 2;

/// Blending mode of a render pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// No blending; the pass goes into the opaque queue
    #[default]
    Opaque,
    /// Additive blending
    Additive,
    /// Alpha blending
    Alpha,
}

/// Single render pass within a technique
///
/// The state identifier stands for the full GPU state object owned by the
/// excluded backend; operations sharing an identifier can be rendered
/// without state changes, which is what the sort keys group by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pass {
    /// Identifier of the GPU state this pass applies
    pub state_id: u16,
    /// Blending mode, which selects the target queue
    pub blending: BlendMode,
}

impl Pass {
    /// Create a new pass
    pub fn new(state_id: u16, blending: BlendMode) -> Self {
        Self { state_id, blending }
    }

    /// Check whether this pass requires blending
    pub fn is_blended(&self) -> bool {
        self.blending != BlendMode::Opaque
    }
}

/// Multipass render technique
#[derive(Debug, Clone, Default)]
pub struct Technique {
    passes: Vec<Pass>,
}

impl Technique {
    /// Create an empty technique
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pass to this technique
    pub fn add_pass(&mut self, pass: Pass) {
        self.passes.push(pass);
    }

    /// Get the passes of this technique
    pub fn passes(&self) -> &[Pass] {
        &self.passes
    }

    /// Check whether this technique has no passes
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

/// Multi-technique material descriptor
#[derive(Debug, Clone, Default)]
pub struct Material {
    techniques: [Technique; PHASE_COUNT],
}

impl Material {
    /// Create a material with empty techniques for every phase
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a material with a single opaque pass in the default phase
    pub fn with_pass(pass: Pass) -> Self {
        let mut material = Self::new();
        material.technique_mut(Phase::Default).add_pass(pass);
        material
    }

    /// Get the technique for the specified phase
    pub fn technique(&self, phase: Phase) -> &Technique {
        &self.techniques[phase as usize]
    }

    /// Get the technique for the specified phase
    pub fn technique_mut(&mut self, phase: Phase) -> &mut Technique {
        &mut self.techniques[phase as usize]
    }
}
