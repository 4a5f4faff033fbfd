//! Foundation module - core math and utility types
//!
//! This module provides the fundamental types used throughout the scene
//! and rendering layers:
//! - Math types and the composable `Transform3`
//! - Bounding volumes and frustum culling primitives
//! - Logging utilities

pub mod bounds;
pub mod logging;
pub mod math;
