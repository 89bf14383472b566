//! Optimization module
//!
//! This module provides optimizations applied to rules before they are
//! assembled into a rule set.

pub mod constant_folding;

// Re-export for convenience
pub use constant_folding::ConstantFolder;
