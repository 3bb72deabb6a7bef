//! Compilation of planned scenes into concrete transform geometry.

/// Scene filters and the render plan.
pub mod plan;
