//! CPU frame rasterization for the frame-stream strategy.

/// Canvas frames and per-scene rasterization.
pub mod canvas;
