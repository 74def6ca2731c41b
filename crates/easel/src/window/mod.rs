//! Window + event loop runtime.
//!
//! Owns the winit event loop, the single window, and the per-window GPU
//! context, and drives the per-frame render path.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
