//! GPU rendering subsystem.
//!
//! Two fixed pipelines consume the scene every frame:
//! - `line`: passthrough vertex transform, per-draw color
//! - `canvas`: scale + translate applied to unit geometry in the vertex shader
//!
//! Per-object uniform values live in one dynamically-offset uniform buffer
//! per pipeline, one aligned slot per shape, bound before each draw call.
//!
//! Convention:
//! - CPU geometry is in normalized device coordinates (-1..1, +Y up).
//! - Draw order is scene insertion order (painter's algorithm, no depth test).

mod canvas;
mod common;
mod ctx;
mod line;
mod pass;

pub use ctx::{RenderCtx, RenderTarget};
pub use pass::ScenePainter;
