//! Coordinate and color types shared across the scene and renderers.
//!
//! Canonical space:
//! - Normalized device coordinates (-1..1 on both axes)
//! - Origin at the window center
//! - +X right, +Y up
//!
//! The window's aspect ratio is fixed at startup; the transform pipeline
//! compensates for it on the Y axis of per-shape scale factors.

mod color;
mod vec2;

pub use color::Color;
pub use vec2::Vec2;
