//! Easel crate.
//!
//! A minimal immediate-mode 2D shape renderer: append lines, triangles,
//! and squares to a scene, then run a blocking render loop that redraws
//! them every frame through two fixed wgpu pipelines.

pub mod coords;
pub mod device;
pub mod logging;
pub mod render;
pub mod scene;
pub mod window;

mod app;

pub use app::{Painter, PainterConfig};
pub use coords::{Color, Vec2};
