//! Scene (shape registry) types.
//!
//! Responsibilities:
//! - store drawable shape records and their parameters
//! - keep draw order deterministic (insertion order = paint order)
//!
//! The registry is append-only: records are never removed or mutated once
//! pushed, so the render loop can iterate it without invalidation concerns.

mod record;
mod registry;

pub use record::{Shape, ShapeRecord};
pub use registry::Scene;
