use crate::coords::{Color, Vec2};

/// Geometry payload for one drawable primitive.
///
/// Extending the scene:
/// - add a new variant here
/// - add a push helper on `Scene`
/// - dispatch the variant in `render::pass`
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Shape {
    /// Segment between two endpoints, drawn as a 1px line primitive.
    Line { start: Vec2, end: Vec2 },
    /// Unit triangle transformed by per-draw scale + position uniforms.
    Triangle { scale: Vec2, pos: Vec2 },
    /// Unit square (two triangles) on the same uniform path as `Triangle`.
    Square { scale: Vec2, pos: Vec2 },
}

/// One entry in the scene list: a drawable primitive and its parameters.
///
/// The variant is fixed at creation; geometry fields match the variant by
/// construction because they live inside the enum payload.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ShapeRecord {
    /// Caller-chosen identifier. Uniqueness is not enforced; duplicate ids
    /// are permitted and not deduplicated.
    pub id: u32,
    pub shape: Shape,
    pub color: Color,
}

impl ShapeRecord {
    #[inline]
    pub const fn new(id: u32, shape: Shape, color: Color) -> Self {
        Self { id, shape, color }
    }
}
