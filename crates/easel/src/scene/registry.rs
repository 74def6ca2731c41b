use crate::coords::{Color, Vec2};

use super::{Shape, ShapeRecord};

/// Append-only, insertion-ordered list of shape records.
///
/// Insertion order is draw order: later records paint over earlier ones
/// (painter's algorithm, no depth test). No validation is performed on ids
/// or geometry; callers get back exactly what they pushed.
#[derive(Debug, Default)]
pub struct Scene {
    records: Vec<ShapeRecord>,
}

impl Scene {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns records in insertion order.
    #[inline]
    pub fn records(&self) -> &[ShapeRecord] {
        &self.records
    }

    /// Appends a record to the end of the draw order.
    #[inline]
    pub fn push(&mut self, record: ShapeRecord) {
        self.records.push(record);
    }

    /// Records a line from `start` to `end`.
    #[inline]
    pub fn push_line(&mut self, id: u32, start: Vec2, end: Vec2, color: Color) {
        self.push(ShapeRecord::new(id, Shape::Line { start, end }, color));
    }

    /// Records a triangle with the given scale and position.
    #[inline]
    pub fn push_triangle(&mut self, id: u32, scale: Vec2, pos: Vec2, color: Color) {
        self.push(ShapeRecord::new(id, Shape::Triangle { scale, pos }, color));
    }

    /// Records a square with the given scale and position.
    #[inline]
    pub fn push_square(&mut self, id: u32, scale: Vec2, pos: Vec2, color: Color) {
        self.push(ShapeRecord::new(id, Shape::Square { scale, pos }, color));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f32, y: f32) -> Vec2 {
        Vec2::new(x, y)
    }

    // ── length ────────────────────────────────────────────────────────────

    #[test]
    fn empty_scene_has_no_records() {
        let scene = Scene::new();
        assert!(scene.is_empty());
        assert_eq!(scene.len(), 0);
    }

    #[test]
    fn length_equals_number_of_pushes() {
        let mut scene = Scene::new();
        scene.push_line(1, v(0.0, 0.0), v(1.0, 1.0), Color::DEFAULT);
        scene.push_triangle(2, v(1.0, 1.0), v(0.0, 0.0), Color::DEFAULT);
        scene.push_square(3, v(0.5, 0.5), v(0.2, 0.2), Color::DEFAULT);
        scene.push_square(3, v(0.5, 0.5), v(0.2, 0.2), Color::DEFAULT);
        assert_eq!(scene.len(), 4);
    }

    // ── ordering ──────────────────────────────────────────────────────────

    #[test]
    fn iteration_order_is_call_order() {
        let mut scene = Scene::new();
        scene.push_square(10, v(1.0, 1.0), v(0.0, 0.0), Color::DEFAULT);
        scene.push_line(11, v(0.0, 0.0), v(1.0, 1.0), Color::DEFAULT);
        scene.push_triangle(12, v(1.0, 1.0), v(0.0, 0.0), Color::DEFAULT);

        let ids: Vec<u32> = scene.records().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![10, 11, 12]);
    }

    #[test]
    fn duplicate_ids_are_kept() {
        let mut scene = Scene::new();
        scene.push_line(7, v(0.0, 0.0), v(1.0, 1.0), Color::DEFAULT);
        scene.push_line(7, v(-1.0, -1.0), v(0.0, 0.0), Color::DEFAULT);
        assert_eq!(scene.len(), 2);
        assert_eq!(scene.records()[0].id, scene.records()[1].id);
    }

    // ── payload ───────────────────────────────────────────────────────────

    #[test]
    fn line_keeps_its_endpoints() {
        let mut scene = Scene::new();
        scene.push_line(1, v(-0.25, 0.5), v(0.75, -0.5), Color::DEFAULT);

        match scene.records()[0].shape {
            Shape::Line { start, end } => {
                assert_eq!(start, v(-0.25, 0.5));
                assert_eq!(end, v(0.75, -0.5));
            }
            other => panic!("expected a line, got {other:?}"),
        }
    }

    #[test]
    fn color_is_stored_as_given() {
        let mut scene = Scene::new();
        scene.push_square(1, v(0.5, 0.5), v(0.0, 0.0), Color::new(1.0, 0.0, 0.0));
        assert_eq!(scene.records()[0].color, Color::new(1.0, 0.0, 0.0));
    }
}
