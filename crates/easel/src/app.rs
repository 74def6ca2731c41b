use anyhow::Result;
use winit::dpi::LogicalSize;

use crate::coords::{Color, Vec2};
use crate::scene::Scene;
use crate::window::{Runtime, RuntimeConfig};

/// Startup configuration for a [`Painter`].
#[derive(Debug, Clone)]
pub struct PainterConfig {
    pub title: String,
    /// Logical window width in pixels.
    pub width: f64,
    /// Logical window height in pixels.
    pub height: f64,
}

impl Default for PainterConfig {
    fn default() -> Self {
        Self {
            title: "easel".to_string(),
            width: 1000.0,
            height: 1000.0,
        }
    }
}

/// Owns a scene of shapes and the configuration used to render it.
///
/// Build one `Painter`, append shapes, then call [`run`](Self::run).
/// `run` consumes the painter, so setup happens exactly once per scene;
/// re-initializing the same painter is unrepresentable.
///
/// All `add_*` calls are infallible: ids are not checked for uniqueness and
/// geometry is rendered exactly as given, without bounds checking.
///
/// Coordinates are normalized device coordinates (-1..1, +Y up).
#[derive(Debug, Default)]
pub struct Painter {
    config: PainterConfig,
    scene: Scene,
}

impl Painter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PainterConfig) -> Self {
        Self {
            config,
            scene: Scene::new(),
        }
    }

    /// Appends a line from `(x0, y0)` to `(x1, y1)` in the default color.
    pub fn add_line(&mut self, id: u32, x0: f32, y0: f32, x1: f32, y1: f32) {
        self.scene
            .push_line(id, Vec2::new(x0, y0), Vec2::new(x1, y1), Color::DEFAULT);
    }

    /// Appends a line with an explicit RGB color.
    pub fn add_line_colored(
        &mut self,
        id: u32,
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
        r: f32,
        g: f32,
        b: f32,
    ) {
        self.scene
            .push_line(id, Vec2::new(x0, y0), Vec2::new(x1, y1), Color::new(r, g, b));
    }

    /// Appends a triangle scaled by `(sx, sy)` at `(px, py)` in the default color.
    pub fn add_triangle(&mut self, id: u32, sx: f32, sy: f32, px: f32, py: f32) {
        self.scene
            .push_triangle(id, Vec2::new(sx, sy), Vec2::new(px, py), Color::DEFAULT);
    }

    /// Appends a triangle with an explicit RGB color.
    pub fn add_triangle_colored(
        &mut self,
        id: u32,
        sx: f32,
        sy: f32,
        px: f32,
        py: f32,
        r: f32,
        g: f32,
        b: f32,
    ) {
        self.scene
            .push_triangle(id, Vec2::new(sx, sy), Vec2::new(px, py), Color::new(r, g, b));
    }

    /// Appends a square scaled by `(sx, sy)` at `(px, py)` in the default color.
    pub fn add_square(&mut self, id: u32, sx: f32, sy: f32, px: f32, py: f32) {
        self.scene
            .push_square(id, Vec2::new(sx, sy), Vec2::new(px, py), Color::DEFAULT);
    }

    /// Appends a square with an explicit RGB color.
    pub fn add_square_colored(
        &mut self,
        id: u32,
        sx: f32,
        sy: f32,
        px: f32,
        py: f32,
        r: f32,
        g: f32,
        b: f32,
    ) {
        self.scene
            .push_square(id, Vec2::new(sx, sy), Vec2::new(px, py), Color::new(r, g, b));
    }

    /// Returns the scene in its current draw order.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Opens the window and blocks until the render loop terminates.
    ///
    /// Returns immediately (without opening a window) when the scene is
    /// empty. Fatal setup errors — window creation, adapter/device
    /// acquisition, shader compile/link — surface here as `Err`.
    pub fn run(self) -> Result<()> {
        Runtime::run(
            RuntimeConfig {
                title: self.config.title,
                initial_size: LogicalSize::new(self.config.width, self.config.height),
            },
            self.scene,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Shape;

    #[test]
    fn registry_length_tracks_add_calls() {
        let mut painter = Painter::new();
        painter.add_line(1, 0.0, 0.0, 1.0, 1.0);
        painter.add_triangle(2, 1.0, 1.0, 0.0, 0.0);
        painter.add_square(3, 0.5, 0.5, 0.2, 0.2);
        assert_eq!(painter.scene().len(), 3);
    }

    #[test]
    fn draw_order_equals_call_order_across_kinds() {
        let mut painter = Painter::new();
        painter.add_square(1, 1.0, 1.0, 0.0, 0.0);
        painter.add_line(2, 0.0, 0.0, 1.0, 1.0);
        painter.add_triangle(3, 1.0, 1.0, 0.0, 0.0);

        let ids: Vec<u32> = painter.scene().records().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn plain_add_uses_the_default_color() {
        let mut painter = Painter::new();
        painter.add_square(1, 0.5, 0.5, 0.0, 0.0);
        assert_eq!(painter.scene().records()[0].color, Color::DEFAULT);
    }

    #[test]
    fn colored_add_stores_the_given_color() {
        let mut painter = Painter::new();
        painter.add_square_colored(3, 0.5, 0.5, 0.0, 0.0, 1.0, 0.0, 0.0);
        assert_eq!(painter.scene().records()[0].color, Color::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn add_line_maps_arguments_to_endpoints() {
        let mut painter = Painter::new();
        painter.add_line(1, -0.5, 0.25, 0.5, -0.25);

        match painter.scene().records()[0].shape {
            Shape::Line { start, end } => {
                assert_eq!(start, Vec2::new(-0.5, 0.25));
                assert_eq!(end, Vec2::new(0.5, -0.25));
            }
            other => panic!("expected a line, got {other:?}"),
        }
    }

    #[test]
    fn add_triangle_maps_arguments_to_scale_and_position() {
        let mut painter = Painter::new();
        painter.add_triangle(1, 2.0, 3.0, 0.1, -0.1);

        match painter.scene().records()[0].shape {
            Shape::Triangle { scale, pos } => {
                assert_eq!(scale, Vec2::new(2.0, 3.0));
                assert_eq!(pos, Vec2::new(0.1, -0.1));
            }
            other => panic!("expected a triangle, got {other:?}"),
        }
    }

    #[test]
    fn default_config_matches_the_fixed_startup_dimensions() {
        let config = PainterConfig::default();
        assert_eq!(config.width, 1000.0);
        assert_eq!(config.height, 1000.0);
    }
}
