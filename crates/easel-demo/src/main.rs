use easel::logging::{init_logging, LoggingConfig};
use easel::Painter;

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let mut painter = Painter::new();

    // Crosshair through the origin.
    painter.add_line(1, -1.0, 0.0, 1.0, 0.0);
    painter.add_line(2, 0.0, -1.0, 0.0, 1.0);

    // A diagonal in red.
    painter.add_line_colored(3, -0.9, -0.9, 0.9, 0.9, 0.9, 0.2, 0.2);

    // Two triangles, default and colored.
    painter.add_triangle(4, 2.0, 2.0, -0.5, 0.4);
    painter.add_triangle_colored(5, 3.0, 3.0, 0.5, 0.4, 0.3, 0.8, 0.4);

    // Overlapping squares: the yellow one is added last and paints on top.
    painter.add_square_colored(6, 4.0, 4.0, -0.1, -0.45, 0.2, 0.4, 0.9);
    painter.add_square_colored(7, 3.0, 3.0, 0.1, -0.35, 0.9, 0.8, 0.2);

    log::info!("starting render loop with {} shapes", painter.scene().len());
    painter.run()
}
