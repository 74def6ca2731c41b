use anyhow::Result;

use crate::scene::{Scene, Shape};

use super::canvas::CanvasPipeline;
use super::line::LinePipeline;
use super::{RenderCtx, RenderTarget};

/// Fixed background color cleared at the start of every frame.
const BACKGROUND: wgpu::Color = wgpu::Color {
    r: 0.2,
    g: 0.3,
    b: 0.3,
    a: 1.0,
};

/// Owns both fixed pipelines and draws the scene once per frame.
///
/// Records are dispatched strictly in insertion order within a single
/// render pass, so later shapes paint over earlier ones regardless of
/// which pipeline they use. All GPU resources (pipelines included) are
/// released when this value is dropped at loop exit.
pub struct ScenePainter {
    line: LinePipeline,
    canvas: CanvasPipeline,
}

impl ScenePainter {
    /// Builds both pipelines up front.
    ///
    /// Shader compile/link failures are logged and propagated; a painter is
    /// never constructed around a broken pipeline.
    pub fn new(ctx: &RenderCtx<'_>) -> Result<Self> {
        Ok(Self {
            line: LinePipeline::new(ctx)?,
            canvas: CanvasPipeline::new(ctx)?,
        })
    }

    /// Clears the target and draws every record in insertion order.
    pub fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, scene: &Scene) {
        self.line.prepare(ctx, scene);
        self.canvas.prepare(ctx, scene);

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("easel scene pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(BACKGROUND),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        // Each pipeline counts its own slots; both follow scene order.
        let mut line_slot = 0u32;
        let mut canvas_slot = 0u32;

        for record in scene.records() {
            match record.shape {
                Shape::Line { .. } => {
                    self.line.draw(&mut rpass, line_slot);
                    line_slot += 1;
                }
                Shape::Triangle { .. } => {
                    self.canvas.draw_triangle(&mut rpass, canvas_slot);
                    canvas_slot += 1;
                }
                Shape::Square { .. } => {
                    self.canvas.draw_square(&mut rpass, canvas_slot);
                    canvas_slot += 1;
                }
            }
        }
    }
}
