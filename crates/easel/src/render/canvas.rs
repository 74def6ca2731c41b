use anyhow::Result;
use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::scene::{Scene, Shape, ShapeRecord};

use super::common::{
    self, min_binding_size, uniform_stride, ShapeVertex, SlotBuffer, UNIT_SQUARE, UNIT_TRIANGLE,
};
use super::RenderCtx;

/// Transform ("canvas") pipeline: scale + translate applied to unit
/// geometry in the vertex shader.
///
/// Triangles and squares share this pipeline. Each kind has one long-lived
/// static vertex buffer; per-shape scale/pos/color go through uniform
/// slots, one per canvas record in scene order.
pub(super) struct CanvasPipeline {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: Option<wgpu::BindGroup>,

    uniforms: SlotBuffer,
    uniform_stride: u64,

    triangle_vbo: wgpu::Buffer,
    square_vbo: wgpu::Buffer,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
struct CanvasUniform {
    scale: [f32; 2],
    pos: [f32; 2],
    color: [f32; 4],
}

impl CanvasPipeline {
    /// Compiles the transform shader, builds the pipeline, and uploads the
    /// two static unit-geometry buffers.
    ///
    /// Fails closed on compile/link diagnostics, same as the line pipeline.
    pub(super) fn new(ctx: &RenderCtx<'_>) -> Result<Self> {
        let shader = common::validated(ctx.device, "canvas shader", || {
            ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("easel canvas shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("shaders/canvas.wgsl").into()),
            })
        })?;

        let bind_group_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("easel canvas bgl"),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: true,
                            min_binding_size: Some(min_binding_size::<CanvasUniform>()),
                        },
                        count: None,
                    }],
                });

        let pipeline_layout =
            ctx.device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("easel canvas pipeline layout"),
                    bind_group_layouts: &[&bind_group_layout],
                    immediate_size: 0,
                });

        let pipeline = common::validated(ctx.device, "canvas pipeline", || {
            ctx.device
                .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some("easel canvas pipeline"),
                    layout: Some(&pipeline_layout),

                    vertex: wgpu::VertexState {
                        module: &shader,
                        entry_point: Some("vs_main"),
                        compilation_options: Default::default(),
                        buffers: &[ShapeVertex::layout()],
                    },

                    fragment: Some(wgpu::FragmentState {
                        module: &shader,
                        entry_point: Some("fs_main"),
                        compilation_options: Default::default(),
                        targets: &[Some(wgpu::ColorTargetState {
                            format: ctx.surface_format,
                            blend: None,
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                    }),

                    primitive: wgpu::PrimitiveState {
                        topology: wgpu::PrimitiveTopology::TriangleList,
                        strip_index_format: None,
                        front_face: wgpu::FrontFace::Ccw,
                        cull_mode: None,
                        polygon_mode: wgpu::PolygonMode::Fill,
                        unclipped_depth: false,
                        conservative: false,
                    },

                    depth_stencil: None,
                    multisample: wgpu::MultisampleState::default(),
                    multiview_mask: None,
                    cache: None,
                })
        })?;

        let triangle_vbo = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("easel unit triangle vbo"),
                contents: bytemuck::cast_slice(&UNIT_TRIANGLE),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let square_vbo = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("easel unit square vbo"),
                contents: bytemuck::cast_slice(&UNIT_SQUARE),
                usage: wgpu::BufferUsages::VERTEX,
            });

        Ok(Self {
            pipeline,
            bind_group_layout,
            bind_group: None,
            uniforms: SlotBuffer::new("easel canvas ubo"),
            uniform_stride: uniform_stride::<CanvasUniform>(ctx.device),
            triangle_vbo,
            square_vbo,
        })
    }

    /// Uploads one scale/pos/color slot per triangle or square record.
    pub(super) fn prepare(&mut self, ctx: &RenderCtx<'_>, scene: &Scene) {
        let uniforms = canvas_uniforms(scene, ctx.aspect_ratio);
        if uniforms.is_empty() {
            return;
        }

        let recreated =
            self.uniforms
                .ensure_capacity(ctx.device, self.uniform_stride, uniforms.len());
        if recreated || self.bind_group.is_none() {
            self.rebuild_bind_group(ctx);
        }
        self.uniforms.write(ctx.queue, self.uniform_stride, &uniforms);
    }

    /// Draws the `slot`-th canvas shape of the frame as a triangle.
    pub(super) fn draw_triangle(&self, rpass: &mut wgpu::RenderPass<'_>, slot: u32) {
        self.draw(rpass, slot, &self.triangle_vbo, 3);
    }

    /// Draws the `slot`-th canvas shape of the frame as a square.
    pub(super) fn draw_square(&self, rpass: &mut wgpu::RenderPass<'_>, slot: u32) {
        self.draw(rpass, slot, &self.square_vbo, 6);
    }

    fn draw(
        &self,
        rpass: &mut wgpu::RenderPass<'_>,
        slot: u32,
        vbo: &wgpu::Buffer,
        vertex_count: u32,
    ) {
        let Some(bind_group) = self.bind_group.as_ref() else { return };

        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, bind_group, &[(slot as u64 * self.uniform_stride) as u32]);
        rpass.set_vertex_buffer(0, vbo.slice(..));
        rpass.draw(0..vertex_count, 0..1);
    }

    fn rebuild_bind_group(&mut self, ctx: &RenderCtx<'_>) {
        let Some(buffer) = self.uniforms.buffer() else { return };

        self.bind_group = Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("easel canvas bind group"),
            layout: &self.bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer,
                    offset: 0,
                    size: Some(min_binding_size::<CanvasUniform>()),
                }),
            }],
        }));
    }
}

/// Uniform values for one triangle or square record.
///
/// The Y scale is multiplied by the window aspect ratio so shapes keep
/// their proportions on non-square surfaces.
fn shape_uniform(record: &ShapeRecord, aspect_ratio: f32) -> Option<CanvasUniform> {
    let (scale, pos) = match record.shape {
        Shape::Triangle { scale, pos } | Shape::Square { scale, pos } => (scale, pos),
        Shape::Line { .. } => return None,
    };

    Some(CanvasUniform {
        scale: [scale.x, scale.y * aspect_ratio],
        pos: [pos.x, pos.y],
        color: record.color.to_rgba(),
    })
}

/// One uniform slot per canvas record (triangles and squares), in scene
/// order, skipping lines.
fn canvas_uniforms(scene: &Scene, aspect_ratio: f32) -> Vec<CanvasUniform> {
    scene
        .records()
        .iter()
        .filter_map(|r| shape_uniform(r, aspect_ratio))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{Color, Vec2};

    fn v(x: f32, y: f32) -> Vec2 {
        Vec2::new(x, y)
    }

    #[test]
    fn identity_scale_at_origin_yields_base_uniforms() {
        let record = ShapeRecord::new(
            1,
            Shape::Triangle { scale: v(1.0, 1.0), pos: v(0.0, 0.0) },
            Color::DEFAULT,
        );

        let u = shape_uniform(&record, 1.0).unwrap();
        assert_eq!(u.scale, [1.0, 1.0]);
        assert_eq!(u.pos, [0.0, 0.0]);
    }

    #[test]
    fn y_scale_is_adjusted_by_aspect_ratio() {
        let record = ShapeRecord::new(
            1,
            Shape::Square { scale: v(2.0, 3.0), pos: v(0.5, -0.5) },
            Color::DEFAULT,
        );

        let u = shape_uniform(&record, 2.0).unwrap();
        assert_eq!(u.scale, [2.0, 6.0]);
        assert_eq!(u.pos, [0.5, -0.5]);
    }

    #[test]
    fn lines_produce_no_canvas_uniform() {
        let record = ShapeRecord::new(
            1,
            Shape::Line { start: v(0.0, 0.0), end: v(1.0, 1.0) },
            Color::DEFAULT,
        );
        assert!(shape_uniform(&record, 1.0).is_none());
    }

    #[test]
    fn slots_follow_scene_order_skipping_lines() {
        let mut scene = Scene::new();
        scene.push_triangle(1, v(1.0, 1.0), v(0.1, 0.1), Color::new(1.0, 0.0, 0.0));
        scene.push_line(2, v(0.0, 0.0), v(1.0, 1.0), Color::DEFAULT);
        scene.push_square(3, v(0.5, 0.5), v(0.0, 0.0), Color::new(0.0, 0.0, 1.0));

        let uniforms = canvas_uniforms(&scene, 1.0);
        assert_eq!(uniforms.len(), 2);
        assert_eq!(uniforms[0].color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(uniforms[1].color, [0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn explicit_color_reaches_the_fragment_uniform_as_opaque_rgba() {
        let mut scene = Scene::new();
        scene.push_square(3, v(0.5, 0.5), v(0.0, 0.0), Color::new(1.0, 0.0, 0.0));

        let uniforms = canvas_uniforms(&scene, 1.0);
        assert_eq!(uniforms[0].color, [1.0, 0.0, 0.0, 1.0]);
    }
}
