use anyhow::Result;
use bytemuck::{Pod, Zeroable};

use crate::scene::{Scene, Shape};

use super::common::{self, min_binding_size, uniform_stride, ShapeVertex, SlotBuffer};
use super::RenderCtx;

/// Line pipeline: passthrough vertex transform, per-draw color uniform.
///
/// Line endpoints are scene data, not uniforms, so they live in one
/// persistent vertex buffer refilled each frame via `write_buffer`. Each
/// line occupies two consecutive vertices; draw calls address their own
/// pair by vertex range, so records never see each other's endpoints.
pub(super) struct LinePipeline {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: Option<wgpu::BindGroup>,

    uniforms: SlotBuffer,
    uniform_stride: u64,

    vbo: Option<wgpu::Buffer>,
    vbo_capacity: usize, // vertices
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
struct LineUniform {
    color: [f32; 4],
}

impl LinePipeline {
    /// Compiles the line shader and builds the pipeline.
    ///
    /// Fails closed: a compile or link diagnostic is logged and returned as
    /// an error, and no pipeline is registered.
    pub(super) fn new(ctx: &RenderCtx<'_>) -> Result<Self> {
        let shader = common::validated(ctx.device, "line shader", || {
            ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("easel line shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("shaders/line.wgsl").into()),
            })
        })?;

        let bind_group_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("easel line bgl"),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: true,
                            min_binding_size: Some(min_binding_size::<LineUniform>()),
                        },
                        count: None,
                    }],
                });

        let pipeline_layout =
            ctx.device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("easel line pipeline layout"),
                    bind_group_layouts: &[&bind_group_layout],
                    immediate_size: 0,
                });

        let pipeline = common::validated(ctx.device, "line pipeline", || {
            ctx.device
                .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some("easel line pipeline"),
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
                        topology: wgpu::PrimitiveTopology::LineList,
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

        Ok(Self {
            pipeline,
            bind_group_layout,
            bind_group: None,
            uniforms: SlotBuffer::new("easel line ubo"),
            uniform_stride: uniform_stride::<LineUniform>(ctx.device),
            vbo: None,
            vbo_capacity: 0,
        })
    }

    /// Uploads this frame's line endpoints and per-line color slots.
    pub(super) fn prepare(&mut self, ctx: &RenderCtx<'_>, scene: &Scene) {
        let vertices = line_vertices(scene);
        if vertices.is_empty() {
            return;
        }
        let uniforms = line_uniforms(scene);

        self.ensure_vbo_capacity(ctx, vertices.len());
        if let Some(vbo) = self.vbo.as_ref() {
            ctx.queue.write_buffer(vbo, 0, bytemuck::cast_slice(&vertices));
        }

        let recreated =
            self.uniforms
                .ensure_capacity(ctx.device, self.uniform_stride, uniforms.len());
        if recreated || self.bind_group.is_none() {
            self.rebuild_bind_group(ctx);
        }
        self.uniforms.write(ctx.queue, self.uniform_stride, &uniforms);
    }

    /// Draws the `slot`-th line of the frame (two vertices at its offset).
    pub(super) fn draw(&self, rpass: &mut wgpu::RenderPass<'_>, slot: u32) {
        let Some(bind_group) = self.bind_group.as_ref() else { return };
        let Some(vbo) = self.vbo.as_ref() else { return };

        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, bind_group, &[(slot as u64 * self.uniform_stride) as u32]);
        rpass.set_vertex_buffer(0, vbo.slice(..));

        let base = slot * 2;
        rpass.draw(base..base + 2, 0..1);
    }

    fn ensure_vbo_capacity(&mut self, ctx: &RenderCtx<'_>, required_vertices: usize) {
        if required_vertices <= self.vbo_capacity && self.vbo.is_some() {
            return;
        }

        let new_cap = required_vertices.next_power_of_two().max(32);
        self.vbo = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("easel line vbo"),
            size: (new_cap * std::mem::size_of::<ShapeVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.vbo_capacity = new_cap;
    }

    fn rebuild_bind_group(&mut self, ctx: &RenderCtx<'_>) {
        let Some(buffer) = self.uniforms.buffer() else { return };

        self.bind_group = Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("easel line bind group"),
            layout: &self.bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer,
                    offset: 0,
                    size: Some(min_binding_size::<LineUniform>()),
                }),
            }],
        }));
    }
}

/// Packs every line's endpoints into a contiguous vertex stream, two
/// vertices per record, in scene order.
fn line_vertices(scene: &Scene) -> Vec<ShapeVertex> {
    let mut vertices = Vec::new();
    for record in scene.records() {
        if let Shape::Line { start, end } = record.shape {
            vertices.push(ShapeVertex { pos: [start.x, start.y] });
            vertices.push(ShapeVertex { pos: [end.x, end.y] });
        }
    }
    vertices
}

/// One color slot per line record, in scene order.
fn line_uniforms(scene: &Scene) -> Vec<LineUniform> {
    scene
        .records()
        .iter()
        .filter(|r| matches!(r.shape, Shape::Line { .. }))
        .map(|r| LineUniform { color: r.color.to_rgba() })
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
    fn each_line_packs_only_its_own_endpoints() {
        let mut scene = Scene::new();
        scene.push_line(1, v(0.0, 0.0), v(1.0, 1.0), Color::DEFAULT);
        scene.push_line(2, v(-1.0, -1.0), v(0.0, 0.0), Color::DEFAULT);

        let vertices = line_vertices(&scene);
        assert_eq!(vertices.len(), 4);
        assert_eq!(vertices[0].pos, [0.0, 0.0]);
        assert_eq!(vertices[1].pos, [1.0, 1.0]);
        assert_eq!(vertices[2].pos, [-1.0, -1.0]);
        assert_eq!(vertices[3].pos, [0.0, 0.0]);
    }

    #[test]
    fn non_line_records_contribute_no_vertices() {
        let mut scene = Scene::new();
        scene.push_triangle(1, v(1.0, 1.0), v(0.0, 0.0), Color::DEFAULT);
        scene.push_line(2, v(0.5, 0.5), v(-0.5, -0.5), Color::DEFAULT);
        scene.push_square(3, v(1.0, 1.0), v(0.0, 0.0), Color::DEFAULT);

        let vertices = line_vertices(&scene);
        assert_eq!(vertices.len(), 2);
        assert_eq!(vertices[0].pos, [0.5, 0.5]);
    }

    #[test]
    fn uniform_slots_follow_line_order_and_carry_opaque_color() {
        let mut scene = Scene::new();
        scene.push_line(1, v(0.0, 0.0), v(1.0, 1.0), Color::new(1.0, 0.0, 0.0));
        scene.push_square(2, v(1.0, 1.0), v(0.0, 0.0), Color::new(0.0, 1.0, 0.0));
        scene.push_line(3, v(0.0, 0.0), v(1.0, 1.0), Color::DEFAULT);

        let uniforms = line_uniforms(&scene);
        assert_eq!(uniforms.len(), 2);
        assert_eq!(uniforms[0].color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(uniforms[1].color, Color::DEFAULT.to_rgba());
    }
}
