use wgpu::{self, util::DeviceExt};

/// Uniform data for one rounded panel: fill color plus pixel dimensions for
/// the corner SDF.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct PanelStyle {
    color: [f32; 4],
    // x: corner radius px, y: width px, z: height px, w: unused
    params: [f32; 4],
}

/// One drawable rounded rectangle. Holds its own uniform buffer so color and
/// size can change per frame without re-creating pipeline state.
pub struct Panel {
    uniform: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Shared pipeline for the themed background clear and all rounded panels
/// (result box, buttons). Panels are positioned with viewports over a unit
/// quad rather than per-panel vertex data.
pub struct RenderPipelines {
    panel_pipeline: wgpu::RenderPipeline,
    quad_vertices: wgpu::Buffer,
    panel_layout: wgpu::BindGroupLayout,
}

impl RenderPipelines {
    pub fn new(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Rounded Rect Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("rounded_rect.wgsl").into()),
        });

        let panel_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Panel Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Panel Pipeline Layout"),
            bind_group_layouts: &[&panel_layout],
            push_constant_ranges: &[],
        });

        let panel_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Panel Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: 8,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x2],
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let quad_vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Panel Quad Vertices"),
            contents: bytemuck::cast_slice(&[
                [-1.0f32, -1.0],
                [1.0, -1.0],
                [-1.0, 1.0],
                [1.0, 1.0],
            ]),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self {
            panel_pipeline,
            quad_vertices,
            panel_layout,
        }
    }

    pub fn create_panel(&self, device: &wgpu::Device) -> Panel {
        let uniform = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Panel Uniform"),
            contents: bytemuck::cast_slice(&[PanelStyle {
                color: [0.0; 4],
                params: [0.0; 4],
            }]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Panel Bind Group"),
            layout: &self.panel_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform.as_entire_binding(),
            }],
        });
        Panel {
            uniform,
            bind_group,
        }
    }

    /// Clear the whole surface to the theme background.
    pub fn draw_background(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        color: [f32; 4],
    ) {
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Clear Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: color[0] as f64,
                        g: color[1] as f64,
                        b: color[2] as f64,
                        a: color[3] as f64,
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
    }

    /// Draw one rounded panel at a pixel rect via a viewport over the quad.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_panel(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        queue: &wgpu::Queue,
        panel: &Panel,
        rect: (f32, f32, f32, f32),
        radius: f32,
        color: [f32; 4],
    ) {
        let (x, y, width, height) = rect;
        if width <= 0.0 || height <= 0.0 {
            return;
        }

        queue.write_buffer(
            &panel.uniform,
            0,
            bytemuck::cast_slice(&[PanelStyle {
                color,
                params: [radius, width, height, 0.0],
            }]),
        );

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Panel Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_viewport(x, y, width, height, 0.0, 1.0);
        render_pass.set_pipeline(&self.panel_pipeline);
        render_pass.set_bind_group(0, &panel.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.quad_vertices.slice(..));
        render_pass.draw(0..4, 0..1);
    }
}
