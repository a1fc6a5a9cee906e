use wgpu::{Buffer, Device, Queue, RenderPipeline, TextureView};
use winit::dpi::PhysicalSize;

use crate::theme::Palette;

use super::waveform::WaveField;

const LINE_HALF_WIDTH: f32 = 1.0; // 2px stroke, split around the sample
const FILL_OPACITY_FACTOR: f32 = 0.15;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct WaveVertex {
    position: [f32; 2],
    color: [f32; 4],
}

impl WaveVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<WaveVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Range of one triangle strip inside the shared vertex buffer.
struct StripRange {
    start: u32,
    end: u32,
}

/// Draws the wave field as one translucent fill plus one 2px stroke ribbon
/// per line. Vertices are rebuilt on the CPU every frame; the buffer is
/// grown on demand after resizes.
pub struct WaveformRenderer {
    pipeline: RenderPipeline,
    vertex_buffer: Buffer,
    capacity: usize,
    size: PhysicalSize<u32>,
    vertices: Vec<WaveVertex>,
    strips: Vec<StripRange>,
}

impl WaveformRenderer {
    pub fn new(device: &Device, surface_format: wgpu::TextureFormat, size: PhysicalSize<u32>) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Waveform Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("waveform.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Waveform Pipeline Layout"),
            bind_group_layouts: &[],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Waveform Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[WaveVertex::desc()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
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

        let capacity = 4096;
        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Waveform Vertex Buffer"),
            size: (capacity * std::mem::size_of::<WaveVertex>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            pipeline,
            vertex_buffer,
            capacity,
            size,
            vertices: Vec::new(),
            strips: Vec::new(),
        }
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.size = size;
    }

    /// Rebuild the vertex list from the current field state. Fills first so
    /// strokes draw on top of every fill.
    fn build_vertices(&mut self, field: &WaveField, palette: &Palette) {
        self.vertices.clear();
        self.strips.clear();

        let width = self.size.width.max(1) as f32;
        let height = self.size.height.max(1) as f32;
        let to_ndc = |x: f32, y: f32| [x / width * 2.0 - 1.0, 1.0 - y / height * 2.0];

        let bottom = field.height();
        let [r, g, b] = palette.wave;

        for wave in field.waves() {
            let fill_color = [r, g, b, wave.stroke_opacity * FILL_OPACITY_FACTOR];
            let start = self.vertices.len() as u32;
            for point in &wave.points {
                self.vertices.push(WaveVertex {
                    position: to_ndc(point.x, point.current_y),
                    color: fill_color,
                });
                self.vertices.push(WaveVertex {
                    position: to_ndc(point.x, bottom),
                    color: fill_color,
                });
            }
            self.strips.push(StripRange {
                start,
                end: self.vertices.len() as u32,
            });
        }

        for wave in field.waves() {
            let stroke_color = [r, g, b, wave.stroke_opacity];
            let start = self.vertices.len() as u32;
            for point in &wave.points {
                self.vertices.push(WaveVertex {
                    position: to_ndc(point.x, point.current_y - LINE_HALF_WIDTH),
                    color: stroke_color,
                });
                self.vertices.push(WaveVertex {
                    position: to_ndc(point.x, point.current_y + LINE_HALF_WIDTH),
                    color: stroke_color,
                });
            }
            self.strips.push(StripRange {
                start,
                end: self.vertices.len() as u32,
            });
        }
    }

    fn ensure_capacity(&mut self, device: &Device) {
        if self.vertices.len() <= self.capacity {
            return;
        }
        self.capacity = self.vertices.len().next_power_of_two();
        self.vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Waveform Vertex Buffer"),
            size: (self.capacity * std::mem::size_of::<WaveVertex>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
    }

    pub fn render(
        &mut self,
        device: &Device,
        queue: &Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &TextureView,
        field: &WaveField,
        palette: &Palette,
    ) {
        self.build_vertices(field, palette);
        if self.vertices.is_empty() {
            return;
        }
        self.ensure_capacity(device);
        queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&self.vertices));

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Waveform Render Pass"),
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

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        for strip in &self.strips {
            render_pass.draw(strip.start..strip.end, 0..1);
        }
    }
}
