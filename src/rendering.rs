//! Rendering system with wgpu pipelines for the ground helper and point cubes.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::error::RenderError;
use crate::grid::HelperLine;
use crate::params::RenderConfig;
use crate::scene::SceneNode;

/// Uniform buffer for both pipelines
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Uniforms {
    pub view_proj: [[f32; 4]; 4],
}

/// Corner of the shared unit cube mesh
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct CubeVertex {
    pub position: [f32; 3],
}

/// Per-cube instance data (world offset, edge length, color)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Instance {
    pub offset: [f32; 3],
    pub scale: f32,
    pub color: [f32; 4],
}

/// Vertex of the ground helper line list
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

/// A cube in the scene whose brightness follows its flash intensity
#[derive(Clone, Debug)]
pub struct CubeNode {
    pub instance: Instance,
    base_color: [f32; 3],
    idle_brightness: f32,
}

impl CubeNode {
    /// White point cube at its idle brightness
    pub fn point(position: Vec3, size_m: f32, config: &RenderConfig) -> Self {
        let mut node = Self {
            instance: Instance {
                offset: position.to_array(),
                scale: size_m,
                color: [1.0; 4],
            },
            base_color: [1.0; 3],
            idle_brightness: config.idle_brightness.clamp(0.0, 1.0),
        };
        node.set_flash(0.0);
        node
    }

    /// Listener marker: constant color, ignores flash
    pub fn marker(position: Vec3, config: &RenderConfig) -> Self {
        let [r, g, b] = config.marker_color;
        Self {
            instance: Instance {
                offset: position.to_array(),
                scale: config.marker_size_m,
                color: [r, g, b, 1.0],
            },
            base_color: config.marker_color,
            idle_brightness: 1.0,
        }
    }
}

impl SceneNode for CubeNode {
    fn set_position(&mut self, position: Vec3) {
        self.instance.offset = position.to_array();
    }

    fn set_flash(&mut self, intensity: f32) {
        let brightness =
            self.idle_brightness + (1.0 - self.idle_brightness) * intensity.clamp(0.0, 1.0);
        let [r, g, b] = self.base_color;
        self.instance.color = [r * brightness, g * brightness, b * brightness, 1.0];
    }
}

/// Unit cube centered on the origin, counter-clockwise faces seen from outside
pub fn cube_vertices() -> Vec<CubeVertex> {
    // (normal, u, v) with u x v = normal
    let faces = [
        (Vec3::X, Vec3::Y, Vec3::Z),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::Z, Vec3::X),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::Y, Vec3::X),
    ];

    let mut vertices = Vec::with_capacity(36);
    for (normal, u, v) in faces {
        let corner = |su: f32, sv: f32| CubeVertex {
            position: (normal * 0.5 + u * (0.5 * su) + v * (0.5 * sv)).to_array(),
        };
        let quad = [
            corner(-1.0, -1.0),
            corner(1.0, -1.0),
            corner(1.0, 1.0),
            corner(-1.0, 1.0),
        ];
        vertices.extend_from_slice(&[quad[0], quad[1], quad[2], quad[0], quad[2], quad[3]]);
    }
    vertices
}

/// Line-list vertices for the ground helper
pub fn helper_line_vertices(lines: &[HelperLine], config: &RenderConfig) -> Vec<LineVertex> {
    lines
        .iter()
        .flat_map(|line| {
            let [r, g, b] = if line.center {
                config.helper_center_color
            } else {
                config.helper_line_color
            };
            let color = [r, g, b, 1.0];
            [
                LineVertex {
                    position: line.start.to_array(),
                    color,
                },
                LineVertex {
                    position: line.end.to_array(),
                    color,
                },
            ]
        })
        .collect()
}

/// Rendering system managing wgpu device, pipelines, and buffers
pub struct RenderSystem {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    cube_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    cube_buffer: wgpu::Buffer,
    cube_vertex_count: u32,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
    instance_count: u32,
    line_buffer: wgpu::Buffer,
    line_vertex_count: u32,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
}

impl RenderSystem {
    /// Create new rendering system
    ///
    /// `instance_capacity` bounds the number of cubes drawn per frame.
    pub async fn new(
        window: Arc<Window>,
        instance_capacity: usize,
        lines: &[LineVertex],
    ) -> Result<Self, RenderError> {
        let size = window.inner_size();

        // Create wgpu instance
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // Create surface (window must have 'static lifetime via Arc)
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::NoAdapter)?;

        log::info!("GPU: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Main Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        // Configure surface
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        // Create buffers
        let cube = cube_vertices();
        let cube_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Cube Vertex Buffer"),
            contents: bytemuck::cast_slice(&cube),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let instance_capacity = instance_capacity.max(1);
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Instance Buffer"),
            size: (instance_capacity * std::mem::size_of::<Instance>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // Empty line lists still need a non-zero buffer
        let line_contents: &[u8] = if lines.is_empty() {
            &[0; std::mem::size_of::<LineVertex>()]
        } else {
            bytemuck::cast_slice(lines)
        };
        let line_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Helper Line Buffer"),
            contents: line_contents,
            usage: wgpu::BufferUsages::VERTEX,
        });

        let uniforms = Uniforms {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
        };

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::cast_slice(&[uniforms]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Uniform Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            push_constant_ranges: &[],
        });

        let color_targets = [Some(wgpu::ColorTargetState {
            format: config.format,
            blend: Some(wgpu::BlendState::REPLACE),
            write_mask: wgpu::ColorWrites::ALL,
        })];

        let cube_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Cube Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_cube"),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<CubeVertex>() as wgpu::BufferAddress,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &[wgpu::VertexAttribute {
                            offset: 0,
                            shader_location: 0,
                            format: wgpu::VertexFormat::Float32x3,
                        }],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Instance>() as wgpu::BufferAddress,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &[
                            wgpu::VertexAttribute {
                                offset: 0,
                                shader_location: 1,
                                format: wgpu::VertexFormat::Float32x3,
                            },
                            wgpu::VertexAttribute {
                                offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                                shader_location: 2,
                                format: wgpu::VertexFormat::Float32,
                            },
                            wgpu::VertexAttribute {
                                offset: (std::mem::size_of::<[f32; 3]>() + std::mem::size_of::<f32>())
                                    as wgpu::BufferAddress,
                                shader_location: 3,
                                format: wgpu::VertexFormat::Float32x4,
                            },
                        ],
                    },
                ],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &color_targets,
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let line_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Helper Line Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_line"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<LineVertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[
                        wgpu::VertexAttribute {
                            offset: 0,
                            shader_location: 0,
                            format: wgpu::VertexFormat::Float32x3,
                        },
                        wgpu::VertexAttribute {
                            offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                            shader_location: 1,
                            format: wgpu::VertexFormat::Float32x4,
                        },
                    ],
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &color_targets,
                compilation_options: Default::default(),
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
            multiview: None,
            cache: None,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            cube_pipeline,
            line_pipeline,
            cube_buffer,
            cube_vertex_count: cube.len() as u32,
            instance_buffer,
            instance_capacity,
            instance_count: 0,
            line_buffer,
            line_vertex_count: lines.len() as u32,
            uniform_buffer,
            uniform_bind_group,
        })
    }

    /// Reconfigure the surface for a new window size
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Current surface size in pixels
    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn update_uniforms(&self, uniforms: &Uniforms) {
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[*uniforms]));
    }

    /// Upload this frame's cubes; anything past the capacity is dropped
    pub fn update_instances(&mut self, instances: &[Instance]) {
        let count = instances.len().min(self.instance_capacity);
        if count > 0 {
            self.queue.write_buffer(
                &self.instance_buffer,
                0,
                bytemuck::cast_slice(&instances[..count]),
            );
        }
        self.instance_count = count as u32;
    }

    /// Render a frame
    pub fn render(&self) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);

            // Ground helper first, cubes on top
            render_pass.set_pipeline(&self.line_pipeline);
            render_pass.set_vertex_buffer(0, self.line_buffer.slice(..));
            render_pass.draw(0..self.line_vertex_count, 0..1);

            if self.instance_count > 0 {
                render_pass.set_pipeline(&self.cube_pipeline);
                render_pass.set_vertex_buffer(0, self.cube_buffer.slice(..));
                render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
                render_pass.draw(0..self.cube_vertex_count, 0..self.instance_count);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_layout_matches_shader() {
        assert_eq!(std::mem::size_of::<Instance>(), 32);
        assert_eq!(std::mem::size_of::<LineVertex>(), 28);
        assert_eq!(std::mem::size_of::<Uniforms>(), 64);
    }

    #[test]
    fn test_cube_faces_point_outward() {
        let vertices = cube_vertices();
        assert_eq!(vertices.len(), 36);

        for tri in vertices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|v| Vec3::from_array(v.position));
            let normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(normal.dot(centroid) > 0.0, "triangle {:?} faces inward", tri);
        }
        assert!(vertices
            .iter()
            .all(|v| v.position.iter().all(|c| c.abs() == 0.5)));
    }

    #[test]
    fn test_point_node_brightness_follows_flash() {
        let config = RenderConfig::default();
        let mut node = CubeNode::point(Vec3::ZERO, 0.01, &config);
        assert_eq!(node.instance.color[0], config.idle_brightness);

        node.set_flash(1.0);
        assert!(node.instance.color.iter().all(|c| (c - 1.0).abs() < 1e-6));

        node.set_flash(0.5);
        let expected = config.idle_brightness + (1.0 - config.idle_brightness) * 0.5;
        assert!((node.instance.color[1] - expected).abs() < 1e-6);
    }

    #[test]
    fn test_marker_moves_and_keeps_color() {
        let config = RenderConfig::default();
        let mut marker = CubeNode::marker(Vec3::ZERO, &config);

        marker.set_position(Vec3::new(0.2, 0.0, -0.1));
        assert_eq!(marker.instance.offset, [0.2, 0.0, -0.1]);

        marker.set_flash(0.0);
        let [r, g, b] = config.marker_color;
        assert_eq!(marker.instance.color, [r, g, b, 1.0]);
    }

    #[test]
    fn test_helper_line_colors() {
        let config = RenderConfig::default();
        let lines = crate::grid::helper_lines(&crate::params::GridParams::default());
        let vertices = helper_line_vertices(&lines, &config);

        assert_eq!(vertices.len(), lines.len() * 2);
        let [r, _, _] = config.helper_center_color;
        let center_vertices = vertices.iter().filter(|v| v.color[0] == r).count();
        assert_eq!(center_vertices, 4);
    }
}
