use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct CameraUniform {
    pub(crate) view_proj: [f32; 16],
    pub(crate) eye: [f32; 4],
}

impl CameraUniform {
    pub(crate) fn new(view_proj: Mat4, eye: Vec3) -> Self {
        Self {
            view_proj: view_proj.to_cols_array(),
            eye: eye.extend(1.0).to_array(),
        }
    }
}

/// Per-draw placement (`offset + position * scale`) and colour.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct DrawUniform {
    pub(crate) offset_scale: [f32; 4],
    pub(crate) color: [f32; 4],
}

impl DrawUniform {
    pub(crate) fn new(offset: Vec3, scale: f32, color: Vec4) -> Self {
        Self {
            offset_scale: offset.extend(scale).to_array(),
            color: color.to_array(),
        }
    }
}

fn uniform_layout(device: &wgpu::Device, label: &str, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

static VEC4_ATTRIBUTES: [[wgpu::VertexAttribute; 1]; 2] = [
    wgpu::vertex_attr_array![0 => Float32x4],
    wgpu::vertex_attr_array![1 => Float32x4],
];

fn vec4_layout(slot: usize) -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VEC4_ATTRIBUTES[slot],
    }
}

/// What a draw stage rasterizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StageKind {
    /// Lit triangles, positions in slot 0 and normals in slot 1.
    Surface,
    /// Flat-coloured line list, positions in slot 0.
    Wire,
}

/// The same pipeline built with and without a depth attachment.
pub(crate) struct PipelinePair {
    pub(crate) depth: wgpu::RenderPipeline,
    pub(crate) no_depth: wgpu::RenderPipeline,
}

impl PipelinePair {
    pub(crate) fn select(&self, with_depth: bool) -> &wgpu::RenderPipeline {
        if with_depth { &self.depth } else { &self.no_depth }
    }
}

// Pipelines and bind group layouts for the viewer
pub(crate) struct RenderConfig {
    pub(crate) surface_format: wgpu::TextureFormat,
    pub(crate) camera_layout: wgpu::BindGroupLayout,
    pub(crate) draw_layout: wgpu::BindGroupLayout,
    pub(crate) surface_pipelines: PipelinePair,
    pub(crate) wire_pipelines: PipelinePair,
}

impl RenderConfig {
    pub(crate) fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let camera_layout = uniform_layout(
            device,
            "Camera Bind Group Layout",
            wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        );
        let draw_layout = uniform_layout(
            device,
            "Draw Bind Group Layout",
            wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        );

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Viewer Pipeline Layout"),
            bind_group_layouts: &[&camera_layout, &draw_layout],
            push_constant_ranges: &[],
        });

        let surface_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Surface Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/surface.wgsl").into()),
        });
        let wire_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Wire Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/wire.wgsl").into()),
        });

        let surface_buffers = [vec4_layout(0), vec4_layout(1)];
        let wire_buffers = [vec4_layout(0)];
        let build = |label: &str,
                     shader: &wgpu::ShaderModule,
                     buffers: &[wgpu::VertexBufferLayout<'_>],
                     topology: wgpu::PrimitiveTopology,
                     with_depth: bool| {
            create_pipeline(
                device,
                label,
                &pipeline_layout,
                shader,
                buffers,
                topology,
                surface_format,
                with_depth,
            )
        };

        let surface_pipelines = PipelinePair {
            depth: build(
                "Surface Render Pipeline",
                &surface_shader,
                &surface_buffers,
                wgpu::PrimitiveTopology::TriangleList,
                true,
            ),
            no_depth: build(
                "Surface Render Pipeline (no depth)",
                &surface_shader,
                &surface_buffers,
                wgpu::PrimitiveTopology::TriangleList,
                false,
            ),
        };
        let wire_pipelines = PipelinePair {
            depth: build(
                "Wire Render Pipeline",
                &wire_shader,
                &wire_buffers,
                wgpu::PrimitiveTopology::LineList,
                true,
            ),
            no_depth: build(
                "Wire Render Pipeline (no depth)",
                &wire_shader,
                &wire_buffers,
                wgpu::PrimitiveTopology::LineList,
                false,
            ),
        };

        Self {
            surface_format,
            camera_layout,
            draw_layout,
            surface_pipelines,
            wire_pipelines,
        }
    }

    pub(crate) fn pipeline(&self, kind: StageKind, with_depth: bool) -> &wgpu::RenderPipeline {
        match kind {
            StageKind::Surface => self.surface_pipelines.select(with_depth),
            StageKind::Wire => self.wire_pipelines.select(with_depth),
        }
    }

    pub(crate) fn uniform_bind_group(
        &self,
        device: &wgpu::Device,
        label: &str,
        layout: &wgpu::BindGroupLayout,
        buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        })
    }
}

#[allow(clippy::too_many_arguments)]
fn create_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    buffers: &[wgpu::VertexBufferLayout<'_>],
    topology: wgpu::PrimitiveTopology,
    surface_format: wgpu::TextureFormat,
    with_depth: bool,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format.add_srgb_suffix(),
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // Cloth is seen from both sides
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: with_depth.then(|| wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    })
}
