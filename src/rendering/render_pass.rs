use wgpu::util::DeviceExt;

use crate::rendering::render_config::{DrawUniform, RenderConfig, StageKind};

pub(crate) const BACKGROUND: wgpu::Color = wgpu::Color {
    r: 0.02,
    g: 0.02,
    b: 0.05,
    a: 1.0,
};

/// Depth attachment for a pass. `Skip` draws without depth testing.
#[derive(Clone, Copy)]
pub(crate) enum DepthTarget<'a> {
    Attach(&'a wgpu::TextureView),
    Skip,
}

impl DepthTarget<'_> {
    pub(crate) fn is_attached(&self) -> bool {
        matches!(self, DepthTarget::Attach(_))
    }
}

/// Where a stage draws. `clear` resets colour and depth before drawing.
#[derive(Clone, Copy)]
pub(crate) struct FrameTarget<'a> {
    pub(crate) color: &'a wgpu::TextureView,
    pub(crate) depth: DepthTarget<'a>,
    pub(crate) clear: bool,
}

/// Vertex and index buffers for one draw. `normals` is ignored by wire stages.
pub(crate) struct Geometry<'a> {
    pub(crate) positions: &'a wgpu::Buffer,
    pub(crate) normals: &'a wgpu::Buffer,
    pub(crate) indices: &'a wgpu::Buffer,
    pub(crate) index_count: u32,
}

/// Opens a render pass on `target`.
pub(crate) fn begin_pass<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    label: &str,
    target: FrameTarget<'_>,
) -> wgpu::RenderPass<'e> {
    let color_load = if target.clear {
        wgpu::LoadOp::Clear(BACKGROUND)
    } else {
        wgpu::LoadOp::Load
    };
    let depth_load = if target.clear {
        wgpu::LoadOp::Clear(1.0)
    } else {
        wgpu::LoadOp::Load
    };

    let depth_stencil_attachment = match target.depth {
        DepthTarget::Attach(view) => Some(wgpu::RenderPassDepthStencilAttachment {
            view,
            depth_ops: Some(wgpu::Operations {
                load: depth_load,
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        DepthTarget::Skip => None,
    };

    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target.color,
            resolve_target: None,
            ops: wgpu::Operations {
                load: color_load,
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment,
        occlusion_query_set: None,
        timestamp_writes: None,
    })
}

/// One toggleable layer of the frame: a pipeline kind plus its own
/// placement/colour uniform.
pub(crate) struct DrawStage {
    pub(crate) label: &'static str,
    pub(crate) kind: StageKind,
    pub(crate) enabled: bool,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl DrawStage {
    pub(crate) fn new(
        device: &wgpu::Device,
        config: &RenderConfig,
        label: &'static str,
        kind: StageKind,
        uniform: DrawUniform,
    ) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = config.uniform_bind_group(device, label, &config.draw_layout, &uniform_buffer);

        Self {
            label,
            kind,
            enabled: true,
            uniform_buffer,
            bind_group,
        }
    }

    pub(crate) fn update(&self, queue: &wgpu::Queue, uniform: DrawUniform) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniform]));
    }

    /// Records this stage into its own pass.
    pub(crate) fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        config: &RenderConfig,
        camera_bind_group: &wgpu::BindGroup,
        target: FrameTarget<'_>,
        geometry: &Geometry<'_>,
    ) {
        let mut render_pass = begin_pass(encoder, self.label, target);
        render_pass.set_pipeline(config.pipeline(self.kind, target.depth.is_attached()));
        render_pass.set_bind_group(0, camera_bind_group, &[]);
        render_pass.set_bind_group(1, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, geometry.positions.slice(..));
        if self.kind == StageKind::Surface {
            render_pass.set_vertex_buffer(1, geometry.normals.slice(..));
        }
        render_pass.set_index_buffer(geometry.indices.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..geometry.index_count, 0, 0..1);
    }
}
