use crate::simulation::state::{ClothBuffers, Parity};

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn compute_pipeline(
    device: &wgpu::Device,
    label: &str,
    source: &str,
    layout: &wgpu::BindGroupLayout,
) -> wgpu::ComputePipeline {
    let shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[layout],
        push_constant_ranges: &[],
    });

    device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some(label),
        layout: Some(&pipeline_layout),
        module: &shader_module,
        entry_point: Some("main"),
        compilation_options: Default::default(),
        cache: None,
    })
}

/// A ping-pong compute stage: reads `(pos, vel)` from one slot and writes
/// the other. Bind group `n` reads slot `n`.
pub struct PingPongKernel {
    pub pipeline: wgpu::ComputePipeline,
    pub bind_groups: [wgpu::BindGroup; 2],
}

impl PingPongKernel {
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        source: &str,
        buffers: &ClothBuffers,
        params_buffer: &wgpu::Buffer,
    ) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(label),
            entries: &[
                // pos_in
                storage_entry(0, true),
                // vel_in
                storage_entry(1, true),
                // pos_out
                storage_entry(2, false),
                // vel_out
                storage_entry(3, false),
                // params
                uniform_entry(4),
            ],
        });

        let bind_group = |read: usize, write: usize| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffers.positions.slot(read).as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: buffers.velocities.slot(read).as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: buffers.positions.slot(write).as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: buffers.velocities.slot(write).as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 4,
                        resource: params_buffer.as_entire_binding(),
                    },
                ],
            })
        };
        let bind_groups = [bind_group(0, 1), bind_group(1, 0)];

        Self {
            pipeline: compute_pipeline(device, label, source, &bind_group_layout),
            bind_groups,
        }
    }

    pub fn bind_group(&self, parity: Parity) -> &wgpu::BindGroup {
        &self.bind_groups[parity.index()]
    }
}

/// Normal stage: reads either position slot, always writes the one normal
/// buffer.
pub struct NormalKernel {
    pub pipeline: wgpu::ComputePipeline,
    pub bind_groups: [wgpu::BindGroup; 2],
}

impl NormalKernel {
    pub fn new(device: &wgpu::Device, buffers: &ClothBuffers, params_buffer: &wgpu::Buffer) -> Self {
        let label = "Cloth Normals Kernel";
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(label),
            entries: &[storage_entry(0, true), storage_entry(1, false), uniform_entry(2)],
        });

        let bind_group = |read: usize| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffers.positions.slot(read).as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: buffers.normals.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: params_buffer.as_entire_binding(),
                    },
                ],
            })
        };
        let bind_groups = [bind_group(0), bind_group(1)];

        Self {
            pipeline: compute_pipeline(device, label, include_str!("../shaders/normals.wgsl"), &bind_group_layout),
            bind_groups,
        }
    }

    pub fn bind_group(&self, parity: Parity) -> &wgpu::BindGroup {
        &self.bind_groups[parity.index()]
    }
}

/// Everything the controller dispatches.
pub struct ComputePipelines {
    pub springs: PingPongKernel,
    pub collision: PingPongKernel,
    pub normals: NormalKernel,
}

impl ComputePipelines {
    pub fn new(
        device: &wgpu::Device,
        buffers: &ClothBuffers,
        spring_params: &wgpu::Buffer,
        collision_params: &wgpu::Buffer,
        normal_params: &wgpu::Buffer,
    ) -> Self {
        Self {
            springs: PingPongKernel::new(
                device,
                "Cloth Springs Kernel",
                include_str!("../shaders/springs.wgsl"),
                buffers,
                spring_params,
            ),
            collision: PingPongKernel::new(
                device,
                "Cloth Collision Kernel",
                include_str!("../shaders/collision.wgsl"),
                buffers,
                collision_params,
            ),
            normals: NormalKernel::new(device, buffers, normal_params),
        }
    }
}
