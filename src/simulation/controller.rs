use glam::Vec4;
use wgpu::util::DeviceExt;

use crate::error::{ClothError, Result};
use crate::simulation::config::ClothConfig;
use crate::simulation::grid::ClothGrid;
use crate::simulation::params::{CollisionParams, NormalParams, Sphere, SpringParams, workgroup_count};
use crate::simulation::pipelines::ComputePipelines;
use crate::simulation::readback::read_vec4s;
use crate::simulation::solver::ClothSolver;
use crate::simulation::state::{ClothBuffers, Parity, particle_bytes};

/// Rejects grids whose storage buffers or 1D dispatch would not fit on a
/// device with `limits`. Returns the workgroup count per kernel dispatch.
pub fn check_device_limits(config: &ClothConfig, limits: &wgpu::Limits) -> Result<u32> {
    let bytes = particle_bytes(config.particle_count() as usize);
    let limit = u64::from(limits.max_storage_buffer_binding_size);
    if bytes > limit {
        return Err(ClothError::BufferTooLarge { bytes, limit });
    }

    let workgroups = workgroup_count(config.particle_count());
    let limit = limits.max_compute_workgroups_per_dimension;
    if workgroups > limit {
        return Err(ClothError::TooManyWorkgroups { workgroups, limit });
    }
    Ok(workgroups)
}

fn dispatch(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    pipeline: &wgpu::ComputePipeline,
    bind_group: &wgpu::BindGroup,
    workgroups: u32,
) {
    let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
        label: Some(label),
        timestamp_writes: None,
    });
    compute_pass.set_pipeline(pipeline);
    compute_pass.set_bind_group(0, bind_group, &[]);
    compute_pass.dispatch_workgroups(workgroups, 1, 1);
}

/// GPU cloth controller.
///
/// Owns the ping-pong state and the three compute kernels. One `step`
/// records `substeps` x (springs, collision) as separate compute passes in a
/// single command buffer; each pass flips the parity, and pass boundaries
/// are the barrier that lets the next kernel read a fully written generation.
pub struct ClothSimulation {
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: ClothConfig,
    grid: ClothGrid,
    buffers: ClothBuffers,
    spring_params_buffer: wgpu::Buffer,
    collision_params_buffer: wgpu::Buffer,
    pipelines: ComputePipelines,
    parity: Parity,
    sphere: Sphere,
    workgroups: u32,
}

impl ClothSimulation {
    /// Validates `config`, uploads the initial lattice to both generations
    /// and builds the kernels. Fails without returning a partially built
    /// controller.
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, config: ClothConfig) -> Result<Self> {
        config.validate()?;

        let workgroups = check_device_limits(&config, &device.limits())?;
        let grid = ClothGrid::from_config(&config);

        device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let buffers = ClothBuffers::new(device, &grid);
        let sphere = Sphere::from_config(&config);

        let uniform = |label: &str, contents: &[u8]| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            })
        };
        let spring_params_buffer = uniform(
            "Cloth Spring Params",
            bytemuck::cast_slice(&[SpringParams::from_config(&config)]),
        );
        let collision_params_buffer = uniform(
            "Cloth Collision Params",
            bytemuck::cast_slice(&[CollisionParams::new(&config, &sphere)]),
        );
        let normal_params_buffer = uniform(
            "Cloth Normal Params",
            bytemuck::cast_slice(&[NormalParams::from_config(&config)]),
        );

        let pipelines = ComputePipelines::new(
            device,
            &buffers,
            &spring_params_buffer,
            &collision_params_buffer,
            &normal_params_buffer,
        );

        let validation = pollster::block_on(device.pop_error_scope());
        let out_of_memory = pollster::block_on(device.pop_error_scope());
        if let Some(error) = out_of_memory.or(validation) {
            log::error!("Cloth resource creation failed: {error}");
            return Err(ClothError::Gpu(error.to_string()));
        }

        log::info!(
            "GPU cloth: {}x{} grid, {} particles, {} workgroups, {} substeps",
            config.grid_width,
            config.grid_height,
            grid.particle_count(),
            workgroups,
            config.substeps
        );

        Ok(Self {
            device: device.clone(),
            queue: queue.clone(),
            config,
            grid,
            buffers,
            spring_params_buffer,
            collision_params_buffer,
            pipelines,
            parity: Parity::default(),
            sphere,
            workgroups,
        })
    }

    pub fn grid(&self) -> &ClothGrid {
        &self.grid
    }

    fn write_params(&self) {
        self.queue.write_buffer(
            &self.spring_params_buffer,
            0,
            bytemuck::cast_slice(&[SpringParams::from_config(&self.config)]),
        );
        self.queue.write_buffer(
            &self.collision_params_buffer,
            0,
            bytemuck::cast_slice(&[CollisionParams::new(&self.config, &self.sphere)]),
        );
    }
}

impl ClothSolver for ClothSimulation {
    type Handle = wgpu::Buffer;

    fn name(&self) -> &str {
        "gpu"
    }

    fn config(&self) -> &ClothConfig {
        &self.config
    }

    fn parity(&self) -> Parity {
        self.parity
    }

    fn sphere(&self) -> &Sphere {
        &self.sphere
    }

    fn sphere_mut(&mut self) -> &mut Sphere {
        &mut self.sphere
    }

    fn step(&mut self) {
        self.write_params();

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Cloth Step Encoder"),
        });

        for _ in 0..self.config.substeps {
            dispatch(
                &mut encoder,
                "Cloth Springs Pass",
                &self.pipelines.springs.pipeline,
                self.pipelines.springs.bind_group(self.parity),
                self.workgroups,
            );
            self.parity = self.parity.flip();

            dispatch(
                &mut encoder,
                "Cloth Collision Pass",
                &self.pipelines.collision.pipeline,
                self.pipelines.collision.bind_group(self.parity),
                self.workgroups,
            );
            self.parity = self.parity.flip();
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        log::debug!("Cloth step: {} dispatches", 2 * self.config.substeps);
    }

    fn compute_normals(&mut self) {
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Cloth Normals Encoder"),
        });
        dispatch(
            &mut encoder,
            "Cloth Normals Pass",
            &self.pipelines.normals.pipeline,
            self.pipelines.normals.bind_group(self.parity),
            self.workgroups,
        );
        self.queue.submit(std::iter::once(encoder.finish()));
    }

    fn reset(&mut self) {
        self.buffers.upload(&self.queue, &self.grid);
        self.parity = Parity::default();
        log::info!("GPU cloth reset");
    }

    fn write_state(&mut self, positions: &[Vec4], velocities: &[Vec4]) -> Result<()> {
        let expected = self.grid.particle_count();
        for got in [positions.len(), velocities.len()] {
            if got != expected {
                return Err(ClothError::StateLength { expected, got });
            }
        }
        self.queue.write_buffer(
            self.buffers.positions.current(self.parity),
            0,
            bytemuck::cast_slice(positions),
        );
        self.queue.write_buffer(
            self.buffers.velocities.current(self.parity),
            0,
            bytemuck::cast_slice(velocities),
        );
        Ok(())
    }

    fn current_positions(&self) -> &wgpu::Buffer {
        self.buffers.positions.current(self.parity)
    }

    fn normals(&self) -> &wgpu::Buffer {
        &self.buffers.normals
    }

    fn read_positions(&self) -> Result<Vec<Vec4>> {
        read_vec4s(&self.device, &self.queue, self.current_positions(), self.grid.particle_count())
    }

    fn read_velocities(&self) -> Result<Vec<Vec4>> {
        read_vec4s(
            &self.device,
            &self.queue,
            self.buffers.velocities.current(self.parity),
            self.grid.particle_count(),
        )
    }

    fn read_normals(&self) -> Result<Vec<Vec4>> {
        read_vec4s(&self.device, &self.queue, &self.buffers.normals, self.grid.particle_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(width: u32, height: u32) -> ClothConfig {
        ClothConfig {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    #[test]
    fn default_grid_fits_default_limits() {
        let config = ClothConfig::default();
        let expected = workgroup_count(config.particle_count());
        assert_eq!(check_device_limits(&config, &wgpu::Limits::default()).ok(), Some(expected));
    }

    #[test]
    fn dispatch_beyond_one_dimension_is_rejected() {
        // 2048 * 2048 particles need 65536 workgroups of 64.
        let config = grid(2048, 2048);
        config.validate().expect("config is otherwise valid");
        match check_device_limits(&config, &wgpu::Limits::default()) {
            Err(ClothError::TooManyWorkgroups { workgroups, limit }) => {
                assert_eq!(workgroups, 65536);
                assert_eq!(limit, 65535);
            }
            other => panic!("expected a workgroup limit error, got {other:?}"),
        }

        // One row fewer fits.
        assert_eq!(check_device_limits(&grid(2048, 2047), &wgpu::Limits::default()).ok(), Some(65504));
    }

    #[test]
    fn storage_binding_limit_is_checked_first() {
        let limits = wgpu::Limits {
            max_storage_buffer_binding_size: 1024,
            ..wgpu::Limits::default()
        };
        match check_device_limits(&grid(2048, 2048), &limits) {
            Err(ClothError::BufferTooLarge { bytes, limit }) => {
                assert_eq!(bytes, 2048 * 2048 * 16);
                assert_eq!(limit, 1024);
            }
            other => panic!("expected a buffer size error, got {other:?}"),
        }
    }
}
