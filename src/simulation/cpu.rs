use glam::Vec4;
use rayon::prelude::*;

use crate::error::{ClothError, Result};
use crate::simulation::config::ClothConfig;
use crate::simulation::grid::ClothGrid;
use crate::simulation::kernels::{collide, grid_normal, spring_step};
use crate::simulation::params::{CollisionParams, Sphere, SpringParams};
use crate::simulation::solver::ClothSolver;
use crate::simulation::state::{Parity, PingPong};

/// Host-side reference solver.
///
/// Runs the same per-particle kernels as the GPU controller, one rayon task
/// per particle, against the same ping-pong arena. Each task writes only its
/// own output slot, so results do not depend on scheduling.
pub struct CpuCloth {
    config: ClothConfig,
    grid: ClothGrid,
    positions: PingPong<Vec<Vec4>>,
    velocities: PingPong<Vec<Vec4>>,
    normals: Vec<Vec4>,
    parity: Parity,
    sphere: Sphere,
}

impl CpuCloth {
    pub fn new(config: ClothConfig) -> Result<Self> {
        config.validate()?;
        let grid = ClothGrid::from_config(&config);
        log::info!(
            "CPU cloth: {}x{} grid, {} particles, {} substeps",
            config.grid_width,
            config.grid_height,
            grid.particle_count(),
            config.substeps
        );

        Ok(Self {
            positions: PingPong::splat(grid.positions.clone()),
            velocities: PingPong::splat(grid.velocities.clone()),
            normals: vec![Vec4::new(0.0, 1.0, 0.0, 0.0); grid.particle_count()],
            parity: Parity::default(),
            sphere: Sphere::from_config(&config),
            config,
            grid,
        })
    }

    fn spring_pass(&mut self, params: &SpringParams) {
        let (pos_in, pos_out) = self.positions.split(self.parity);
        let (vel_in, vel_out) = self.velocities.split(self.parity);

        pos_out
            .par_iter_mut()
            .zip(vel_out.par_iter_mut())
            .enumerate()
            .for_each(|(i, (p, v))| {
                (*p, *v) = spring_step(i, pos_in, vel_in, params);
            });

        self.parity = self.parity.flip();
    }

    fn collision_pass(&mut self, params: &CollisionParams) {
        let (pos_in, pos_out) = self.positions.split(self.parity);
        let (vel_in, vel_out) = self.velocities.split(self.parity);

        pos_out
            .par_iter_mut()
            .zip(vel_out.par_iter_mut())
            .enumerate()
            .for_each(|(i, (p, v))| {
                (*p, *v) = collide(pos_in[i], vel_in[i], params);
            });

        self.parity = self.parity.flip();
    }
}

impl ClothSolver for CpuCloth {
    type Handle = [Vec4];

    fn name(&self) -> &str {
        "cpu"
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
        let springs = SpringParams::from_config(&self.config);
        let collision = CollisionParams::new(&self.config, &self.sphere);

        for _ in 0..self.config.substeps {
            self.spring_pass(&springs);
            self.collision_pass(&collision);
        }
    }

    fn compute_normals(&mut self) {
        let positions = self.positions.current(self.parity);
        let (width, height) = (self.config.grid_width, self.config.grid_height);

        self.normals
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, n)| *n = grid_normal(i, positions, width, height));
    }

    fn reset(&mut self) {
        for slot in self.positions.slots_mut() {
            slot.copy_from_slice(&self.grid.positions);
        }
        for slot in self.velocities.slots_mut() {
            slot.copy_from_slice(&self.grid.velocities);
        }
        self.parity = Parity::default();
        log::info!("CPU cloth reset");
    }

    fn write_state(&mut self, positions: &[Vec4], velocities: &[Vec4]) -> Result<()> {
        let expected = self.grid.particle_count();
        for got in [positions.len(), velocities.len()] {
            if got != expected {
                return Err(ClothError::StateLength { expected, got });
            }
        }
        self.positions.current_mut(self.parity).copy_from_slice(positions);
        self.velocities.current_mut(self.parity).copy_from_slice(velocities);
        Ok(())
    }

    fn current_positions(&self) -> &[Vec4] {
        self.positions.current(self.parity)
    }

    fn normals(&self) -> &[Vec4] {
        &self.normals
    }

    fn read_positions(&self) -> Result<Vec<Vec4>> {
        Ok(self.positions.current(self.parity).clone())
    }

    fn read_velocities(&self) -> Result<Vec<Vec4>> {
        Ok(self.velocities.current(self.parity).clone())
    }

    fn read_normals(&self) -> Result<Vec<Vec4>> {
        Ok(self.normals.clone())
    }
}
