use glam::Vec4;

use crate::error::Result;
use crate::simulation::config::ClothConfig;
use crate::simulation::params::Sphere;
use crate::simulation::state::Parity;

/// The interface the frame loop drives, shared by the GPU controller and
/// the CPU reference solver.
pub trait ClothSolver {
    /// What `current_positions` and `normals` hand out: a GPU buffer or a
    /// host slice.
    type Handle: ?Sized;

    /// Short backend name for logs
    fn name(&self) -> &str;

    fn config(&self) -> &ClothConfig;

    /// Slot holding the authoritative generation.
    fn parity(&self) -> Parity;

    fn sphere(&self) -> &Sphere;

    /// The collider is read at the start of every `step`.
    fn sphere_mut(&mut self) -> &mut Sphere;

    /// Advance one frame: `substeps` x (spring pass, collision pass).
    fn step(&mut self);

    /// Refresh normals from the authoritative positions.
    fn compute_normals(&mut self);

    /// Rewrite both generations with the initial snapshot and restore the
    /// initial parity.
    fn reset(&mut self);

    /// Authoritative positions. Do not hold across `step`: the slot changes
    /// with every dispatch.
    fn current_positions(&self) -> &Self::Handle;

    fn normals(&self) -> &Self::Handle;

    /// Overwrite the authoritative generation. Both slices must hold one
    /// entry per particle.
    fn write_state(&mut self, positions: &[Vec4], velocities: &[Vec4]) -> Result<()>;

    fn read_positions(&self) -> Result<Vec<Vec4>>;

    fn read_velocities(&self) -> Result<Vec<Vec4>>;

    fn read_normals(&self) -> Result<Vec<Vec4>>;
}
