//! Mass-spring cloth on the GPU.
//!
//! A `W x H` particle sheet under gravity, structural/shear/bend springs and
//! collision with one sphere and a floor plane. Every update runs as a wgpu
//! compute pass over ping-ponged storage buffers; [`CpuCloth`] runs the same
//! kernels on the host.

pub mod error;
pub mod gpu;
pub mod simulation;

pub use error::{ClothError, Result};
pub use gpu::GpuContext;
pub use simulation::{ClothConfig, ClothSimulation, ClothSolver, CpuCloth, Parity, Sphere};
