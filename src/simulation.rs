pub mod config;
pub mod controller;
pub mod cpu;
pub mod grid;
pub mod kernels;
pub mod params;
pub mod pipelines;
pub mod readback;
pub mod scenes;
pub mod solver;
pub mod state;

pub use config::ClothConfig;
pub use controller::ClothSimulation;
pub use cpu::CpuCloth;
pub use grid::{ClothGrid, SpringCounts};
pub use params::Sphere;
pub use solver::ClothSolver;
pub use state::{Parity, PingPong};
