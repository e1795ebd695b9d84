use glam::Vec4;
use wgpu::util::DeviceExt;

use crate::simulation::grid::ClothGrid;

/// Which ping-pong slot holds the authoritative generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Parity {
    #[default]
    A,
    B,
}

impl Parity {
    pub fn flip(self) -> Self {
        match self {
            Parity::A => Parity::B,
            Parity::B => Parity::A,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Parity::A => 0,
            Parity::B => 1,
        }
    }
}

/// Two interchangeable slots of the same quantity, addressed by parity.
#[derive(Debug, Clone)]
pub struct PingPong<T> {
    slots: [T; 2],
}

impl<T> PingPong<T> {
    pub fn new(a: T, b: T) -> Self {
        Self { slots: [a, b] }
    }

    pub fn current(&self, parity: Parity) -> &T {
        &self.slots[parity.index()]
    }

    pub fn current_mut(&mut self, parity: Parity) -> &mut T {
        &mut self.slots[parity.index()]
    }

    pub fn slot(&self, index: usize) -> &T {
        &self.slots[index]
    }

    pub fn slots_mut(&mut self) -> &mut [T; 2] {
        &mut self.slots
    }

    /// Authoritative slot for reading and the other slot for writing.
    pub fn split(&mut self, parity: Parity) -> (&T, &mut T) {
        let (a, b) = self.slots.split_at_mut(1);
        match parity {
            Parity::A => (&a[0], &mut b[0]),
            Parity::B => (&b[0], &mut a[0]),
        }
    }
}

impl<T: Clone> PingPong<T> {
    pub fn splat(value: T) -> Self {
        Self::new(value.clone(), value)
    }
}

/// GPU-resident cloth state: ping-ponged positions and velocities plus the
/// single normal buffer.
pub struct ClothBuffers {
    pub positions: PingPong<wgpu::Buffer>,
    pub velocities: PingPong<wgpu::Buffer>,
    pub normals: wgpu::Buffer,
}

impl ClothBuffers {
    pub fn new(device: &wgpu::Device, grid: &ClothGrid) -> Self {
        // Positions and normals double as vertex buffers for the renderer.
        let position_usage = wgpu::BufferUsages::STORAGE
            | wgpu::BufferUsages::VERTEX
            | wgpu::BufferUsages::COPY_SRC
            | wgpu::BufferUsages::COPY_DST;
        let velocity_usage =
            wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC | wgpu::BufferUsages::COPY_DST;

        let init = |label: &str, contents: &[Vec4], usage| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(contents),
                usage,
            })
        };

        // Both generations start from the snapshot so neither holds garbage.
        let positions = PingPong::new(
            init("Cloth Positions A", &grid.positions, position_usage),
            init("Cloth Positions B", &grid.positions, position_usage),
        );
        let velocities = PingPong::new(
            init("Cloth Velocities A", &grid.velocities, velocity_usage),
            init("Cloth Velocities B", &grid.velocities, velocity_usage),
        );

        let up = vec![Vec4::new(0.0, 1.0, 0.0, 0.0); grid.particle_count()];
        let normals = init("Cloth Normals", &up, position_usage);

        Self {
            positions,
            velocities,
            normals,
        }
    }

    /// Rewrites both generations with the snapshot.
    pub fn upload(&self, queue: &wgpu::Queue, grid: &ClothGrid) {
        for index in 0..2 {
            queue.write_buffer(self.positions.slot(index), 0, bytemuck::cast_slice(&grid.positions));
            queue.write_buffer(self.velocities.slot(index), 0, bytemuck::cast_slice(&grid.velocities));
        }
    }
}

pub fn particle_bytes(count: usize) -> u64 {
    (count * std::mem::size_of::<Vec4>()) as u64
}
