use glam::Vec4;

use crate::simulation::config::ClothConfig;
use crate::simulation::kernels::{SpringFamily, neighbor};

/// Initial particle lattice plus the index lists the renderer draws it with.
///
/// Particle `i = y * width + x` sits at `(x, z) = (x, y) * rest` on a flat
/// sheet centred on `center`, at height `y0`. Velocities start at zero and
/// the w lane is left at 1.0 for positions and 0.0 for velocities; nothing
/// reads it.
#[derive(Debug, Clone)]
pub struct ClothGrid {
    pub width: u32,
    pub height: u32,
    pub positions: Vec<Vec4>,
    pub velocities: Vec<Vec4>,
    pub line_indices: Vec<u32>,
    pub triangle_indices: Vec<u32>,
}

impl ClothGrid {
    pub fn new(width: u32, height: u32, rest: f32, y0: f32, center: [f32; 2]) -> Self {
        let count = (width * height) as usize;
        let mut positions = Vec::with_capacity(count);

        let ox = -0.5 * (width - 1) as f32 * rest;
        let oz = -0.5 * (height - 1) as f32 * rest;

        for y in 0..height {
            for x in 0..width {
                positions.push(Vec4::new(
                    ox + x as f32 * rest + center[0],
                    y0,
                    oz + y as f32 * rest + center[1],
                    1.0,
                ));
            }
        }

        Self {
            width,
            height,
            positions,
            velocities: vec![Vec4::ZERO; count],
            line_indices: line_indices(width, height, true),
            triangle_indices: triangle_indices(width, height),
        }
    }

    pub fn from_config(config: &ClothConfig) -> Self {
        Self::new(
            config.grid_width,
            config.grid_height,
            config.rest_length,
            config.cloth_y(),
            config.cloth_center,
        )
    }

    pub fn particle_count(&self) -> usize {
        self.positions.len()
    }
}

/// Wireframe topology: horizontal and vertical edges, plus one diagonal per
/// quad when `diagonals` is set.
pub fn line_indices(width: u32, height: u32, diagonals: bool) -> Vec<u32> {
    let idx = |x: u32, y: u32| y * width + x;
    let mut lines = Vec::new();

    for y in 0..height {
        for x in 0..width - 1 {
            lines.extend_from_slice(&[idx(x, y), idx(x + 1, y)]);
        }
    }
    for y in 0..height - 1 {
        for x in 0..width {
            lines.extend_from_slice(&[idx(x, y), idx(x, y + 1)]);
        }
    }
    if diagonals {
        for y in 0..height - 1 {
            for x in 0..width - 1 {
                lines.extend_from_slice(&[idx(x, y), idx(x + 1, y + 1)]);
            }
        }
    }

    lines
}

/// Two counter-clockwise triangles per grid quad.
pub fn triangle_indices(width: u32, height: u32) -> Vec<u32> {
    let idx = |x: u32, y: u32| y * width + x;
    let mut triangles = Vec::with_capacity(((width - 1) * (height - 1) * 6) as usize);

    for y in 0..height - 1 {
        for x in 0..width - 1 {
            let i00 = idx(x, y);
            let i10 = idx(x + 1, y);
            let i01 = idx(x, y + 1);
            let i11 = idx(x + 1, y + 1);
            triangles.extend_from_slice(&[i00, i10, i01, i10, i11, i01]);
        }
    }

    triangles
}

/// Undirected spring counts per family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpringCounts {
    pub structural: u32,
    pub shear: u32,
    pub bend: u32,
}

impl SpringCounts {
    pub fn total(&self) -> u32 {
        self.structural + self.shear + self.bend
    }
}

/// Counts springs by walking every particle's neighbour tables, the same way
/// the spring kernel does. Each spring is seen from both ends.
pub fn count_springs(width: u32, height: u32) -> SpringCounts {
    let mut ends = [0u32; 3];

    for y in 0..height as i32 {
        for x in 0..width as i32 {
            for (slot, family) in SpringFamily::ALL.iter().enumerate() {
                ends[slot] += family
                    .offsets()
                    .iter()
                    .filter(|&&offset| neighbor(x, y, offset, width, height).is_some())
                    .count() as u32;
            }
        }
    }

    SpringCounts {
        structural: ends[0] / 2,
        shear: ends[1] / 2,
        bend: ends[2] / 2,
    }
}

/// Closed-form spring counts for a `width x height` sheet.
pub fn expected_springs(width: u32, height: u32) -> SpringCounts {
    let (w, h) = (width, height);
    SpringCounts {
        structural: (w - 1) * h + w * (h - 1),
        shear: 2 * (w - 1) * (h - 1),
        bend: w.saturating_sub(2) * h + w * h.saturating_sub(2),
    }
}
