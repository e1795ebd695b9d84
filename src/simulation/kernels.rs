//! Host-side copies of the per-particle compute kernels.
//!
//! Each function here mirrors one entry point in `src/shaders/` operation for
//! operation, so the CPU solver and the GPU controller step the same model.
//! Grid topology is never stored: neighbours come from index arithmetic on
//! `(x, y, width, height)`.

use glam::{Vec3, Vec4, Vec4Swizzles};

use crate::simulation::params::{CollisionParams, SpringParams};

/// Below this length a vector is treated as degenerate.
pub const DEGENERATE_LENGTH: f32 = 1e-6;

const STRUCTURAL_OFFSETS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const SHEAR_OFFSETS: [(i32, i32); 4] = [(-1, -1), (1, -1), (-1, 1), (1, 1)];
const BEND_OFFSETS: [(i32, i32); 4] = [(-2, 0), (2, 0), (0, -2), (0, 2)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpringFamily {
    Structural,
    Shear,
    Bend,
}

impl SpringFamily {
    pub const ALL: [SpringFamily; 3] = [SpringFamily::Structural, SpringFamily::Shear, SpringFamily::Bend];

    pub fn offsets(self) -> &'static [(i32, i32); 4] {
        match self {
            SpringFamily::Structural => &STRUCTURAL_OFFSETS,
            SpringFamily::Shear => &SHEAR_OFFSETS,
            SpringFamily::Bend => &BEND_OFFSETS,
        }
    }

    pub fn rest_length(self, rest: f32) -> f32 {
        match self {
            SpringFamily::Structural => rest,
            SpringFamily::Shear => rest * std::f32::consts::SQRT_2,
            SpringFamily::Bend => 2.0 * rest,
        }
    }

    pub fn stiffness(self, params: &SpringParams) -> f32 {
        match self {
            SpringFamily::Structural => params.k_structural,
            SpringFamily::Shear => params.k_shear,
            SpringFamily::Bend => params.k_bend,
        }
    }
}

/// Linear index of the neighbour at `offset`, or `None` past the free edge.
pub fn neighbor(x: i32, y: i32, offset: (i32, i32), width: u32, height: u32) -> Option<usize> {
    let nx = x + offset.0;
    let ny = y + offset.1;
    if nx < 0 || ny < 0 || nx >= width as i32 || ny >= height as i32 {
        return None;
    }
    Some(ny as usize * width as usize + nx as usize)
}

/// Hookean pull on `p` from a neighbour at `q` with rest length `rest`.
///
/// Coincident particles give zero force instead of a NaN direction.
pub fn spring_force(p: Vec3, q: Vec3, rest: f32, k: f32) -> Vec3 {
    let d = q - p;
    let len = d.length();
    if len < DEGENERATE_LENGTH {
        return Vec3::ZERO;
    }
    d * (k * (len - rest) / len)
}

/// Spring pass for particle `i`: gravity plus all three spring families,
/// then semi-implicit Euler. Returns the new `(position, velocity)`.
pub fn spring_step(i: usize, positions: &[Vec4], velocities: &[Vec4], params: &SpringParams) -> (Vec4, Vec4) {
    let x = (i as u32 % params.width) as i32;
    let y = (i as u32 / params.width) as i32;
    let p = positions[i].xyz();
    let v = velocities[i].xyz();

    let mut force = Vec3::new(0.0, params.gravity, 0.0) * params.mass;
    for family in SpringFamily::ALL {
        let rest = family.rest_length(params.rest);
        let k = family.stiffness(params);
        for &offset in family.offsets() {
            if let Some(j) = neighbor(x, y, offset, params.width, params.height) {
                force += spring_force(p, positions[j].xyz(), rest, k);
            }
        }
    }

    let accel = force / params.mass;
    let v_new = (v + accel * params.dt) * params.damping;
    let p_new = p + v_new * params.dt;

    (p_new.extend(positions[i].w), v_new.extend(velocities[i].w))
}

/// Collision pass for one particle: sphere first, then the floor.
pub fn collide(position: Vec4, velocity: Vec4, params: &CollisionParams) -> (Vec4, Vec4) {
    let mut p = position.xyz();
    let mut v = velocity.xyz();

    if params.radius > 0.0 {
        let center = Vec3::from_array(params.center);
        let surface = params.radius + params.epsilon;
        let d = p - center;
        let dist = d.length();
        if dist < surface {
            let n = if dist > DEGENERATE_LENGTH { d / dist } else { Vec3::Y };
            p = center + n * surface;

            let vn = v.dot(n);
            let v_normal = n * vn;
            let v_tangent = v - v_normal;
            let v_normal = if vn < 0.0 { v_normal * -params.bounce } else { v_normal };
            v = v_normal + v_tangent * (1.0 - params.friction);
        }
    }

    if p.y < params.floor_y {
        p.y = params.floor_y;
        if v.y < 0.0 {
            v.y *= -params.bounce;
        }
    }

    (p.extend(position.w), v.extend(velocity.w))
}

/// Smoothed surface normal at particle `i` from neighbour differences.
///
/// Interior particles use central differences; edges fall back to the
/// one-sided difference that exists.
pub fn grid_normal(i: usize, positions: &[Vec4], width: u32, height: u32) -> Vec4 {
    let x = i as u32 % width;
    let y = i as u32 / width;
    let at = |x: u32, y: u32| positions[(y * width + x) as usize].xyz();

    let x0 = x.saturating_sub(1);
    let x1 = (x + 1).min(width - 1);
    let y0 = y.saturating_sub(1);
    let y1 = (y + 1).min(height - 1);

    let tangent_x = at(x1, y) - at(x0, y);
    let tangent_y = at(x, y1) - at(x, y0);
    let n = tangent_y.cross(tangent_x);
    let len = n.length();
    if len < DEGENERATE_LENGTH {
        return Vec4::new(0.0, 1.0, 0.0, 0.0);
    }
    (n / len).extend(0.0)
}
