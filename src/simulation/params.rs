use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::simulation::config::ClothConfig;

/// Threads per compute workgroup; must match `@workgroup_size` in the WGSL.
pub const WORKGROUP_SIZE: u32 = 64;

/// Live sphere collider. Physics and the sphere draw both read this.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub fn from_config(config: &ClothConfig) -> Self {
        Self {
            center: config.sphere_center,
            radius: config.sphere_radius,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.radius > 0.0
    }
}

// Spring pass uniform (48 bytes)
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct SpringParams {
    pub dt: f32,
    pub gravity: f32,
    pub rest: f32,
    pub mass: f32,
    pub k_structural: f32,
    pub k_shear: f32,
    pub k_bend: f32,
    pub damping: f32,
    pub width: u32,
    pub height: u32,
    pub count: u32,
    pub _padding: u32,
}

impl SpringParams {
    pub fn from_config(config: &ClothConfig) -> Self {
        Self {
            dt: config.sub_dt(),
            gravity: config.gravity,
            rest: config.rest_length,
            mass: config.mass,
            k_structural: config.k_structural,
            k_shear: config.k_shear,
            k_bend: config.k_bend,
            damping: config.damping,
            width: config.grid_width,
            height: config.grid_height,
            count: config.particle_count(),
            _padding: 0,
        }
    }
}

// Collision pass uniform (48 bytes)
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct CollisionParams {
    pub center: [f32; 3],
    pub radius: f32,
    pub bounce: f32,
    pub friction: f32,
    pub epsilon: f32,
    pub floor_y: f32,
    pub count: u32,
    pub _padding: [u32; 3],
}

impl CollisionParams {
    pub fn new(config: &ClothConfig, sphere: &Sphere) -> Self {
        Self {
            center: sphere.center.to_array(),
            radius: sphere.radius,
            bounce: config.bounce,
            friction: config.friction,
            epsilon: config.collision_epsilon,
            floor_y: config.floor_y,
            count: config.particle_count(),
            _padding: [0; 3],
        }
    }
}

// Normal pass uniform (16 bytes)
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct NormalParams {
    pub width: u32,
    pub height: u32,
    pub count: u32,
    pub _padding: u32,
}

impl NormalParams {
    pub fn from_config(config: &ClothConfig) -> Self {
        Self {
            width: config.grid_width,
            height: config.grid_height,
            count: config.particle_count(),
            _padding: 0,
        }
    }
}

pub fn workgroup_count(particles: u32) -> u32 {
    particles.div_ceil(WORKGROUP_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_sizes_match_wgsl_layout() {
        assert_eq!(std::mem::size_of::<SpringParams>(), 48);
        assert_eq!(std::mem::size_of::<CollisionParams>(), 48);
        assert_eq!(std::mem::size_of::<NormalParams>(), 16);
    }

    #[test]
    fn workgroups_cover_all_particles() {
        assert_eq!(workgroup_count(1), 1);
        assert_eq!(workgroup_count(64), 1);
        assert_eq!(workgroup_count(65), 2);
        assert_eq!(workgroup_count(16 * 16), 4);
    }
}
