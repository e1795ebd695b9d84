use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{ClothError, Result};

/// Tunables for one cloth simulation.
///
/// Every field has a default, so a config document only needs to name the
/// values it overrides. The controller validates the whole struct once at
/// construction and refuses to start on a bad value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClothConfig {
    /// Particles along x.
    pub grid_width: u32,
    /// Particles along z.
    pub grid_height: u32,
    /// Structural spring rest length, also the initial lattice spacing.
    pub rest_length: f32,
    /// Uniform particle mass.
    pub mass: f32,
    /// Vertical acceleration (negative is down).
    pub gravity: f32,
    pub k_structural: f32,
    pub k_shear: f32,
    pub k_bend: f32,
    /// Velocity multiplier applied after every spring integration.
    pub damping: f32,
    /// Frame interval, split evenly across `substeps`.
    pub dt: f32,
    pub substeps: u32,

    /// Initial sphere centre. The live centre is mutable on the controller.
    pub sphere_center: Vec3,
    /// Zero disables the sphere collider.
    pub sphere_radius: f32,
    /// Fraction of tangential velocity removed on sphere contact.
    pub friction: f32,
    /// Skin added to the sphere radius.
    pub collision_epsilon: f32,
    /// Restitution for sphere and floor contacts.
    pub bounce: f32,
    /// Floor plane height. Negative infinity disables it.
    pub floor_y: f32,

    /// Cloth centre on the xz-plane.
    pub cloth_center: [f32; 2],
    /// Initial height of the cloth above the top of the sphere.
    pub cloth_height: f32,
}

impl Default for ClothConfig {
    fn default() -> Self {
        Self {
            grid_width: 16,
            grid_height: 16,
            rest_length: 0.10,
            mass: 0.5,
            gravity: -9.81,
            k_structural: 60.0,
            k_shear: 100.0,
            k_bend: 400.0,
            damping: 0.995,
            dt: 1.0 / 240.0,
            substeps: 20,
            sphere_center: Vec3::new(0.35, 1.0, 0.0),
            sphere_radius: 0.8,
            friction: 0.8,
            collision_epsilon: 0.01,
            bounce: 0.0,
            floor_y: -2.0,
            cloth_center: [0.35, 0.0],
            cloth_height: 0.5,
        }
    }
}

impl ClothConfig {
    /// Parses a JSON config document. Missing fields keep their defaults.
    pub fn from_json_str(source: &str) -> Result<Self> {
        let config: ClothConfig = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_json_str(&source)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn particle_count(&self) -> u32 {
        self.grid_width * self.grid_height
    }

    /// Integration step used by each kernel inside one sub-step.
    pub fn sub_dt(&self) -> f32 {
        self.dt / self.substeps as f32
    }

    /// Height of the initial flat lattice.
    pub fn cloth_y(&self) -> f32 {
        self.sphere_center.y + self.sphere_radius.max(0.0) + self.cloth_height
    }

    pub fn validate(&self) -> Result<()> {
        if self.grid_width < 2 {
            return Err(ClothError::invalid("grid_width", format!("must be at least 2, got {}", self.grid_width)));
        }
        if self.grid_height < 2 {
            return Err(ClothError::invalid("grid_height", format!("must be at least 2, got {}", self.grid_height)));
        }
        if self.grid_width.checked_mul(self.grid_height).is_none() {
            return Err(ClothError::invalid("grid_width", "grid_width * grid_height overflows u32"));
        }
        if !(self.rest_length.is_finite() && self.rest_length > 0.0) {
            return Err(ClothError::invalid("rest_length", format!("must be finite and positive, got {}", self.rest_length)));
        }
        if !(self.mass.is_finite() && self.mass > 0.0) {
            return Err(ClothError::invalid("mass", format!("must be finite and positive, got {}", self.mass)));
        }
        if !self.gravity.is_finite() {
            return Err(ClothError::invalid("gravity", "must be finite"));
        }
        for (field, k) in [
            ("k_structural", self.k_structural),
            ("k_shear", self.k_shear),
            ("k_bend", self.k_bend),
        ] {
            if !(k.is_finite() && k >= 0.0) {
                return Err(ClothError::invalid(field, format!("must be finite and non-negative, got {k}")));
            }
        }
        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return Err(ClothError::invalid("damping", format!("must be in (0, 1], got {}", self.damping)));
        }
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(ClothError::invalid("dt", format!("must be finite and positive, got {}", self.dt)));
        }
        if self.substeps == 0 {
            return Err(ClothError::invalid("substeps", "must be at least 1"));
        }
        if !self.sphere_center.is_finite() {
            return Err(ClothError::invalid("sphere_center", "must be finite"));
        }
        if !(self.sphere_radius.is_finite() && self.sphere_radius >= 0.0) {
            return Err(ClothError::invalid("sphere_radius", format!("must be finite and non-negative, got {}", self.sphere_radius)));
        }
        if !(0.0..=1.0).contains(&self.friction) {
            return Err(ClothError::invalid("friction", format!("must be in [0, 1], got {}", self.friction)));
        }
        if !(self.collision_epsilon.is_finite() && self.collision_epsilon >= 0.0) {
            return Err(ClothError::invalid("collision_epsilon", format!("must be finite and non-negative, got {}", self.collision_epsilon)));
        }
        if !(self.bounce.is_finite() && self.bounce >= 0.0) {
            return Err(ClothError::invalid("bounce", format!("must be finite and non-negative, got {}", self.bounce)));
        }
        if self.floor_y.is_nan() || self.floor_y == f32::INFINITY {
            return Err(ClothError::invalid("floor_y", "must be a number below +inf"));
        }
        if !(self.cloth_center[0].is_finite() && self.cloth_center[1].is_finite() && self.cloth_height.is_finite()) {
            return Err(ClothError::invalid("cloth_center", "placement must be finite"));
        }
        Ok(())
    }
}
