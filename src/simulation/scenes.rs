use glam::Vec3;

use crate::simulation::config::ClothConfig;

/// A named starting setup the viewer can switch between.
pub trait Scene {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn config(&self) -> ClothConfig;
}

/// Default 16x16 sheet falling onto the sphere.
pub struct DrapedSphere;

impl Scene for DrapedSphere {
    fn name(&self) -> &str {
        "Draped sphere"
    }

    fn description(&self) -> &str {
        "16x16 cloth dropped half a unit above a sphere, stiff bend springs"
    }

    fn config(&self) -> ClothConfig {
        ClothConfig::default()
    }
}

/// Larger, lighter sheet starting just above the sphere.
pub struct WideDrape;

impl Scene for WideDrape {
    fn name(&self) -> &str {
        "Wide drape"
    }

    fn description(&self) -> &str {
        "25x25 light cloth with softer shear and bend springs, resting on a floor at y = 0"
    }

    fn config(&self) -> ClothConfig {
        ClothConfig {
            grid_width: 25,
            grid_height: 25,
            mass: 0.1,
            k_structural: 60.0,
            k_shear: 80.0,
            k_bend: 300.0,
            substeps: 8,
            friction: 0.6,
            collision_epsilon: 0.004,
            floor_y: 0.0,
            cloth_height: 0.10,
            ..Default::default()
        }
    }
}

/// No sphere: the cloth falls flat onto the floor.
pub struct FloorDrop;

impl Scene for FloorDrop {
    fn name(&self) -> &str {
        "Floor drop"
    }

    fn description(&self) -> &str {
        "Sphere disabled, the sheet free-falls and settles on the floor"
    }

    fn config(&self) -> ClothConfig {
        ClothConfig {
            sphere_radius: 0.0,
            sphere_center: Vec3::new(0.35, 0.0, 0.0),
            cloth_height: 1.5,
            floor_y: -1.0,
            ..Default::default()
        }
    }
}

/// Scenes in the order the viewer cycles through them.
pub fn all_scenes() -> Vec<Box<dyn Scene>> {
    vec![Box::new(DrapedSphere), Box::new(WideDrape), Box::new(FloorDrop)]
}
