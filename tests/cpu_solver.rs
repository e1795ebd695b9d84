//! Reference solver behaviour. Runs everywhere, no GPU required.
//!
//! Run with: cargo test --test cpu_solver -- --nocapture

mod common;

use gpu_cloth::simulation::grid::{ClothGrid, count_springs, expected_springs, line_indices};
use gpu_cloth::simulation::scenes::all_scenes;
use gpu_cloth::{ClothConfig, ClothError, ClothSolver, CpuCloth};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn cpu(config: ClothConfig) -> CpuCloth {
    CpuCloth::new(config).expect("valid config")
}

#[test]
fn reset_restores_initial_state() {
    common::reset_restores_initial_state(cpu);
}

#[test]
fn free_fall_center_of_mass_descends() {
    common::free_fall_center_of_mass_descends(cpu);
}

#[test]
fn gravity_only_single_step() {
    common::gravity_only_single_step(cpu);
}

#[test]
fn sphere_containment() {
    common::sphere_containment(cpu);
}

#[test]
fn floor_containment() {
    common::floor_containment(cpu);
}

#[test]
fn corner_particle_pushed_to_surface() {
    common::corner_particle_pushed_to_surface(cpu);
}

#[test]
fn runs_are_deterministic() {
    common::runs_are_deterministic(cpu);
}

#[test]
fn normals_follow_positions() {
    common::normals_follow_positions(cpu);
}

#[test]
fn coincident_neighbours_stay_finite() {
    common::coincident_neighbours_stay_finite(cpu);
}

#[test]
fn short_state_upload_is_rejected() {
    common::short_state_upload_is_rejected(cpu);
}

#[test]
fn invalid_config_is_rejected_before_allocation() {
    let config = ClothConfig {
        grid_width: 1,
        ..Default::default()
    };
    match CpuCloth::new(config) {
        Err(ClothError::InvalidConfig { field, .. }) => assert_eq!(field, "grid_width"),
        Err(e) => panic!("unexpected error: {e}"),
        Ok(_) => panic!("1-wide grid accepted"),
    }
}

#[test]
fn spring_counts_match_closed_form_for_random_grids() {
    let mut rng = StdRng::seed_from_u64(0x00c1_0755);
    for _ in 0..64 {
        let width = rng.gen_range(2..40);
        let height = rng.gen_range(2..40);

        let counted = count_springs(width, height);
        assert_eq!(counted, expected_springs(width, height), "{width}x{height}");

        let grid = ClothGrid::new(width, height, 0.1, 0.0, [0.0, 0.0]);
        assert_eq!(grid.particle_count(), (width * height) as usize);

        // The wireframe draws every structural spring and one diagonal per quad.
        let lines = line_indices(width, height, true);
        assert_eq!(lines.len() as u32 / 2, counted.structural + counted.shear / 2, "{width}x{height}");
    }
}

#[test]
fn moving_the_sphere_takes_effect_next_step() {
    let mut solver = cpu(common::free_fall_config());
    let positions = solver.read_positions().expect("read positions");
    let middle = positions[positions.len() / 2];

    {
        let sphere = solver.sphere_mut();
        sphere.center = middle.truncate();
        sphere.radius = 0.3;
    }
    solver.step();

    let center = solver.sphere().center;
    let surface = 0.3 + solver.config().collision_epsilon;
    for p in solver.read_positions().expect("read positions") {
        assert!((p.truncate() - center).length() >= surface - 1e-4);
    }
}

#[test]
fn every_scene_runs() {
    for scene in all_scenes() {
        let mut solver = cpu(scene.config());
        for _ in 0..10 {
            solver.step();
        }
        solver.compute_normals();
        let positions = solver.read_positions().expect("read positions");
        assert!(
            positions.iter().all(|p| p.is_finite()),
            "{}: non-finite position after 10 frames",
            scene.name()
        );
    }
}
