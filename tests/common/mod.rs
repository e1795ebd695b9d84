//! Behavioural checks shared by the CPU and GPU solver tests.
//!
//! Each check takes a constructor so the same property runs against every
//! `ClothSolver` backend.

#![allow(dead_code)]

use glam::{Vec3, Vec4, Vec4Swizzles};
use gpu_cloth::{ClothConfig, ClothSolver, Parity};

const POSITION_TOLERANCE: f32 = 1e-4;

/// Sphere and floor out of the way: pure free fall.
pub fn free_fall_config() -> ClothConfig {
    ClothConfig {
        sphere_radius: 0.0,
        floor_y: f32::NEG_INFINITY,
        ..Default::default()
    }
}

/// Cloth a few centimetres above the sphere so contact happens quickly.
pub fn near_sphere_config() -> ClothConfig {
    ClothConfig {
        cloth_height: 0.02,
        ..Default::default()
    }
}

fn mean_y(positions: &[Vec4]) -> f32 {
    positions.iter().map(|p| p.y).sum::<f32>() / positions.len() as f32
}

fn bits(values: &[Vec4]) -> Vec<[u32; 4]> {
    values
        .iter()
        .map(|v| v.to_array().map(f32::to_bits))
        .collect()
}

pub fn reset_restores_initial_state<S: ClothSolver>(make: impl Fn(ClothConfig) -> S) {
    let mut solver = make(ClothConfig::default());
    let initial_positions = solver.read_positions().expect("read positions");
    let initial_velocities = solver.read_velocities().expect("read velocities");

    for _ in 0..7 {
        solver.step();
    }
    assert_ne!(bits(&solver.read_positions().expect("read positions")), bits(&initial_positions));

    solver.reset();
    assert_eq!(solver.parity(), Parity::A);
    assert_eq!(bits(&solver.read_positions().expect("read positions")), bits(&initial_positions));
    assert_eq!(bits(&solver.read_velocities().expect("read velocities")), bits(&initial_velocities));

    // A second reset with no steps in between changes nothing.
    solver.reset();
    assert_eq!(bits(&solver.read_positions().expect("read positions")), bits(&initial_positions));
}

pub fn free_fall_center_of_mass_descends<S: ClothSolver>(make: impl Fn(ClothConfig) -> S) {
    let mut solver = make(free_fall_config());
    let mut previous = mean_y(&solver.read_positions().expect("read positions"));

    for frame in 0..20 {
        solver.step();
        let current = mean_y(&solver.read_positions().expect("read positions"));
        assert!(current <= previous, "frame {frame}: centre of mass rose from {previous} to {current}");
        previous = current;
    }
}

pub fn gravity_only_single_step<S: ClothSolver>(make: impl Fn(ClothConfig) -> S) {
    let config = ClothConfig {
        grid_width: 4,
        grid_height: 4,
        rest_length: 0.1,
        mass: 1.0,
        gravity: -9.81,
        damping: 1.0,
        dt: 1.0 / 240.0,
        substeps: 1,
        sphere_radius: 0.0,
        floor_y: -100.0,
        ..Default::default()
    };
    let mut solver = make(config);
    let before = solver.read_positions().expect("read positions");

    solver.step();

    let expected_vy = -9.81_f32 / 240.0;
    let expected_dy = expected_vy / 240.0;
    let after = solver.read_positions().expect("read positions");
    let velocities = solver.read_velocities().expect("read velocities");
    for (i, ((p0, p1), v)) in before.iter().zip(&after).zip(&velocities).enumerate() {
        assert!((v.y - expected_vy).abs() < 1e-5, "particle {i}: v.y = {}", v.y);
        assert!(v.x.abs() < 1e-5 && v.z.abs() < 1e-5, "particle {i}: lateral drift {v}");
        assert!(((p1.y - p0.y) - expected_dy).abs() < 1e-6, "particle {i}: dy = {}", p1.y - p0.y);
    }
}

pub fn sphere_containment<S: ClothSolver>(make: impl Fn(ClothConfig) -> S) {
    let config = near_sphere_config();
    let center = config.sphere_center;
    let surface = config.sphere_radius + config.collision_epsilon;
    let mut solver = make(config);

    let mut touched = false;
    for frame in 0..90 {
        solver.step();
        for (i, p) in solver.read_positions().expect("read positions").iter().enumerate() {
            let distance = (p.xyz() - center).length();
            assert!(
                distance >= surface - POSITION_TOLERANCE,
                "frame {frame}: particle {i} inside sphere at distance {distance}"
            );
            touched |= distance < surface + 1e-3;
        }
    }
    assert!(touched, "cloth never reached the sphere");
}

pub fn floor_containment<S: ClothSolver>(make: impl Fn(ClothConfig) -> S) {
    let config = ClothConfig {
        sphere_radius: 0.0,
        sphere_center: Vec3::ZERO,
        cloth_height: 0.0,
        floor_y: -0.03,
        ..Default::default()
    };
    let floor_y = config.floor_y;
    let mut solver = make(config);

    for frame in 0..60 {
        solver.step();
        let positions = solver.read_positions().expect("read positions");
        for (i, p) in positions.iter().enumerate() {
            assert!(p.y >= floor_y - POSITION_TOLERANCE, "frame {frame}: particle {i} below floor at {}", p.y);
        }
    }

    let positions = solver.read_positions().expect("read positions");
    assert!(positions.iter().all(|p| (p.y - floor_y).abs() < 1e-3), "cloth did not settle on the floor");
    let velocities = solver.read_velocities().expect("read velocities");
    assert!(velocities.iter().all(|v| v.y >= -1e-4), "resting cloth still moving into the floor");
}

pub fn corner_particle_pushed_to_surface<S: ClothSolver>(make: impl Fn(ClothConfig) -> S) {
    let config = ClothConfig {
        grid_width: 4,
        grid_height: 4,
        substeps: 1,
        sphere_radius: 0.0,
        floor_y: -100.0,
        ..Default::default()
    };
    let epsilon = config.collision_epsilon;
    let mut solver = make(config);
    let corner = solver.read_positions().expect("read positions")[0].xyz();

    let radius = 0.05;
    {
        let sphere = solver.sphere_mut();
        sphere.center = corner;
        sphere.radius = radius;
    }
    solver.step();

    let positions = solver.read_positions().expect("read positions");
    let distance = (positions[0].xyz() - corner).length();
    assert!(
        (distance - (radius + epsilon)).abs() < POSITION_TOLERANCE,
        "corner left at distance {distance} from the sphere centre"
    );
    for (i, p) in positions.iter().enumerate() {
        assert!((p.xyz() - corner).length() >= radius + epsilon - POSITION_TOLERANCE, "particle {i} inside sphere");
    }
}

pub fn runs_are_deterministic<S: ClothSolver>(make: impl Fn(ClothConfig) -> S) {
    let mut first = make(near_sphere_config());
    let mut second = make(near_sphere_config());
    for _ in 0..30 {
        first.step();
        second.step();
    }
    assert_eq!(
        bits(&first.read_positions().expect("read positions")),
        bits(&second.read_positions().expect("read positions"))
    );
}

pub fn normals_follow_positions<S: ClothSolver>(make: impl Fn(ClothConfig) -> S) {
    let mut solver = make(near_sphere_config());

    solver.compute_normals();
    for (i, n) in solver.read_normals().expect("read normals").iter().enumerate() {
        assert!((n.xyz() - Vec3::Y).length() < 1e-5, "flat sheet normal {i} is {n}");
    }

    for _ in 0..90 {
        solver.step();
    }
    solver.compute_normals();
    let normals = solver.read_normals().expect("read normals");
    for (i, n) in normals.iter().enumerate() {
        assert!((n.xyz().length() - 1.0).abs() < 1e-3, "normal {i} is not unit length: {n}");
    }
    assert!(
        normals.iter().any(|n| (n.xyz() - Vec3::Y).length() > 1e-2),
        "draped cloth still has flat normals"
    );
}

pub fn coincident_neighbours_stay_finite<S: ClothSolver>(make: impl Fn(ClothConfig) -> S) {
    let mut solver = make(ClothConfig::default());
    let mut positions = solver.read_positions().expect("read positions");
    let velocities = solver.read_velocities().expect("read velocities");

    // Collapse the first structural spring to zero length.
    positions[1] = positions[0];
    solver.write_state(&positions, &velocities).expect("write state");
    assert_eq!(bits(&solver.read_positions().expect("read positions"))[1], bits(&positions)[0]);

    for _ in 0..10 {
        solver.step();
    }
    solver.compute_normals();

    let finite = |values: &[Vec4]| values.iter().position(|v| !v.is_finite());
    assert_eq!(finite(&solver.read_positions().expect("read positions")), None, "non-finite position");
    assert_eq!(finite(&solver.read_velocities().expect("read velocities")), None, "non-finite velocity");
    assert_eq!(finite(&solver.read_normals().expect("read normals")), None, "non-finite normal");
}

pub fn short_state_upload_is_rejected<S: ClothSolver>(make: impl Fn(ClothConfig) -> S) {
    let mut solver = make(ClothConfig::default());
    let positions = solver.read_positions().expect("read positions");
    let velocities = solver.read_velocities().expect("read velocities");

    match solver.write_state(&positions[1..], &velocities) {
        Err(gpu_cloth::ClothError::StateLength { expected, got }) => {
            assert_eq!(expected, positions.len());
            assert_eq!(got, positions.len() - 1);
        }
        other => panic!("expected a state length error, got {other:?}"),
    }
    assert_eq!(bits(&solver.read_positions().expect("read positions")), bits(&positions));
}
