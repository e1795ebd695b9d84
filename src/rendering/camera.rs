use glam::{Mat4, Vec3};

const PITCH_MIN: f32 = -1.2;
const PITCH_MAX: f32 = 1.2;
const DISTANCE_MIN: f32 = 1.5;
const DISTANCE_MAX: f32 = 10.0;
const ROTATE_SPEED: f32 = 0.006;
const ZOOM_SPEED: f32 = 0.15;

// Orbit camera circling a target point
pub(crate) struct Camera {
    target: Vec3,
    yaw: f32,
    pitch: f32,
    distance: f32,

    // Mouse interaction state
    mouse_pressed: bool,
    last_mouse_position: [f32; 2],
}

impl Camera {
    pub(crate) fn new(target: Vec3) -> Self {
        Self {
            target,
            yaw: 0.0,
            pitch: 0.25,
            distance: 4.5,
            mouse_pressed: false,
            last_mouse_position: [0.0, 0.0],
        }
    }

    pub(crate) fn set_target(&mut self, target: Vec3) {
        self.target = target;
    }

    pub(crate) fn eye(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.target + self.distance * Vec3::new(sin_yaw * cos_pitch, sin_pitch, cos_yaw * cos_pitch)
    }

    pub(crate) fn view_projection(&self, aspect: f32) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye(), self.target, Vec3::Y);
        let projection = Mat4::perspective_rh(70.0_f32.to_radians(), aspect, 0.05, 50.0);
        projection * view
    }

    pub(crate) fn orbit(&mut self, delta_x: f32, delta_y: f32) {
        self.yaw += delta_x * ROTATE_SPEED;
        self.pitch = (self.pitch - delta_y * ROTATE_SPEED).clamp(PITCH_MIN, PITCH_MAX);
    }

    pub(crate) fn zoom(&mut self, delta: f32) {
        // Positive delta (wheel up) moves the camera closer
        self.distance = (self.distance * (1.0 - delta * ZOOM_SPEED)).clamp(DISTANCE_MIN, DISTANCE_MAX);
    }

    // Input handling methods
    pub(crate) fn handle_mouse_press(&mut self, position: [f32; 2]) {
        self.mouse_pressed = true;
        self.last_mouse_position = position;
    }

    pub(crate) fn handle_mouse_release(&mut self) {
        self.mouse_pressed = false;
    }

    pub(crate) fn handle_mouse_move(&mut self, position: [f32; 2]) -> bool {
        if !self.mouse_pressed {
            return false;
        }
        let delta_x = position[0] - self.last_mouse_position[0];
        let delta_y = position[1] - self.last_mouse_position[1];
        self.last_mouse_position = position;
        self.orbit(delta_x, delta_y);
        true
    }

    pub(crate) fn handle_mouse_wheel(&mut self, delta: f32) {
        self.zoom(delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eye_sits_at_distance_from_target() {
        let camera = Camera::new(Vec3::new(0.35, 1.0, 0.0));
        assert!(((camera.eye() - camera.target).length() - 4.5).abs() < 1e-5);
    }

    #[test]
    fn pitch_and_distance_are_clamped() {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.orbit(0.0, -10_000.0);
        assert_eq!(camera.pitch, PITCH_MAX);
        for _ in 0..100 {
            camera.zoom(5.0);
        }
        assert_eq!(camera.distance, DISTANCE_MIN);
        for _ in 0..100 {
            camera.zoom(-5.0);
        }
        assert_eq!(camera.distance, DISTANCE_MAX);
    }

    #[test]
    fn drag_only_orbits_while_pressed() {
        let mut camera = Camera::new(Vec3::ZERO);
        assert!(!camera.handle_mouse_move([10.0, 0.0]));
        camera.handle_mouse_press([0.0, 0.0]);
        assert!(camera.handle_mouse_move([100.0, 0.0]));
        assert!((camera.yaw - 0.6).abs() < 1e-6);
        camera.handle_mouse_release();
        assert!(!camera.handle_mouse_move([200.0, 0.0]));
    }
}
