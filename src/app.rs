use std::sync::Arc;

use glam::Vec3;
use gpu_cloth::ClothConfig;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::rendering::Renderer;

const SPHERE_NUDGE: f32 = 0.05;

const HELP: &str = "\
Controls:
  drag          orbit camera
  wheel         zoom
  P             pause / resume
  R             reset cloth and resume
  1-4           toggle layers (cloth surface, cloth wire, sphere surface, sphere wire)
  N / Right     next scene
  Left          previous scene
  A / D         move sphere along x
  W / S         move sphere along z
  PgUp / PgDn   move sphere along y
  H             this help";

/// Pause state after `key_code`. Reset always resumes.
fn paused_after(paused: bool, key_code: KeyCode) -> bool {
    match key_code {
        KeyCode::KeyP => !paused,
        KeyCode::KeyR => false,
        _ => paused,
    }
}

#[derive(Default)]
pub(crate) struct App {
    state: Option<Renderer>,
    config: Option<ClothConfig>,
    paused: bool,
    last_cursor_x: f32,
    last_cursor_y: f32,
}

impl App {
    pub(crate) fn new(config: Option<ClothConfig>) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    fn handle_key(&mut self, key_code: KeyCode) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        let was_paused = self.paused;
        self.paused = paused_after(was_paused, key_code);
        if self.paused != was_paused {
            log::info!("{}", if self.paused { "Paused" } else { "Running" });
        }

        match key_code {
            KeyCode::KeyR => state.reset(),

            // Layer toggles
            KeyCode::Digit1 => state.toggle_layer(0),
            KeyCode::Digit2 => state.toggle_layer(1),
            KeyCode::Digit3 => state.toggle_layer(2),
            KeyCode::Digit4 => state.toggle_layer(3),

            // Next/previous scene
            KeyCode::ArrowRight | KeyCode::KeyN => state.next_scene(),
            KeyCode::ArrowLeft => state.previous_scene(),

            // Sphere motion
            KeyCode::KeyA => state.move_sphere(Vec3::new(-SPHERE_NUDGE, 0.0, 0.0)),
            KeyCode::KeyD => state.move_sphere(Vec3::new(SPHERE_NUDGE, 0.0, 0.0)),
            KeyCode::KeyW => state.move_sphere(Vec3::new(0.0, 0.0, -SPHERE_NUDGE)),
            KeyCode::KeyS => state.move_sphere(Vec3::new(0.0, 0.0, SPHERE_NUDGE)),
            KeyCode::PageUp => state.move_sphere(Vec3::new(0.0, SPHERE_NUDGE, 0.0)),
            KeyCode::PageDown => state.move_sphere(Vec3::new(0.0, -SPHERE_NUDGE, 0.0)),

            KeyCode::KeyH => println!("{HELP}"),

            _ => (),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        let attributes = Window::default_attributes().with_title("GPU Cloth");
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        match pollster::block_on(Renderer::new(window.clone(), self.config.take())) {
            Ok(state) => self.state = Some(state),
            Err(e) => {
                log::error!("Failed to start renderer: {e}");
                event_loop.exit();
                return;
            }
        }

        window.request_redraw();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let paused = self.paused;
        let Some(state) = self.state.as_mut() else {
            return;
        };
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested; stopping");
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                state.render(paused);
                // Emits a new redraw requested event.
                state.get_window().request_redraw();
            }
            WindowEvent::Resized(size) => {
                // Reconfigures the size of the surface. We do not re-render
                // here as this event is always followed up by redraw request.
                state.resize(size);
            }
            WindowEvent::MouseWheel { delta, .. } => match delta {
                MouseScrollDelta::LineDelta(_, y) => state.handle_mouse_wheel(y),
                // Touchpad gesture - needs smaller scaling factor to feel natural
                MouseScrollDelta::PixelDelta(position) => state.handle_mouse_wheel(position.y as f32 * 0.003),
            },
            WindowEvent::MouseInput {
                state: button_state,
                button: MouseButton::Left,
                ..
            } => match button_state {
                ElementState::Pressed => state.handle_mouse_press([self.last_cursor_x, self.last_cursor_y]),
                ElementState::Released => state.handle_mouse_release(),
            },
            WindowEvent::CursorMoved { position, .. } => {
                self.last_cursor_x = position.x as f32;
                self.last_cursor_y = position.y as f32;
                state.handle_mouse_move([self.last_cursor_x, self.last_cursor_y]);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => self.handle_key(key_code),
            _ => (),
        }
    }
}

/// Runs the viewer until the window closes.
pub(crate) fn run(config: Option<ClothConfig>) -> Result<(), winit::error::EventLoopError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)
}
