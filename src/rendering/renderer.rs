use std::sync::Arc;

use glam::{Vec3, Vec4};
use gpu_cloth::simulation::grid::ClothGrid;
use gpu_cloth::simulation::scenes::{Scene, all_scenes};
use gpu_cloth::{ClothConfig, ClothError, ClothSimulation, ClothSolver, Result};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::rendering::camera::Camera;
use crate::rendering::mesh::{uv_sphere_triangles, uv_sphere_wire};
use crate::rendering::render_config::{CameraUniform, DEPTH_FORMAT, DrawUniform, RenderConfig, StageKind};
use crate::rendering::render_pass::{DepthTarget, DrawStage, FrameTarget, Geometry, begin_pass};

const SPHERE_STACKS: u32 = 24;
const SPHERE_SLICES: u32 = 48;
const SPHERE_WIRE_STACKS: u32 = 12;
const SPHERE_WIRE_SLICES: u32 = 24;

const CLOTH_COLOR: Vec4 = Vec4::new(0.85, 0.35, 0.30, 1.0);
const CLOTH_WIRE_COLOR: Vec4 = Vec4::new(0.95, 0.90, 0.80, 1.0);
const SPHERE_COLOR: Vec4 = Vec4::new(0.30, 0.50, 0.80, 1.0);
const SPHERE_WIRE_COLOR: Vec4 = Vec4::new(0.60, 0.80, 1.00, 1.0);

struct IndexedMesh {
    positions: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
}

impl IndexedMesh {
    fn new(device: &wgpu::Device, label: &str, positions: &[Vec4], indices: &[u32]) -> Self {
        let positions = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(positions),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self {
            positions,
            indices: index_buffer(device, label, indices),
            index_count: indices.len() as u32,
        }
    }
}

fn index_buffer(device: &wgpu::Device, label: &str, indices: &[u32]) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(indices),
        usage: wgpu::BufferUsages::INDEX,
    })
}

struct ClothIndices {
    triangles: wgpu::Buffer,
    triangle_count: u32,
    lines: wgpu::Buffer,
    line_count: u32,
}

impl ClothIndices {
    fn new(device: &wgpu::Device, grid: &ClothGrid) -> Self {
        Self {
            triangles: index_buffer(device, "Cloth Triangle Indices", &grid.triangle_indices),
            triangle_count: grid.triangle_indices.len() as u32,
            lines: index_buffer(device, "Cloth Line Indices", &grid.line_indices),
            line_count: grid.line_indices.len() as u32,
        }
    }
}

fn create_depth_view(device: &wgpu::Device, size: winit::dpi::PhysicalSize<u32>) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: size.width.max(1),
            height: size.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

// Main renderer struct
pub(crate) struct Renderer {
    window: Arc<Window>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    size: winit::dpi::PhysicalSize<u32>,
    surface: wgpu::Surface<'static>,
    depth_view: wgpu::TextureView,

    // Rendering configuration
    render_config: RenderConfig,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    stages: [DrawStage; 4],

    // Simulation
    simulation: ClothSimulation,
    cloth_indices: ClothIndices,
    sphere_surface: IndexedMesh,
    sphere_wire: IndexedMesh,
    scenes: Vec<Box<dyn Scene>>,
    scene_index: usize,
    custom_config: Option<ClothConfig>,

    // Camera
    camera: Camera,
}

impl Renderer {
    /// Layer names in toggle order (keys 1 to 4).
    pub(crate) const LAYERS: [&'static str; 4] = ["Cloth surface", "Cloth wireframe", "Sphere surface", "Sphere wireframe"];

    /// Opens the surface and builds the first simulation, either from
    /// `custom_config` or from the first scene.
    pub(crate) async fn new(window: Arc<Window>, custom_config: Option<ClothConfig>) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| ClothError::Gpu(e.to_string()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Cloth Viewer Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let info = adapter.get_info();
        log::info!("Viewer GPU: {} ({:?})", info.name, info.backend);

        let size = window.inner_size();
        let cap = surface.get_capabilities(&adapter);
        let surface_format = *cap
            .formats
            .first()
            .ok_or_else(|| ClothError::Gpu("surface reports no supported formats".into()))?;

        let render_config = RenderConfig::new(&device, surface_format);

        let scenes = all_scenes();
        let config = match &custom_config {
            Some(config) => config.clone(),
            None => scenes[0].config(),
        };
        let simulation = ClothSimulation::new(&device, &queue, config)?;
        log::info!("Cloth running on the {} solver", simulation.name());
        let cloth_indices = ClothIndices::new(&device, simulation.grid());

        let (positions, triangles) = uv_sphere_triangles(SPHERE_STACKS, SPHERE_SLICES);
        let sphere_surface = IndexedMesh::new(&device, "Sphere Surface Mesh", &positions, &triangles);
        let (positions, lines) = uv_sphere_wire(SPHERE_WIRE_STACKS, SPHERE_WIRE_SLICES);
        let sphere_wire = IndexedMesh::new(&device, "Sphere Wire Mesh", &positions, &lines);

        let camera = Camera::new(simulation.sphere().center);
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Uniform"),
            contents: bytemuck::cast_slice(&[CameraUniform::new(
                camera.view_projection(aspect_ratio(size)),
                camera.eye(),
            )]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let camera_bind_group = render_config.uniform_bind_group(
            &device,
            "Camera Bind Group",
            &render_config.camera_layout,
            &camera_buffer,
        );

        let cloth_draw = DrawUniform::new(Vec3::ZERO, 1.0, CLOTH_COLOR);
        let cloth_wire_draw = DrawUniform::new(Vec3::ZERO, 1.0, CLOTH_WIRE_COLOR);
        let sphere = simulation.sphere();
        let sphere_draw = DrawUniform::new(sphere.center, sphere.radius, SPHERE_COLOR);
        let sphere_wire_draw = DrawUniform::new(sphere.center, sphere.radius, SPHERE_WIRE_COLOR);
        let mut stages = [
            DrawStage::new(&device, &render_config, "Cloth Surface Pass", StageKind::Surface, cloth_draw),
            DrawStage::new(&device, &render_config, "Cloth Wire Pass", StageKind::Wire, cloth_wire_draw),
            DrawStage::new(&device, &render_config, "Sphere Surface Pass", StageKind::Surface, sphere_draw),
            DrawStage::new(&device, &render_config, "Sphere Wire Pass", StageKind::Wire, sphere_wire_draw),
        ];
        // Wireframes start hidden
        stages[1].enabled = false;
        stages[3].enabled = false;

        let depth_view = create_depth_view(&device, size);

        let renderer = Self {
            window,
            device,
            queue,
            size,
            surface,
            depth_view,
            render_config,
            camera_buffer,
            camera_bind_group,
            stages,
            simulation,
            cloth_indices,
            sphere_surface,
            sphere_wire,
            scenes,
            scene_index: 0,
            custom_config,
            camera,
        };

        // Configure surface for the first time
        renderer.configure_surface();
        renderer.print_scene();

        Ok(renderer)
    }

    pub(crate) fn get_window(&self) -> &Window {
        &self.window
    }

    fn configure_surface(&self) {
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: self.render_config.surface_format,
            // Request compatibility with the sRGB-format texture view we're going to create later.
            view_formats: vec![self.render_config.surface_format.add_srgb_suffix()],
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            width: self.size.width.max(1),
            height: self.size.height.max(1),
            desired_maximum_frame_latency: 2,
            present_mode: wgpu::PresentMode::AutoVsync,
        };
        self.surface.configure(&self.device, &surface_config);
    }

    pub(crate) fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.size = new_size;
        self.configure_surface();
        self.depth_view = create_depth_view(&self.device, new_size);
    }

    fn update_uniforms(&mut self) {
        let sphere = *self.simulation.sphere();
        self.camera.set_target(sphere.center);
        let camera_uniform = CameraUniform::new(self.camera.view_projection(aspect_ratio(self.size)), self.camera.eye());
        self.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[camera_uniform]));

        self.stages[2].update(&self.queue, DrawUniform::new(sphere.center, sphere.radius, SPHERE_COLOR));
        self.stages[3].update(
            &self.queue,
            DrawUniform::new(sphere.center, sphere.radius, SPHERE_WIRE_COLOR),
        );
    }

    /// Advances the cloth (unless `paused`), refreshes normals and draws
    /// the enabled layers.
    pub(crate) fn render(&mut self, paused: bool) {
        if !paused {
            self.simulation.step();
        }
        self.simulation.compute_normals();
        self.update_uniforms();

        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated, reconfiguring");
                self.configure_surface();
                return;
            }
            Err(e) => {
                log::warn!("Skipping frame: {e}");
                return;
            }
        };
        let texture_view = surface_texture.texture.create_view(&wgpu::TextureViewDescriptor {
            format: Some(self.render_config.surface_format.add_srgb_suffix()),
            ..Default::default()
        });

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Cloth Render Encoder"),
        });

        let cloth_positions = self.simulation.current_positions();
        let cloth_normals = self.simulation.normals();
        let sphere_visible = self.simulation.sphere().is_enabled();
        let geometries = [
            Geometry {
                positions: cloth_positions,
                normals: cloth_normals,
                indices: &self.cloth_indices.triangles,
                index_count: self.cloth_indices.triangle_count,
            },
            Geometry {
                positions: cloth_positions,
                normals: cloth_normals,
                indices: &self.cloth_indices.lines,
                index_count: self.cloth_indices.line_count,
            },
            // Unit sphere positions double as its normals
            Geometry {
                positions: &self.sphere_surface.positions,
                normals: &self.sphere_surface.positions,
                indices: &self.sphere_surface.indices,
                index_count: self.sphere_surface.index_count,
            },
            Geometry {
                positions: &self.sphere_wire.positions,
                normals: &self.sphere_wire.positions,
                indices: &self.sphere_wire.indices,
                index_count: self.sphere_wire.index_count,
            },
        ];

        let mut clear = true;
        for (index, (stage, geometry)) in self.stages.iter().zip(&geometries).enumerate() {
            if !stage.enabled || (index >= 2 && !sphere_visible) {
                continue;
            }
            let target = FrameTarget {
                color: &texture_view,
                depth: DepthTarget::Attach(&self.depth_view),
                clear,
            };
            stage.encode(
                &mut encoder,
                &self.render_config,
                &self.camera_bind_group,
                target,
                geometry,
            );
            clear = false;
        }

        // Nothing drawn: still clear the frame
        if clear {
            let target = FrameTarget {
                color: &texture_view,
                depth: DepthTarget::Skip,
                clear: true,
            };
            let _background = begin_pass(&mut encoder, "Background Pass", target);
        }

        self.queue.submit([encoder.finish()]);
        self.window.pre_present_notify();
        surface_texture.present();
    }

    fn load(&mut self, config: ClothConfig) {
        match ClothSimulation::new(&self.device, &self.queue, config) {
            Ok(simulation) => {
                self.cloth_indices = ClothIndices::new(&self.device, simulation.grid());
                self.simulation = simulation;
            }
            Err(e) => log::error!("Failed to build cloth: {e}"),
        }
    }

    pub(crate) fn reset(&mut self) {
        self.simulation.reset();
    }

    pub(crate) fn switch_scene(&mut self, index: usize) {
        if index >= self.scenes.len() || (index == self.scene_index && self.custom_config.is_none()) {
            return;
        }
        self.scene_index = index;
        self.custom_config = None;
        let config = self.scenes[index].config();
        self.load(config);
        self.print_scene();
    }

    pub(crate) fn next_scene(&mut self) {
        self.switch_scene((self.scene_index + 1) % self.scenes.len());
    }

    pub(crate) fn previous_scene(&mut self) {
        let count = self.scenes.len();
        self.switch_scene((self.scene_index + count - 1) % count);
    }

    pub(crate) fn toggle_layer(&mut self, layer: usize) {
        if let Some(stage) = self.stages.get_mut(layer) {
            stage.enabled = !stage.enabled;
            log::info!(
                "{}: {}",
                Self::LAYERS[layer],
                if stage.enabled { "on" } else { "off" }
            );
        }
    }

    pub(crate) fn move_sphere(&mut self, delta: Vec3) {
        let sphere = self.simulation.sphere_mut();
        sphere.center += delta;
        log::debug!("Sphere centre: {}", sphere.center);
    }

    fn print_scene(&self) {
        if self.custom_config.is_some() {
            println!("Scene: custom config (press N to cycle built-in scenes, H for help)");
            return;
        }
        let scene = &self.scenes[self.scene_index];
        println!(
            "Scene {}/{}: {} - {} (H for help)",
            self.scene_index + 1,
            self.scenes.len(),
            scene.name(),
            scene.description()
        );
    }

    // Input handling methods
    pub(crate) fn handle_mouse_press(&mut self, position: [f32; 2]) {
        self.camera.handle_mouse_press(position);
    }

    pub(crate) fn handle_mouse_release(&mut self) {
        self.camera.handle_mouse_release();
    }

    pub(crate) fn handle_mouse_move(&mut self, position: [f32; 2]) {
        self.camera.handle_mouse_move(position);
    }

    pub(crate) fn handle_mouse_wheel(&mut self, delta: f32) {
        self.camera.handle_mouse_wheel(delta);
    }
}

fn aspect_ratio(size: winit::dpi::PhysicalSize<u32>) -> f32 {
    size.width.max(1) as f32 / size.height.max(1) as f32
}
