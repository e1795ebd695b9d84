mod camera;
mod mesh;
mod render_config;
mod render_pass;
mod renderer;

pub(crate) use renderer::Renderer;
