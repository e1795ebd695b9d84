use crate::error::Result;

/// Device and queue without a window, for tests and offline runs.
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub adapter_info: wgpu::AdapterInfo,
}

impl GpuContext {
    pub async fn new_headless() -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Cloth Headless Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let adapter_info = adapter.get_info();
        log::info!("Headless GPU: {} ({:?})", adapter_info.name, adapter_info.backend);

        Ok(Self {
            device,
            queue,
            adapter_info,
        })
    }

    /// Blocking wrapper around [`GpuContext::new_headless`].
    pub fn request() -> Result<Self> {
        pollster::block_on(Self::new_headless())
    }
}
