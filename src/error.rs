use thiserror::Error;

/// Errors surfaced by the cloth core.
///
/// Per-particle numerical problems never show up here: the kernels resolve
/// them locally. Only structural misconfiguration and GPU resource failures
/// propagate.
#[derive(Error, Debug)]
pub enum ClothError {
    #[error("invalid cloth configuration: `{field}` {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("particle buffer of {bytes} bytes exceeds the device storage binding limit of {limit} bytes")]
    BufferTooLarge { bytes: u64, limit: u64 },

    #[error("{workgroups} workgroups exceed the device dispatch limit of {limit} per dimension")]
    TooManyWorkgroups { workgroups: u32, limit: u32 },

    #[error("state upload has {got} particles, the grid has {expected}")]
    StateLength { expected: usize, got: usize },

    #[error("GPU error: {0}")]
    Gpu(String),

    #[error("no compatible GPU adapter found: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to create GPU device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("failed to map read-back buffer: {0}")]
    BufferMap(#[from] wgpu::BufferAsyncError),

    #[error("failed to poll GPU device: {0}")]
    Poll(#[from] wgpu::PollError),

    #[error("read-back channel disconnected before the map completed")]
    ChannelDisconnected,

    #[error("failed to read config file: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ClothError>;

impl ClothError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ClothError::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}
