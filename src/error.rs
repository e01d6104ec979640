use thiserror::Error;

/// Failures at the boundary between the sandbox and its host: GPU and
/// surface setup, frame acquisition, texture loading and windowing.
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter found: {0}")]
    RequestAdapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to request device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported texture formats")]
    UnsupportedSurface,

    #[error("failed to acquire frame: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    #[error("failed to decode texture: {0}")]
    TextureDecode(#[from] image::ImageError),

    #[error("failed to fetch texture {url}: {reason}")]
    TextureFetch { url: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[cfg(not(target_arch = "wasm32"))]
    #[error(transparent)]
    EventLoop(#[from] winit::error::EventLoopError),

    #[cfg(not(target_arch = "wasm32"))]
    #[error(transparent)]
    Os(#[from] winit::error::OsError),
}

pub type Result<T, E = SandboxError> = std::result::Result<T, E>;
