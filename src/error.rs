//! Error types for backends, stages and GPU setup.

use thiserror::Error;

use crate::backend::{TargetId, TextureId};

/// Errors raised by a [`GraphicsBackend`](crate::GraphicsBackend) implementation.
#[derive(Debug, Error)]
pub enum BackendError {
    /// A texture or render target could not be allocated (size limits, out of memory).
    #[error("failed to allocate {what} ({width}x{height}): {reason}")]
    AllocationFailed {
        what: &'static str,
        width: u32,
        height: u32,
        reason: String,
    },

    /// The texture handle does not name a live texture.
    #[error("unknown texture {0:?}")]
    UnknownTexture(TextureId),

    /// The texture exists but has no storage yet.
    #[error("texture {0:?} has no storage")]
    NoStorage(TextureId),

    /// The render target handle does not name a live target.
    #[error("unknown render target {0:?}")]
    UnknownTarget(TargetId),

    /// A draw was recorded with neither a bound target nor a default output.
    #[error("no render target bound and no default output set")]
    NoOutput,

    /// A draw was recorded outside `begin_frame` / `finish_frame`.
    #[error("no frame in progress")]
    NoFrame,

    /// Copying texture contents back to the CPU failed.
    #[error("readback failed: {0}")]
    Readback(String),
}

/// Errors surfaced from a filter pipeline draw or initialization.
#[derive(Debug, Error)]
pub enum FilterError {
    /// A backend operation failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// A stage's shader failed to compile or validate.
    #[error("shader error in '{label}': {message}")]
    Shader { label: String, message: String },

    /// A stage reported a failure of its own.
    #[error("stage '{label}' failed: {message}")]
    Stage { label: String, message: String },
}

/// Errors that can occur while acquiring a GPU device.
#[derive(Debug, Error)]
pub enum GpuError {
    /// No adapter matched the requested options.
    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    /// The adapter refused to create a device.
    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}
