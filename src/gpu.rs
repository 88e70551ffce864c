//! Headless GPU device and queue.
//!
//! Filters render into textures, never directly into a window, so the
//! context carries no surface. Everything that draws borrows the context
//! through [`WgpuBackend`](crate::WgpuBackend).
//!
//! # Example
//!
//! ```no_run
//! use filterkit::{GpuConfig, GpuContext};
//!
//! let gpu = GpuContext::new(
//!     GpuConfig::new()
//!         .power_preference(wgpu::PowerPreference::LowPower)
//!         .label("thumbnailer"),
//! )?;
//! println!("{:?}", gpu.format());
//! # Ok::<(), filterkit::GpuError>(())
//! ```

use tracing::info;

use crate::GpuError;

/// Options for acquiring a [`GpuContext`].
#[derive(Clone, Debug)]
pub struct GpuConfig {
    pub backends: wgpu::Backends,
    pub power_preference: wgpu::PowerPreference,
    /// Format of every texture the backend allocates.
    pub format: wgpu::TextureFormat,
    pub label: String,
    /// Use a software adapter even if hardware is available.
    pub force_fallback_adapter: bool,
}

impl Default for GpuConfig {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::PRIMARY,
            power_preference: wgpu::PowerPreference::default(),
            format: wgpu::TextureFormat::Rgba8Unorm,
            label: "filterkit".to_string(),
            force_fallback_adapter: false,
        }
    }
}

impl GpuConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn backends(mut self, backends: wgpu::Backends) -> Self {
        self.backends = backends;
        self
    }

    pub fn power_preference(mut self, preference: wgpu::PowerPreference) -> Self {
        self.power_preference = preference;
        self
    }

    pub fn format(mut self, format: wgpu::TextureFormat) -> Self {
        self.format = format;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn force_fallback_adapter(mut self, force: bool) -> Self {
        self.force_fallback_adapter = force;
        self
    }
}

/// A wgpu device and queue plus the texture format filters render in.
///
/// Fields are public so callers can create their own resources next to the
/// filter pipeline.
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    format: wgpu::TextureFormat,
}

impl GpuContext {
    /// Acquires an adapter and device, blocking until both are ready.
    pub fn new(config: GpuConfig) -> Result<Self, GpuError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: config.backends,
            ..Default::default()
        });

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: config.power_preference,
            compatible_surface: None,
            force_fallback_adapter: config.force_fallback_adapter,
        }))?;

        let adapter_info = adapter.get_info();
        info!(
            name = %adapter_info.name,
            backend = ?adapter_info.backend,
            device_type = ?adapter_info.device_type,
            "selected GPU adapter"
        );

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some(&config.label),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits()),
            memory_hints: Default::default(),
            trace: Default::default(),
            experimental_features: Default::default(),
        }))?;

        Ok(Self::from_parts(device, queue, config.format))
    }

    /// Wraps a device the caller already owns.
    pub fn from_parts(
        device: wgpu::Device,
        queue: wgpu::Queue,
        format: wgpu::TextureFormat,
    ) -> Self {
        Self {
            device,
            queue,
            format,
        }
    }

    /// The color format of every texture and pipeline the backend creates.
    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Largest width or height a texture may have on this device.
    pub fn max_texture_size(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }
}
