//! # filterkit
//!
//! **Composable multi-pass GPU image filters.**
//!
//! A filter is either a single [`Stage`] (one shader pass) or a
//! [`FilterGroup`] of further filters. Groups nest freely; at draw time the
//! tree is flattened and the stages run back to back through a chain of
//! offscreen render targets, the last one drawing into the caller's output.
//!
//! ## Quick Start
//!
//! ```no_run
//! use filterkit::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut backend = WgpuBackend::new(GpuContext::new(GpuConfig::default())?);
//! let photo = image::open("photo.png")?.to_rgba8();
//! let (width, height) = photo.dimensions();
//!
//! let edges = ThresholdEdgeDetection::new();
//! edges.set_threshold(0.7);
//! let group = FilterGroup::builder()
//!     .filter(Filter::stage(InvertStage::new()))
//!     .filter(&edges)
//!     .build();
//!
//! let input = backend.upload_rgba(&photo)?;
//! let output = backend.create_texture()?;
//! backend.allocate_texture(output, width, height)?;
//! backend.set_default_output(output);
//!
//! group.init(&mut backend)?;
//! group.resize(width, height);
//! backend.begin_frame();
//! group.draw(&mut backend, input, &Quad::CUBE, &TexCoords::NO_ROTATION)?;
//! backend.finish_frame();
//! backend.read_rgba(output)?.save("edges.png")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Backends
//!
//! The compositor only needs the handful of texture and render-target
//! primitives in [`GraphicsBackend`]. [`WgpuBackend`] implements them on
//! wgpu; any other implementation works with the same groups.

mod backend;
mod edge_detection;
mod error;
mod filter;
mod geometry;
mod gpu;
pub mod group;
mod shader_stage;
mod stage;
mod stages;
mod wgpu_backend;

#[cfg(test)]
mod testing;

pub use backend::{
    FilterMode, GraphicsBackend, TRANSPARENT, TargetId, TextureId, TextureParams, WrapMode,
};
pub use edge_detection::ThresholdEdgeDetection;
pub use error::{BackendError, FilterError, GpuError};
pub use filter::Filter;
pub use geometry::{Quad, QuadVertex, Rotation, TexCoords};
pub use gpu::{GpuConfig, GpuContext};
pub use group::{DrawStatus, FilterGroup, FilterGroupBuilder};
pub use shader_stage::{SHADER_PRELUDE, ShaderStage, StageUniforms};
pub use stage::{SharedStage, Stage, StageCell, StageHandle};
pub use stages::{GrayscaleStage, InvertStage, SobelThresholdStage};
pub use wgpu_backend::WgpuBackend;
