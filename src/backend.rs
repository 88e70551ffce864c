//! Graphics backend capability interface.
//!
//! The compositor never talks to a graphics API directly. Everything it needs
//! to build and drive the chain of intermediate render targets goes through
//! [`GraphicsBackend`], which mirrors the small set of texture and framebuffer
//! primitives a classic immediate-mode API exposes:
//!
//! ```text
//! create_texture ─▶ allocate_texture ─▶ set_texture_params
//!                                             │
//! create_target ─────────▶ attach_texture ◀───┘
//!                               │
//!                  bind_target / clear / (stage draws) / unbind_target
//! ```
//!
//! "Unbound" means the externally supplied output (the screen, or whatever
//! the caller selected before drawing). The compositor only ever binds its
//! own offscreen targets and unbinds back to that output.

/// Type-safe handle to a backend texture.
///
/// This newtype wrapper prevents accidentally passing render target ids where
/// texture ids are expected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

/// Type-safe handle to a backend offscreen render target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub u32);

/// Texture sampling filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterMode {
    Nearest,
    Linear,
}

/// Texture coordinate wrapping outside `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WrapMode {
    ClampToEdge,
    Repeat,
}

/// Sampling parameters applied to a texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureParams {
    pub mag_filter: FilterMode,
    pub min_filter: FilterMode,
    pub wrap_u: WrapMode,
    pub wrap_v: WrapMode,
}

impl TextureParams {
    /// Linear filtering with edge clamping on both axes.
    ///
    /// Used for every intermediate texture in a filter chain: repeating would
    /// bleed the opposite border into edge pixels.
    pub const LINEAR_CLAMPED: Self = Self {
        mag_filter: FilterMode::Linear,
        min_filter: FilterMode::Linear,
        wrap_u: WrapMode::ClampToEdge,
        wrap_v: WrapMode::ClampToEdge,
    };
}

impl Default for TextureParams {
    fn default() -> Self {
        Self::LINEAR_CLAMPED
    }
}

/// Transparent black, the clear color for intermediate targets.
pub const TRANSPARENT: [f32; 4] = [0.0, 0.0, 0.0, 0.0];

/// Texture and render-target primitives consumed by the compositor.
///
/// All methods must only be called while the backend's graphics context is
/// current, i.e. from the render thread. The compositor guarantees this by
/// only allocating or releasing resources inside `draw` and `destroy`.
///
/// Deletion methods ignore unknown handles so that releasing twice is harmless.
pub trait GraphicsBackend {
    /// Creates a texture name without storage.
    fn create_texture(&mut self) -> Result<TextureId, crate::BackendError>;

    /// Allocates empty RGBA storage of the given size for `texture`.
    fn allocate_texture(
        &mut self,
        texture: TextureId,
        width: u32,
        height: u32,
    ) -> Result<(), crate::BackendError>;

    /// Sets filtering and wrap parameters for `texture`.
    fn set_texture_params(
        &mut self,
        texture: TextureId,
        params: TextureParams,
    ) -> Result<(), crate::BackendError>;

    /// Deletes a texture and its storage.
    fn delete_texture(&mut self, texture: TextureId);

    /// Creates an offscreen render target with no color attachment.
    fn create_target(&mut self) -> Result<TargetId, crate::BackendError>;

    /// Attaches `texture` as the color output of `target`.
    fn attach_texture(
        &mut self,
        target: TargetId,
        texture: TextureId,
    ) -> Result<(), crate::BackendError>;

    /// Deletes an offscreen render target. The attached texture is not deleted.
    fn delete_target(&mut self, target: TargetId);

    /// Routes subsequent draws to `target`.
    fn bind_target(&mut self, target: TargetId);

    /// Routes subsequent draws back to the externally supplied output.
    fn unbind_target(&mut self);

    /// Clears the currently bound target to `color` (RGBA).
    fn clear(&mut self, color: [f32; 4]);
}
