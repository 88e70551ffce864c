//! Intermediate offscreen render targets for a filter group.

use crate::BackendError;
use crate::backend::{GraphicsBackend, TargetId, TextureId, TextureParams};
use crate::stage::SharedStage;

/// An offscreen render target and the texture it renders into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OffscreenTarget {
    pub target: TargetId,
    pub texture: TextureId,
    pub width: u32,
    pub height: u32,
}

/// The chain of offscreen targets that links consecutive stages.
///
/// For `n` stages the chain holds `n - 1` targets: target `i` receives the
/// output of stage `i` and is sampled by stage `i + 1`. The last stage draws
/// to the caller's output, so a one-stage pipeline needs no targets at all.
///
/// The chain is always rebuilt from scratch; targets are never patched in
/// place.
#[derive(Debug, Default)]
pub struct RenderTargetChain {
    targets: Vec<OffscreenTarget>,
    ready: bool,
}

impl RenderTargetChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the chain was fully built for the current stage list.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn targets(&self) -> &[OffscreenTarget] {
        &self.targets
    }

    pub fn get(&self, index: usize) -> Option<&OffscreenTarget> {
        self.targets.get(index)
    }

    /// Releases every target and rebuilds the chain for `stages`.
    ///
    /// Target `i` is sized to stage `i`'s output. If any allocation fails,
    /// everything allocated so far is released again and the chain is left
    /// empty and not ready.
    pub fn rebuild<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
        stages: &[SharedStage<B>],
    ) -> Result<(), BackendError> {
        self.release(backend);

        let producers = stages.len().saturating_sub(1);
        self.targets.reserve(producers);
        for stage in &stages[..producers] {
            let (width, height) = stage.output_size();
            match allocate_target(backend, width, height) {
                Ok(target) => self.targets.push(target),
                Err(err) => {
                    self.release(backend);
                    return Err(err);
                }
            }
        }

        self.ready = true;
        Ok(())
    }

    /// Deletes every target and texture in the chain. Safe to call repeatedly.
    pub fn release<B: GraphicsBackend>(&mut self, backend: &mut B) {
        for target in self.targets.drain(..) {
            backend.delete_texture(target.texture);
            backend.delete_target(target.target);
        }
        self.ready = false;
    }
}

fn allocate_target<B: GraphicsBackend>(
    backend: &mut B,
    width: u32,
    height: u32,
) -> Result<OffscreenTarget, BackendError> {
    let texture = backend.create_texture()?;
    if let Err(err) = backend
        .allocate_texture(texture, width, height)
        .and_then(|()| backend.set_texture_params(texture, TextureParams::LINEAR_CLAMPED))
    {
        backend.delete_texture(texture);
        return Err(err);
    }

    let target = match backend.create_target() {
        Ok(target) => target,
        Err(err) => {
            backend.delete_texture(texture);
            return Err(err);
        }
    };
    if let Err(err) = backend.attach_texture(target, texture) {
        backend.delete_target(target);
        backend.delete_texture(texture);
        return Err(err);
    }

    Ok(OffscreenTarget {
        target,
        texture,
        width,
        height,
    })
}
