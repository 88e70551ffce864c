//! The stage capability interface and the handles the compositor keeps to stages.
//!
//! A [`Stage`] is a single GPU pass: it samples one input texture and writes
//! one output into whatever target the backend currently has bound. Stages are
//! owned by the pipeline but often need tuning from elsewhere (a slider on
//! another thread, a composite filter exposing an inner parameter), so each
//! stage lives behind a lock and is reachable through two kinds of handle:
//!
//! - [`StageHandle<S>`] keeps the concrete type, so callers can reach
//!   stage-specific setters without downcasting.
//! - [`SharedStage<B>`] is the type-erased form stored in filter groups.
//!
//! Both point at the same [`StageCell`], which also carries the lifecycle flag
//! that makes `init`/`release` idempotent.

use std::sync::Arc;

use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};

use crate::FilterError;
use crate::backend::TextureId;
use crate::geometry::{Quad, TexCoords};

/// A single rendering pass in a filter pipeline.
///
/// `B` is the graphics backend the stage draws with. The compositor calls
/// `init`, `draw` and `release` only on the render thread; `resize` may be
/// called from any thread and should only record the new size.
pub trait Stage<B>: Send {
    /// Short name used in logs and errors.
    fn label(&self) -> &str;

    /// Creates GPU resources. Called with the graphics context current.
    fn init(&mut self, backend: &mut B) -> Result<(), FilterError>;

    /// Records the output size this stage renders at.
    fn resize(&mut self, width: u32, height: u32);

    /// Draws `input` into the currently bound target using the given quad.
    fn draw(
        &mut self,
        backend: &mut B,
        input: TextureId,
        geometry: &Quad,
        tex_coords: &TexCoords,
    ) -> Result<(), FilterError>;

    /// Releases GPU resources created by `init`.
    fn release(&mut self, backend: &mut B);

    /// Output `(width, height)` in pixels.
    fn output_size(&self) -> (u32, u32);
}

/// A stage together with its lifecycle state.
pub struct StageCell<S: ?Sized> {
    initialized: bool,
    stage: S,
}

impl<S> StageCell<S> {
    fn new(stage: S) -> Self {
        Self {
            initialized: false,
            stage,
        }
    }
}

impl<S: ?Sized> StageCell<S> {
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn stage(&self) -> &S {
        &self.stage
    }

    pub fn stage_mut(&mut self) -> &mut S {
        &mut self.stage
    }

    /// Runs the stage's `init`. A stage that is already initialized is left alone.
    pub fn init<B>(&mut self, backend: &mut B) -> Result<(), FilterError>
    where
        S: Stage<B>,
    {
        if self.initialized {
            return Ok(());
        }
        self.stage.init(backend)?;
        self.initialized = true;
        Ok(())
    }

    /// Runs the stage's `release` if and only if it is initialized.
    pub fn release<B>(&mut self, backend: &mut B)
    where
        S: Stage<B>,
    {
        if !self.initialized {
            return;
        }
        self.initialized = false;
        self.stage.release(backend);
    }

    /// Draws the stage, or does nothing if it has not been initialized.
    pub fn draw<B>(
        &mut self,
        backend: &mut B,
        input: TextureId,
        geometry: &Quad,
        tex_coords: &TexCoords,
    ) -> Result<(), FilterError>
    where
        S: Stage<B>,
    {
        if !self.initialized {
            return Ok(());
        }
        self.stage.draw(backend, input, geometry, tex_coords)
    }
}

/// Strongly typed, clonable handle to a stage.
///
/// Keep one of these when you need to reach a specific stage's parameters
/// after handing it to a [`FilterGroup`](crate::FilterGroup):
///
/// ```ignore
/// let sobel = StageHandle::new(SobelThresholdStage::new());
/// group.add_filter(sobel.clone());
/// sobel.lock().set_threshold(0.5);
/// ```
pub struct StageHandle<S> {
    cell: Arc<Mutex<StageCell<S>>>,
}

impl<S> StageHandle<S> {
    pub fn new(stage: S) -> Self {
        Self {
            cell: Arc::new(Mutex::new(StageCell::new(stage))),
        }
    }

    /// Locks the stage for direct access.
    pub fn lock(&self) -> MappedMutexGuard<'_, S> {
        MutexGuard::map(self.cell.lock(), |cell| &mut cell.stage)
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.lock().initialized
    }

    /// Type-erases this handle for storage in a filter group.
    pub fn shared<B>(&self) -> SharedStage<B>
    where
        S: Stage<B> + 'static,
    {
        let cell: Arc<Mutex<StageCell<dyn Stage<B>>>> = self.cell.clone();
        SharedStage { cell }
    }
}

impl<S> Clone for StageHandle<S> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

/// Type-erased, clonable handle to a stage drawing with backend `B`.
pub struct SharedStage<B> {
    cell: Arc<Mutex<StageCell<dyn Stage<B>>>>,
}

impl<B> SharedStage<B> {
    pub fn new<S: Stage<B> + 'static>(stage: S) -> Self {
        StageHandle::new(stage).shared()
    }

    pub fn lock(&self) -> MutexGuard<'_, StageCell<dyn Stage<B>>> {
        self.cell.lock()
    }

    /// Whether both handles refer to the same stage instance.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }

    pub fn output_size(&self) -> (u32, u32) {
        self.cell.lock().stage.output_size()
    }

    pub fn label(&self) -> String {
        self.cell.lock().stage.label().to_owned()
    }
}

impl<B> Clone for SharedStage<B> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<B> std::fmt::Debug for SharedStage<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SharedStage")
            .field(&Arc::as_ptr(&self.cell).cast::<()>())
            .finish()
    }
}

impl<B, S: Stage<B> + 'static> From<StageHandle<S>> for SharedStage<B> {
    fn from(handle: StageHandle<S>) -> Self {
        handle.shared()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingBackend, RecordingStage};

    #[test]
    fn release_runs_at_most_once() {
        let mut backend = RecordingBackend::new();
        let (stage, log) = RecordingStage::new("a", 4, 4);
        let shared: SharedStage<RecordingBackend> = SharedStage::new(stage);

        shared.lock().init(&mut backend).unwrap();
        shared.lock().init(&mut backend).unwrap();
        shared.lock().release(&mut backend);
        shared.lock().release(&mut backend);

        let log = log.lock();
        assert_eq!(log.inits, 1);
        assert_eq!(log.releases, 1);
    }

    #[test]
    fn release_without_init_is_noop() {
        let mut backend = RecordingBackend::new();
        let (stage, log) = RecordingStage::new("a", 4, 4);
        let shared: SharedStage<RecordingBackend> = SharedStage::new(stage);

        shared.lock().release(&mut backend);
        assert_eq!(log.lock().releases, 0);
    }

    #[test]
    fn uninitialized_stage_does_not_draw() {
        let mut backend = RecordingBackend::new();
        let (stage, log) = RecordingStage::new("a", 4, 4);
        let shared: SharedStage<RecordingBackend> = SharedStage::new(stage);

        shared
            .lock()
            .draw(&mut backend, TextureId(7), &Quad::CUBE, &TexCoords::NO_ROTATION)
            .unwrap();
        assert!(log.lock().draws.is_empty());
    }

    #[test]
    fn typed_and_shared_handles_alias() {
        let (stage, _log) = RecordingStage::new("a", 4, 4);
        let handle = StageHandle::new(stage);
        let first: SharedStage<RecordingBackend> = handle.shared();
        let second: SharedStage<RecordingBackend> = handle.clone().into();
        assert!(first.ptr_eq(&second));

        handle.lock().resize(32, 16);
        assert_eq!(first.output_size(), (32, 16));
        assert_eq!(first.label(), "a");
        assert_eq!(second.lock().stage().output_size(), (32, 16));
        assert!(!second.lock().is_initialized());
    }
}
