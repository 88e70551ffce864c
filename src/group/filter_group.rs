//! The filter group compositor.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::FilterError;
use crate::backend::{GraphicsBackend, TRANSPARENT, TextureId};
use crate::filter::Filter;
use crate::geometry::{Quad, TexCoords};
use crate::group::chain::RenderTargetChain;
use crate::group::flatten::flatten;
use crate::group::tasks::DeferredTasks;
use crate::stage::SharedStage;

/// Held while a group is checked for cycles and linked into another group.
/// Without it, `a.add_filter(b)` and `b.add_filter(a)` racing on two threads
/// could both pass the check.
static NESTING: Mutex<()> = Mutex::new(());

/// Outcome of a [`FilterGroup::draw`] call that did not fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawStatus {
    /// The group has not been initialized (or was destroyed); nothing was drawn.
    NotInitialized,
    /// There was nothing to draw, or the render targets could not be
    /// allocated. The next draw tries again.
    Skipped,
    /// Every stage drew.
    Drawn,
}

/// Everything guarded by the group lock. The children, the merged list and
/// the render targets derived from it change together or not at all.
struct GroupState<B> {
    filters: Vec<Filter<B>>,
    merged: Arc<[SharedStage<B>]>,
    chain: RenderTargetChain,
    output_size: Option<(u32, u32)>,
}

/// A filter made of other filters, applied one after another.
///
/// See the [module documentation](crate::group) for an overview.
///
/// All methods take `&self`; share a group between threads with an `Arc`.
/// `init`, `draw` and `destroy` must be called on the thread that owns the
/// graphics context. `add_filter` and `resize` may be called from any thread.
pub struct FilterGroup<B> {
    state: Mutex<GroupState<B>>,
    /// Set when the render targets no longer match the merged list or size.
    stale: AtomicBool,
    initialized: AtomicBool,
    tasks: DeferredTasks<B>,
    geometry: Quad,
    tex_coords: TexCoords,
    flipped_tex_coords: TexCoords,
}

impl<B: GraphicsBackend + 'static> FilterGroup<B> {
    /// Creates an empty group.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GroupState {
                filters: Vec::new(),
                merged: Vec::new().into(),
                chain: RenderTargetChain::new(),
                output_size: None,
            }),
            stale: AtomicBool::new(true),
            initialized: AtomicBool::new(false),
            tasks: DeferredTasks::new(),
            geometry: Quad::CUBE,
            tex_coords: TexCoords::NO_ROTATION,
            flipped_tex_coords: TexCoords::NO_ROTATION.flipped_vertically(),
        }
    }

    /// Creates a group from `filters`, in order.
    pub fn with_filters<I, F>(filters: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<Filter<B>>,
    {
        let group = Self::new();
        {
            let mut state = group.state.lock();
            state.filters.extend(filters.into_iter().map(Into::into));
            group.update_merged_locked(&mut state);
        }
        group
    }

    /// Creates a new group builder.
    pub fn builder() -> FilterGroupBuilder<B> {
        FilterGroupBuilder::new()
    }

    /// Appends a child filter.
    ///
    /// The new child is resized to the group's current output size. If the
    /// group is already initialized, the child's initialization is queued to
    /// run at the start of the next draw, on the render thread.
    ///
    /// A group that contains this group (or is this group) is ignored, since
    /// it would make the tree cyclic.
    pub fn add_filter(&self, filter: impl Into<Filter<B>>) {
        let filter = filter.into();
        let _nesting = match &filter {
            Filter::Group(group) => {
                let guard = NESTING.lock();
                if std::ptr::eq(Arc::as_ptr(group), self) || group.contains_group(self) {
                    warn!("ignoring filter group that would contain itself");
                    return;
                }
                Some(guard)
            }
            Filter::Stage(_) => None,
        };

        {
            let mut state = self.state.lock();
            if let Some((width, height)) = state.output_size {
                filter.resize(width, height);
            }
            state.filters.push(filter.clone());
            self.update_merged_locked(&mut state);
        }

        if self.is_initialized() {
            self.tasks.push(move |backend| filter.init(backend));
        }
    }

    /// Appends `filter` if present; `None` is ignored.
    pub fn add_optional_filter(&self, filter: Option<Filter<B>>) {
        if let Some(filter) = filter {
            self.add_filter(filter);
        }
    }

    /// Queues `task` to run on the render thread at the start of the next draw.
    pub fn run_on_draw<F>(&self, task: F)
    where
        F: FnOnce(&mut B) -> Result<(), FilterError> + Send + 'static,
    {
        self.tasks.push(task);
    }

    /// Initializes every child. Call with the graphics context current.
    pub fn init(&self, backend: &mut B) -> Result<(), FilterError> {
        let state = self.state.lock();
        for filter in &state.filters {
            filter.init(backend)?;
        }
        self.initialized.store(true, Ordering::Release);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Resizes every child and schedules the render targets to be rebuilt.
    pub fn resize(&self, width: u32, height: u32) {
        let mut state = self.state.lock();
        for filter in &state.filters {
            filter.resize(width, height);
        }
        state.output_size = Some((width, height));
        self.stale.store(true, Ordering::Release);
    }

    /// The size last passed to [`resize`](Self::resize).
    pub fn output_size(&self) -> Option<(u32, u32)> {
        self.state.lock().output_size
    }

    /// Whether the next draw will rebuild the render targets.
    pub fn is_stale(&self) -> bool {
        self.stale.load(Ordering::Acquire)
    }

    /// Runs every stage, drawing the final result into the caller's output.
    ///
    /// `geometry` and `tex_coords` are used for the first stage only; later
    /// stages draw the canonical full-target quad. The last stage's texture
    /// coordinates are flipped vertically when the number of stages is even,
    /// which cancels out the flips accumulated by the intermediate targets.
    ///
    /// The caller's currently bound target is left untouched until the last
    /// stage draws into it.
    pub fn draw(
        &self,
        backend: &mut B,
        input: TextureId,
        geometry: &Quad,
        tex_coords: &TexCoords,
    ) -> Result<DrawStatus, FilterError> {
        if !self.is_initialized() {
            return Ok(DrawStatus::NotInitialized);
        }
        self.run_pending_tasks(backend)?;

        let mut state = self.state.lock();
        if self.stale.swap(false, Ordering::AcqRel) {
            let merged = Arc::clone(&state.merged);
            match state.chain.rebuild(backend, &merged) {
                Ok(()) => debug!(
                    stages = merged.len(),
                    targets = state.chain.len(),
                    "rebuilt render target chain"
                ),
                Err(err) => {
                    debug!(error = %err, "render target allocation failed, skipping frame");
                    self.stale.store(true, Ordering::Release);
                }
            }
        }

        if state.merged.is_empty() || !state.chain.is_ready() {
            return Ok(DrawStatus::Skipped);
        }

        let count = state.merged.len();
        let mut previous = input;
        for (index, stage) in state.merged.iter().enumerate() {
            let target = state.chain.get(index).copied();
            if let Some(target) = &target {
                backend.bind_target(target.target);
                backend.clear(TRANSPARENT);
            }

            let (quad, coords) = self.coordinates_for(index, count, geometry, tex_coords);
            trace!(index, count, input = ?previous, "drawing stage");
            let result = stage.lock().draw(backend, previous, quad, coords);

            if let Some(target) = &target {
                backend.unbind_target();
                previous = target.texture;
            }
            result?;
        }

        Ok(DrawStatus::Drawn)
    }

    /// Runs this group's queued tasks, then those of every nested group.
    ///
    /// Only the outermost group draws, so nested groups' tasks run here.
    fn run_pending_tasks(&self, backend: &mut B) -> Result<(), FilterError> {
        self.tasks.run_pending(backend)?;
        let groups: Vec<_> = self
            .state
            .lock()
            .filters
            .iter()
            .filter_map(|filter| filter.as_group().cloned())
            .collect();
        for group in groups {
            group.run_pending_tasks(backend)?;
        }
        Ok(())
    }

    /// Geometry and texture coordinates for stage `index` of `count`.
    fn coordinates_for<'a>(
        &'a self,
        index: usize,
        count: usize,
        geometry: &'a Quad,
        tex_coords: &'a TexCoords,
    ) -> (&'a Quad, &'a TexCoords) {
        if index == 0 {
            (geometry, tex_coords)
        } else if index + 1 == count {
            let coords = if count % 2 == 0 {
                &self.flipped_tex_coords
            } else {
                &self.tex_coords
            };
            (&self.geometry, coords)
        } else {
            (&self.geometry, &self.tex_coords)
        }
    }

    /// Releases the render targets and destroys every child.
    ///
    /// Safe to call more than once and on a group that never drew.
    pub fn destroy(&self, backend: &mut B) {
        let mut state = self.state.lock();
        state.chain.release(backend);
        for filter in &state.filters {
            filter.destroy(backend);
        }
        self.initialized.store(false, Ordering::Release);
        self.stale.store(true, Ordering::Release);
    }

    /// The direct child at `index`, or `None` if out of range.
    pub fn filter(&self, index: usize) -> Option<Filter<B>> {
        self.state.lock().filters.get(index).cloned()
    }

    /// A snapshot of the direct children.
    pub fn filters(&self) -> Vec<Filter<B>> {
        self.state.lock().filters.clone()
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.state.lock().filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().filters.is_empty()
    }

    /// The flattened stage list, in draw order.
    ///
    /// The returned slice is a snapshot; later changes to the group do not
    /// affect it.
    pub fn merged_filters(&self) -> Arc<[SharedStage<B>]> {
        Arc::clone(&self.state.lock().merged)
    }

    /// Number of offscreen targets currently allocated.
    pub fn target_count(&self) -> usize {
        self.state.lock().chain.len()
    }

    /// Re-flattens the child tree and schedules the render targets to be rebuilt.
    pub fn update_merged(&self) {
        let mut state = self.state.lock();
        self.update_merged_locked(&mut state);
    }

    fn update_merged_locked(&self, state: &mut GroupState<B>) {
        state.merged = flatten(&state.filters).into();
        self.stale.store(true, Ordering::Release);
    }

    /// Whether `group` appears anywhere below this group.
    fn contains_group(&self, group: *const Self) -> bool {
        self.state.lock().filters.iter().any(|filter| match filter {
            Filter::Stage(_) => false,
            Filter::Group(child) => {
                std::ptr::eq(Arc::as_ptr(child), group) || child.contains_group(group)
            }
        })
    }
}

impl<B: GraphicsBackend + 'static> Default for FilterGroup<B> {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for filter groups with a fluent API.
///
/// ```ignore
/// let group = FilterGroup::builder()
///     .filter(grayscale)
///     .filter(edges)
///     .build();
/// ```
pub struct FilterGroupBuilder<B> {
    filters: Vec<Filter<B>>,
}

impl<B: GraphicsBackend + 'static> FilterGroupBuilder<B> {
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Appends a child. Children run in the order they are added.
    pub fn filter(mut self, filter: impl Into<Filter<B>>) -> Self {
        self.filters.push(filter.into());
        self
    }

    pub fn build(self) -> FilterGroup<B> {
        FilterGroup::with_filters(self.filters)
    }
}

impl<B: GraphicsBackend + 'static> Default for FilterGroupBuilder<B> {
    fn default() -> Self {
        Self::new()
    }
}
