//! Pipeline tree nodes.

use std::sync::Arc;

use crate::FilterError;
use crate::backend::GraphicsBackend;
use crate::group::FilterGroup;
use crate::stage::{SharedStage, Stage, StageHandle};

/// A child of a [`FilterGroup`]: either a single stage or a nested group.
///
/// Groups nest arbitrarily deep. At draw time the tree is flattened to the
/// leaf stages in depth-first order.
pub enum Filter<B> {
    Stage(SharedStage<B>),
    Group(Arc<FilterGroup<B>>),
}

impl<B: GraphicsBackend + 'static> Filter<B> {
    /// Wraps a bare stage. Use a [`StageHandle`] instead if you need to reach
    /// the stage again later.
    pub fn stage<S: Stage<B> + 'static>(stage: S) -> Self {
        Filter::Stage(SharedStage::new(stage))
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Filter::Group(_))
    }

    pub fn as_stage(&self) -> Option<&SharedStage<B>> {
        match self {
            Filter::Stage(stage) => Some(stage),
            Filter::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&Arc<FilterGroup<B>>> {
        match self {
            Filter::Stage(_) => None,
            Filter::Group(group) => Some(group),
        }
    }

    pub(crate) fn init(&self, backend: &mut B) -> Result<(), FilterError> {
        match self {
            Filter::Stage(stage) => stage.lock().init(backend),
            Filter::Group(group) => group.init(backend),
        }
    }

    pub(crate) fn resize(&self, width: u32, height: u32) {
        match self {
            Filter::Stage(stage) => stage.lock().stage_mut().resize(width, height),
            Filter::Group(group) => group.resize(width, height),
        }
    }

    pub(crate) fn destroy(&self, backend: &mut B) {
        match self {
            Filter::Stage(stage) => stage.lock().release(backend),
            Filter::Group(group) => group.destroy(backend),
        }
    }
}

impl<B> Clone for Filter<B> {
    fn clone(&self) -> Self {
        match self {
            Filter::Stage(stage) => Filter::Stage(stage.clone()),
            Filter::Group(group) => Filter::Group(Arc::clone(group)),
        }
    }
}

impl<B> std::fmt::Debug for Filter<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Filter::Stage(stage) => f.debug_tuple("Stage").field(stage).finish(),
            Filter::Group(group) => f
                .debug_tuple("Group")
                .field(&Arc::as_ptr(group).cast::<()>())
                .finish(),
        }
    }
}

impl<B> From<SharedStage<B>> for Filter<B> {
    fn from(stage: SharedStage<B>) -> Self {
        Filter::Stage(stage)
    }
}

impl<B, S: Stage<B> + 'static> From<StageHandle<S>> for Filter<B> {
    fn from(handle: StageHandle<S>) -> Self {
        Filter::Stage(handle.shared())
    }
}

impl<B> From<Arc<FilterGroup<B>>> for Filter<B> {
    fn from(group: Arc<FilterGroup<B>>) -> Self {
        Filter::Group(group)
    }
}

impl<B> From<FilterGroup<B>> for Filter<B> {
    fn from(group: FilterGroup<B>) -> Self {
        Filter::Group(Arc::new(group))
    }
}
