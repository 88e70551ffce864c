//! Threshold edge detection: grayscale followed by a Sobel threshold.

use std::sync::Arc;

use crate::filter::Filter;
use crate::group::FilterGroup;
use crate::stage::{SharedStage, StageHandle};
use crate::stages::{GrayscaleStage, SobelThresholdStage};
use crate::wgpu_backend::WgpuBackend;

/// A two-stage filter group producing black edges on white.
///
/// Keeps a typed handle to its Sobel stage so the tuning setters reach it
/// directly. Nest it in a larger pipeline with [`filter`](Self::filter).
pub struct ThresholdEdgeDetection {
    group: Arc<FilterGroup<WgpuBackend>>,
    sobel: StageHandle<SobelThresholdStage>,
}

impl ThresholdEdgeDetection {
    pub fn new() -> Self {
        let sobel = StageHandle::new(SobelThresholdStage::new());
        let group = FilterGroup::builder()
            .filter(StageHandle::new(GrayscaleStage::new()))
            .filter(sobel.clone())
            .build();
        Self {
            group: Arc::new(group),
            sobel,
        }
    }

    pub fn line_size(&self) -> f32 {
        self.sobel.lock().line_size()
    }

    pub fn set_line_size(&self, line_size: f32) {
        self.sobel.lock().set_line_size(line_size);
    }

    pub fn threshold(&self) -> f32 {
        self.sobel.lock().threshold()
    }

    pub fn set_threshold(&self, threshold: f32) {
        self.sobel.lock().set_threshold(threshold);
    }

    pub fn group(&self) -> &Arc<FilterGroup<WgpuBackend>> {
        &self.group
    }

    /// The Sobel stage as stored in the group.
    pub fn sobel(&self) -> SharedStage<WgpuBackend> {
        self.sobel.shared()
    }

    /// This detector as a child for another group.
    pub fn filter(&self) -> Filter<WgpuBackend> {
        Filter::Group(Arc::clone(&self.group))
    }
}

impl Default for ThresholdEdgeDetection {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&ThresholdEdgeDetection> for Filter<WgpuBackend> {
    fn from(edges: &ThresholdEdgeDetection) -> Self {
        edges.filter()
    }
}
