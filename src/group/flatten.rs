//! Flattening a tree of filters into the ordered list of stages that runs.

use crate::backend::GraphicsBackend;
use crate::filter::Filter;
use crate::stage::SharedStage;

/// Expands `children` depth-first into their leaf stages.
///
/// Nested groups are re-flattened first and replaced by their own merged
/// lists; empty groups contribute nothing.
pub(crate) fn flatten<B: GraphicsBackend + 'static>(children: &[Filter<B>]) -> Vec<SharedStage<B>> {
    let mut merged = Vec::with_capacity(children.len());
    for child in children {
        match child {
            Filter::Stage(stage) => merged.push(stage.clone()),
            Filter::Group(group) => {
                group.update_merged();
                merged.extend(group.merged_filters().iter().cloned());
            }
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::FilterGroup;
    use crate::testing::{RecordingBackend, RecordingStage};

    fn stage(label: &str) -> SharedStage<RecordingBackend> {
        SharedStage::new(RecordingStage::new(label, 8, 8).0)
    }

    fn labels(stages: &[SharedStage<RecordingBackend>]) -> Vec<String> {
        stages.iter().map(SharedStage::label).collect()
    }

    #[test]
    fn nested_groups_flatten_depth_first() {
        let a = stage("a");
        let b = stage("b");
        let c = stage("c");
        let empty = FilterGroup::<RecordingBackend>::new();
        let inner = FilterGroup::with_filters([b.clone(), c.clone()]);

        let children = vec![Filter::Stage(a.clone()), empty.into(), inner.into()];
        let merged = flatten(&children);

        assert_eq!(labels(&merged), ["a", "b", "c"]);
        assert!(merged[0].ptr_eq(&a));
        assert!(merged[1].ptr_eq(&b));
        assert!(merged[2].ptr_eq(&c));
    }

    #[test]
    fn deeply_nested_groups_keep_order() {
        let deepest = FilterGroup::with_filters([stage("c"), stage("d")]);
        let middle = FilterGroup::builder()
            .filter(stage("b"))
            .filter(deepest)
            .build();
        let children = vec![
            Filter::Stage(stage("a")),
            middle.into(),
            Filter::Stage(stage("e")),
        ];

        assert_eq!(labels(&flatten(&children)), ["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn only_empty_groups_yield_nothing() {
        let children: Vec<Filter<RecordingBackend>> = vec![
            FilterGroup::new().into(),
            FilterGroup::with_filters([FilterGroup::<RecordingBackend>::new()]).into(),
        ];
        assert!(flatten(&children).is_empty());
    }

    #[test]
    fn flatten_is_idempotent() {
        let inner = FilterGroup::with_filters([stage("b"), stage("c")]);
        let children = vec![Filter::Stage(stage("a")), inner.into()];

        let first = flatten(&children);
        let second = flatten(&children);

        assert_eq!(first.len(), second.len());
        assert!(first.iter().zip(&second).all(|(x, y)| x.ptr_eq(y)));
    }
}
