//! Filter groups: nested, multi-pass filter pipelines.
//!
//! A [`FilterGroup`] runs an ordered list of children (stages or further
//! groups) as one pipeline. Each frame it feeds the previous stage's output
//! into the next stage through a chain of offscreen render targets, with the
//! final stage drawing into whatever output the caller has bound:
//!
//! ```text
//!  input ──▶ stage 0 ──▶ target 0 ──▶ stage 1 ──▶ target 1 ──▶ stage 2 ──▶ output
//! ```
//!
//! # Composition
//!
//! Groups nest. Before drawing, the tree is flattened to its leaf stages in
//! depth-first order (the "merged" list), so a group inside a group costs
//! nothing extra at draw time:
//!
//! ```text
//! group[A, group[], group[B, C]]   ──flatten──▶   [A, B, C]
//! ```
//!
//! # Threading
//!
//! Children may be added and the group resized from any thread while another
//! thread draws. Mutations only mark the render targets stale; the targets
//! are rebuilt by the next `draw`, on the thread that owns the graphics
//! context.
//!
//! # Example
//!
//! ```ignore
//! let group = FilterGroup::builder()
//!     .filter(Filter::stage(GrayscaleStage::new()))
//!     .filter(edges.filter())                    // a nested group
//!     .build();
//!
//! group.init(&mut backend)?;
//! group.resize(width, height);
//!
//! // Per frame, on the render thread:
//! group.draw(&mut backend, input, &Quad::CUBE, &TexCoords::NO_ROTATION)?;
//! ```

mod chain;
mod filter_group;
mod flatten;
mod tasks;

pub use chain::{OffscreenTarget, RenderTargetChain};
pub use filter_group::{DrawStatus, FilterGroup, FilterGroupBuilder};
