#![forbid(unsafe_code)]

//! Headless three-sided layout for weighted call trees.
//!
//! A run picks one scale factor for the whole tree ([`scale`]), lays the leaves out along the
//! left, bottom and right canvas borders in proportion to their longest paths, and positions
//! every ancestor from its leaves while keeping each edge at its scaled length ([`allocation`]).

pub mod allocation;
pub mod error;
pub mod geom;
pub mod layout;
pub mod node;
pub mod scale;
pub mod settings;
pub mod stem;
pub mod validate;

pub use allocation::{NodeAllocation, Position};
pub use error::{Error, Result};
pub use layout::{Layout, LayoutPoint, LayoutResult, ScaleSummary, SegmentSummary};
pub use node::{LayoutNode, LayoutNodes};
pub use scale::{DecisiveWeight, Scale, ScaleCategory, ScaleDiagnostics};
pub use settings::{CoordinateGenerator, LayoutSettings, PlacementMode};
pub use stem::{ScaledStem, Stem, TotalStemLength};

pub use narwhal_tree as tree;

/// Lays out the whole of `tree` in one call.
pub fn layout(tree: &tree::Tree, settings: &LayoutSettings) -> Result<LayoutResult> {
    Layout::new(tree, settings.clone())?.generate()
}
