//! One layout run: stems, scale, allocation, result.

use crate::allocation::NodeAllocation;
use crate::error::Result;
use crate::node::{LayoutNodes, collect_layout_nodes};
use crate::scale::{DecisiveWeight, MIN_SCALE_FACTOR, Scale};
use crate::settings::LayoutSettings;
use indexmap::IndexMap;
use narwhal_tree::Tree;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleSummary {
    pub scale_factor: f64,
    pub final_svg_height: f64,
    pub decisive_weight: Option<DecisiveWeight>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentSummary {
    pub label: Option<String>,
    pub start: LayoutPoint,
    pub end: LayoutPoint,
    pub leaf_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResult {
    pub svg_width: f64,
    pub svg_height: f64,
    pub scale: ScaleSummary,
    pub positions: IndexMap<String, LayoutPoint>,
    pub segments: Vec<SegmentSummary>,
}

#[derive(Debug, Clone)]
pub struct Layout {
    settings: LayoutSettings,
    layout_nodes: LayoutNodes,
    scale: Scale,
}

impl Layout {
    /// Lays out every node of `tree`.
    pub fn new(tree: &Tree, settings: LayoutSettings) -> Result<Self> {
        let ids = tree.depth_first_ids();
        Self::with_subset(tree, ids.iter().map(String::as_str), settings)
    }

    /// Lays out only `ids`; nodes whose parent is left out become roots of the run.
    pub fn with_subset<'a, I>(tree: &Tree, ids: I, settings: LayoutSettings) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        settings.validate()?;
        let layout_nodes = collect_layout_nodes(tree, ids, &settings)?;
        let scale = Scale::new(&settings);
        Ok(Self {
            settings,
            layout_nodes,
            scale,
        })
    }

    pub fn settings(&self) -> &LayoutSettings {
        &self.settings
    }

    pub fn layout_nodes(&self) -> &LayoutNodes {
        &self.layout_nodes
    }

    /// Mutable access for callers that adjust stems before generating.
    pub fn layout_nodes_mut(&mut self) -> &mut LayoutNodes {
        &mut self.layout_nodes
    }

    pub fn scale(&self) -> &Scale {
        &self.scale
    }

    pub fn generate(&mut self) -> Result<LayoutResult> {
        let span = tracing::debug_span!("narwhal.layout", nodes = self.layout_nodes.len());
        let _enter = span.enter();

        self.scale.calculate_scale_factor(&self.layout_nodes)?;
        if let Some(decisive) = self.scale.decisive_weight() {
            tracing::debug!(
                category = %decisive.category,
                scale_factor = self.scale.scale_factor(),
                final_svg_height = self.scale.final_svg_height(),
                candidates = self.scale.candidates().len(),
                "selected scale factor"
            );
            if decisive.scale_factor <= MIN_SCALE_FACTOR {
                tracing::warn!(
                    category = %decisive.category,
                    "fixed per-node lengths alone exceed the canvas; scalable lengths collapsed"
                );
            }
        }

        let mut allocation = NodeAllocation::new(&self.layout_nodes, &self.scale, &self.settings)?;
        allocation.process(self.settings.placement_mode)?;
        tracing::debug!(
            leaves = allocation.leaves().len(),
            midpoints = allocation.midpoints().len(),
            roots = allocation.roots().len(),
            perimeter = allocation.total_length(),
            mode = ?self.settings.placement_mode,
            "allocated nodes"
        );

        let positions = allocation
            .finalized()
            .into_iter()
            .map(|(id, p)| (id, LayoutPoint { x: p.x, y: p.y }))
            .collect();
        let segments = allocation
            .segments()
            .iter()
            .map(|s| SegmentSummary {
                label: s.line.label.clone(),
                start: LayoutPoint {
                    x: s.line.start.x,
                    y: s.line.start.y,
                },
                end: LayoutPoint {
                    x: s.line.end.x,
                    y: s.line.end.y,
                },
                leaf_ids: s.blocks.iter().map(|b| b.leaf_id.clone()).collect(),
            })
            .collect();

        Ok(LayoutResult {
            svg_width: self.settings.svg_width,
            svg_height: self.scale.final_svg_height(),
            scale: ScaleSummary {
                scale_factor: self.scale.scale_factor(),
                final_svg_height: self.scale.final_svg_height(),
                decisive_weight: self.scale.decisive_weight().cloned(),
            },
            positions,
            segments,
        })
    }
}
