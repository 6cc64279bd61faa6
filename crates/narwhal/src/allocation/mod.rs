//! Node allocation: weights to 1D perimeter space, then 1D space plus topology to 2D.
//!
//! [`NodeAllocation::process`] runs five phases in order, each reading what the previous one
//! wrote into the per-node [`Position`] records:
//!
//! 1. unit conversion (share of the perimeter per leaf, via [`Hierarchy`]),
//! 2. 1D offsets (leaves in display order, one [`SpaceBlock`] each),
//! 3. 2D leaf coordinates (offset projected onto the owning segment),
//! 4. 2D midpoint coordinates (top-down, from descendant leaf centroids),
//! 5. leaf re-anchoring (length-constrained mode only).

pub mod hierarchy;
pub mod perimeter;

pub use hierarchy::{Clump, ClumpKey, Hierarchy, HierarchyLevel};
pub use perimeter::{PerimeterBounds, Segment, SpaceBlock};

use crate::error::{Error, Result};
use crate::geom::{Point, centroid, point, point_towards};
use crate::node::{LayoutNode, LayoutNodes};
use crate::scale::Scale;
use crate::settings::{LayoutSettings, PlacementMode};
use crate::validate::{StatOptions, validate_coordinate, validate_stat};
use indexmap::IndexMap;
use serde::Serialize;

/// Minimum top clearance, as a share of the final canvas height.
pub const TOP_CLEARANCE_RATIO: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Position {
    /// Fraction of the perimeter granted to the node.
    pub units: f64,
    /// Center of the leaf's block in 1D space; always `None` for midpoints.
    pub offset: Option<f64>,
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn point(&self) -> Point {
        point(self.x, self.y)
    }
}

pub struct NodeAllocation<'a> {
    layout_nodes: &'a LayoutNodes,
    scale: &'a Scale,
    settings: &'a LayoutSettings,
    leaves: Vec<&'a str>,
    midpoints: Vec<&'a str>,
    roots: Vec<&'a str>,
    segments: Vec<Segment>,
    total_length: f64,
    positions: IndexMap<String, Position>,
}

impl<'a> NodeAllocation<'a> {
    pub fn new(
        layout_nodes: &'a LayoutNodes,
        scale: &'a Scale,
        settings: &'a LayoutSettings,
    ) -> Result<Self> {
        let mut leaves = Vec::new();
        let mut midpoints = Vec::new();
        let mut roots = Vec::new();
        for (id, layout_node) in layout_nodes {
            check_parent(layout_nodes, layout_node)?;
            if layout_node.is_leaf() {
                leaves.push(id.as_str());
            } else {
                midpoints.push(id.as_str());
                if layout_node.parent.is_none() {
                    roots.push(id.as_str());
                }
            }
        }

        let final_height = scale.final_svg_height();
        let largest_root = roots
            .iter()
            .filter_map(|id| layout_nodes.get(*id))
            .map(|n| n.stem.scaled(scale).own_diameter)
            .fold(0.0, f64::max);
        let clearance = (final_height * TOP_CLEARANCE_RATIO).max(largest_root);
        let edge = settings.svg_distance_from_edge;
        let bounds = PerimeterBounds {
            left: edge,
            right: settings.svg_width - edge,
            top: edge + clearance,
            bottom: final_height - edge,
        };
        let positive = StatOptions { above_zero: true };
        validate_stat(bounds.right - bounds.left, "perimeter width", positive)?;
        validate_stat(bounds.bottom - bounds.top, "perimeter height", positive)?;

        let segments = perimeter::lay_end_to_end(perimeter::perimeter_lines(
            settings.coordinate_generator,
            &bounds,
        ));
        let total_length = validate_stat(
            segments.last().map_or(0.0, |s| s.end),
            "perimeter length",
            positive,
        )?;

        Ok(Self {
            layout_nodes,
            scale,
            settings,
            leaves,
            midpoints,
            roots,
            segments,
            total_length,
            positions: layout_nodes
                .keys()
                .map(|id| (id.clone(), Position::default()))
                .collect(),
        })
    }

    /// Leaf ids in display order.
    pub fn leaves(&self) -> &[&'a str] {
        &self.leaves
    }

    pub fn midpoints(&self) -> &[&'a str] {
        &self.midpoints
    }

    /// Midpoints whose parent is not part of this run.
    pub fn roots(&self) -> &[&'a str] {
        &self.roots
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn total_length(&self) -> f64 {
        self.total_length
    }

    pub fn positions(&self) -> &IndexMap<String, Position> {
        &self.positions
    }

    pub fn position(&self, id: &str) -> Option<&Position> {
        self.positions.get(id)
    }

    /// Final `{x, y}` per node, in display order.
    pub fn finalized(&self) -> IndexMap<String, Point> {
        self.positions
            .iter()
            .map(|(id, p)| (id.clone(), p.point()))
            .collect()
    }

    pub fn process(&mut self, mode: PlacementMode) -> Result<()> {
        self.calculate_units()?;
        self.calculate_offsets()?;
        self.calculate_leaf_coordinates()?;
        self.calculate_midpoint_coordinates(mode)?;
        if mode == PlacementMode::LengthConstrained {
            self.reanchor_leaves()?;
        }
        Ok(())
    }

    /// Clump index over the current leaves at the current scale.
    pub fn build_hierarchy(&self) -> Result<Hierarchy> {
        let mut hierarchy = Hierarchy::new();
        let mut chain: Vec<&str> = Vec::new();
        for &leaf_id in &self.leaves {
            let leaf = self.layout_node(leaf_id)?;
            chain.clear();
            chain.extend(
                leaf.stem
                    .ancestors
                    .ids
                    .iter()
                    .map(String::as_str)
                    .filter(|id| self.layout_nodes.contains_key(*id)),
            );
            chain.push(leaf_id);

            let length = leaf
                .stem
                .total_stem_length(self.scale.scale_factor())
                .combined;
            hierarchy.add_leaf(
                &chain,
                validate_stat(length, "total stem length", StatOptions::default())?,
            );
        }
        hierarchy.assign_units();
        Ok(hierarchy)
    }

    fn calculate_units(&mut self) -> Result<()> {
        let hierarchy = self.build_hierarchy()?;
        for (id, position) in self.positions.iter_mut() {
            if let Some(units) = hierarchy.total_units(id) {
                position.units = validate_stat(units, "units", StatOptions::default())?;
            }
        }
        Ok(())
    }

    fn calculate_offsets(&mut self) -> Result<()> {
        for segment in &mut self.segments {
            segment.blocks.clear();
        }

        let mut cursor = 0.0;
        for &leaf_id in &self.leaves {
            let position = self
                .positions
                .get_mut(leaf_id)
                .ok_or_else(|| Error::structural(leaf_id, "leaf has no position record"))?;
            let block = SpaceBlock {
                leaf_id: leaf_id.to_string(),
                start: cursor,
                end: cursor + position.units * self.total_length,
            };
            cursor = block.end;

            let offset = validate_stat(block.center(), "offset", StatOptions::default())?;
            position.offset = Some(offset);
            let index = perimeter::owning_segment(&self.segments, offset)
                .ok_or_else(|| Error::structural(leaf_id, "perimeter has no segments"))?;
            self.segments[index].blocks.push(block);
        }
        Ok(())
    }

    fn calculate_leaf_coordinates(&mut self) -> Result<()> {
        let mut placed = Vec::with_capacity(self.leaves.len());
        for segment in &self.segments {
            for block in &segment.blocks {
                let p = segment.line.point_at_length(block.center() - segment.start);
                placed.push((block.leaf_id.clone(), p));
            }
        }
        for (leaf_id, p) in placed {
            self.set_point(&leaf_id, p)?;
        }
        Ok(())
    }

    fn calculate_midpoint_coordinates(&mut self, mode: PlacementMode) -> Result<()> {
        // Parents sit higher in the tree, so sorting by depth places them first.
        let mut order = self.midpoints.clone();
        order.sort_by_key(|id| {
            self.layout_nodes
                .get(*id)
                .map_or(0, |n| n.stem.ancestors.ids.len())
        });

        for id in order {
            let midpoint = self.layout_node(id)?;
            let scaled = midpoint.stem.scaled(self.scale);
            let p = match midpoint.parent.as_deref() {
                None => self.root_anchor(scaled.own_radius()),
                Some(parent_id) => {
                    let leaf_centroid = self.leaf_centroid(midpoint)?;
                    let parent_point = self.point_of(parent_id)?;
                    match mode {
                        PlacementMode::LengthConstrained => {
                            let parent_radius = self
                                .layout_node(parent_id)?
                                .stem
                                .scaled(self.scale)
                                .own_radius();
                            point_towards(
                                parent_point,
                                leaf_centroid,
                                parent_radius + scaled.own_between + scaled.own_radius(),
                            )
                        }
                        PlacementMode::Spider => parent_point.lerp(leaf_centroid, 0.5),
                    }
                }
            };
            self.set_point(id, p)?;
        }
        Ok(())
    }

    fn reanchor_leaves(&mut self) -> Result<()> {
        let leaves = self.leaves.clone();
        for leaf_id in leaves {
            let leaf = self.layout_node(leaf_id)?;
            let scaled = leaf.stem.scaled(self.scale);
            let raw = self.point_of(leaf_id)?;
            let (anchor, anchor_radius) = match leaf.parent.as_deref() {
                Some(parent_id) => (
                    self.point_of(parent_id)?,
                    self.layout_node(parent_id)?
                        .stem
                        .scaled(self.scale)
                        .own_radius(),
                ),
                // The parent is outside this run: hang the leaf from a stand-in root its own size.
                None => (
                    self.root_anchor(scaled.own_radius()),
                    scaled.own_radius(),
                ),
            };
            let p = point_towards(
                anchor,
                raw,
                anchor_radius + scaled.own_between + scaled.own_radius(),
            );
            self.set_point(leaf_id, p)?;
        }
        Ok(())
    }

    fn root_anchor(&self, radius: f64) -> Point {
        point(
            self.settings.svg_width / 2.0,
            self.settings.svg_distance_from_edge + radius,
        )
    }

    fn leaf_centroid(&self, midpoint: &LayoutNode) -> Result<Point> {
        let points: Vec<Point> = midpoint
            .stem
            .leaves
            .iter()
            .filter_map(|id| self.positions.get(id.as_str()))
            .map(Position::point)
            .collect();
        validate_stat(
            points.len() as f64,
            &format!("descendant leaf count of {}", midpoint.id()),
            StatOptions { above_zero: true },
        )?;
        centroid(points).ok_or_else(|| Error::structural(midpoint.id(), "no descendant leaves"))
    }

    fn layout_node(&self, id: &str) -> Result<&'a LayoutNode> {
        self.layout_nodes
            .get(id)
            .ok_or_else(|| Error::structural(id, "node is not in the active subset"))
    }

    fn point_of(&self, id: &str) -> Result<Point> {
        self.positions
            .get(id)
            .map(Position::point)
            .ok_or_else(|| Error::structural(id, "node has no position record"))
    }

    fn set_point(&mut self, id: &str, p: Point) -> Result<()> {
        let x = validate_coordinate(p.x, &format!("x of {id}"))?;
        let y = validate_coordinate(p.y, &format!("y of {id}"))?;
        let position = self
            .positions
            .get_mut(id)
            .ok_or_else(|| Error::structural(id, "node has no position record"))?;
        position.x = x;
        position.y = y;
        Ok(())
    }
}

fn check_parent(layout_nodes: &LayoutNodes, layout_node: &LayoutNode) -> Result<()> {
    let id = layout_node.id();
    let tree_parent = layout_node.node.parent_id.as_deref();
    match layout_node.parent.as_deref() {
        Some(parent_id) => {
            if tree_parent != Some(parent_id) {
                return Err(Error::structural(
                    id,
                    format!("recorded parent {parent_id} is not the tree parent"),
                ));
            }
            if !layout_nodes.contains_key(parent_id) {
                return Err(Error::structural(
                    id,
                    format!("parent {parent_id} is not in the active subset"),
                ));
            }
        }
        None => {
            if let Some(parent_id) = tree_parent.filter(|p| layout_nodes.contains_key(*p)) {
                return Err(Error::structural(
                    id,
                    format!("declared root has its parent {parent_id} in the active subset"),
                ));
            }
        }
    }
    Ok(())
}
