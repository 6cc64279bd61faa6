//! Per-node length model.
//!
//! A node's visual path from the root is split into a scalable part (edge weights and circle
//! diameters, multiplied by the scale factor) and an absolute part (labels and line width, fixed
//! in pixels). Ancestor totals are taken over the full tree, not the active subset, so a node's
//! stem is the same whichever subset it is laid out in.

use crate::error::Result;
use crate::scale::Scale;
use crate::settings::LayoutSettings;
use crate::validate::{StatOptions, validate_stat};
use indexmap::IndexSet;
use narwhal_tree::{Node, Tree};
use serde::Serialize;

/// Unscaled lengths of the node itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RawStem {
    pub own_between: f64,
    /// Diameter of the circle whose circumference is the node's `within` weight.
    pub own_diameter: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StemAncestors {
    /// Root first, direct parent last.
    pub ids: Vec<String>,
    pub total_between: f64,
    pub total_diameter: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TotalStemLength {
    pub scalable: f64,
    pub absolute: f64,
    pub combined: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaledStem {
    pub own_diameter: f64,
    pub own_between: f64,
}

impl ScaledStem {
    pub fn own_radius(&self) -> f64 {
        self.own_diameter / 2.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stem {
    pub raw: RawStem,
    pub ancestors: StemAncestors,
    /// Descendant leaf ids in display order; a leaf lists itself.
    pub leaves: IndexSet<String>,
    absolute_per_node: f64,
}

impl Stem {
    pub fn new(tree: &Tree, node: &Node, settings: &LayoutSettings) -> Result<Self> {
        let raw = raw_stem(node)?;

        let ids = tree.ancestor_ids(&node.id)?;
        let mut total_between = 0.0;
        let mut total_diameter = 0.0;
        for id in &ids {
            let Some(ancestor) = tree.node(id) else {
                continue;
            };
            let ancestor_raw = raw_stem(ancestor)?;
            total_between += ancestor_raw.own_between;
            total_diameter += ancestor_raw.own_diameter;
        }

        Ok(Self {
            raw,
            ancestors: StemAncestors {
                ids,
                total_between,
                total_diameter,
            },
            leaves: tree.descendant_leaf_ids(&node.id)?,
            absolute_per_node: validate_stat(
                settings.absolute_length_per_node(),
                "absolute length per node",
                StatOptions::default(),
            )?,
        })
    }

    /// Number of nodes on the path from the root down to this node, inclusive.
    pub fn path_len(&self) -> usize {
        self.ancestors.ids.len() + 1
    }

    pub fn total_stem_length(&self, scale_factor: f64) -> TotalStemLength {
        let scalable = self.ancestors.total_between
            + self.ancestors.total_diameter
            + self.raw.own_between
            + self.raw.own_diameter;
        let absolute = self.path_len() as f64 * self.absolute_per_node;
        TotalStemLength {
            scalable,
            absolute,
            combined: absolute + scalable * scale_factor,
        }
    }

    pub fn scaled(&self, scale: &Scale) -> ScaledStem {
        ScaledStem {
            own_diameter: scale.line_length(self.raw.own_diameter),
            own_between: scale.line_length(self.raw.own_between) + self.absolute_per_node,
        }
    }
}

fn raw_stem(node: &Node) -> Result<RawStem> {
    let opts = StatOptions::default();
    Ok(RawStem {
        own_between: validate_stat(node.between, "between", opts)?,
        own_diameter: validate_stat(node.within / std::f64::consts::PI, "own diameter", opts)?,
    })
}

#[cfg(test)]
mod tests {
    use super::Stem;
    use crate::settings::LayoutSettings;
    use narwhal_tree::{Node, Tree};
    use std::f64::consts::PI;

    fn tree() -> Tree {
        let mut t = Tree::new();
        t.insert(Node::new("r", None, 2.0, PI * 4.0)).unwrap();
        t.insert(Node::new("r/a", Some("r"), 10.0, PI)).unwrap();
        t
    }

    #[test]
    fn stem_sums_ancestor_lengths() {
        let t = tree();
        let settings = LayoutSettings {
            label_minimum_space: 1.0,
            line_width: 0.5,
            ..Default::default()
        };
        let stem = Stem::new(&t, t.node("r/a").unwrap(), &settings).unwrap();

        assert_eq!(stem.ancestors.ids, vec!["r"]);
        assert!((stem.raw.own_diameter - 1.0).abs() < 1e-12);
        assert!((stem.ancestors.total_diameter - 4.0).abs() < 1e-12);

        let total = stem.total_stem_length(2.0);
        assert!((total.scalable - 17.0).abs() < 1e-12);
        assert_eq!(total.absolute, 5.0);
        assert!((total.combined - 39.0).abs() < 1e-12);
    }

    #[test]
    fn midpoint_stem_lists_descendant_leaves() {
        let t = tree();
        let stem = Stem::new(&t, t.node("r").unwrap(), &LayoutSettings::default()).unwrap();
        assert_eq!(stem.leaves.iter().collect::<Vec<_>>(), vec!["r/a"]);
        assert_eq!(stem.path_len(), 1);
    }
}
