//! Per-depth clump index used to turn worst-case leaf lengths into shares of the perimeter.
//!
//! Clumps live in one arena per depth; parent/child links are [`ClumpKey`] lookups into the
//! arena, so the whole structure is dropped in one go once units are assigned.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClumpKey {
    pub depth: usize,
    pub index: usize,
}

/// Aggregate of one node's leaves at one depth.
#[derive(Debug, Clone, PartialEq)]
pub struct Clump {
    pub id: String,
    pub parent: Option<ClumpKey>,
    pub children: Vec<ClumpKey>,
    /// Longest total stem length among the leaves beneath.
    pub longest: f64,
    /// Share of the parent clump; siblings sum to 1.
    pub units: f64,
    /// Share of the whole perimeter.
    pub total_units: f64,
}

#[derive(Debug, Clone, Default)]
pub struct HierarchyLevel {
    clumps: Vec<Clump>,
    by_id: FxHashMap<String, usize>,
}

impl HierarchyLevel {
    pub fn clumps(&self) -> &[Clump] {
        &self.clumps
    }

    pub fn get(&self, id: &str) -> Option<&Clump> {
        self.by_id.get(id).map(|&i| &self.clumps[i])
    }
}

#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    levels: Vec<HierarchyLevel>,
    leaves: IndexMap<String, ClumpKey>,
}

impl Hierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn levels(&self) -> &[HierarchyLevel] {
        &self.levels
    }

    pub fn clump(&self, key: ClumpKey) -> &Clump {
        &self.levels[key.depth].clumps[key.index]
    }

    /// Registers one leaf. `chain` lists the leaf's ancestors present in the run, root first,
    /// and ends with the leaf itself; depth is the position in that chain.
    pub fn add_leaf(&mut self, chain: &[&str], length: f64) {
        let mut parent = None;
        for (depth, id) in chain.iter().enumerate() {
            let key = self.get_or_insert(depth, id, parent);
            let clump = self.clump_mut(key);
            clump.longest = clump.longest.max(length);
            parent = Some(key);
        }
        if let (Some(key), Some(leaf_id)) = (parent, chain.last()) {
            self.leaves.insert((*leaf_id).to_string(), key);
        }
    }

    /// Splits the perimeter top-down: each sibling group shares its parent's space in
    /// proportion to the longest leaf beneath each sibling.
    pub fn assign_units(&mut self) {
        let Some(top) = self.levels.first_mut() else {
            return;
        };
        let tops: Vec<f64> = top.clumps.iter().map(|c| c.longest).collect();
        for (clump, share) in top.clumps.iter_mut().zip(shares(&tops)) {
            clump.units = share;
            clump.total_units = share;
        }

        for depth in 0..self.levels.len() {
            for index in 0..self.levels[depth].clumps.len() {
                let parent = &self.levels[depth].clumps[index];
                if parent.children.is_empty() {
                    continue;
                }
                let parent_total = parent.total_units;
                let children = parent.children.clone();
                let lengths: Vec<f64> = children.iter().map(|k| self.clump(*k).longest).collect();
                for (key, share) in children.into_iter().zip(shares(&lengths)) {
                    let child = self.clump_mut(key);
                    child.units = share;
                    child.total_units = parent_total * share;
                }
            }
        }
    }

    /// Perimeter share of the node `id`, at whichever depth it sits.
    pub fn total_units(&self, id: &str) -> Option<f64> {
        self.levels
            .iter()
            .find_map(|level| level.get(id))
            .map(|c| c.total_units)
    }

    pub fn leaf_units(&self, leaf_id: &str) -> Option<f64> {
        self.leaves
            .get(leaf_id)
            .map(|&key| self.clump(key).total_units)
    }

    /// Clumps sharing `parent` (`None` for the top level).
    pub fn siblings(&self, parent: Option<ClumpKey>) -> Vec<&Clump> {
        match parent {
            Some(key) => self
                .clump(key)
                .children
                .iter()
                .map(|k| self.clump(*k))
                .collect(),
            None => self
                .levels
                .first()
                .map(|l| l.clumps.iter().collect())
                .unwrap_or_default(),
        }
    }

    fn clump_mut(&mut self, key: ClumpKey) -> &mut Clump {
        &mut self.levels[key.depth].clumps[key.index]
    }

    fn get_or_insert(&mut self, depth: usize, id: &str, parent: Option<ClumpKey>) -> ClumpKey {
        if self.levels.len() <= depth {
            self.levels.resize_with(depth + 1, HierarchyLevel::default);
        }
        let level = &mut self.levels[depth];
        if let Some(&index) = level.by_id.get(id) {
            return ClumpKey { depth, index };
        }

        let index = level.clumps.len();
        level.clumps.push(Clump {
            id: id.to_string(),
            parent,
            children: Vec::new(),
            longest: 0.0,
            units: 0.0,
            total_units: 0.0,
        });
        level.by_id.insert(id.to_string(), index);

        let key = ClumpKey { depth, index };
        if let Some(parent) = parent {
            self.clump_mut(parent).children.push(key);
        }
        key
    }
}

/// Proportional shares of `lengths`; an all-zero group splits evenly.
fn shares(lengths: &[f64]) -> Vec<f64> {
    let sum: f64 = lengths.iter().sum();
    if sum > 0.0 && sum.is_finite() {
        lengths.iter().map(|l| l / sum).collect()
    } else {
        let even = 1.0 / lengths.len().max(1) as f64;
        vec![even; lengths.len()]
    }
}
