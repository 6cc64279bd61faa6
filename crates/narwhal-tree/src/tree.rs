use crate::error::{Error, Result};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: String,
    pub parent_id: Option<String>,
    /// Child ids in display order.
    pub children: Vec<String>,
    pub between: f64,
    pub within: f64,
}

impl Node {
    pub fn new(id: impl Into<String>, parent_id: Option<&str>, between: f64, within: f64) -> Self {
        Self {
            id: id.into(),
            parent_id: parent_id.map(str::to_string),
            children: Vec::new(),
            between,
            within,
        }
    }

    /// Aggregated weight of the node (edge plus own time).
    pub fn weight(&self) -> f64 {
        self.between + self.within
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Insertion-ordered tree index.
///
/// Parents must be inserted before their children, which keeps every lookup below acyclic
/// without a separate validation pass.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: IndexMap<String, Node>,
    roots: Vec<String>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, mut node: Node) -> Result<()> {
        check_weight(&node.id, "between", node.between)?;
        check_weight(&node.id, "within", node.within)?;
        if self.nodes.contains_key(&node.id) {
            return Err(Error::DuplicateId { id: node.id });
        }

        match node.parent_id.as_deref() {
            Some(parent_id) => {
                let Some(parent) = self.nodes.get_mut(parent_id) else {
                    return Err(Error::UnknownParent {
                        id: node.id,
                        parent_id: parent_id.to_string(),
                    });
                };
                parent.children.push(node.id.clone());
            }
            None => self.roots.push(node.id.clone()),
        }

        node.children.clear();
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    pub fn parent_of(&self, node: &Node) -> Option<&Node> {
        node.parent_id.as_deref().and_then(|id| self.nodes.get(id))
    }

    /// Ancestor ids ordered from the root down to the direct parent.
    pub fn ancestor_ids(&self, id: &str) -> Result<Vec<String>> {
        let mut cur = self.get(id)?;
        let mut out = Vec::new();
        while let Some(parent) = self.parent_of(cur) {
            out.push(parent.id.clone());
            cur = parent;
        }
        out.reverse();
        Ok(out)
    }

    /// Leaf ids under `id` in display order. A leaf's set contains only itself.
    pub fn descendant_leaf_ids(&self, id: &str) -> Result<IndexSet<String>> {
        let mut out = IndexSet::new();
        let mut stack = vec![self.get(id)?];
        while let Some(node) = stack.pop() {
            if node.is_leaf() {
                out.insert(node.id.clone());
                continue;
            }
            for child in node.children.iter().rev() {
                stack.push(self.get(child)?);
            }
        }
        Ok(out)
    }

    /// Pre-order ids starting from every root, children in insertion order.
    pub fn depth_first_ids(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<&str> = self.roots.iter().rev().map(String::as_str).collect();
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            out.push(node.id.clone());
            for child in node.children.iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    fn get(&self, id: &str) -> Result<&Node> {
        self.nodes
            .get(id)
            .ok_or_else(|| Error::UnknownNode { id: id.to_string() })
    }
}

fn check_weight(id: &str, label: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        return Ok(());
    }
    Err(Error::InvalidWeight {
        id: id.to_string(),
        label,
        value,
    })
}
