use crate::error::{Error, Result};
use crate::settings::LayoutSettings;
use crate::stem::Stem;
use indexmap::IndexMap;
use narwhal_tree::{Node, Tree};

/// A tree node taking part in one layout run.
#[derive(Debug, Clone)]
pub struct LayoutNode {
    pub node: Node,
    pub stem: Stem,
    /// The direct parent's id when that parent is part of the same run.
    pub parent: Option<String>,
}

impl LayoutNode {
    pub fn id(&self) -> &str {
        &self.node.id
    }

    pub fn is_leaf(&self) -> bool {
        self.node.is_leaf()
    }
}

/// Layout nodes keyed by id, in display order.
pub type LayoutNodes = IndexMap<String, LayoutNode>;

/// Builds layout nodes for `ids`, kept in the tree's depth-first display order.
pub fn collect_layout_nodes<'a, I>(
    tree: &Tree,
    ids: I,
    settings: &LayoutSettings,
) -> Result<LayoutNodes>
where
    I: IntoIterator<Item = &'a str>,
{
    let wanted: rustc_hash::FxHashSet<&str> = ids.into_iter().collect();
    for id in &wanted {
        if !tree.contains(id) {
            return Err(narwhal_tree::Error::UnknownNode { id: id.to_string() }.into());
        }
    }

    let mut out = LayoutNodes::with_capacity(wanted.len());
    for id in tree.depth_first_ids() {
        if !wanted.contains(id.as_str()) {
            continue;
        }
        let node = tree
            .node(&id)
            .ok_or_else(|| Error::structural(&id, "node vanished from tree"))?;
        let parent = node
            .parent_id
            .as_ref()
            .filter(|p| wanted.contains(p.as_str()))
            .cloned();
        out.insert(
            id.clone(),
            LayoutNode {
                stem: Stem::new(tree, node, settings)?,
                node: node.clone(),
                parent,
            },
        );
    }
    Ok(out)
}
