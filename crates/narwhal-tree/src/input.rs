use crate::PATH_SEPARATOR;
use crate::error::Result;
use crate::tree::{Node, Tree};
use serde::{Deserialize, Serialize};

/// Nested tree input as produced by the aggregation step (one object per call site).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeInput {
    pub name: String,
    #[serde(default)]
    pub between: f64,
    #[serde(default)]
    pub within: f64,
    #[serde(default)]
    pub children: Vec<TreeInput>,
}

impl Tree {
    /// Builds a tree from nested input, deriving ids as `/`-joined name paths.
    pub fn from_input(input: &TreeInput) -> Result<Tree> {
        Self::from_inputs(std::slice::from_ref(input))
    }

    /// Like [`Tree::from_input`] but accepts a forest.
    pub fn from_inputs(inputs: &[TreeInput]) -> Result<Tree> {
        let mut tree = Tree::new();
        let mut stack: Vec<(&TreeInput, Option<String>)> =
            inputs.iter().rev().map(|i| (i, None)).collect();
        while let Some((input, parent_id)) = stack.pop() {
            let id = match parent_id.as_deref() {
                Some(parent) => format!("{parent}{PATH_SEPARATOR}{}", input.name),
                None => input.name.clone(),
            };
            tree.insert(Node::new(
                id.clone(),
                parent_id.as_deref(),
                input.between,
                input.within,
            ))?;
            for child in input.children.iter().rev() {
                stack.push((child, Some(id.clone())));
            }
        }
        Ok(tree)
    }
}
