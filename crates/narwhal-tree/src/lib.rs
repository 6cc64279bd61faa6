#![forbid(unsafe_code)]

//! Weighted hierarchical tree model (aggregated call trees) consumed by `narwhal`.
//!
//! Nodes carry two aggregated weights: `between` (the edge from the parent) and `within` (time
//! spent inside the node). Ids are hierarchical paths so a node id is stable across subsets.

pub mod error;
pub mod input;
pub mod tree;

pub use error::{Error, Result};
pub use input::TreeInput;
pub use tree::{Node, Tree};

/// Separator used when deriving hierarchical ids from nested input.
pub const PATH_SEPARATOR: char = '/';
