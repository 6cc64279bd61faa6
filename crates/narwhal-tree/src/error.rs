#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("duplicate node id: {id}")]
    DuplicateId { id: String },

    #[error("node {id} references unknown parent {parent_id}")]
    UnknownParent { id: String, parent_id: String },

    #[error("unknown node id: {id}")]
    UnknownNode { id: String },

    #[error("invalid {label} weight on node {id}: {value}")]
    InvalidWeight {
        id: String,
        label: &'static str,
        value: f64,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
