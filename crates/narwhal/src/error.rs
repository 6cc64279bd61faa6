#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A computed value is non-finite, negative where disallowed, or a zero divisor.
    #[error("invalid {label}: {value} ({reason})")]
    Validation {
        label: String,
        value: f64,
        reason: &'static str,
    },

    /// The active node subset is internally inconsistent.
    #[error("inconsistent node subset at {id}: {message}")]
    Structural { id: String, message: String },

    #[error("no scale constraint produced a positive finite factor")]
    NoScaleConstraint,

    #[error(transparent)]
    Tree(#[from] narwhal_tree::Error),
}

impl Error {
    pub(crate) fn structural(id: &str, message: impl Into<String>) -> Self {
        Self::Structural {
            id: id.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
