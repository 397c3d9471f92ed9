use thiserror::Error;

/// Errors raised by the document model.
///
/// Only [`ModelError::InvalidContent`] describes an expected outcome (the
/// schema refused an edit). Everything else means a caller handed the model
/// positions or names that do not exist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("position {pos} is outside of the document (content size {size})")]
    PositionOutOfRange { pos: usize, size: usize },

    #[error("invalid range {from}..{to}")]
    InvalidRange { from: usize, to: usize },

    #[error("range {from}..{to} does not start and end in the same parent node")]
    RangeCrossesNodes { from: usize, to: usize },

    #[error("no node starts at position {pos}")]
    NoNodeAt { pos: usize },

    #[error("position {pos} does not point at a table cell")]
    NotACell { pos: usize },

    #[error("cells at {anchor} and {head} are not in the same table")]
    CellsInDifferentTables { anchor: usize, head: usize },

    #[error("selection was resolved against a different document")]
    ForeignSelection,

    #[error("invalid content for node type {node_type}")]
    InvalidContent { node_type: String },

    #[error("text nodes must not be empty")]
    EmptyText,

    #[error("unknown node type {0}")]
    UnknownNodeType(String),

    #[error("unknown mark type {0}")]
    UnknownMarkType(String),

    #[error("schema does not define the {0} node type")]
    MissingNodeType(String),

    #[error("invalid content expression {expr:?}: {reason}")]
    InvalidContentExpr { expr: String, reason: String },
}

impl ModelError {
    /// True when the error is a schema refusal rather than a misuse of the API.
    pub fn is_schema_violation(&self) -> bool {
        matches!(self, ModelError::InvalidContent { .. })
    }
}

pub type Result<T, E = ModelError> = std::result::Result<T, E>;
