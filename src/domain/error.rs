//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Rejected input: a tree record or node value that does not satisfy the
/// record grammar or the variant rules.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("value cannot be null")]
    MissingValue,

    #[error("invalid node format: each node must have a 'value' key")]
    MissingValueKey,

    #[error("value must be an integer, found {found}")]
    InvalidValue { found: String },

    #[error("invalid node format: expected a record or null, found {found}")]
    NotARecord { found: String },

    #[error("binary tree node does not accept a 'color' attribute")]
    UnexpectedColor,

    #[error("invalid node format: red-black tree node requires a 'color' key")]
    MissingColor,

    #[error("invalid color '{0}', must be 'RED' or 'BLACK'")]
    InvalidColor(String),

    #[error("malformed JSON: {0}")]
    MalformedJson(String),

    #[error("tree nesting exceeds the maximum depth of {limit}")]
    TooDeep { limit: usize },

    #[error("diagram needs {nodes} layout nodes, more than the limit of {limit}")]
    LayoutTooLarge { nodes: usize, limit: usize },
}

/// Violations of the structural rules: variant homogeneity, handle validity
/// and exclusive ownership of subtrees.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    #[error("cannot attach a {found} node to a {expected} tree")]
    VariantMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("node handle belongs to a different tree")]
    ForeignNode,

    #[error("node handle refers to a node that no longer exists")]
    StaleNode,

    #[error("cannot attach a node beneath itself")]
    Cycle,

    #[error("node is already attached; detach it before attaching it again")]
    AlreadyAttached,
}

/// Domain errors represent violations of the tree model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Structural(#[from] StructuralError),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
