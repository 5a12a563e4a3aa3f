//! Cascade error types
//!
//! Errors raised while building a module tree or resolving permission intents.
//! A Download toggle on a module without download support is not an error; the
//! engine reports it on the outcome instead.

use crate::tree::ModuleId;
use thiserror::Error;

/// Result type for cascade operations.
pub type CascadeResult<T> = Result<T, CascadeError>;

/// Errors from permission cascade operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CascadeError {
    /// An intent or query named a module the tree does not contain.
    #[error("unknown module {id}")]
    UnknownModule {
        /// The id that was not found
        id: ModuleId,
    },

    /// The supplied module configuration does not describe a tree.
    #[error("malformed module tree: {0}")]
    MalformedTree(#[from] MalformedTreeError),

    /// Configuration could not be read or parsed.
    #[error("configuration error: {reason}")]
    Config {
        /// Reason for the failure
        reason: String,
    },

    /// A permission matrix or group record could not be decoded or encoded.
    #[error("invalid permission record: {reason}")]
    Record {
        /// Reason for the failure
        reason: String,
    },

    /// Authorization group record is not acceptable for persistence.
    #[error("invalid authorization group: {reason}")]
    InvalidGroup {
        /// Reason for rejection
        reason: String,
    },
}

impl CascadeError {
    /// Create an unknown module error.
    pub fn unknown_module(id: impl Into<ModuleId>) -> Self {
        Self::UnknownModule { id: id.into() }
    }

    /// Create a configuration error.
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Create a record error.
    pub fn record(reason: impl Into<String>) -> Self {
        Self::Record {
            reason: reason.into(),
        }
    }

    /// Create an invalid group error.
    pub fn invalid_group(reason: impl Into<String>) -> Self {
        Self::InvalidGroup {
            reason: reason.into(),
        }
    }
}

/// Construction-time failures of a module tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedTreeError {
    /// Two nodes share the same id.
    #[error("duplicate module id {id}")]
    DuplicateId {
        /// The repeated id
        id: ModuleId,
    },

    /// A node is reachable from itself.
    #[error("cycle through modules {}", format_path(.path))]
    Cycle {
        /// Ids along the cycle, starting and ending at the same node
        path: Vec<ModuleId>,
    },

    /// A node lists a child id that is never defined.
    #[error("module {parent} references undefined child {child}")]
    DanglingChild {
        /// The referencing node
        parent: ModuleId,
        /// The missing child id
        child: ModuleId,
    },

    /// A node is listed as the child of two different parents.
    #[error("module {child} is listed under both {first_parent} and {second_parent}")]
    SharedChild {
        /// The child listed twice
        child: ModuleId,
        /// Parent seen first
        first_parent: ModuleId,
        /// Parent seen second
        second_parent: ModuleId,
    },

    /// A node has an empty or whitespace-only id.
    #[error("module id must not be empty")]
    EmptyId,
}

fn format_path(path: &[ModuleId]) -> String {
    path.iter()
        .map(ModuleId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}
