//! World-state error types.
//!
//! Every tree and registry operation reports one of these; the
//! transaction processor maps them onto the ledger's invalid-transaction
//! and internal-error responses.

use thiserror::Error;

/// Domain errors for world-state mutations.
///
/// All variants except `Serialization` describe a rejected request and
/// leave the state untouched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    /// An intermediate path component does not exist.
    #[error("Path doesn't exist: {0}")]
    PathNotFound(String),

    /// A file occupies a path component where a directory is required.
    #[error("Path is blocked by a file: {0}")]
    PathBlockedByFile(String),

    /// No file of this name under the path.
    #[error("File doesn't exist: {path}{name}")]
    FileNotFound {
        /// Parent path, `/`-terminated.
        path: String,
        /// File name.
        name: String,
    },

    /// No file or directory of this name under the path.
    #[error("File or directory doesn't exist: {path}{name}")]
    INodeNotFound {
        /// Parent path, `/`-terminated.
        path: String,
        /// Entry name.
        name: String,
    },

    /// A sibling with the same name already exists.
    #[error("The same name already exists: {path}{name}")]
    DuplicateName {
        /// Parent path, `/`-terminated.
        path: String,
        /// Conflicting name.
        name: String,
    },

    /// Path fails validation (must start and end with `/`, no `//`).
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Name fails validation (non-empty, no `/`).
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// The file has no fragment with this hash.
    #[error("Fragment doesn't exist: {0}")]
    FragmentNotFound(String),

    /// The fragment already records this sea.
    #[error("Fragment already stored by sea: {0}")]
    DuplicateSea(String),

    /// Key index unknown, or the publication check failed.
    #[error("Invalid key or not exists")]
    InvalidKey,

    /// Canonical encoding or decoding failed.
    #[error("Serialization failed: {0}")]
    Serialization(String),
}
