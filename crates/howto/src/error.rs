//! Error types for the guide pipeline.
//!
//! One closed enum covers every user-visible failure mode; each variant
//! maps to a stable process exit code so scripts can distinguish outcomes.

use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, HowtoError>;

/// Every failure mode in the guide pipeline.
#[derive(Error, Debug)]
pub enum HowtoError {
    /// An invariant was violated. A bug, not a user error.
    #[error("internal error: {0}")]
    Internal(String),

    /// The caller supplied an unusable query or flag combination.
    #[error("{0}")]
    Input(String),

    /// A frontmatter opening fence with no matching closing fence.
    #[error(
        "The file '{}' appears to start with a metadata section (three or five dashes at the top) but it does not seem to be in the correct format.",
        path.display()
    )]
    InvalidFormat {
        /// Offending guide file.
        path: PathBuf,
    },

    /// The fenced metadata block failed to decode.
    #[error("Could not parse metadata for {}: {source}", path.display())]
    UnparseableMetadata {
        /// Offending guide or context file.
        path: PathBuf,
        /// Underlying decode failure.
        source: serde_yaml::Error,
    },

    /// The decoded metadata is not a key/value mapping.
    #[error("The file {} has invalid metadata (expected key-value pairs)", path.display())]
    InvalidMetadata {
        /// Offending guide or context file.
        path: PathBuf,
    },

    /// The file bytes are not valid UTF-8.
    #[error("Could not read {} because the file is not valid UTF-8.", path.display())]
    InvalidEncoding {
        /// Offending guide file.
        path: PathBuf,
    },

    /// The underlying read failed (permissions, missing file, I/O error).
    #[error("Could not read {}: {source}", path.display())]
    FileUnreadable {
        /// Offending file.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// Resolution produced zero or more than one candidate when exactly
    /// one guide was required.
    #[error("{0}")]
    Missing(String),

    /// A templated guide body failed to render.
    #[error("Could not render the template {}: {source}", path.display())]
    Template {
        /// Offending guide file.
        path: PathBuf,
        /// Underlying template failure.
        source: minijinja::Error,
    },
}

impl HowtoError {
    /// Process exit code associated with this error kind.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Internal(_) => 1,
            Self::Template { .. } => 2,
            Self::Input(_) => 3,
            Self::InvalidFormat { .. } => 4,
            Self::UnparseableMetadata { .. } => 5,
            Self::InvalidMetadata { .. } => 6,
            Self::FileUnreadable { .. } => 7,
            Self::InvalidEncoding { .. } => 8,
            Self::Missing(_) => 20,
        }
    }
}
