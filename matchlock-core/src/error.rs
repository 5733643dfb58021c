//! Typed error handling for matchlock.
//!
//! These errors describe faults *inside* the analysis machinery, never
//! problems with the code under analysis. Malformed input code is what the
//! [`crate::diagnostics`] taxonomy reports; a `MatchlockError` means the
//! semantic-model collaborator or the loader misbehaved.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for matchlock operations.
///
/// Provides typed errors that library consumers can match on, unlike opaque
/// `anyhow::Error` types. Engine entry points catch these at the construct
/// boundary and degrade to a single internal-fault diagnostic, so one broken
/// construct never aborts the analysis of the rest.
#[derive(Error, Debug)]
pub enum MatchlockError {
    /// The semantic-model collaborator broke one of its invariants
    /// (e.g. reported an enum type but returned no enum domain).
    #[error("Semantic model fault: {message}")]
    SemanticModel { message: String },

    /// A program description file could not be loaded or deserialized.
    #[error("Load error at {path}: {message}")]
    Load { path: PathBuf, message: String },

    /// Configuration file errors (matchlock.toml).
    #[error("Config error at {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// Generic internal error.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl MatchlockError {
    /// Create a semantic-model fault.
    pub fn semantic(message: impl Into<String>) -> Self {
        Self::SemanticModel {
            message: message.into(),
        }
    }

    /// Create a load error with path context.
    pub fn load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Load {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a config error with path context.
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Check if this error should be contained at the construct boundary
    /// (analysis of other constructs proceeds) rather than propagated.
    pub fn is_construct_local(&self) -> bool {
        matches!(self, Self::SemanticModel { .. } | Self::Internal { .. })
    }

    /// Get the path associated with this error, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Load { path, .. } => Some(path),
            Self::Config { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Convenience type alias for matchlock results.
pub type MatchlockResult<T> = Result<T, MatchlockError>;
