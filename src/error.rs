//! Error taxonomy
//!
//! Fatal configuration errors abort the whole command. Skip reasons only
//! drop a single package from a bulk run.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors raised while resolving packages and their manifests.
#[derive(Debug, Error)]
pub enum Error {
    #[error("No manifest found for package at {}", path.display())]
    MissingManifest { path: PathBuf },

    #[error("Failed to parse manifest {}: {source}", path.display())]
    InvalidManifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unknown package: {0}")]
    UnknownPackage(String),

    #[error("No target directory found for package '{package}' (tried: {})", candidates.join(", "))]
    TargetDirNotFound {
        package: String,
        candidates: Vec<String>,
    },

    #[error("Invalid glob pattern '{pattern}': {source}")]
    Glob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a package was left out of a bulk install.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("required executable '{0}' not found on PATH")]
    MissingExecutable(String),

    #[error("platform '{0}' is not supported")]
    UnsupportedPlatform(String),
}
