//! Configuration error types

use std::path::PathBuf;

use guild_model::ValidationError;

/// Error raised while loading or writing configuration files
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration directory does not exist
    #[error("configuration directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// A file could not be read or written
    #[error("failed to access {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file exists but is not valid YAML for its schema
    #[error("failed to parse {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A value could not be serialized for writing
    #[error("failed to serialize {what}")]
    Serialize {
        what: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// The loaded desired state violates a structural invariant
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Convenience alias used across the config crate
pub type Result<T> = std::result::Result<T, ConfigError>;
