//! # Lootrun Error Types
//!
//! All errors that can occur while recording, storing or configuring
//! lootruns. User-facing outcomes (undo refused, name taken) are result
//! enums, not errors; see `session::UndoResult` and `store::SaveResult`.

use thiserror::Error;

/// Errors from reading, listing or deleting recording files.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No recording file with this name.
    #[error("lootrun file not found: {0}")]
    NotFound(String),

    /// The name is not a plain file name inside the store.
    #[error("invalid lootrun name: {0:?}")]
    InvalidName(String),

    /// File system failure.
    #[error("i/o error on lootrun file {file}: {source}")]
    Io {
        /// File involved.
        file: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file exists but is not a valid recording.
    #[error("malformed lootrun file {file}: {source}")]
    Parse {
        /// File involved.
        file: String,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors from session operations.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The operation needs a recording or loaded lootrun.
    #[error("no lootrun is active")]
    NoActiveLootrun,

    /// The operation is not allowed while recording.
    #[error("a recording is in progress")]
    RecordingInProgress,

    /// The operation only applies while recording.
    #[error("not recording")]
    NotRecording,

    /// A loaded lootrun changed but could not be written back.
    #[error("failed to save lootrun to {0}")]
    PersistFailed(String),

    /// Storage failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
