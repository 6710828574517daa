//! Ports to the outside world.
//!
//! [`RelayRepo`] is how the admin console reaches the relay; the relay in turn
//! writes through a [`RepositoryBackend`].

use async_trait::async_trait;
use fieldnotes_relay_types::FileEntry;
use thiserror::Error;

/// Why a commit batch did not land, classified for the status log.
///
/// Every variant carries the text shown to the operator verbatim.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommitError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Configuration(String),
    #[error("{0}")]
    Upstream(String),
    #[error("{0}")]
    Transport(String),
    #[error("{0}")]
    Decode(String),
}

impl CommitError {
    pub fn kind(&self) -> &'static str {
        match self {
            CommitError::Validation(_) => "validation",
            CommitError::Unauthorized(_) => "unauthorized",
            CommitError::Configuration(_) => "configuration",
            CommitError::Upstream(_) => "upstream",
            CommitError::Transport(_) => "transport",
            CommitError::Decode(_) => "decode",
        }
    }
}

/// One logical commit: files are written in order under a single message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitBatch {
    pub message: String,
    pub files: Vec<FileEntry>,
}

impl CommitBatch {
    pub fn new(message: impl Into<String>, files: Vec<FileEntry>) -> Self {
        Self {
            message: message.into(),
            files,
        }
    }

    pub fn paths(&self) -> Vec<&str> {
        self.files.iter().map(|file| file.path.as_str()).collect()
    }
}

#[async_trait]
pub trait RelayRepo: Send + Sync {
    /// Deliver `batch` authenticated by `access_key`; returns the relay's message.
    async fn publish(&self, access_key: &str, batch: CommitBatch) -> Result<String, CommitError>;
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{0}")]
    Upstream(String),
    #[error("path `{0}` escapes the repository root")]
    InvalidPath(String),
    #[error("content for `{path}` is not valid base64")]
    InvalidContent { path: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl BackendError {
    pub fn upstream(err: impl std::fmt::Display) -> Self {
        Self::Upstream(err.to_string())
    }
}

/// The repository the relay writes into.
#[async_trait]
pub trait RepositoryBackend: Send + Sync {
    /// Version marker of the file at `path`, or `None` when it does not exist yet.
    async fn current_version(&self, path: &str) -> Result<Option<String>, BackendError>;

    /// Create or overwrite `path`. `version` must be the marker read just before
    /// when the file exists.
    async fn put_file(
        &self,
        path: &str,
        content_base64: &str,
        message: &str,
        version: Option<&str>,
    ) -> Result<(), BackendError>;

    fn name(&self) -> &'static str;
}
