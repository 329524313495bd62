//! Error types for the cnn-classifier core.
//!
//! Each component returns its own `thiserror` enum; the ingestion pipeline folds
//! them into [`IngestionError`] so callers can tell configuration, filesystem,
//! network and archive failures apart without looking at messages.

use std::path::PathBuf;

/// Errors from reading a YAML document.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("YAML file '{}' not found", path.display())]
    NotFound { path: PathBuf },

    #[error("YAML file '{}' is empty", path.display())]
    Empty { path: PathBuf },

    #[error("Error parsing YAML file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("An error occurred while reading YAML file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from creating directories.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("Failed to create directory '{}': {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from fetching the source archive.
#[derive(Debug, thiserror::Error)]
pub enum RetrieveError {
    #[error("Invalid source URL '{url}': {reason}")]
    InvalidSourceUrl { url: String, reason: String },

    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Request to {url} returned an HTML page instead of the file")]
    UnexpectedHtml { url: String },

    #[error("Failed to prepare download directory: {0}")]
    Directory(#[from] PathError),

    #[error("Failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from extracting the downloaded archive.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Failed to open archive '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid zip archive '{}': {source}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Archive entry '{name}' escapes the destination directory")]
    UnsafeEntry { name: String },

    #[error("Failed to prepare extraction directory: {0}")]
    Directory(#[from] PathError),

    #[error("Failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from the auxiliary I/O helpers in [`crate::common`].
#[derive(Debug, thiserror::Error)]
pub enum CommonError {
    #[error("File not found at path: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error on '{}': {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid base64-encoded image string: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Errors from setting up logging.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to create log directory: {0}")]
    Directory(#[from] PathError),

    #[error("Invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("A global logger is already installed: {0}")]
    AlreadyInstalled(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Coarse failure class of an ingestion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Filesystem,
    Network,
    Archive,
    State,
}

/// Top-level error returned by the data ingestion pipeline.
#[derive(Debug, thiserror::Error)]
pub enum IngestionError {
    #[error("Configuration error: {0}")]
    Config(#[from] SettingsError),

    #[error("Filesystem error: {0}")]
    Filesystem(#[from] PathError),

    #[error("Download error: {0}")]
    Retrieve(#[from] RetrieveError),

    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("Stage has already been run (state: {0:?})")]
    AlreadyRun(crate::pipeline::StageState),
}

impl IngestionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            IngestionError::Config(_) => ErrorKind::Config,
            IngestionError::Filesystem(_) => ErrorKind::Filesystem,
            IngestionError::Retrieve(RetrieveError::InvalidSourceUrl { .. }) => ErrorKind::Config,
            IngestionError::Retrieve(RetrieveError::Directory(_))
            | IngestionError::Retrieve(RetrieveError::Write { .. }) => ErrorKind::Filesystem,
            IngestionError::Retrieve(_) => ErrorKind::Network,
            IngestionError::Extract(ExtractError::Directory(_))
            | IngestionError::Extract(ExtractError::Write { .. }) => ErrorKind::Filesystem,
            IngestionError::Extract(_) => ErrorKind::Archive,
            IngestionError::AlreadyRun(_) => ErrorKind::State,
        }
    }
}
