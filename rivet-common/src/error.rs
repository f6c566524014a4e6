use std::sync::Arc;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum RivetError {
    #[error("I/O Error: {0}")]
    Io(#[from] Arc<std::io::Error>),

    #[error("HTTP Request Error: {0}")]
    Http(#[from] Arc<reqwest::Error>),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] Arc<serde_json::Error>),

    #[error("Semantic Versioning Error: {0}")]
    SemVer(#[from] Arc<semver::Error>),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Artifact '{coordinate}' could not be resolved: {reason}")]
    Resolution { coordinate: String, reason: String },

    #[error("Descriptor for '{coordinate}' is unreadable: {reason}")]
    Descriptor { coordinate: String, reason: String },

    #[error("Failed to collect dependencies of '{coordinate}': {reason}")]
    DependencyCollection { coordinate: String, reason: String },

    #[error("Dependency processing failed at '{coordinate}': {reason}")]
    DependencyProcessing { coordinate: String, reason: String },

    #[error("Version range query for '{coordinate}' failed: {reason}")]
    VersionRange { coordinate: String, reason: String },

    #[error("Graph transform invoked re-entrantly while a walk is in progress")]
    Reentrancy,

    #[error("DownloadError: Failed to download '{0}' from '{1}': {2}")]
    DownloadError(String, String, String),

    #[error("Checksum Mismatch: {0}")]
    ChecksumMismatch(String),

    #[error("Resource Not Found: {0}")]
    NotFound(String),

    #[error("Installation Error: {0}")]
    InstallError(String),

    #[error("Validation Error: {0}")]
    ValidationError(String),

    #[error("Cache Error: {0}")]
    Cache(String),

    #[error("Generic Error: {0}")]
    Generic(String),
}

impl RivetError {
    /// Attaches a coordinate to a lower-level failure during collection.
    pub fn collection(coordinate: impl ToString, source: impl ToString) -> Self {
        RivetError::DependencyCollection {
            coordinate: coordinate.to_string(),
            reason: source.to_string(),
        }
    }

    /// Attaches a coordinate to a failure raised by a processing policy.
    pub fn processing(coordinate: impl ToString, source: impl ToString) -> Self {
        RivetError::DependencyProcessing {
            coordinate: coordinate.to_string(),
            reason: source.to_string(),
        }
    }
}

impl From<std::io::Error> for RivetError {
    fn from(err: std::io::Error) -> Self {
        RivetError::Io(Arc::new(err))
    }
}

impl From<reqwest::Error> for RivetError {
    fn from(err: reqwest::Error) -> Self {
        RivetError::Http(Arc::new(err))
    }
}

impl From<serde_json::Error> for RivetError {
    fn from(err: serde_json::Error) -> Self {
        RivetError::Json(Arc::new(err))
    }
}

impl From<semver::Error> for RivetError {
    fn from(err: semver::Error) -> Self {
        RivetError::SemVer(Arc::new(err))
    }
}

pub type Result<T> = std::result::Result<T, RivetError>;
