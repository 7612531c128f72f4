use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KConfigError {
    #[error("Failed to read directory {path}: {source}")]
    ScanIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Failed to read boot cmdline {path}: {source}")]
    BootLineIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Conflicting header '{second}' in {path} (already using '{first}')")]
    HeaderConflict {
        first: String,
        second: String,
        path: PathBuf,
    },

    #[error("Failed to fetch {url}: {reason}")]
    RemoteFetch { url: String, reason: String },

    #[error("Failed to parse document fetched from {url}: {source}")]
    RemoteParse {
        url: String,
        source: serde_yaml::Error,
    },

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Failed to decode configuration: {0}")]
    Decode(#[source] serde_yaml::Error),

    #[error("Unknown key '{key}' (line {line})")]
    UnknownKey { key: String, line: usize },

    #[error("Unknown keys in configuration")]
    UnknownKeys(Vec<KConfigError>),

    #[error("Failed to serialize configuration: {0}")]
    Serialize(String),

    #[error("Settings error: {0}")]
    Settings(#[from] confique::Error),
}
