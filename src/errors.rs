use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),
    #[error("Failed to serialize project structure: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("I/O error while {0}: {1}")]
    IO(String, #[source] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read file '{0}': {1}")]
    FileRead(String, #[source] std::io::Error),
    #[error("Failed to parse TOML from file '{0}': {1}")]
    TomlParse(String, #[source] toml::de::Error),
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Scan root '{}' does not exist", .0.display())]
    RootNotFound(PathBuf),
    #[error("Scan root '{}' is not a directory", .0.display())]
    RootNotADirectory(PathBuf),
    #[error("Failed to walk '{}': {}", .0.display(), .1)]
    Walk(PathBuf, #[source] ignore::Error),
    #[error("Scan was cancelled")]
    Cancelled,
    #[error("Extraction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IO("I/O operation failed".to_string(), err)
    }
}

impl AppError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Scan(ScanError::Cancelled) => 2,
            _ => 1,
        }
    }
}
