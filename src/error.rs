use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnicompareError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("I/O error on {}: {source}", .path.display())]
    Io { path: PathBuf, #[source] source: std::io::Error },
    #[error("Parse error in {} at line {line}: {message}", .path.display())]
    Parse { path: PathBuf, line: u64, message: String },
    #[error("Output already exists: {}", .0.display())]
    OutputExists(PathBuf),
    #[error("Reconcile error: {0}")]
    Reconcile(String),
    #[error("CSV error: {0}")]
    Csv(String),
    #[error("JSON error: {0}")]
    Json(String),
}

pub type Result<T> = std::result::Result<T, AnicompareError>;

impl AnicompareError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

// Helper conversions
impl From<csv::Error> for AnicompareError {
    fn from(e: csv::Error) -> Self { Self::Csv(e.to_string()) }
}
impl From<config::ConfigError> for AnicompareError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}
impl From<serde_json::Error> for AnicompareError {
    fn from(e: serde_json::Error) -> Self { Self::Json(e.to_string()) }
}
