use thiserror::Error;

/// Errors surfaced by persistence, configuration loading and GPU setup.
///
/// The game loop itself never fails; callers at the frontend log these and
/// fall back to defaults.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Storage I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
    #[error("Storage backend unavailable")]
    StorageUnavailable,
    #[error("Storage backend error: {0}")]
    Storage(String),
    #[error("Invalid tuning: {0}")]
    InvalidTuning(String),
    #[error("Graphics initialization failed: {0}")]
    Graphics(String),
}

pub type Result<T> = std::result::Result<T, Error>;
