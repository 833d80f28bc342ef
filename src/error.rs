use std::path::PathBuf;

/// Errors from the file-facing parts of the crate (settings and documents).
///
/// The speed-control engine itself never fails: out-of-range input is clamped.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid settings json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("document {path} contains no readable words")]
    EmptyDocument { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, Error>;
