use thiserror::Error;

/// Errors emitted while rendering or writing the generated file.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error(transparent)]
    Core(#[from] datafreeze_core::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid output path: {0}")]
    InvalidPath(String),
}
