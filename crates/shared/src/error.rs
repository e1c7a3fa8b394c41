use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Transport,
    MalformedBody,
    UnexpectedShape,
}

/// Failures at the load boundary. None of these are fatal; the controller
/// logs them and keeps its last-known-good list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GalleryError {
    #[error("user id must not be empty")]
    InvalidUserId,
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("gallery service returned HTTP {0}")]
    Status(u16),
    #[error("response body is not valid JSON: {0}")]
    MalformedBody(String),
    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),
}

impl GalleryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidUserId => ErrorKind::Validation,
            Self::Transport(_) | Self::Status(_) => ErrorKind::Transport,
            Self::MalformedBody(_) => ErrorKind::MalformedBody,
            Self::UnexpectedShape(_) => ErrorKind::UnexpectedShape,
        }
    }
}
