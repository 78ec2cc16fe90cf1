use thiserror::Error;
use tokio::task::JoinError;

use crate::ekn::error::EknError;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("{0}")]
    EknError(#[from] EknError),
    #[error("io error `{0}`")]
    IoError(#[from] std::io::Error),
    #[error("json encoding error `{0}`")]
    JsonEncodingError(String),
    #[error("no sample at `{0}`")]
    NotFound(String),
    #[error("no ekn files found")]
    NoFiles,
    #[error("{failed} of {total} files failed to convert")]
    BatchFailed { failed: usize, total: usize },
    #[error("task error `{0}`")]
    TaskError(#[from] JoinError),
}

impl From<serde_json::Error> for DispatchError {
    fn from(value: serde_json::Error) -> Self {
        Self::JsonEncodingError(value.to_string())
    }
}
