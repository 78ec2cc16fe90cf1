use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("could not create `{path}`: {source}")]
    CreateError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("io error `{0}`")]
    IoError(#[from] std::io::Error),
    #[error("csv error `{0}`")]
    CsvError(#[from] csv::Error),
}
