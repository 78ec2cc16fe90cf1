use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EknError {
    #[error("filename `{0}` does not match `YYYY_<name>.ekn`")]
    FormatError(String),
    #[error("payload for {year} has {actual} bytes but the grid needs {expected}")]
    TruncatedInputError {
        year: i16,
        expected: usize,
        actual: usize,
    },
    #[error("year `{0}` is outside the supported calendar range")]
    InvalidYear(i16),
    #[error("could not read `{path}`: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("timestamp arithmetic error `{0}`")]
    TimeError(#[from] jiff::Error),
}
