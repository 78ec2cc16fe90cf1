//! Reads myGEKKO `.ekn` trend files (one little-endian f32 per 15 minute slot
//! of a calendar year) and turns them into semicolon separated csv.

pub mod batch;
pub mod cli;
pub mod config;
pub mod ekn;
pub mod export;
pub mod series;

#[cfg(test)]
mod test_util;

pub use ekn::{EknFile, FileMetadata, decode::decode, error::EknError};
pub use series::{Sample, TimeSeries};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
