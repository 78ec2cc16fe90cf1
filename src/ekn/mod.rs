//! myGEKKO trend files.
//!
//! ```text
//!  2023_ER1.ekn
//!        │
//!        ▼
//!   ┌──────────┐     ┌─────────┐
//!   │ filename │ ──▶ │ channel │   year, base name, position, unit, description
//!   └──────────┘     └─────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  decode  │   f32 payload -> TimeSeries on the 15 minute annual grid
//!   └──────────┘
//! ```

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::series::TimeSeries;

use self::{
    channel::ChannelTable,
    error::EknError,
    filename::{ParsedName, file_name_of, parse_filename},
};

pub mod channel;
pub mod decode;
pub mod error;
pub mod filename;

pub const DEFAULT_ROOM: &str = "not set";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMetadata {
    pub file_name: String,
    pub year: i16,
    pub base_name: String,
    pub position: Option<u32>,
    pub unit: String,
    pub description: String,
    pub room: String,
}

/// A decoded ekn file. Owns its series, everything handed out is borrowed.
#[derive(Debug, Clone)]
pub struct EknFile {
    path: PathBuf,
    meta: FileMetadata,
    series: TimeSeries,
}

impl EknFile {
    /// Read and decode the file at `path`.
    pub fn open(
        path: impl AsRef<Path>,
        room: &str,
        channels: &ChannelTable,
    ) -> Result<Self, EknError> {
        let path = path.as_ref();
        let file_name = file_name_of(path)?;
        // reject bad names before touching the disk
        let parsed = parse_filename(&file_name)?;
        let payload = load_bytes(path)?;

        debug!("decoding {} ({} bytes)", path.display(), payload.len());
        Self::build(path.to_path_buf(), file_name, parsed, &payload, room, channels)
    }

    /// Decode an in-memory payload. `file_name` carries the year and channel.
    pub fn from_bytes(
        file_name: &str,
        payload: &[u8],
        room: &str,
        channels: &ChannelTable,
    ) -> Result<Self, EknError> {
        let parsed = parse_filename(file_name)?;
        Self::build(
            PathBuf::from(file_name),
            file_name.to_string(),
            parsed,
            payload,
            room,
            channels,
        )
    }

    fn build(
        path: PathBuf,
        file_name: String,
        parsed: ParsedName,
        payload: &[u8],
        room: &str,
        channels: &ChannelTable,
    ) -> Result<Self, EknError> {
        let series = decode::decode(payload, parsed.year)?;
        let channel = channels.resolve(&parsed.base_name);

        Ok(Self {
            path,
            meta: FileMetadata {
                file_name,
                year: parsed.year,
                base_name: parsed.base_name,
                position: parsed.position,
                unit: channel.unit,
                description: channel.description,
                room: room.to_string(),
            },
            series,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn metadata(&self) -> &FileMetadata {
        &self.meta
    }

    pub fn series(&self) -> &TimeSeries {
        &self.series
    }
}

/// Read a whole file into memory. The handle is closed before returning.
pub fn load_bytes(path: &Path) -> Result<Vec<u8>, EknError> {
    std::fs::read(path).map_err(|source| EknError::IoError {
        path: path.to_path_buf(),
        source,
    })
}
