//! Payload layout:
//! ```text
//! +-----------+-----------+-----+-------------+
//! | f32 (LE)  | f32 (LE)  | ... | f32 (LE)    |  trailing bytes ignored
//! | Jan 1     | Jan 1     |     | Dec 31      |
//! | 00:00     | 00:15     |     | 23:45       |
//! +-----------+-----------+-----+-------------+
//! ```

use jiff::civil::{Date, DateTime};
use tracing::debug;

use crate::series::{STEP, Sample, TimeSeries};

use super::error::EknError;

pub const SAMPLE_WIDTH: usize = size_of::<f32>();

/// First and last slot of the annual grid.
pub fn grid_bounds(year: i16) -> Result<(DateTime, DateTime), EknError> {
    let first = Date::new(year, 1, 1).map_err(|_| EknError::InvalidYear(year))?;
    let last = Date::new(year, 12, 31).map_err(|_| EknError::InvalidYear(year))?;
    Ok((first.at(0, 0, 0, 0), last.at(23, 45, 0, 0)))
}

/// Number of slots in the annual grid of `year`.
pub fn grid_length(year: i16) -> Result<usize, EknError> {
    let (start, end) = grid_bounds(year)?;
    let steps = end.duration_since(start).as_secs() / STEP.as_secs();
    Ok(steps as usize + 1)
}

/// Decode a raw payload into the full grid of `year`.
///
/// Exactly `grid_length(year)` floats are read from the front of the
/// payload. A shorter payload is an error, never padded.
pub fn decode(payload: &[u8], year: i16) -> Result<TimeSeries, EknError> {
    let (start, end) = grid_bounds(year)?;
    let len = grid_length(year)?;
    let expected = len * SAMPLE_WIDTH;

    if payload.len() < expected {
        return Err(EknError::TruncatedInputError {
            year,
            expected,
            actual: payload.len(),
        });
    }
    if payload.len() > expected {
        debug!("ignoring {} trailing bytes", payload.len() - expected);
    }

    let mut samples = Vec::with_capacity(len);
    let mut timestamp = start;
    for (i, raw) in payload[..expected].chunks_exact(SAMPLE_WIDTH).enumerate() {
        if i > 0 {
            timestamp = timestamp.checked_add(STEP)?;
        }
        let value = f32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
        samples.push(Sample::new(timestamp, value));
    }
    debug_assert_eq!(timestamp, end);

    Ok(TimeSeries::from_grid(start, samples))
}
