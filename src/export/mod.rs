//! Semicolon separated text export.
//!
//! ```text
//! # converted with ekn-convert under MIT License
//! # Original ekn file: 2023_ER1.ekn          ┐
//! # Year: 2023                               │ info block
//! # Description: Einzelraumregelung.Ist-...  │
//! # Room: Bad                                │
//!                                            ┘
//! Timestamp;°C                                 header
//! 2023-01-01 00:00:00;21,5                     rows
//! ```

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use clap_derive::ValueEnum;
use csv::{Terminator, WriterBuilder};
use jiff::civil::DateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::ekn::EknFile;

pub use self::error::ExportError;

pub mod error;

pub const ATTRIBUTION: &str = "# converted with ekn-convert under MIT License";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum DecimalSeparator {
    #[serde(rename = ".")]
    #[value(name = ".", alias = "dot")]
    Dot,
    #[default]
    #[serde(rename = ",")]
    #[value(name = ",", alias = "comma")]
    Comma,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    pub separator: DecimalSeparator,
    /// `Timestamp;<unit>` row
    pub header: bool,
    /// File name, year, description and room as comment lines
    pub info_text: bool,
    /// Files carry a slot for every point of the year, drop the ones after
    /// the last completed slot
    pub strip_future_values: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            separator: DecimalSeparator::Comma,
            header: true,
            info_text: true,
            strip_future_values: true,
        }
    }
}

pub fn format_timestamp(timestamp: DateTime) -> String {
    timestamp.strftime(TIMESTAMP_FORMAT).to_string()
}

/// Shortest text that reads back as `value`, laid out like Python's
/// `str(float)`: `21.0` keeps its fractional digit, magnitudes from `1e16`
/// and below `1e-4` use exponent form (`3e+20`), NaN is `nan`.
pub fn format_value(value: f64, separator: DecimalSeparator) -> String {
    let text = if value.is_nan() {
        "nan".to_string()
    } else if value.is_infinite() {
        format!("{value}")
    } else if value != 0.0 && !(1e-4..1e16).contains(&value.abs()) {
        exponent_form(value)
    } else if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    };

    match separator {
        DecimalSeparator::Dot => text,
        DecimalSeparator::Comma => text.replace('.', ","),
    }
}

/// `1e16` -> `1e+16`, `1e-5` -> `1e-05`
fn exponent_form(value: f64) -> String {
    let text = format!("{value:e}");
    match text.split_once('e') {
        Some((mantissa, exp)) => match exp.strip_prefix('-') {
            Some(digits) => format!("{mantissa}e-{digits:0>2}"),
            None => format!("{mantissa}e+{exp:0>2}"),
        },
        None => text,
    }
}

/// Write `file` as csv into `out`. Returns the number of data rows.
///
/// `now` decides where future values are cut. A series that does not
/// contain the last completed slot (another year) is written in full.
pub fn write_csv<W: Write>(
    file: &EknFile,
    mut out: W,
    options: &CsvOptions,
    now: DateTime,
) -> Result<usize, ExportError> {
    let meta = file.metadata();
    let series = file.series();

    let cutoff = match options.strip_future_values {
        true => series.current_at(now).map(|s| s.timestamp),
        false => None,
    };

    // preamble lines are single field records, rows have two
    let mut wtr = WriterBuilder::new()
        .delimiter(b';')
        .terminator(Terminator::CRLF)
        .flexible(true)
        .from_writer(&mut out);

    wtr.write_record([ATTRIBUTION])?;
    if options.info_text {
        let blank: [&str; 0] = [];
        wtr.write_record([format!("# Original ekn file: {}", meta.file_name)])?;
        wtr.write_record([format!("# Year: {}", meta.year)])?;
        wtr.write_record([format!("# Description: {}", meta.description)])?;
        wtr.write_record([format!("# Room: {}", meta.room)])?;
        wtr.write_record(blank)?;
    }

    if options.header {
        wtr.write_record(["Timestamp", meta.unit.as_str()])?;
    }

    let mut rows = 0;
    for sample in series.all() {
        if cutoff.is_some_and(|c| sample.timestamp > c) {
            break;
        }
        wtr.write_record([
            format_timestamp(sample.timestamp),
            format_value(sample.value, options.separator),
        ])?;
        rows += 1;
    }

    wtr.flush()?;
    Ok(rows)
}

/// Target path for the csv of `file`: next to the source, or in `output_dir`.
pub fn csv_path(file: &EknFile, output_dir: Option<&Path>) -> PathBuf {
    let target = file.path().with_extension("csv");
    match (output_dir, target.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => target,
    }
}

/// Write `file` to `target` as csv. The rows go to `<target>.part` first and
/// are renamed into place once complete, a failed write leaves no csv behind.
pub fn convert_file(
    file: &EknFile,
    target: &Path,
    options: &CsvOptions,
    now: DateTime,
) -> Result<usize, ExportError> {
    info!(
        "writing file {} at {}",
        file.metadata().file_name,
        format_timestamp(now)
    );

    let partial = partial_path(target);
    let res = write_file(file, &partial, options, now).and_then(|rows| {
        fs::rename(&partial, target)?;
        Ok(rows)
    });

    if res.is_err() && fs::remove_file(&partial).is_ok() {
        debug!("removed partial {}", partial.display());
    }
    res
}

fn partial_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_os_string();
    name.push(".part");
    PathBuf::from(name)
}

fn write_file(
    file: &EknFile,
    path: &Path,
    options: &CsvOptions,
    now: DateTime,
) -> Result<usize, ExportError> {
    let out = File::create(path).map_err(|source| ExportError::CreateError {
        path: path.to_path_buf(),
        source,
    })?;
    let mut out = BufWriter::new(out);
    let rows = write_csv(file, &mut out, options, now)?;
    out.flush()?;
    Ok(rows)
}
