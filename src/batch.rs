use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use jiff::civil::DateTime;
use thiserror::Error;
use tokio::{fs, task::JoinSet};
use tracing::{Level, debug, error, span};

use crate::{
    config::ConverterConfig,
    ekn::{EknFile, channel::ChannelTable, error::EknError, filename::has_ekn_extension},
    export::{CsvOptions, ExportError, convert_file, csv_path},
};

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("{0}")]
    EknError(#[from] EknError),
    #[error("{0}")]
    ExportError(#[from] ExportError),
}

/// Everything needed to turn one ekn file into a csv. Shared read-only
/// between the conversion tasks.
#[derive(Debug, Clone)]
pub struct ConvertJob {
    pub options: CsvOptions,
    pub room: String,
    pub output_dir: Option<PathBuf>,
    pub channels: ChannelTable,
    pub now: DateTime,
}

impl ConvertJob {
    pub fn from_config(config: &ConverterConfig, now: DateTime) -> Self {
        Self {
            options: config.csv_options(),
            room: config.room.clone(),
            output_dir: config.output_dir.clone(),
            channels: ChannelTable::with_extra(&config.channels),
            now,
        }
    }

    /// Convert a single file, returns the csv path
    pub fn run(&self, path: &Path) -> Result<PathBuf, ConvertError> {
        let span = span!(Level::INFO, "convert", file = %path.display());
        let _enter = span.enter();

        let file = EknFile::open(path, &self.room, &self.channels)?;
        let target = csv_path(&file, self.output_dir.as_deref());
        let rows = convert_file(&file, &target, &self.options, self.now)?;
        debug!("{rows} rows -> {}", target.display());
        Ok(target)
    }
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub converted: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, ConvertError)>,
    /// conversion tasks that panicked
    pub panicked: usize,
}

impl BatchReport {
    pub fn failures(&self) -> usize {
        self.failed.len() + self.panicked
    }
}

/// Paths found by [`collect_ekn_files`], plus the ones that could not be read.
#[derive(Debug, Default)]
pub struct Collected {
    pub files: Vec<PathBuf>,
    pub unreadable: Vec<(PathBuf, ConvertError)>,
}

impl Collected {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.unreadable.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len() + self.unreadable.len()
    }
}

/// Expand directories to the `.ekn` files directly inside them (sorted).
/// Plain file paths are passed through untouched. A path that cannot be
/// read is recorded and skipped.
pub async fn collect_ekn_files(paths: &[PathBuf]) -> Collected {
    let mut collected = Collected::default();

    for path in paths {
        let res = match fs::metadata(path).await {
            Ok(meta) if meta.is_dir() => scan_dir(path).await,
            Ok(_) => Ok(vec![path.clone()]),
            Err(e) => Err(e),
        };

        match res {
            Ok(found) => collected.files.extend(found),
            Err(source) => {
                error!("{}: {source}", path.display());
                let err = EknError::IoError {
                    path: path.clone(),
                    source,
                };
                collected.unreadable.push((path.clone(), err.into()));
            }
        }
    }

    collected
}

async fn scan_dir(dir: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut found = Vec::new();
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let entry_path = entry.path();
        if has_ekn_extension(&entry_path) && entry.file_type().await?.is_file() {
            found.push(entry_path);
        }
    }
    found.sort();
    Ok(found)
}

/// Convert all collected files in parallel. One file failing never stops the
/// others, unreadable paths are reported as failures.
pub async fn convert_all(collected: Collected, job: Arc<ConvertJob>) -> BatchReport {
    let mut report = BatchReport {
        failed: collected.unreadable,
        ..Default::default()
    };

    let mut set = JoinSet::new();
    for path in collected.files {
        let job = job.clone();
        set.spawn_blocking(move || {
            let res = job.run(&path);
            (path, res)
        });
    }

    while let Some(res) = set.join_next().await {
        match res {
            Ok((_, Ok(target))) => report.converted.push(target),
            Ok((path, Err(e))) => {
                error!("{}: {e}", path.display());
                report.failed.push((path, e));
            }
            Err(e) => {
                error!("conversion task failed: {e}");
                report.panicked += 1;
            }
        }
    }

    report.converted.sort();
    report.failed.sort_by(|a, b| a.0.cmp(&b.0));
    report
}
