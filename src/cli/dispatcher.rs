use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use jiff::{Zoned, civil::DateTime};
use serde::Serialize;
use tokio::fs;
use tracing::info;

use crate::{
    batch::{ConvertJob, collect_ekn_files, convert_all},
    config::ConverterConfig,
    ekn::{EknFile, FileMetadata, channel::ChannelTable},
    export::{DecimalSeparator, format_timestamp, format_value},
    series::Sample,
};

use super::{
    error::DispatchError,
    model::{Cli, CliCommands, Query},
};

#[derive(Serialize)]
struct InfoResponse<'a> {
    path: &'a Path,
    #[serde(flatten)]
    meta: &'a FileMetadata,
    samples: usize,
    first: DateTime,
    last: Option<DateTime>,
}

impl Cli {
    /// Run the command. `Ok(Some(..))` is meant for stdout.
    pub async fn dispatch(
        self,
        mut config: ConverterConfig,
    ) -> Result<Option<String>, DispatchError> {
        Ok(match self.command {
            CliCommands::Convert(args) => {
                args.apply(&mut config);
                Some(convert(args.paths, config, Zoned::now().datetime()).await?)
            }
            CliCommands::Info { file } => {
                let file = open(file, &config).await?;
                let series = file.series();
                let res = InfoResponse {
                    path: file.path(),
                    meta: file.metadata(),
                    samples: series.len(),
                    first: series.start(),
                    last: series.end(),
                };
                Some(serde_json::to_string_pretty(&res)?)
            }
            CliCommands::Get(args) => {
                let file = open(args.file, &config).await?;
                Some(query(&file, args.query, config.decimal_separator)?)
            }
        })
    }
}

async fn open(path: PathBuf, config: &ConverterConfig) -> Result<EknFile, DispatchError> {
    let room = config.room.clone();
    let channels = ChannelTable::with_extra(&config.channels);
    let file = tokio::task::spawn_blocking(move || EknFile::open(path, &room, &channels)).await??;
    Ok(file)
}

async fn convert(
    paths: Vec<PathBuf>,
    config: ConverterConfig,
    now: DateTime,
) -> Result<String, DispatchError> {
    let files = collect_ekn_files(&paths).await;
    if files.is_empty() {
        return Err(DispatchError::NoFiles);
    }
    if let Some(dir) = &config.output_dir {
        fs::create_dir_all(dir).await?;
    }

    let total = files.len();
    info!("converting {total} files");
    let report = convert_all(files, Arc::new(ConvertJob::from_config(&config, now))).await;

    match report.failures() {
        0 => Ok(format!("converted {} files", report.converted.len())),
        failed => Err(DispatchError::BatchFailed { failed, total }),
    }
}

fn query(
    file: &EknFile,
    query: Query,
    separator: DecimalSeparator,
) -> Result<String, DispatchError> {
    let series = file.series();
    let row = |s: &Sample| {
        format!(
            "{};{}",
            format_timestamp(s.timestamp),
            format_value(s.value, separator)
        )
    };
    let rows = |samples: &[Sample]| samples.iter().map(row).collect::<Vec<_>>().join("\n");

    Ok(match query {
        Query::At { timestamp } => series
            .sample_at(timestamp)
            .map(row)
            .ok_or_else(|| DispatchError::NotFound(timestamp.to_string()))?,
        Query::Range { from, to } => series
            .range(from, to)
            .map(rows)
            .ok_or_else(|| DispatchError::NotFound(format!("{from}..={to}")))?,
        Query::Current => series
            .current()
            .map(row)
            .ok_or_else(|| DispatchError::NotFound("current time".to_string()))?,
        Query::All => rows(series.all()),
    })
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use jiff::civil::datetime;

    use super::*;
    use crate::{ekn::error::EknError, test_util::ramp_payload};

    fn write_file(dir: &Path, name: &str, year: i16) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, ramp_payload(year)).unwrap();
        path
    }

    async fn run(args: &[&str]) -> Result<Option<String>, DispatchError> {
        let cli = Cli::try_parse_from(std::iter::once("ekn-convert").chain(args.iter().copied()))
            .unwrap();
        cli.dispatch(ConverterConfig::default()).await
    }

    #[tokio::test]
    async fn test_info() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "2023_ER_S4.ekn", 2023);

        let out = run(&["info", path.to_str().unwrap()]).await.unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["year"], 2023);
        assert_eq!(json["base_name"], "ER_S");
        assert_eq!(json["position"], 4);
        assert_eq!(json["description"], "Einzelraumregelung.Soll-Temperatur");
        assert_eq!(json["room"], "not set");
        assert_eq!(json["samples"], 35040);
        assert_eq!(json["first"], "2023-01-01T00:00:00");
        assert_eq!(json["last"], "2023-12-31T23:45:00");
    }

    #[tokio::test]
    async fn test_get_at_and_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "2023_ER1.ekn", 2023);
        let path = path.to_str().unwrap();

        let out = run(&["get", path, "at", "2023-01-02T00:15"]).await.unwrap();
        assert_eq!(out.as_deref(), Some("2023-01-02 00:15:00;97,0"));

        let out = run(&["get", path, "range", "2023-01-01T00:00", "2023-01-01T00:30"])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            out,
            "2023-01-01 00:00:00;0,0\n2023-01-01 00:15:00;1,0\n2023-01-01 00:30:00;2,0"
        );
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "2000_ER1.ekn", 2000);
        let path = path.to_str().unwrap();

        let res = run(&["get", path, "at", "2000-01-01T00:07"]).await;
        assert!(matches!(res, Err(DispatchError::NotFound(_))));

        let res = run(&["get", path, "range", "2000-12-31T00:00", "2001-01-01T00:00"]).await;
        assert!(matches!(res, Err(DispatchError::NotFound(_))));

        // a year 2000 series never contains the wall clock
        let res = run(&["get", path, "current"]).await;
        assert!(matches!(res, Err(DispatchError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_truncated_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("2023_ER1.ekn");
        std::fs::write(&path, [0u8; 16]).unwrap();

        let res = run(&["get", path.to_str().unwrap(), "all"]).await;
        assert!(matches!(
            res,
            Err(DispatchError::EknError(EknError::TruncatedInputError { .. }))
        ));
    }

    #[tokio::test]
    async fn test_convert_reports_failures() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "2023_ER1.ekn", 2023);
        std::fs::write(dir.path().join("2023_ER2.ekn"), [0u8; 3]).unwrap();

        let config = ConverterConfig::default();
        let now = datetime(2023, 1, 1, 1, 0, 0, 0);
        let res = convert(vec![dir.path().to_path_buf()], config, now).await;
        assert!(matches!(
            res,
            Err(DispatchError::BatchFailed {
                failed: 1,
                total: 2
            })
        ));
        assert!(dir.path().join("2023_ER1.csv").exists());
    }

    #[tokio::test]
    async fn test_convert_skips_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_file(dir.path(), "2023_ER1.ekn", 2023);
        let missing = dir.path().join("2023_ER2.ekn");

        let now = datetime(2023, 1, 1, 1, 0, 0, 0);
        let res = convert(vec![good, missing], ConverterConfig::default(), now).await;
        assert!(matches!(
            res,
            Err(DispatchError::BatchFailed {
                failed: 1,
                total: 2
            })
        ));
        assert!(dir.path().join("2023_ER1.csv").exists());
    }

    #[tokio::test]
    async fn test_convert_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let now = datetime(2023, 1, 1, 0, 0, 0, 0);
        let res = convert(vec![dir.path().to_path_buf()], ConverterConfig::default(), now).await;
        assert!(matches!(res, Err(DispatchError::NoFiles)));
    }

    #[tokio::test]
    async fn test_convert_creates_output_dir() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let out_dir = out.path().join("csv");
        let path = write_file(src.path(), "2023_MK_S.ekn", 2023);

        let config = ConverterConfig {
            output_dir: Some(out_dir.clone()),
            ..Default::default()
        };
        let msg = convert(vec![path], config, datetime(2023, 1, 1, 0, 0, 0, 0))
            .await
            .unwrap();
        assert_eq!(msg, "converted 1 files");
        assert!(out_dir.join("2023_MK_S.csv").exists());
    }
}
