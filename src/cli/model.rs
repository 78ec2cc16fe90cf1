use std::path::PathBuf;

use clap::ArgAction;
use clap_derive::{Args, Parser, Subcommand};
use jiff::civil::DateTime;

use crate::{config::ConverterConfig, export::DecimalSeparator};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// RON config file (defaults to ./ekn.ron when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// More logging, repeat for trace
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
    #[command(subcommand)]
    pub command: CliCommands,
}

impl Cli {
    /// Default log filter when `RUST_LOG` is unset
    pub fn log_level(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "warn",
            (false, 0) => "info",
            (false, 1) => "debug",
            _ => "trace",
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum CliCommands {
    /// Convert ekn files to csv
    #[command(alias = "conv")]
    Convert(ConvertArgs),
    /// Show file metadata as json
    Info {
        /// ekn file
        file: PathBuf,
    },
    /// Look up samples
    Get(FileAndQuery),
}

#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    /// ekn files or directories holding them
    #[arg(default_value = ".")]
    pub paths: Vec<PathBuf>,
    /// Decimal separator for values
    #[arg(long, value_enum)]
    pub separator: Option<DecimalSeparator>,
    /// Skip the `Timestamp;<unit>` row
    #[arg(long)]
    pub no_header: bool,
    /// Skip the comment block (file, year, description, room)
    #[arg(long)]
    pub no_info: bool,
    /// Keep slots after the current time
    #[arg(long)]
    pub keep_future: bool,
    /// Room label written to the comment block
    #[arg(long)]
    pub room: Option<String>,
    /// Write csv files here instead of next to their source
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

impl ConvertArgs {
    /// Flags win over configured values
    pub fn apply(&self, config: &mut ConverterConfig) {
        if let Some(separator) = self.separator {
            config.decimal_separator = separator;
        }
        if self.no_header {
            config.header = false;
        }
        if self.no_info {
            config.info_text = false;
        }
        if self.keep_future {
            config.strip_future_values = false;
        }
        if let Some(room) = &self.room {
            config.room = room.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = Some(dir.clone());
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct FileAndQuery {
    /// ekn file
    pub file: PathBuf,
    #[command(subcommand)]
    pub query: Query,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Query {
    /// Sample at a grid timestamp, e.g. 2023-06-01T09:45
    At { timestamp: DateTime },
    /// Samples from FROM through TO
    Range { from: DateTime, to: DateTime },
    /// Last completed slot
    #[command(alias = "now")]
    Current,
    /// Every sample
    All,
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use jiff::civil::datetime;

    use super::*;

    #[test]
    fn test_parse_convert() {
        let cli = Cli::try_parse_from([
            "ekn-convert",
            "-v",
            "convert",
            "a/2023_ER1.ekn",
            "b",
            "--separator",
            ".",
            "--no-info",
            "--room",
            "Bad",
        ])
        .unwrap();
        assert_eq!(cli.log_level(), "debug");

        let CliCommands::Convert(args) = cli.command else {
            panic!("expected convert");
        };
        assert_eq!(args.paths, vec![PathBuf::from("a/2023_ER1.ekn"), PathBuf::from("b")]);

        let mut config = ConverterConfig::default();
        args.apply(&mut config);
        assert_eq!(config.decimal_separator, DecimalSeparator::Dot);
        assert!(!config.info_text);
        assert!(config.header);
        assert!(config.strip_future_values);
        assert_eq!(config.room, "Bad");
    }

    #[test]
    fn test_convert_defaults_to_cwd() {
        let cli = Cli::try_parse_from(["ekn-convert", "convert"]).unwrap();
        assert_eq!(cli.log_level(), "info");
        let CliCommands::Convert(args) = cli.command else {
            panic!("expected convert");
        };
        assert_eq!(args.paths, vec![PathBuf::from(".")]);
    }

    #[test]
    fn test_parse_get() {
        let cli = Cli::try_parse_from([
            "ekn-convert",
            "get",
            "2023_ER1.ekn",
            "range",
            "2023-06-01T09:00",
            "2023-06-01 10:00:00",
        ])
        .unwrap();

        let CliCommands::Get(args) = cli.command else {
            panic!("expected get");
        };
        match args.query {
            Query::Range { from, to } => {
                assert_eq!(from, datetime(2023, 6, 1, 9, 0, 0, 0));
                assert_eq!(to, datetime(2023, 6, 1, 10, 0, 0, 0));
            }
            other => panic!("expected range, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_timestamp() {
        let res = Cli::try_parse_from(["ekn-convert", "get", "2023_ER1.ekn", "at", "yesterday"]);
        assert!(res.is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let res = Cli::try_parse_from(["ekn-convert", "-q", "-v", "info", "x.ekn"]);
        assert!(res.is_err());
        let cli = Cli::try_parse_from(["ekn-convert", "-q", "info", "x.ekn"]).unwrap();
        assert_eq!(cli.log_level(), "warn");
    }
}
