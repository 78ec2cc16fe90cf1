use std::path::{Path, PathBuf};

use ::config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::{
    ekn::{DEFAULT_ROOM, channel::ChannelConfig},
    export::{CsvOptions, DecimalSeparator},
};

pub const DEFAULT_CONFIG_FILE: &str = "ekn.ron";
pub const ENV_PREFIX: &str = "EKN";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConverterConfig {
    pub decimal_separator: DecimalSeparator,
    pub header: bool,
    pub info_text: bool,
    pub strip_future_values: bool,
    pub room: String,
    pub output_dir: Option<PathBuf>,
    pub channels: Vec<ChannelConfig>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        let csv = CsvOptions::default();
        Self {
            decimal_separator: csv.separator,
            header: csv.header,
            info_text: csv.info_text,
            strip_future_values: csv.strip_future_values,
            room: DEFAULT_ROOM.to_string(),
            output_dir: None,
            channels: Vec::new(),
        }
    }
}

impl ConverterConfig {
    /// Defaults, then the RON file (`path`, or `./ekn.ron` if present), then
    /// `EKN_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with_env(path: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).format(FileFormat::Ron).required(true),
            None => File::new(DEFAULT_CONFIG_FILE, FileFormat::Ron).required(false),
        };

        Config::builder()
            .add_source(file)
            .add_source(env.try_parsing(true))
            .build()?
            .try_deserialize()
    }

    #[cfg(test)]
    fn parse(s: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(s, FileFormat::Ron))
            .build()?
            .try_deserialize()
    }

    pub fn csv_options(&self) -> CsvOptions {
        CsvOptions {
            separator: self.decimal_separator,
            header: self.header,
            info_text: self.info_text,
            strip_future_values: self.strip_future_values,
        }
    }
}
