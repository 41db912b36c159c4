//! Pipeline settings.
//!
//! Resolution order is CLI flag, then config file, then the built-in defaults
//! (`data/raw_sales_data.csv` in, `outputs/cleaned_sales_data.csv` out).

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, de};

use crate::cli::{Cli, parse_delimiter};

pub const DEFAULT_INPUT: &str = "data/raw_sales_data.csv";
pub const DEFAULT_OUTPUT_DIR: &str = "outputs";
pub const DEFAULT_OUTPUT_FILE: &str = "cleaned_sales_data.csv";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub output_file: PathBuf,
    #[serde(deserialize_with = "deserialize_delimiter")]
    pub delimiter: Option<u8>,
    pub input_encoding: Option<String>,
    pub output_encoding: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
            delimiter: None,
            input_encoding: None,
            output_encoding: None,
        }
    }
}

impl PipelineConfig {
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_file)
    }

    /// Reads settings from `path`; `.json` files are parsed as JSON and
    /// everything else as YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening config file {path:?}"))?;
        let reader = BufReader::new(file);
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config = if is_json {
            serde_json::from_reader(reader)
                .with_context(|| format!("Parsing JSON config {path:?}"))?
        } else {
            serde_yaml::from_reader(reader)
                .with_context(|| format!("Parsing YAML config {path:?}"))?
        };
        Ok(config)
    }

    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_overrides(cli);
        Ok(config)
    }

    pub fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(input) = &cli.input {
            self.input = input.clone();
        }
        if let Some(dir) = &cli.output_dir {
            self.output_dir = dir.clone();
        }
        if let Some(file) = &cli.output_file {
            self.output_file = file.clone();
        }
        if cli.delimiter.is_some() {
            self.delimiter = cli.delimiter;
        }
        if cli.input_encoding.is_some() {
            self.input_encoding = cli.input_encoding.clone();
        }
        if cli.output_encoding.is_some() {
            self.output_encoding = cli.output_encoding.clone();
        }
    }
}

fn deserialize_delimiter<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|value| parse_delimiter(&value).map_err(de::Error::custom))
        .transpose()
}
