use std::path::PathBuf;

use clap::Parser;

/// Every option is optional: running without arguments cleans
/// `data/raw_sales_data.csv` into `outputs/cleaned_sales_data.csv`.
#[derive(Debug, Default, Parser)]
#[command(
    author,
    version,
    about = "Clean raw sales CSV exports and derive order amounts and date parts",
    long_about = None
)]
pub struct Cli {
    /// YAML or JSON file providing pipeline settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Raw sales CSV to load
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,
    /// Directory receiving the cleaned file (created when missing)
    #[arg(short = 'o', long = "output-dir")]
    pub output_dir: Option<PathBuf>,
    /// File name of the cleaned CSV inside the output directory
    #[arg(long = "output-file")]
    pub output_file: Option<PathBuf>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Character encoding of the cleaned file (defaults to utf-8)
    #[arg(long = "output-encoding")]
    pub output_encoding: Option<String>,
    /// Print the first N cleaned rows as a table once the file is written
    #[arg(long)]
    pub preview: Option<usize>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "pipe" | "|" => Ok(b'|'),
        "semicolon" | ";" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err(format!("Delimiter '{other}' must be a single character"));
            }
            if !first.is_ascii() {
                return Err(format!("Delimiter '{other}' must be ASCII"));
            }
            Ok(first as u8)
        }
    }
}
