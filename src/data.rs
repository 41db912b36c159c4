//! In-memory table model shared by every pipeline stage.
//!
//! A [`Dataset`] is a list of typed [`Column`]s plus the [`Record`]s read from
//! the source file. Cells are `Option<Value>`; `None` is the null marker and is
//! written back out as an empty field.

use std::fmt;

use anyhow::{Result, anyhow};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::PipelineError;

/// Tokens read as missing values in addition to the empty field.
pub const MISSING_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    String,
    Integer,
    Float,
    Date,
    DateTime,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ColumnType::String => "string",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Date => "date",
            ColumnType::DateTime => "datetime",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Value {
    pub fn as_display(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => format_float(*f),
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
            Value::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

/// Renders floats the way the source exports do: whole numbers keep a
/// trailing `.0` so the column still reads as floating point, and magnitudes
/// from `1e16` up or below `1e-4` switch to exponent form (`1e+16`, `1e-05`).
pub fn format_float(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let scientific = format!("{value:e}");
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };
    if value != 0.0 && !(-4..16).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs())
    } else if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

pub fn is_missing(value: &str) -> bool {
    value.is_empty() || MISSING_TOKENS.contains(&value)
}

/// Reads one raw cell as `ty`. Only numeric types are parsed; date columns
/// are produced by the clean stage, so every other type keeps the text.
pub fn parse_typed_value(value: &str, ty: ColumnType) -> Result<Option<Value>> {
    if is_missing(value) {
        return Ok(None);
    }
    let parsed = match ty {
        ColumnType::Integer => Value::Integer(
            value
                .trim()
                .parse()
                .map_err(|_| anyhow!("Failed to parse '{value}' as integer"))?,
        ),
        ColumnType::Float => Value::Float(
            value
                .trim()
                .parse()
                .map_err(|_| anyhow!("Failed to parse '{value}' as float"))?,
        ),
        _ => Value::String(value.to_string()),
    };
    Ok(Some(parsed))
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d %B %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%b %d, %Y",
    "%Y%m%d",
];

/// Parses a calendar date or timestamp, returning `None` for anything
/// unrecognised. Slash dates are read month-first before day-first.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if is_missing(trimmed) {
        return None;
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(parsed);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(parsed.and_time(NaiveTime::MIN));
        }
    }
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|parsed| parsed.naive_local())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub datatype: ColumnType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// 1-based line in the source file (the header is line 1).
    pub line: usize,
    pub values: Vec<Option<Value>>,
}

impl Record {
    pub fn get(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx).and_then(|v| v.as_ref())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub columns: Vec<Column>,
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn new(columns: Vec<Column>, records: Vec<Record>) -> Self {
        Self { columns, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize, PipelineError> {
        self.column_index(name)
            .ok_or_else(|| PipelineError::MissingColumn {
                column: name.to_string(),
            })
    }

    /// Collects the cells of one column, in record order.
    pub fn column_values(&self, idx: usize) -> Vec<Option<Value>> {
        self.records
            .iter()
            .map(|record| record.values.get(idx).cloned().flatten())
            .collect()
    }

    /// Replaces an existing column in place or appends a new one at the end.
    /// `values` must hold one cell per record.
    pub fn set_column(&mut self, name: &str, datatype: ColumnType, values: Vec<Option<Value>>) {
        debug_assert_eq!(values.len(), self.records.len());
        let idx = match self.column_index(name) {
            Some(idx) => {
                self.columns[idx].datatype = datatype;
                idx
            }
            None => {
                self.columns.push(Column {
                    name: name.to_string(),
                    datatype,
                });
                self.columns.len() - 1
            }
        };
        for (record, value) in self.records.iter_mut().zip(values) {
            if record.values.len() <= idx {
                record.values.resize(idx + 1, None);
            }
            record.values[idx] = value;
        }
    }

    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&Record) -> bool,
    {
        self.records.retain(keep);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::new(
            vec![Column {
                name: "order_id".into(),
                datatype: ColumnType::Integer,
            }],
            vec![
                Record {
                    line: 2,
                    values: vec![Some(Value::Integer(1))],
                },
                Record {
                    line: 3,
                    values: vec![None],
                },
            ],
        )
    }

    #[test]
    fn format_float_keeps_trailing_zero_for_whole_numbers() {
        assert_eq!(format_float(2.0), "2.0");
        assert_eq!(format_float(18.0), "18.0");
        assert_eq!(format_float(0.1), "0.1");
        assert_eq!(format_float(-3.25), "-3.25");
        assert_eq!(format_float(1234567890123456.0), "1234567890123456.0");
        assert_eq!(format_float(0.0001), "0.0001");
    }

    #[test]
    fn format_float_uses_exponent_form_at_extreme_magnitudes() {
        assert_eq!(format_float(1e16), "1e+16");
        assert_eq!(format_float(1.5e20), "1.5e+20");
        assert_eq!(format_float(1e100), "1e+100");
        assert_eq!(format_float(1e-5), "1e-05");
        assert_eq!(format_float(-2.5e-7), "-2.5e-07");
        assert_eq!(format_float(0.0), "0.0");
        assert_eq!(format_float(f64::INFINITY), "inf");
    }

    #[test]
    fn missing_tokens_become_null() {
        assert_eq!(parse_typed_value("", ColumnType::Integer).unwrap(), None);
        assert_eq!(parse_typed_value("NA", ColumnType::String).unwrap(), None);
        assert_eq!(parse_typed_value("null", ColumnType::Float).unwrap(), None);
        assert_eq!(
            parse_typed_value(" alice ", ColumnType::String).unwrap(),
            Some(Value::String(" alice ".into()))
        );
    }

    #[test]
    fn numeric_parsing_tolerates_padding() {
        assert_eq!(
            parse_typed_value(" 10 ", ColumnType::Integer).unwrap(),
            Some(Value::Integer(10))
        );
        assert!(parse_typed_value("ten", ColumnType::Float).is_err());
    }

    #[test]
    fn date_typed_cells_are_kept_as_text() {
        assert_eq!(
            parse_typed_value("2023-01-15", ColumnType::Date).unwrap(),
            Some(Value::String("2023-01-15".into()))
        );
        assert_eq!(parse_typed_value("NA", ColumnType::DateTime).unwrap(), None);
    }

    #[test]
    fn parse_timestamp_supports_multiple_layouts() {
        let expected = NaiveDate::from_ymd_opt(2023, 1, 15)
            .unwrap()
            .and_time(NaiveTime::MIN);
        assert_eq!(parse_timestamp("2023-01-15"), Some(expected));
        assert_eq!(parse_timestamp("01/15/2023"), Some(expected));
        assert_eq!(parse_timestamp("15/01/2023"), Some(expected));
        assert_eq!(parse_timestamp("15 January 2023"), Some(expected));
        assert_eq!(parse_timestamp("Jan 15, 2023"), Some(expected));
        assert_eq!(parse_timestamp("20230115"), Some(expected));
        assert_eq!(
            parse_timestamp("2023-01-15T08:30:00")
                .map(|dt| dt.format("%H:%M").to_string())
                .as_deref(),
            Some("08:30")
        );
        assert_eq!(parse_timestamp("not-a-date"), None);
        assert_eq!(parse_timestamp("2023-02-30"), None);
    }

    #[test]
    fn set_column_appends_then_overwrites_in_place() {
        let mut dataset = sample();
        dataset.set_column(
            "gross_amount",
            ColumnType::Float,
            vec![Some(Value::Float(1.5)), None],
        );
        assert_eq!(dataset.headers(), vec!["order_id", "gross_amount"]);

        dataset.set_column(
            "order_id",
            ColumnType::String,
            vec![Some(Value::String("A".into())), None],
        );
        assert_eq!(dataset.headers(), vec!["order_id", "gross_amount"]);
        assert_eq!(dataset.columns[0].datatype, ColumnType::String);
        assert_eq!(
            dataset.records[0].get(0),
            Some(&Value::String("A".into()))
        );
    }

    #[test]
    fn require_column_reports_missing_name() {
        let dataset = sample();
        assert_eq!(dataset.require_column("order_id"), Ok(0));
        assert_eq!(
            dataset.require_column("discount"),
            Err(PipelineError::MissingColumn {
                column: "discount".into()
            })
        );
    }
}
