//! Cleaning and enrichment of raw sales records.
//!
//! The stage validates the required columns, drops rows without identifiers,
//! coerces `order_date`, normalizes free-text columns, fills missing
//! discounts and derives the amount and date-part columns. The only
//! recovered failure is an unparseable order date, which becomes null.

use anyhow::Result;
use chrono::{Datelike, NaiveDate, NaiveTime};
use itertools::Itertools;
use log::debug;

use crate::{
    data::{ColumnType, Dataset, Value, parse_timestamp},
    error::PipelineError,
    transform::string_ops::normalize_text,
};

pub const ORDER_ID: &str = "order_id";
pub const PRODUCT_ID: &str = "product_id";
pub const ORDER_DATE: &str = "order_date";
pub const UNIT_PRICE: &str = "unit_price";
pub const QUANTITY: &str = "quantity";
pub const DISCOUNT: &str = "discount";

pub const GROSS_AMOUNT: &str = "gross_amount";
pub const DISCOUNT_AMOUNT: &str = "discount_amount";
pub const NET_AMOUNT: &str = "net_amount";
pub const ORDER_YEAR: &str = "order_year";
pub const ORDER_MONTH: &str = "order_month";
pub const ORDER_MONTH_NAME: &str = "order_month_name";
pub const ORDER_DAY: &str = "order_day";

pub const REQUIRED_COLUMNS: [&str; 6] = [
    ORDER_ID, PRODUCT_ID, ORDER_DATE, UNIT_PRICE, QUANTITY, DISCOUNT,
];

pub const TEXT_COLUMNS: [&str; 9] = [
    "customer_name",
    "city",
    "state",
    "country",
    "product_name",
    "category",
    "sub_category",
    "payment_method",
    "order_status",
];

/// What a missing free-text cell reads as once converted to text.
pub const MISSING_TEXT: &str = "Nan";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanSummary {
    pub rows_in: usize,
    pub rows_dropped: usize,
    pub dates_coerced: usize,
    pub discounts_filled: usize,
    pub text_columns: usize,
}

pub fn clean_dataset(mut dataset: Dataset) -> Result<(Dataset, CleanSummary)> {
    for name in REQUIRED_COLUMNS {
        dataset.require_column(name)?;
    }
    let mut summary = CleanSummary {
        rows_in: dataset.len(),
        ..CleanSummary::default()
    };

    summary.rows_dropped = drop_unidentified_rows(&mut dataset)?;
    summary.dates_coerced = parse_order_dates(&mut dataset)?;
    summary.text_columns = normalize_text_columns(&mut dataset);
    summary.discounts_filled = fill_missing_discounts(&mut dataset)?;
    derive_amounts(&mut dataset)?;
    derive_date_parts(&mut dataset)?;

    debug!(
        "Cleaned {} row(s): dropped {}, coerced {} date(s) to null, filled {} discount(s), normalized {} text column(s)",
        summary.rows_in,
        summary.rows_dropped,
        summary.dates_coerced,
        summary.discounts_filled,
        summary.text_columns
    );
    Ok((dataset, summary))
}

fn drop_unidentified_rows(dataset: &mut Dataset) -> Result<usize, PipelineError> {
    let order_idx = dataset.require_column(ORDER_ID)?;
    let product_idx = dataset.require_column(PRODUCT_ID)?;
    let before = dataset.len();
    dataset.retain(|record| record.get(order_idx).is_some() && record.get(product_idx).is_some());
    Ok(before - dataset.len())
}

/// Returns how many non-null cells could not be read as a date. The column
/// becomes a plain date column when every parsed value falls on midnight.
fn parse_order_dates(dataset: &mut Dataset) -> Result<usize, PipelineError> {
    let idx = dataset.require_column(ORDER_DATE)?;
    let raw = dataset.column_values(idx);
    let parsed = raw
        .iter()
        .map(|cell| cell.as_ref().and_then(|v| parse_timestamp(&v.as_display())))
        .collect::<Vec<_>>();
    let coerced = raw
        .iter()
        .zip(&parsed)
        .filter(|(before, after)| before.is_some() && after.is_none())
        .count();

    let date_only = parsed
        .iter()
        .flatten()
        .all(|dt| dt.time() == NaiveTime::MIN);
    let (datatype, values) = if date_only {
        (
            ColumnType::Date,
            parsed
                .into_iter()
                .map(|dt| dt.map(|dt| Value::Date(dt.date())))
                .collect(),
        )
    } else {
        (
            ColumnType::DateTime,
            parsed.into_iter().map(|dt| dt.map(Value::DateTime)).collect(),
        )
    };
    dataset.set_column(ORDER_DATE, datatype, values);
    Ok(coerced)
}

fn normalize_text_columns(dataset: &mut Dataset) -> usize {
    let mut normalized = 0;
    for name in TEXT_COLUMNS {
        let Some(idx) = dataset.column_index(name) else {
            continue;
        };
        let values = dataset
            .column_values(idx)
            .into_iter()
            .map(|cell| {
                let text = match cell {
                    Some(value) => normalize_text(&value.as_display()).into_owned(),
                    None => MISSING_TEXT.to_string(),
                };
                Some(Value::String(text))
            })
            .collect();
        dataset.set_column(name, ColumnType::String, values);
        normalized += 1;
    }
    normalized
}

fn fill_missing_discounts(dataset: &mut Dataset) -> Result<usize, PipelineError> {
    let idx = dataset.require_column(DISCOUNT)?;
    let datatype = dataset.columns[idx].datatype;
    let zero = match datatype {
        ColumnType::Float => Value::Float(0.0),
        _ => Value::Integer(0),
    };
    let mut filled = 0;
    for record in &mut dataset.records {
        if let Some(cell) = record.values.get_mut(idx) {
            if cell.is_none() {
                *cell = Some(zero.clone());
                filled += 1;
            }
        }
    }
    Ok(filled)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn from_cell(cell: Option<&Value>, column: &str, line: usize) -> Result<Option<Self>, PipelineError> {
        match cell {
            None => Ok(None),
            Some(Value::Integer(i)) => Ok(Some(Number::Int(*i))),
            Some(Value::Float(f)) => Ok(Some(Number::Float(*f))),
            Some(Value::String(text)) => {
                let trimmed = text.trim();
                if let Ok(i) = trimmed.parse::<i64>() {
                    Ok(Some(Number::Int(i)))
                } else if let Ok(f) = trimmed.parse::<f64>() {
                    Ok(Some(Number::Float(f)))
                } else {
                    Err(PipelineError::NonNumeric {
                        column: column.to_string(),
                        line,
                        value: text.clone(),
                    })
                }
            }
            Some(other) => Err(PipelineError::NonNumeric {
                column: column.to_string(),
                line,
                value: other.as_display(),
            }),
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    fn combine(
        self,
        other: Number,
        int_op: fn(i64, i64) -> Option<i64>,
        float_op: fn(f64, f64) -> f64,
        column: &str,
        line: usize,
    ) -> Result<Number, PipelineError> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => {
                int_op(a, b)
                    .map(Number::Int)
                    .ok_or_else(|| PipelineError::Overflow {
                        column: column.to_string(),
                        line,
                    })
            }
            (a, b) => Ok(Number::Float(float_op(a.as_f64(), b.as_f64()))),
        }
    }

    fn into_value(self) -> Value {
        match self {
            Number::Int(i) => Value::Integer(i),
            Number::Float(f) => Value::Float(f),
        }
    }
}

fn derive_amounts(dataset: &mut Dataset) -> Result<(), PipelineError> {
    let price_idx = dataset.require_column(UNIT_PRICE)?;
    let quantity_idx = dataset.require_column(QUANTITY)?;
    let discount_idx = dataset.require_column(DISCOUNT)?;

    let mut rows = Vec::with_capacity(dataset.len());
    for record in &dataset.records {
        let line = record.line;
        let price = Number::from_cell(record.get(price_idx), UNIT_PRICE, line)?;
        let quantity = Number::from_cell(record.get(quantity_idx), QUANTITY, line)?;
        let rate = Number::from_cell(record.get(discount_idx), DISCOUNT, line)?;

        let gross = match (price, quantity) {
            (Some(p), Some(q)) => Some(p.combine(q, i64::checked_mul, |a, b| a * b, GROSS_AMOUNT, line)?),
            _ => None,
        };
        let discount = match (gross, rate) {
            (Some(g), Some(r)) => Some(g.combine(r, i64::checked_mul, |a, b| a * b, DISCOUNT_AMOUNT, line)?),
            _ => None,
        };
        let net = match (gross, discount) {
            (Some(g), Some(d)) => Some(g.combine(d, i64::checked_sub, |a, b| a - b, NET_AMOUNT, line)?),
            _ => None,
        };
        rows.push((gross, discount, net));
    }

    let (gross, discount, net): (Vec<_>, Vec<_>, Vec<_>) = rows.into_iter().multiunzip();
    set_numeric_column(dataset, GROSS_AMOUNT, gross);
    set_numeric_column(dataset, DISCOUNT_AMOUNT, discount);
    set_numeric_column(dataset, NET_AMOUNT, net);
    Ok(())
}

/// Integer results stay integers; a column with any float (or no values at
/// all) is typed as float.
fn set_numeric_column(dataset: &mut Dataset, name: &str, numbers: Vec<Option<Number>>) {
    let datatype = if numbers.iter().flatten().any(|n| matches!(n, Number::Float(_)))
        || numbers.iter().all(Option::is_none)
    {
        ColumnType::Float
    } else {
        ColumnType::Integer
    };
    let values = numbers
        .into_iter()
        .map(|n| n.map(Number::into_value))
        .collect();
    dataset.set_column(name, datatype, values);
}

fn calendar_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Date(d) => Some(*d),
        Value::DateTime(dt) => Some(dt.date()),
        _ => None,
    }
}

fn derive_date_parts(dataset: &mut Dataset) -> Result<(), PipelineError> {
    let idx = dataset.require_column(ORDER_DATE)?;
    let dates = dataset
        .records
        .iter()
        .map(|record| record.get(idx).and_then(calendar_date))
        .collect::<Vec<_>>();

    let year = dates
        .iter()
        .map(|d| d.map(|d| Value::Integer(i64::from(d.year()))))
        .collect();
    let month = dates
        .iter()
        .map(|d| d.map(|d| Value::Integer(i64::from(d.month()))))
        .collect();
    let month_name = dates
        .iter()
        .map(|d| d.map(|d| Value::String(d.format("%b").to_string())))
        .collect();
    let day = dates
        .iter()
        .map(|d| d.map(|d| Value::Integer(i64::from(d.day()))))
        .collect();

    dataset.set_column(ORDER_YEAR, ColumnType::Integer, year);
    dataset.set_column(ORDER_MONTH, ColumnType::Integer, month);
    dataset.set_column(ORDER_MONTH_NAME, ColumnType::String, month_name);
    dataset.set_column(ORDER_DAY, ColumnType::Integer, day);
    Ok(())
}
