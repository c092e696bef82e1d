use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;
use uuid::Uuid;

use crate::schema::ValueKind;

/// Earliest and latest years a generated `DateTime` literal can hold.
const MIN_YEAR: i32 = 1;
const MAX_YEAR: i32 = 9999;

/// A decoded cell, ready for literal formatting.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Real(f32),
    Double(f64),
    /// Exact decimal text (`-12.50`), never routed through a float.
    Decimal(String),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
    Char(char),
    Text(String),
    Guid(Uuid),
    Bytes(Vec<u8>),
    /// Canonical text of a type without a dedicated literal form.
    Raw(String),
}

/// One materialized row, aligned with the table's column order.
pub type Row = Vec<CellValue>;

/// All rows read for one table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowBuffer {
    pub rows: Vec<Row>,
}

impl RowBuffer {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A cell whose text cannot be represented as its declared kind.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("cannot read {raw:?} as {kind:?}: {reason}")]
pub struct DecodeError {
    pub kind: ValueKind,
    pub raw: String,
    pub reason: String,
}

impl CellValue {
    /// Decode the text form Postgres produces for `value::text`.
    pub fn decode(raw: Option<&str>, kind: ValueKind) -> Result<Self, DecodeError> {
        let Some(raw) = raw else {
            return Ok(Self::Null);
        };
        let fail = |reason: &str| DecodeError {
            kind,
            raw: raw.to_string(),
            reason: reason.to_string(),
        };

        match kind {
            ValueKind::Boolean => match raw {
                "true" | "t" => Ok(Self::Bool(true)),
                "false" | "f" => Ok(Self::Bool(false)),
                _ => Err(fail("not a boolean")),
            },
            ValueKind::Integer => raw
                .parse::<i64>()
                .map(Self::Int)
                .map_err(|err| fail(&err.to_string())),
            ValueKind::Real => raw
                .parse::<f32>()
                .map(Self::Real)
                .map_err(|err| fail(&err.to_string())),
            ValueKind::Double => raw
                .parse::<f64>()
                .map(Self::Double)
                .map_err(|err| fail(&err.to_string())),
            ValueKind::Decimal => {
                if is_exact_decimal(raw) {
                    Ok(Self::Decimal(raw.to_string()))
                } else {
                    Err(fail("not a finite decimal"))
                }
            }
            ValueKind::DateTime => parse_datetime(raw).map(Self::DateTime).map_err(|r| fail(&r)),
            ValueKind::Time => NaiveTime::parse_from_str(raw, "%H:%M:%S%.f")
                .map(Self::Time)
                .map_err(|err| fail(&err.to_string())),
            ValueKind::Char => {
                let mut chars = raw.chars();
                match (chars.next(), chars.next()) {
                    // Only `"char"` prints its zero byte as empty text; `character(1)`
                    // arrives blank-padded.
                    (None, _) => Ok(Self::Char('\0')),
                    (Some(ch), None) => Ok(Self::Char(ch)),
                    _ => Err(fail("more than one character")),
                }
            }
            ValueKind::Text => Ok(Self::Text(raw.to_string())),
            ValueKind::Guid => Uuid::parse_str(raw)
                .map(Self::Guid)
                .map_err(|err| fail(&err.to_string())),
            ValueKind::Bytes => {
                let digits = raw
                    .strip_prefix("\\x")
                    .ok_or_else(|| fail("expected hex bytea output"))?;
                hex::decode(digits)
                    .map(Self::Bytes)
                    .map_err(|err| fail(&err.to_string()))
            }
            ValueKind::Other => Ok(Self::Raw(raw.to_string())),
        }
    }
}

fn is_exact_decimal(raw: &str) -> bool {
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (digits, None),
    };
    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    all_digits(whole) && fraction.is_none_or(all_digits)
}

fn parse_datetime(raw: &str) -> Result<NaiveDateTime, String> {
    let parsed = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(|date| date.and_time(NaiveTime::MIN))
        })
        .map_err(|err| err.to_string())?;

    if !(MIN_YEAR..=MAX_YEAR).contains(&parsed.year()) {
        return Err(format!("year {} is outside {MIN_YEAR}..={MAX_YEAR}", parsed.year()));
    }
    Ok(parsed)
}
