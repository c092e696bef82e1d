//! C# literal rendering for materialized cells.
//!
//! Output is a pure function of the value and its declared kind so that two
//! runs over the same data produce identical files.

use std::fmt::Write;

use chrono::{Datelike, Timelike};
use serde::{Deserialize, Serialize};

use crate::schema::ValueKind;
use crate::value::CellValue;

/// How text and character literals treat quotes and control characters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscapeMode {
    /// Backslash-escape quotes, backslashes and control characters.
    #[default]
    Escaped,
    /// Copy text between the quotes untouched. Embedded quotes or line
    /// breaks produce source that does not compile.
    Verbatim,
}

/// Renders cells as C# literal expressions.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiteralFormatter {
    escape: EscapeMode,
}

impl LiteralFormatter {
    pub fn new(escape: EscapeMode) -> Self {
        Self { escape }
    }

    /// Format one cell.
    ///
    /// Date/time values become `new DateTime(y, M, d, h, m, s)` and times
    /// `new TimeSpan(h, m, s)`. Neither carries a time zone, and fractional
    /// seconds are dropped: `10:30:00.75` is emitted as `10, 30, 0`.
    /// Exact decimals keep their digits and gain the `m` suffix. C# `decimal`
    /// holds 28 to 29 significant digits; longer `numeric` values are copied
    /// as they are and the C# compiler rounds them.
    pub fn format(&self, value: &CellValue, kind: ValueKind) -> String {
        match value {
            CellValue::Null => "null".to_string(),
            CellValue::Bool(true) => "true".to_string(),
            CellValue::Bool(false) => "false".to_string(),
            CellValue::Int(number) if kind == ValueKind::Decimal => format!("{number}m"),
            CellValue::Int(number) => number.to_string(),
            CellValue::Real(number) => format_real(*number),
            CellValue::Double(number) => format_double(*number),
            CellValue::Decimal(digits) => format!("{digits}m"),
            CellValue::DateTime(at) => format!(
                "new DateTime({}, {}, {}, {}, {}, {})",
                at.year(),
                at.month(),
                at.day(),
                at.hour(),
                at.minute(),
                at.second()
            ),
            CellValue::Time(at) => {
                format!("new TimeSpan({}, {}, {})", at.hour(), at.minute(), at.second())
            }
            CellValue::Char(ch) => self.char_literal(*ch),
            CellValue::Text(text) => self.string_literal(text),
            CellValue::Guid(guid) => format!("new Guid(\"{}\")", guid.hyphenated()),
            CellValue::Bytes(bytes) => format_bytes(bytes),
            CellValue::Raw(text) => text.clone(),
        }
    }

    fn string_literal(&self, text: &str) -> String {
        match self.escape {
            EscapeMode::Verbatim => format!("\"{text}\""),
            EscapeMode::Escaped => {
                let mut out = String::with_capacity(text.len() + 2);
                out.push('"');
                for ch in text.chars() {
                    match ch {
                        '"' => out.push_str("\\\""),
                        _ => push_escaped(&mut out, ch),
                    }
                }
                out.push('"');
                out
            }
        }
    }

    fn char_literal(&self, ch: char) -> String {
        match self.escape {
            EscapeMode::Verbatim => format!("'{ch}'"),
            EscapeMode::Escaped => {
                let mut out = String::from("'");
                match ch {
                    '\'' => out.push_str("\\'"),
                    _ => push_escaped(&mut out, ch),
                }
                out.push('\'');
                out
            }
        }
    }
}

fn push_escaped(out: &mut String, ch: char) {
    match ch {
        '\\' => out.push_str("\\\\"),
        '\0' => out.push_str("\\0"),
        '\u{7}' => out.push_str("\\a"),
        '\u{8}' => out.push_str("\\b"),
        '\u{c}' => out.push_str("\\f"),
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        '\u{b}' => out.push_str("\\v"),
        '\u{2028}' | '\u{2029}' => {
            let _ = write!(out, "\\u{:04X}", ch as u32);
        }
        ch if ch.is_control() => {
            let _ = write!(out, "\\u{:04X}", ch as u32);
        }
        ch => out.push(ch),
    }
}

fn format_double(number: f64) -> String {
    if number.is_nan() {
        "double.NaN".to_string()
    } else if number.is_infinite() {
        if number > 0.0 {
            "double.PositiveInfinity".to_string()
        } else {
            "double.NegativeInfinity".to_string()
        }
    } else {
        format!("{number:?}")
    }
}

fn format_real(number: f32) -> String {
    if number.is_nan() {
        "float.NaN".to_string()
    } else if number.is_infinite() {
        if number > 0.0 {
            "float.PositiveInfinity".to_string()
        } else {
            "float.NegativeInfinity".to_string()
        }
    } else {
        format!("{number:?}f")
    }
}

fn format_bytes(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return "new byte[0]".to_string();
    }
    let items: Vec<String> = bytes.iter().map(|byte| format!("0x{byte:02X}")).collect();
    format!("new byte[] {{ {} }}", items.join(", "))
}
