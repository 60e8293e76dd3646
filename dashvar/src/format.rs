//! Value formatting for interpolated variables.
//!
//! A token may carry a format suffix (`${host:csv}`) telling the
//! interpolator how to render the variable's current value, which matters
//! mostly for multi-selects:
//!
//! | format          | `["a","b"]` renders as |
//! |-----------------|------------------------|
//! | (default)       | `{a,b}`                |
//! | `raw`, `csv`    | `a,b`                  |
//! | `text`          | `a + b`                |
//! | `pipe`          | `a\|b`                 |
//! | `glob`          | `{a,b}`                |
//! | `json`          | `["a","b"]`            |
//! | `regex`         | `(a\|b)`               |
//! | `percentencode` | `%7Ba%2Cb%7D`          |
//! | `singlequote`   | `'a','b'`              |
//! | `doublequote`   | `"a","b"`              |
//! | `sqlstring`     | `'a','b'`              |
//!
//! Single values pass through unchanged under the default format.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::store::VariableValue;

/// How a variable value renders into the output text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// No explicit format: single values pass through, multi-selects render
    /// as `{a,b}`.
    #[default]
    Default,
    Raw,
    Text,
    Csv,
    Json,
    Pipe,
    Glob,
    Regex,
    PercentEncode,
    SingleQuote,
    DoubleQuote,
    SqlString,
}

impl Format {
    pub fn as_str(self) -> &'static str {
        match self {
            Format::Default => "default",
            Format::Raw => "raw",
            Format::Text => "text",
            Format::Csv => "csv",
            Format::Json => "json",
            Format::Pipe => "pipe",
            Format::Glob => "glob",
            Format::Regex => "regex",
            Format::PercentEncode => "percentencode",
            Format::SingleQuote => "singlequote",
            Format::DoubleQuote => "doublequote",
            Format::SqlString => "sqlstring",
        }
    }

    /// Parse a token's format suffix, falling back to [`Format::Default`]
    /// for names this build does not know.
    pub fn parse_or_default(name: &str) -> Format {
        name.parse().unwrap_or_else(|error: UnknownFormatError| {
            debug!(%error, "falling back to the default format");
            Format::Default
        })
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = UnknownFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "raw" => Format::Raw,
            "text" => Format::Text,
            "csv" => Format::Csv,
            "json" => Format::Json,
            "pipe" => Format::Pipe,
            "glob" => Format::Glob,
            "regex" => Format::Regex,
            "percentencode" => Format::PercentEncode,
            "singlequote" => Format::SingleQuote,
            "doublequote" => Format::DoubleQuote,
            "sqlstring" => Format::SqlString,
            _ => return Err(UnknownFormatError { name: s.to_owned() }),
        })
    }
}

/// A format suffix named something this build does not implement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFormatError {
    name: String,
}

impl UnknownFormatError {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for UnknownFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown format specifier `{}`", self.name)
    }
}

impl std::error::Error for UnknownFormatError {}

/// Render a variable value under the given format.
pub fn format_value(value: &VariableValue, format: Format) -> String {
    let values = value.values();
    match format {
        Format::Default | Format::Glob => match values {
            [single] => single.clone(),
            _ => format!("{{{}}}", values.join(",")),
        },
        Format::Raw | Format::Csv => values.join(","),
        Format::Text => values.join(" + "),
        Format::Pipe => values.join("|"),
        Format::Json => match value {
            VariableValue::Single(v) => serde_json::Value::from(v.as_str()).to_string(),
            VariableValue::Multi(vs) => serde_json::Value::from(vs.clone()).to_string(),
        },
        Format::Regex => {
            let escaped: Vec<String> = values.iter().map(|v| regex::escape(v)).collect();
            match escaped.as_slice() {
                [single] => single.clone(),
                _ => format!("({})", escaped.join("|")),
            }
        }
        Format::PercentEncode => {
            let plain = match values {
                [single] => single.clone(),
                _ => format!("{{{}}}", values.join(",")),
            };
            percent_encode(&plain)
        }
        Format::SingleQuote => quote_each(values, '\'', "\\'"),
        Format::DoubleQuote => quote_each(values, '"', "\\\""),
        Format::SqlString => quote_each(values, '\'', "''"),
    }
}

fn quote_each(values: &[String], quote: char, escaped_quote: &str) -> String {
    let quoted: Vec<String> = values
        .iter()
        .map(|v| format!("{quote}{}{quote}", v.replace(quote, escaped_quote)))
        .collect();
    quoted.join(",")
}

/// Percent-encode everything outside the URI unreserved set.
fn percent_encode(input: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            _ => {
                out.push('%');
                out.push(HEX[(byte >> 4) as usize] as char);
                out.push(HEX[(byte & 0x0f) as usize] as char);
            }
        }
    }
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
