//! Reader for CTG trace files: a Python-literal list of `{'Key': x, 'Value': y}` mappings.

use anyhow::{Context, Result};
use log::{debug, warn};
use serde::Deserialize;
use std::path::Path;

use crate::pipeline::PayloadReader;

/// One parsed CTG trace: time axis and heart rate, aligned by index. Missing values are `None`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CtgTrace {
    pub x: Vec<f64>,
    pub y: Vec<Option<f64>>,
}

impl CtgTrace {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// `(x, y)` pairs in file order.
    pub fn points(&self) -> impl Iterator<Item = (f64, Option<f64>)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }
}

#[derive(Debug, Deserialize)]
struct RawPoint {
    #[serde(rename = "Key", default)]
    key: Option<f64>,
    #[serde(rename = "Value", default)]
    value: Option<f64>,
}

/// Stateless reader for CTG trace files. One is built per reader worker.
#[derive(Clone, Copy, Debug, Default)]
pub struct DictReader;

impl DictReader {
    pub fn new() -> Self {
        Self
    }

    /// Parse a trace file. Errors carry the path; [`PayloadReader::read`] logs and drops them.
    pub fn parse_file(&self, path: &Path) -> Result<CtgTrace> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read {}", path.display()))?;
        debug!("File {} open", path.display());
        let trace = parse_trace(&text).with_context(|| format!("parse {}", path.display()))?;
        debug!("File {} parsed ({} points)", path.display(), trace.len());
        Ok(trace)
    }
}

impl PayloadReader for DictReader {
    type Payload = CtgTrace;

    fn read(&mut self, path: &Path) -> Option<CtgTrace> {
        self.parse_file(path)
            .map_err(|e| warn!("{:#}", e))
            .ok()
    }
}

/// Parse the text of a trace file. Points without a `Key` are dropped.
pub fn parse_trace(text: &str) -> Result<CtgTrace> {
    let json = python_literal_to_json(text)?;
    let raw: Vec<RawPoint> = serde_json::from_str(&json)?;
    let mut trace = CtgTrace::default();
    for point in raw {
        match point.key {
            Some(x) => {
                trace.x.push(x);
                trace.y.push(point.value);
            }
            None => debug!("Dropping point without Key"),
        }
    }
    Ok(trace)
}

/// Rewrite a Python literal (single-quoted strings, `None`/`True`/`False`, trailing commas,
/// `1_000` / `0x1F` / `.5` style numbers) as JSON. Content inside strings is kept as is apart
/// from quote escaping. Fails on a numeric token with no JSON equivalent.
pub fn python_literal_to_json(src: &str) -> Result<String> {
    let mut out = String::with_capacity(src.len());
    let mut quote: Option<char> = None;
    let mut chars = src.chars().peekable();

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            match c {
                '\\' => match chars.next() {
                    Some('\'') => out.push('\''),
                    Some(n) => {
                        out.push('\\');
                        out.push(n);
                    }
                    None => out.push('\\'),
                },
                c if c == q => {
                    out.push('"');
                    quote = None;
                }
                '"' => out.push_str("\\\""),
                _ => out.push(c),
            }
            continue;
        }

        match c {
            '\'' | '"' => {
                quote = Some(c);
                out.push('"');
            }
            ',' => {
                let mut ahead = chars.clone();
                while ahead.next_if(|n| n.is_whitespace()).is_some() {}
                if !matches!(ahead.peek(), Some(']' | '}')) {
                    out.push(',');
                }
            }
            c if c.is_ascii_digit()
                || (c == '.' && chars.peek().is_some_and(|n| n.is_ascii_digit())) =>
            {
                let mut token = String::from(c);
                let hex = c == '0' && matches!(chars.peek(), Some('x' | 'X'));
                while let Some(n) = chars.next_if(|n| {
                    n.is_ascii_alphanumeric()
                        || *n == '_'
                        || *n == '.'
                        || (matches!(*n, '+' | '-') && !hex && token.ends_with(['e', 'E']))
                }) {
                    token.push(n);
                }
                out.push_str(&number_to_json(&token)?);
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut word = String::from(c);
                while let Some(n) = chars.next_if(|n| n.is_ascii_alphanumeric() || *n == '_') {
                    word.push(n);
                }
                out.push_str(match word.as_str() {
                    "None" => "null",
                    "True" => "true",
                    "False" => "false",
                    other => other,
                });
            }
            _ => out.push(c),
        }
    }
    Ok(out)
}

/// JSON spelling of one Python numeric token.
fn number_to_json(token: &str) -> Result<String> {
    let digits: String = token.chars().filter(|c| *c != '_').collect();
    let radix = match digits.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let value = u64::from_str_radix(&digits[2..], radix)
            .with_context(|| format!("unsupported numeric literal {:?}", token))?;
        return Ok(value.to_string());
    }
    if let Ok(value) = digits.parse::<i64>() {
        return Ok(value.to_string());
    }
    match digits.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(format!("{:?}", value)),
        _ => anyhow::bail!("unsupported numeric literal {:?}", token),
    }
}
