use std::collections::BTreeMap;
use std::fmt;

/// A single block parameter as entered in the editor.
///
/// Number fields in the editor hand back whatever the user typed, so a value
/// may arrive as text even where a number is expected.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Number(f64),
    Text(String),
}

impl Param {
    /// Lenient numeric read: numbers pass through when finite, text yields its
    /// leading numeric prefix. Anything else is `None`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Param::Number(n) if n.is_finite() => Some(*n),
            Param::Number(_) => None,
            Param::Text(s) => parse_numeric_prefix(s),
        }
    }

    pub fn as_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Number(n) => write!(f, "{n}"),
            Param::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Param {
    fn from(value: f64) -> Self {
        Param::Number(value)
    }
}

impl From<f32> for Param {
    fn from(value: f32) -> Self {
        Param::Number(value as f64)
    }
}

impl From<i32> for Param {
    fn from(value: i32) -> Self {
        Param::Number(value as f64)
    }
}

impl From<u32> for Param {
    fn from(value: u32) -> Self {
        Param::Number(value as f64)
    }
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Param::Text(value.to_owned())
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Param::Text(value)
    }
}

/// Named parameters of one block. Ordered so debug output is stable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(BTreeMap<String, Param>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: &str, value: impl Into<Param>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<Param>) {
        self.0.insert(key.to_owned(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Param> {
        self.0.get(key)
    }

    /// Overwrite every key present in `partial`, keep the rest.
    pub fn merge(&mut self, partial: Params) {
        self.0.extend(partial.0);
    }

    /// Numeric read with `0` fallback (steps, degrees, x, y). Saturates at
    /// the `f32` range instead of overflowing to infinity.
    pub fn number_or_zero(&self, key: &str) -> f32 {
        self.get(key).and_then(Param::as_number).map_or(0.0, narrow)
    }

    /// Iteration count: truncated toward zero, negatives and garbage become 0.
    pub fn count(&self, key: &str) -> u32 {
        match self.get(key).and_then(Param::as_number) {
            Some(n) if n > 0.0 => n.trunc().min(u32::MAX as f64) as u32,
            _ => 0,
        }
    }

    /// Seconds with a kind-specific fallback when missing or non-numeric.
    pub fn seconds_or(&self, key: &str, fallback: f32) -> f32 {
        match self.get(key).and_then(Param::as_number) {
            Some(n) => narrow(n).max(0.0),
            None => fallback,
        }
    }

    /// Text read with a fallback for missing or empty values.
    pub fn text_or(&self, key: &str, fallback: &str) -> String {
        match self.get(key).map(Param::as_text) {
            Some(text) if !text.is_empty() => text,
            _ => fallback.to_owned(),
        }
    }
}

fn narrow(n: f64) -> f32 {
    n.clamp(f32::MIN as f64, f32::MAX as f64) as f32
}

/// Parse the longest leading decimal number in `s` (after leading whitespace).
///
/// Accepts an optional sign, digits with at most one decimal point, and an
/// optional exponent. `"12px"` gives 12, `"-3.5e1deg"` gives -35, `"abc"` and
/// `"."` give `None`.
pub fn parse_numeric_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let mut digits = 0;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
        digits += 1;
    }
    if bytes.get(end) == Some(&b'.') {
        end += 1;
        while bytes.get(end).is_some_and(u8::is_ascii_digit) {
            end += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return None;
    }

    // Exponent only counts if at least one digit follows it.
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s.get(..end)?.parse::<f64>().ok().filter(|n| n.is_finite())
}
