// Conversion between human-readable sizes ("10G", "1.5T") and byte counts.
// Units are binary: every step is a factor of 1024.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SizeError {
    #[error("no size given")]
    Empty,

    #[error("'{0}' does not start with a number")]
    InvalidNumber(String),

    #[error("'{0}' has no unit, expected one of B, K, M, G, T")]
    MissingUnit(String),

    #[error("unknown unit '{0}', expected one of B, K, M, G, T")]
    InvalidUnit(char),

    #[error("'{0}' does not fit in 64 bits")]
    Overflow(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeUnit {
    B,
    K,
    M,
    G,
    T,
}

impl SizeUnit {
    pub const ALL: [SizeUnit; 5] = [SizeUnit::B, SizeUnit::K, SizeUnit::M, SizeUnit::G, SizeUnit::T];

    pub fn multiplier(self) -> u64 {
        1024u64.pow(self as u32)
    }

    pub fn suffix(self) -> char {
        match self {
            SizeUnit::B => 'B',
            SizeUnit::K => 'K',
            SizeUnit::M => 'M',
            SizeUnit::G => 'G',
            SizeUnit::T => 'T',
        }
    }

    pub fn from_suffix(c: char) -> Option<Self> {
        let c = c.to_ascii_uppercase();
        Self::ALL.into_iter().find(|u| u.suffix() == c)
    }

    /// Largest unit not bigger than `bytes`.
    fn for_bytes(bytes: u64) -> Self {
        Self::ALL
            .into_iter()
            .rev()
            .find(|u| bytes >= u.multiplier())
            .unwrap_or(SizeUnit::B)
    }
}

impl fmt::Display for SizeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.suffix())
    }
}

/// Parse `<digits>[.<digits>]<unit>` into bytes. The unit is mandatory.
pub fn parse_size(text: &str) -> Result<u64, SizeError> {
    let text = text.trim();
    let suffix = text.chars().last().ok_or(SizeError::Empty)?;
    if suffix.is_ascii_digit() {
        return Err(SizeError::MissingUnit(text.to_string()));
    }
    let unit = SizeUnit::from_suffix(suffix).ok_or(SizeError::InvalidUnit(suffix))?;
    let number = &text[..text.len() - suffix.len_utf8()];

    let (whole, fraction) = match number.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (number, None),
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || fraction.is_some_and(|f| !all_digits(f)) {
        return Err(SizeError::InvalidNumber(text.to_string()));
    }

    let overflow = || SizeError::Overflow(text.to_string());
    let whole: u64 = whole.parse().map_err(|_| overflow())?;
    let mut bytes = whole.checked_mul(unit.multiplier()).ok_or_else(overflow)?;

    if let Some(fraction) = fraction {
        let fraction: f64 = format!("0.{}", fraction)
            .parse()
            .map_err(|_| SizeError::InvalidNumber(text.to_string()))?;
        let extra = (fraction * unit.multiplier() as f64).round() as u64;
        bytes = bytes.checked_add(extra).ok_or_else(overflow)?;
    }
    Ok(bytes)
}

/// Format bytes with the largest fitting unit and one decimal digit.
/// Plain bytes are shown as an integer; absent or zero sizes as "0.0".
pub fn format_size(bytes: Option<u64>) -> String {
    let bytes = match bytes {
        Some(b) if b > 0 => b,
        _ => return "0.0".to_string(),
    };
    match SizeUnit::for_bytes(bytes) {
        SizeUnit::B => format!("{}B", bytes),
        unit => format!("{:.1}{}", bytes as f64 / unit.multiplier() as f64, unit),
    }
}
