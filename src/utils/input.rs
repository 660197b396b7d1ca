use thiserror::Error;

/// Keyword that keeps the default goal during setup.
pub const DEFAULT_KEYWORD: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Enter a number (0 or more)")]
    Empty,
    #[error("'{0}' is not a number. Enter 0 or more")]
    NotANumber(String),
    #[error("Negative amounts are not allowed. Enter 0 or more")]
    Negative,
}

/// Parses a non-negative amount, accepting a decimal comma and rounding to
/// the nearest whole unit.
pub fn parse_amount(text: &str) -> Result<u32, InputError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(InputError::Empty);
    }
    let value: f64 = trimmed
        .replace(',', ".")
        .parse()
        .map_err(|_| InputError::NotANumber(trimmed.to_string()))?;
    if !value.is_finite() {
        return Err(InputError::NotANumber(trimmed.to_string()));
    }
    if value < 0.0 {
        return Err(InputError::Negative);
    }
    Ok(value.round().min(u32::MAX as f64) as u32)
}

pub fn is_default_keyword(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case(DEFAULT_KEYWORD)
}
