//! Field-level checks shared by the services.

use crate::domain::errors::ValidationError;

/// Trimmed, non-empty text of at most `max` characters.
pub fn required_text(field: &'static str, value: &str, max: usize) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if trimmed.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(trimmed.to_string())
}

/// Trimmed optional text; blank input counts as absent.
pub fn optional_text(
    field: &'static str,
    value: Option<String>,
    max: usize,
) -> Result<Option<String>, ValidationError> {
    match value {
        Some(text) if !text.trim().is_empty() => required_text(field, &text, max).map(Some),
        _ => Ok(None),
    }
}

/// Three ASCII letters, normalized to upper case.
pub fn currency_code(value: &str) -> Result<String, ValidationError> {
    let code = value.trim();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code.to_ascii_uppercase())
    } else {
        Err(ValidationError::InvalidCurrency(value.to_string()))
    }
}

/// Largest amount a single transaction may carry. Keeps every ledger sum
/// far inside the fixed-point range.
pub const MAX_AMOUNT: f64 = 1_000_000_000_000.0;

/// Finite, strictly positive and at most [`MAX_AMOUNT`].
pub fn positive_amount(amount: f64) -> Result<f64, ValidationError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ValidationError::NonPositiveAmount);
    }
    if amount > MAX_AMOUNT {
        return Err(ValidationError::AmountTooLarge { max: MAX_AMOUNT });
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert_eq!(required_text("name", "  Home ", 10), Ok("Home".to_string()));
        assert_eq!(required_text("name", "   ", 10), Err(ValidationError::Empty { field: "name" }));
        assert_eq!(
            required_text("name", "abcdefghijk", 10),
            Err(ValidationError::TooLong { field: "name", max: 10 })
        );
    }

    #[test]
    fn test_optional_text_treats_blank_as_absent() {
        assert_eq!(optional_text("notes", Some("  ".to_string()), 10), Ok(None));
        assert_eq!(optional_text("notes", None, 10), Ok(None));
        assert_eq!(optional_text("notes", Some(" hi ".to_string()), 10), Ok(Some("hi".to_string())));
    }

    #[test]
    fn test_currency_and_amount() {
        assert_eq!(currency_code("eur"), Ok("EUR".to_string()));
        assert!(currency_code("EURO").is_err());
        assert!(currency_code("U$D").is_err());
        assert_eq!(positive_amount(0.01), Ok(0.01));
        assert!(positive_amount(0.0).is_err());
        assert!(positive_amount(f64::NAN).is_err());
        assert!(positive_amount(f64::INFINITY).is_err());
        assert_eq!(positive_amount(MAX_AMOUNT), Ok(MAX_AMOUNT));
        assert_eq!(
            positive_amount(6.0e14),
            Err(ValidationError::AmountTooLarge { max: MAX_AMOUNT })
        );
    }
}
