//! Input validation for identifiers and names

use crate::contract::PosError;

const MAX_KEY_LEN: usize = 64;

/// Validate a product SKU
///
/// Accepts alphanumeric characters plus `-`, `_` and `.`, starting with an
/// alphanumeric character. Surrounding whitespace is not allowed; callers
/// trim first.
pub fn validate_sku(sku: &str) -> Result<(), PosError> {
    validate_code("sku", sku, MAX_KEY_LEN)
}

/// Validate a system config key (1-64 chars, alphanumeric first, then `._-`)
pub fn validate_config_key(key: &str) -> Result<(), PosError> {
    validate_code("config key", key, MAX_KEY_LEN)
}

/// Validate and normalize a promo code to upper case
pub fn normalize_promo_code(code: &str) -> Result<String, PosError> {
    let trimmed = code.trim();
    validate_code("promo code", trimmed, 32)?;
    Ok(trimmed.to_uppercase())
}

/// Trimmed, non-empty display name
pub fn require_name(field: &str, name: &str) -> Result<String, PosError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(PosError::validation(format!("{} cannot be empty", field)));
    }
    if trimmed.chars().count() > 200 {
        return Err(PosError::validation(format!(
            "{} cannot be longer than 200 characters",
            field
        )));
    }
    Ok(trimmed.to_string())
}

fn validate_code(field: &str, value: &str, max_len: usize) -> Result<(), PosError> {
    let Some(first) = value.chars().next() else {
        return Err(PosError::validation(format!("{} cannot be empty", field)));
    };

    if value.len() > max_len {
        return Err(PosError::validation(format!(
            "{} '{}' is longer than {} characters",
            field, value, max_len
        )));
    }

    if !first.is_ascii_alphanumeric() {
        return Err(PosError::validation(format!(
            "{} '{}' must start with an alphanumeric character",
            field, value
        )));
    }

    let valid = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-');
    if !valid {
        return Err(PosError::validation(format!(
            "{} '{}' contains invalid characters. Only alphanumeric, '_', '.', and '-' are allowed",
            field, value
        )));
    }

    Ok(())
}
