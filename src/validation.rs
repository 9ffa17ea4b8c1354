use crate::error::{SocratesError, SocratesResult};

/// Validates that a string is not blank (empty or whitespace-only).
/// Returns the trimmed string on success.
pub fn non_blank(value: &str, field: &str) -> SocratesResult<String> {
    let trimmed = value.trim().to_string();
    if trimmed.is_empty() {
        Err(SocratesError::BlankField {
            field: field.to_string(),
        })
    } else {
        Ok(trimmed)
    }
}

/// Validates that an integer is positive (> 0) and fits a `u32`.
pub fn positive(value: i64, field: &str) -> SocratesResult<u32> {
    if value <= 0 {
        return Err(SocratesError::NonPositive {
            field: field.to_string(),
        });
    }
    u32::try_from(value).map_err(|_| SocratesError::OutOfRange {
        field: field.to_string(),
        value,
    })
}

/// Validates an optional positive integer (None is valid, Some(n) must be positive).
pub fn optional_positive(value: Option<i64>, field: &str) -> SocratesResult<Option<u32>> {
    match value {
        None => Ok(None),
        Some(n) => positive(n, field).map(Some),
    }
}
