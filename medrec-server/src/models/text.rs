//! Field rules shared by entity inputs
//!
//! Lengths are counted in characters, not bytes, so names with accents or
//! Devanagari script are measured the way a user would count them.

use super::ValidationError;

/// Require a non-blank string whose trimmed length is within `min..=max`.
pub fn bounded(field: &'static str, value: &str, min: usize, max: usize) -> Result<(), ValidationError> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }

    let len = trimmed.chars().count();
    if len < min {
        return Err(ValidationError::TooShort { field, min });
    }
    if len > max {
        return Err(ValidationError::TooLong { field, max });
    }

    Ok(())
}

/// Require a non-blank string of any length.
pub fn required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(())
}

/// Cap an optional string at `max` characters.
pub fn at_most(field: &'static str, value: Option<&str>, max: usize) -> Result<(), ValidationError> {
    match value {
        Some(v) if v.chars().count() > max => Err(ValidationError::TooLong { field, max }),
        _ => Ok(()),
    }
}

/// Require that an optional value was supplied.
pub fn present<T>(field: &'static str, value: &Option<T>) -> Result<(), ValidationError> {
    if value.is_none() {
        return Err(ValidationError::Missing { field });
    }
    Ok(())
}

/// Trim and drop blank optional strings.
pub fn normalize(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// Build a display name from its parts.
///
/// Returns `None` when neither first nor last name is present. A blank
/// middle name is skipped rather than leaving a double space.
pub fn build_full_name(first: &str, middle: Option<&str>, last: &str) -> Option<String> {
    let first = first.trim();
    let last = last.trim();

    if first.is_empty() && last.is_empty() {
        return None;
    }

    let joined = match middle.map(str::trim).filter(|m| !m.is_empty()) {
        Some(middle) => format!("{} {} {}", first, middle, last),
        None => format!("{} {}", first, last),
    };

    Some(joined.trim().to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_lengths() {
        assert!(bounded("name", "Aspirin", 5, 100).is_ok());
        assert!(matches!(
            bounded("name", "Asp", 5, 100).unwrap_err(),
            ValidationError::TooShort { min: 5, .. }
        ));
        assert!(matches!(
            bounded("name", &"a".repeat(101), 5, 100).unwrap_err(),
            ValidationError::TooLong { max: 100, .. }
        ));
        assert!(matches!(
            bounded("name", "   ", 5, 100).unwrap_err(),
            ValidationError::Empty { .. }
        ));
    }

    #[test]
    fn bounded_counts_chars() {
        // 5 characters, 10 bytes
        assert!(bounded("name", "ééééé", 5, 6).is_ok());
    }

    #[test]
    fn full_name_without_middle() {
        assert_eq!(build_full_name("Jo", None, "Doe").as_deref(), Some("Jo Doe"));
        assert_eq!(
            build_full_name(" Jo ", Some("  "), " Doe").as_deref(),
            Some("Jo Doe")
        );
    }

    #[test]
    fn full_name_with_middle() {
        assert_eq!(
            build_full_name("Jo", Some("Anne"), "Doe").as_deref(),
            Some("Jo Anne Doe")
        );
    }

    #[test]
    fn full_name_requires_a_name() {
        assert_eq!(build_full_name("", Some("x"), " "), None);
        assert_eq!(build_full_name("", None, "Doe").as_deref(), Some("Doe"));
    }

    #[test]
    fn normalize_drops_blanks() {
        assert_eq!(normalize(Some("  ")), None);
        assert_eq!(normalize(Some(" 42 ")).as_deref(), Some("42"));
        assert_eq!(normalize(None), None);
    }
}
