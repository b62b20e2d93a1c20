//! List query types: window, ordering, ranges and the `{rows, count}` page

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Hard cap on rows returned by a single list call
pub const MAX_LIMIT: u32 = 500;

/// Default autocomplete result count
pub const DEFAULT_AUTOCOMPLETE_LIMIT: u32 = 10;

/// Row window for a list query.
///
/// A zero or absent limit means "everything", capped at [`MAX_LIMIT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub limit: u32,
    pub offset: u32,
}

impl Window {
    pub fn new(limit: Option<u32>, offset: Option<u32>) -> Self {
        let limit = match limit {
            None | Some(0) => MAX_LIMIT,
            Some(n) => n.min(MAX_LIMIT),
        };
        Self {
            limit,
            offset: offset.unwrap_or(0),
        }
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Sort order resolved against a per-entity whitelist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ordering {
    pub column: &'static str,
    pub descending: bool,
}

impl Ordering {
    /// Newest first.
    pub const DEFAULT: Ordering = Ordering {
        column: "created_at",
        descending: true,
    };

    /// Parse `<field>_ASC` / `<field>_DESC`.
    ///
    /// `allowed` maps JSON field names to columns; `createdAt` is always
    /// accepted. Anything else is rejected instead of reaching SQL.
    pub fn parse(
        order_by: Option<&str>,
        allowed: &[(&'static str, &'static str)],
    ) -> Result<Self, ValidationError> {
        let Some(raw) = order_by.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(Self::DEFAULT);
        };

        let (field, direction) = raw.rsplit_once('_').ok_or(ValidationError::InvalidFormat {
            field: "orderBy",
            reason: "expected <field>_ASC or <field>_DESC",
        })?;

        let descending = match direction.to_ascii_uppercase().as_str() {
            "ASC" => false,
            "DESC" => true,
            _ => {
                return Err(ValidationError::InvalidFormat {
                    field: "orderBy",
                    reason: "direction must be ASC or DESC",
                })
            }
        };

        let column = if field == "createdAt" {
            "created_at"
        } else {
            allowed
                .iter()
                .find(|(name, _)| *name == field)
                .map(|(_, column)| *column)
                .ok_or_else(|| ValidationError::InvalidVariant {
                    field: "orderBy",
                    value: field.to_owned(),
                })?
        };

        Ok(Self { column, descending })
    }
}

/// List response: the requested window plus the total match count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub count: i64,
}

/// One id/label pair for type-ahead widgets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AutocompleteItem {
    pub id: uuid::Uuid,
    pub label: String,
}

/// Parse a `[start, end]` date range. Blank bounds are open.
pub fn date_range(
    field: &'static str,
    bounds: Option<&[String]>,
) -> Result<(Option<NaiveDate>, Option<NaiveDate>), ValidationError> {
    let (start, end) = split_bounds(bounds);
    Ok((parse_date(field, start)?, parse_date(field, end)?))
}

/// Parse a `[start, end]` timestamp range. Blank bounds are open.
///
/// Accepts RFC 3339 timestamps or plain dates; a plain end date covers the
/// whole day.
pub fn timestamp_range(
    field: &'static str,
    bounds: Option<&[String]>,
) -> Result<(Option<DateTime<Utc>>, Option<DateTime<Utc>>), ValidationError> {
    let (start, end) = split_bounds(bounds);
    let start = parse_timestamp(field, start, NaiveTime::MIN)?;
    let end_of_day = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    let end = parse_timestamp(field, end, end_of_day)?;
    Ok((start, end))
}

/// Parse a boolean filter value (`true`/`false`).
pub fn flag(field: &'static str, value: Option<&str>) -> Result<Option<bool>, ValidationError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some("true") => Ok(Some(true)),
        Some("false") => Ok(Some(false)),
        Some(other) => Err(ValidationError::InvalidVariant {
            field,
            value: other.to_owned(),
        }),
    }
}

/// Parse an integer filter value.
pub fn integer(field: &'static str, value: Option<&str>) -> Result<Option<i64>, ValidationError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => v.parse().map(Some).map_err(|_| ValidationError::InvalidFormat {
            field,
            reason: "expected an integer",
        }),
    }
}

fn split_bounds(bounds: Option<&[String]>) -> (Option<&str>, Option<&str>) {
    let bounds = bounds.unwrap_or(&[]);
    let pick = |i: usize| {
        bounds
            .get(i)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    };
    (pick(0), pick(1))
}

fn parse_date(field: &'static str, value: Option<&str>) -> Result<Option<NaiveDate>, ValidationError> {
    value
        .map(|v| {
            // Tolerate full timestamps by keeping the date part
            let date_part = v.get(..10).unwrap_or(v);
            NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|_| {
                ValidationError::InvalidFormat {
                    field,
                    reason: "expected YYYY-MM-DD",
                }
            })
        })
        .transpose()
}

fn parse_timestamp(
    field: &'static str,
    value: Option<&str>,
    time_of_day: NaiveTime,
) -> Result<Option<DateTime<Utc>>, ValidationError> {
    let Some(value) = value else {
        return Ok(None);
    };

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        ValidationError::InvalidFormat {
            field,
            reason: "expected an RFC 3339 timestamp or YYYY-MM-DD",
        }
    })?;

    Ok(Some(Utc.from_utc_datetime(&date.and_time(time_of_day))))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALLOWED: &[(&str, &str)] = &[("medicineName", "medicine_name")];

    #[test]
    fn window_defaults_and_caps() {
        assert_eq!(Window::new(None, None), Window { limit: MAX_LIMIT, offset: 0 });
        assert_eq!(Window::new(Some(0), Some(5)).limit, MAX_LIMIT);
        assert_eq!(Window::new(Some(10_000), None).limit, MAX_LIMIT);
        assert_eq!(Window::new(Some(25), Some(50)), Window { limit: 25, offset: 50 });
    }

    #[test]
    fn ordering_default_is_newest_first() {
        assert_eq!(Ordering::parse(None, ALLOWED).unwrap(), Ordering::DEFAULT);
        assert_eq!(Ordering::parse(Some(""), ALLOWED).unwrap(), Ordering::DEFAULT);
    }

    #[test]
    fn ordering_resolves_whitelisted_fields() {
        let o = Ordering::parse(Some("medicineName_ASC"), ALLOWED).unwrap();
        assert_eq!(o.column, "medicine_name");
        assert!(!o.descending);

        let o = Ordering::parse(Some("createdAt_desc"), ALLOWED).unwrap();
        assert_eq!(o.column, "created_at");
        assert!(o.descending);
    }

    #[test]
    fn ordering_rejects_unknown_fields() {
        let err = Ordering::parse(Some("password_ASC"), ALLOWED).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidVariant { .. }));

        let err = Ordering::parse(Some("medicineName_UP"), ALLOWED).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { .. }));
    }

    #[test]
    fn open_date_ranges() {
        let bounds = vec!["2024-01-01".to_owned(), String::new()];
        let (start, end) = date_range("visitDate", Some(&bounds)).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(end, None);

        let (start, end) = date_range("visitDate", None).unwrap();
        assert_eq!((start, end), (None, None));
    }

    #[test]
    fn timestamp_range_end_covers_day() {
        let bounds = vec!["2024-01-01".to_owned(), "2024-01-31".to_owned()];
        let (start, end) = timestamp_range("createdAtRange", Some(&bounds)).unwrap();
        assert_eq!(start.unwrap().to_rfc3339(), "2024-01-01T00:00:00+00:00");
        assert_eq!(end.unwrap().to_rfc3339(), "2024-01-31T23:59:59.999+00:00");
    }

    #[test]
    fn rejects_bad_dates() {
        let bounds = vec!["yesterday".to_owned()];
        assert!(date_range("visitDate", Some(&bounds)).is_err());
    }

    #[test]
    fn flags() {
        assert_eq!(flag("keptInStock", Some("true")).unwrap(), Some(true));
        assert_eq!(flag("keptInStock", Some("")).unwrap(), None);
        assert!(flag("keptInStock", Some("yes")).is_err());
    }
}
