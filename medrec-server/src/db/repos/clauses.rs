//! Bound values and WHERE clauses built from list filters
//!
//! Filters are collected once and pushed into several queries (the count
//! and the page), so every value is owned and cloneable.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

use crate::models::listing::{self, date_range, timestamp_range};
use crate::models::ValidationError;

/// A value bound into a statement. `None` binds NULL.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Text(Option<String>),
    Uuid(Option<Uuid>),
    Int(Option<i64>),
    Bool(bool),
    Date(Option<NaiveDate>),
    Timestamp(DateTime<Utc>),
}

impl Param {
    pub fn text(value: &str) -> Self {
        Self::Text(Some(value.trim().to_owned()))
    }

    pub fn opt_text(value: Option<&str>) -> Self {
        Self::Text(crate::models::text::normalize(value))
    }

    pub fn push_to(self, qb: &mut QueryBuilder<'_, Sqlite>) {
        match self {
            Self::Text(v) => qb.push_bind(v),
            Self::Uuid(v) => qb.push_bind(v),
            Self::Int(v) => qb.push_bind(v),
            Self::Bool(v) => qb.push_bind(v),
            Self::Date(v) => qb.push_bind(v),
            Self::Timestamp(v) => qb.push_bind(v),
        };
    }
}

#[derive(Debug, Clone)]
enum Clause {
    Like { column: &'static str, pattern: String },
    Eq { column: &'static str, value: Param },
    Gte { column: &'static str, value: Param },
    Lte { column: &'static str, value: Param },
}

/// AND-ed conditions of a list query
#[derive(Debug, Clone, Default)]
pub struct Conditions {
    clauses: Vec<Clause>,
}

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Case-insensitive substring match.
    pub fn contains(&mut self, column: &'static str, value: Option<&str>) {
        if let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) {
            self.clauses.push(Clause::Like {
                column,
                pattern: like_pattern(v),
            });
        }
    }

    /// Exact text match, used for enum columns.
    pub fn text_equals(&mut self, column: &'static str, value: Option<&str>) {
        if let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) {
            self.equals(column, Param::text(v));
        }
    }

    pub fn equals(&mut self, column: &'static str, value: Param) {
        self.clauses.push(Clause::Eq { column, value });
    }

    /// Exact id match. A value that is not a UUID matches nothing.
    pub fn reference(&mut self, column: &'static str, value: Option<&str>) {
        if let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) {
            let id = Uuid::parse_str(v).unwrap_or(Uuid::nil());
            self.equals(column, Param::Uuid(Some(id)));
        }
    }

    pub fn flag(
        &mut self,
        column: &'static str,
        field: &'static str,
        value: Option<&str>,
    ) -> Result<(), ValidationError> {
        if let Some(b) = listing::flag(field, value)? {
            self.equals(column, Param::Bool(b));
        }
        Ok(())
    }

    /// Inclusive `[start, end]` date range; either bound may be open.
    pub fn date_between(
        &mut self,
        column: &'static str,
        field: &'static str,
        bounds: Option<&[String]>,
    ) -> Result<(), ValidationError> {
        let (start, end) = date_range(field, bounds)?;
        if let Some(start) = start {
            self.clauses.push(Clause::Gte {
                column,
                value: Param::Date(Some(start)),
            });
        }
        if let Some(end) = end {
            self.clauses.push(Clause::Lte {
                column,
                value: Param::Date(Some(end)),
            });
        }
        Ok(())
    }

    pub fn timestamp_between(
        &mut self,
        column: &'static str,
        field: &'static str,
        bounds: Option<&[String]>,
    ) -> Result<(), ValidationError> {
        let (start, end) = timestamp_range(field, bounds)?;
        if let Some(start) = start {
            self.clauses.push(Clause::Gte {
                column,
                value: Param::Timestamp(start),
            });
        }
        if let Some(end) = end {
            self.clauses.push(Clause::Lte {
                column,
                value: Param::Timestamp(end),
            });
        }
        Ok(())
    }

    pub fn int_between(
        &mut self,
        column: &'static str,
        field: &'static str,
        bounds: Option<&[String]>,
    ) -> Result<(), ValidationError> {
        let bounds = bounds.unwrap_or(&[]);
        let start = listing::integer(field, bounds.first().map(String::as_str))?;
        let end = listing::integer(field, bounds.get(1).map(String::as_str))?;
        if start.is_some() {
            self.clauses.push(Clause::Gte {
                column,
                value: Param::Int(start),
            });
        }
        if end.is_some() {
            self.clauses.push(Clause::Lte {
                column,
                value: Param::Int(end),
            });
        }
        Ok(())
    }

    /// Append every clause as ` AND ...`.
    pub fn push_to(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        for clause in self.clauses.iter().cloned() {
            match clause {
                Clause::Like { column, pattern } => {
                    qb.push(format!(" AND {column} LIKE "));
                    qb.push_bind(pattern);
                    qb.push(" ESCAPE '\\'");
                }
                Clause::Eq { column, value } => {
                    qb.push(format!(" AND {column} = "));
                    value.push_to(qb);
                }
                Clause::Gte { column, value } => {
                    qb.push(format!(" AND {column} >= "));
                    value.push_to(qb);
                }
                Clause::Lte { column, value } => {
                    qb.push(format!(" AND {column} <= "));
                    value.push_to(qb);
                }
            }
        }
    }
}

/// `%value%` with LIKE wildcards in the value escaped.
pub fn like_pattern(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('%');
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("para"), "%para%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn blank_filters_add_nothing() {
        let mut c = Conditions::new();
        c.contains("name", Some("  "));
        c.reference("doctor_id", None);
        c.date_between("visit_date", "visitDateRange", None).unwrap();
        assert!(c.is_empty());
    }

    #[test]
    fn clauses_render_with_placeholders() {
        let mut c = Conditions::new();
        c.contains("name", Some("Anand"));
        c.int_between("count", "countRange", Some(&["1".into(), "".into()]))
            .unwrap();

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT id FROM doctors WHERE 1=1");
        c.push_to(&mut qb);
        assert_eq!(
            qb.sql(),
            "SELECT id FROM doctors WHERE 1=1 AND name LIKE ? ESCAPE '\\' AND count >= ?"
        );
    }

    #[test]
    fn invalid_reference_matches_nothing() {
        let mut c = Conditions::new();
        c.reference("patient_id", Some("not-a-uuid"));
        let Clause::Eq { value, .. } = &c.clauses[0] else {
            panic!("expected equality clause");
        };
        assert_eq!(value, &Param::Uuid(Some(Uuid::nil())));
    }

    #[test]
    fn bad_range_is_rejected() {
        let mut c = Conditions::new();
        let err = c
            .int_between("count", "countRange", Some(&["many".into()]))
            .unwrap_err();
        assert_eq!(err.field(), "countRange");
    }
}
