//! Service error types

use crate::db::repos::{DbError, TenantEntity};
use crate::models::{Forbidden, ValidationError};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Forbidden(#[from] Forbidden),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("import hash is required")]
    ImportHashRequired,

    #[error("row with this import hash was already imported")]
    ImportHashExists,

    #[error("{entity} with this {field} already exists")]
    Duplicate {
        entity: &'static str,
        field: &'static str,
    },

    #[error(transparent)]
    Database(DbError),
}

impl ServiceError {
    /// Translate a repository error of entity `E`, naming the violated
    /// unique field when there is one.
    pub fn from_db<E: TenantEntity>(e: DbError) -> Self {
        if let Some(message) = e.unique_violation() {
            if message.contains(&format!("{}.import_hash", E::TABLE)) {
                return Self::ImportHashExists;
            }
            if let Some(&(_, field)) = E::UNIQUE
                .iter()
                .find(|(column, _)| message.contains(&format!("{}.{}", E::TABLE, column)))
            {
                return Self::Duplicate {
                    entity: E::RESOURCE.key(),
                    field,
                };
            }
        }
        Self::from(e)
    }
}

impl From<DbError> for ServiceError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { resource, id } => Self::NotFound { resource, id },
            DbError::Invalid(v) => Self::Validation(v),
            other => Self::Database(other),
        }
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        Self::Database(DbError::Sqlx(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_errors_are_prefixed_once() {
        let err = ServiceError::from(sqlx::Error::PoolTimedOut);
        let message = err.to_string();
        assert!(message.starts_with("database error: "));
        assert_eq!(message.matches("database error").count(), 1);
    }
}
