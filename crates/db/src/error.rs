use mobilepack_core::error::CoreError;
use mobilepack_core::types::DbId;

/// PostgreSQL SQLSTATE for a foreign key violation.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// PostgreSQL SQLSTATE for a unique constraint violation.
const UNIQUE_VIOLATION: &str = "23505";

/// Error returned by every repository operation.
///
/// Store failures that carry domain meaning (foreign key and unique
/// violations) are classified into [`CoreError`] so callers can tell them
/// apart from plain persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

/// Coarse classification of a [`DbError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    ReferentialIntegrity,
    NotFound,
    Conflict,
    Persistence,
}

impl DbError {
    pub fn not_found(entity: &'static str, id: DbId) -> Self {
        DbError::Core(CoreError::NotFound { entity, id })
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DbError::Core(CoreError::Validation { .. }) => ErrorKind::Validation,
            DbError::Core(CoreError::ReferentialIntegrity { .. }) => {
                ErrorKind::ReferentialIntegrity
            }
            DbError::Core(CoreError::NotFound { .. }) => ErrorKind::NotFound,
            DbError::Core(CoreError::Conflict(_)) => ErrorKind::Conflict,
            DbError::Database(_) => ErrorKind::Persistence,
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or("unknown");
            match db_err.code().as_deref() {
                Some(FOREIGN_KEY_VIOLATION) => {
                    return DbError::Core(CoreError::ReferentialIntegrity {
                        entity: db_err.table().unwrap_or("unknown").to_string(),
                        message: format!("{} (constraint {constraint})", db_err.message()),
                    });
                }
                Some(UNIQUE_VIOLATION) => {
                    return DbError::Core(CoreError::Conflict(format!(
                        "Duplicate value violates unique constraint: {constraint}"
                    )));
                }
                _ => {}
            }
        }
        DbError::Database(err)
    }
}

impl From<validator::ValidationErrors> for DbError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DbError::Core(errors.into())
    }
}
