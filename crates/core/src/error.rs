use crate::types::DbId;

/// Domain error taxonomy shared by every crate in the workspace.
///
/// Each variant is a distinct, inspectable failure kind; callers match on
/// the variant rather than parsing messages.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// A field failed a length, pattern, or type rule.
    #[error("Validation failed on `{field}` ({rule}): {message}")]
    Validation {
        field: String,
        rule: String,
        message: String,
    },

    /// A foreign key points at a row that does not exist.
    #[error("Referential integrity violated on {entity}: {message}")]
    ReferentialIntegrity { entity: String, message: String },

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl CoreError {
    /// Shorthand for building a [`CoreError::Validation`].
    pub fn validation(
        field: impl Into<String>,
        rule: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        CoreError::Validation {
            field: field.into(),
            rule: rule.into(),
            message: message.into(),
        }
    }
}
