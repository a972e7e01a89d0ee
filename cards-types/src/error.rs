//! Error types for the cards service.

use std::collections::BTreeMap;

use serde::Serialize;

/// Violated field -> message, ordered by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a violation; the first message per field wins.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields: Vec<&str> = self.fields().collect();
        write!(f, "{}", fields.join(", "))
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        for (field, violations) in errors.field_errors() {
            if let Some(violation) = violations.first() {
                let message = violation
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| violation.code.to_string());
                out.add(field.to_string(), message);
            }
        }
        out
    }
}

/// Domain-level errors (input rule violations).
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Validation failed for: {0}")]
    Validation(FieldErrors),

    #[error("Malformed identifier: {0}")]
    MalformedIdentifier(String),
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DomainError::Validation(errors.into())
    }
}

/// Repository-level errors (data access failures).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Entity not found")]
    NotFound,

    /// A uniqueness constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Application-level errors (for HTTP responses).
///
/// Maps cleanly to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation failed for: {0}")]
    Validation(FieldErrors),

    #[error("Malformed identifier: {0}")]
    MalformedIdentifier(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(fields) => AppError::Validation(fields),
            DomainError::MalformedIdentifier(raw) => AppError::MalformedIdentifier(raw),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".into()),
            RepoError::Conflict(e) => AppError::Conflict(e),
            RepoError::Database(e) => AppError::Internal(e),
            RepoError::Transaction(e) => AppError::Internal(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_message_per_field_wins() {
        let mut errors = FieldErrors::new();
        errors.add("cvc", "first");
        errors.add("cvc", "second");
        assert_eq!(errors.get("cvc"), Some("first"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let mut errors = FieldErrors::new();
        errors.add("number", "bad");
        errors.add("cvc", "bad too");
        let json = serde_json::to_string(&errors).unwrap();
        assert_eq!(json, r#"{"cvc":"bad too","number":"bad"}"#);
    }

    #[test]
    fn test_repo_conflict_maps_to_app_conflict() {
        let err: AppError = RepoError::Conflict("duplicate name".into()).into();
        assert!(matches!(err, AppError::Conflict(msg) if msg == "duplicate name"));
    }

    #[test]
    fn test_database_error_maps_to_internal() {
        let err: AppError = RepoError::Database("disk full".into()).into();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
