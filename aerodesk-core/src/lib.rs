pub mod identity;
pub mod repository;

use repository::RepoError;

/// Failure categories shared by every engine operation. None of them leave a
/// partial mutation behind.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Malformed input or a regulation bound violated.
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },
    /// Capacity exhausted, deadline passed, illegal transition or a lost race.
    #[error("Conflict: {0}")]
    ConflictError(String),
    #[error("Internal service error: {0}")]
    InternalError(String),
}

impl CoreError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        CoreError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Caller-facing reason without the category prefix.
    pub fn reason(&self) -> String {
        match self {
            CoreError::ValidationError(msg)
            | CoreError::ConflictError(msg)
            | CoreError::InternalError(msg) => msg.clone(),
            CoreError::NotFound { .. } => self.to_string(),
        }
    }
}

impl From<RepoError> for CoreError {
    fn from(err: RepoError) -> Self {
        CoreError::InternalError(err.to_string())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_strips_category() {
        let err = CoreError::ConflictError("No available seats in this class".to_string());
        assert_eq!(err.reason(), "No available seats in this class");
        assert_eq!(err.to_string(), "Conflict: No available seats in this class");

        let err = CoreError::not_found("Flight", "VN210");
        assert_eq!(err.reason(), "Flight not found: VN210");
    }

    #[test]
    fn test_storage_errors_become_internal() {
        let boxed: RepoError = "connection reset".into();
        let err: CoreError = boxed.into();
        assert!(matches!(err, CoreError::InternalError(msg) if msg == "connection reset"));
    }
}
