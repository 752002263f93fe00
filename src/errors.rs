use thiserror::Error;

use crate::domain::errors::DomainError;
use crate::domain::validation::ValidationErrors;

/// Everything a controller can report back to the operator.
///
/// `Clone` so a deduplicated in-flight request can hand the same failure to
/// every waiter.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Transport(String),

    #[error("Invalid input: {0}")]
    Validation(ValidationErrors),

    #[error("{message}")]
    Backend { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Not allowed to {0}")]
    Forbidden(String),

    #[error(transparent)]
    Domain(DomainError),
}

impl AppError {
    /// Inline field errors, when the failure came from local validation.
    pub fn field_errors(&self) -> Option<&ValidationErrors> {
        match self {
            AppError::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation(errors) => AppError::Validation(errors),
            other => AppError::Domain(other),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(errors)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Decode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::validation::Validator;

    #[test]
    fn backend_error_displays_its_message() {
        let err = AppError::Backend {
            status: 400,
            message: "Slug already exists".to_string(),
        };
        assert_eq!(err.to_string(), "Slug already exists");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn transport_error_display() {
        assert_eq!(
            AppError::Transport("connection refused".to_string()).to_string(),
            "Network error: connection refused"
        );
    }

    #[test]
    fn domain_validation_maps_to_app_validation() {
        let errors = Validator::new().required("code", "").finish().unwrap_err();
        let app_err: AppError = DomainError::Validation(errors.clone()).into();
        assert_eq!(app_err.field_errors(), Some(&errors));
    }

    #[test]
    fn terminal_status_maps_to_app_domain() {
        let app_err: AppError = DomainError::TerminalStatus("Completed").into();
        assert!(matches!(app_err, AppError::Domain(_)));
        assert_eq!(
            app_err.to_string(),
            "Order is Completed and its status can no longer change"
        );
    }

    #[test]
    fn serde_errors_map_to_decode() {
        let err = serde_json::from_str::<u32>("\"x\"").unwrap_err();
        assert!(matches!(AppError::from(err), AppError::Decode(_)));
    }
}
