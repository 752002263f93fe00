use thiserror::Error;

use super::validation::ValidationErrors;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),
    #[error("Order is {0} and its status can no longer change")]
    TerminalStatus(&'static str),
    #[error("Unknown order status: {0}")]
    UnknownStatus(i64),
}
