//! Core use-case services.
//!
//! # Responsibility
//! - Validate caller input and orchestrate repository calls.
//! - Keep CLI and UI layers decoupled from storage details.

use crate::repo::RepoError;
use crate::service::validation::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod customer_service;
pub mod validation;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error returned by service entry points.
#[derive(Debug)]
pub enum ServiceError {
    /// Input failed a business rule.
    Validation(ValidationError),
    /// Argument the service or store cannot act on.
    InvalidArgument(String),
    Repo(RepoError),
}

impl ServiceError {
    /// Returns the validation failure, if this is one.
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "validation failed: {err}"),
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::InvalidArgument(_) => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::InvalidArgument(message) => Self::InvalidArgument(message),
            other => Self::Repo(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ServiceError;
    use crate::repo::RepoError;
    use crate::service::validation::ValidationError;

    #[test]
    fn repo_invalid_argument_surfaces_as_service_invalid_argument() {
        let err = ServiceError::from(RepoError::InvalidArgument("bad id".to_string()));
        assert!(matches!(err, ServiceError::InvalidArgument(ref message) if message == "bad id"));

        let err = ServiceError::from(RepoError::MissingRequiredTable("customers"));
        assert!(matches!(err, ServiceError::Repo(_)));
    }

    #[test]
    fn validation_accessor_exposes_the_rule() {
        let err = ServiceError::from(ValidationError::MissingExamDate);
        assert_eq!(err.validation(), Some(&ValidationError::MissingExamDate));
        assert!(ServiceError::InvalidArgument(String::new())
            .validation()
            .is_none());
    }
}
