use thiserror::Error;

use crate::application::repos::RepoError;
use crate::domain::error::DomainError;

/// Failure surfaced by an application service.
///
/// Remote-service failures never appear here: they are absorbed inside the
/// synchronization layer and downgrade outcomes instead of erroring. Only
/// validation problems and store-layer failures propagate.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Store(#[from] RepoError),
}

impl ServiceError {
    pub fn not_found(entity: &'static str) -> Self {
        Self::Domain(DomainError::not_found(entity))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Domain(DomainError::validation(message))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Domain(DomainError::NotFound { .. }) | Self::Store(RepoError::NotFound)
        )
    }
}
