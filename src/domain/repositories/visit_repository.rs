//! Repository trait for visit event persistence.

use crate::domain::entities::NewVisitEvent;
use crate::error::AppError;
use async_trait::async_trait;

/// Append-only repository interface for visit events.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VisitRepository: Send + Sync {
    /// Appends one visit event row. Pure insert; touches no other table.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn record(&self, event: NewVisitEvent) -> Result<(), AppError>;
}
