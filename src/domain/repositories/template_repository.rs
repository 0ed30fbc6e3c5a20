//! Repository trait for redirect template access.

use crate::domain::entities::TemplateRow;
use crate::error::AppError;
use async_trait::async_trait;

/// Read-only repository interface for redirect templates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TemplateRepository: Send + Sync {
    /// Fetches an active template row by id.
    ///
    /// Inactive and missing templates both return `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_active(&self, id: i64) -> Result<Option<TemplateRow>, AppError>;
}
