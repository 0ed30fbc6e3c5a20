//! Repository trait for short link lookup and click accounting.

use crate::domain::entities::ResolvedLink;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository interface for the redirect hot path.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Finds the link serving `(host, code)`.
    ///
    /// The lookup joins the owning domain and already excludes soft-deleted
    /// and disabled links as well as inactive domains; `host` is matched
    /// exactly and case-sensitively.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(link))` if a servable link exists
    /// - `Ok(None)` otherwise
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_for_redirect(
        &self,
        host: &str,
        code: &str,
    ) -> Result<Option<ResolvedLink>, AppError>;

    /// Atomically advances `total_clicks` and stamps `last_access_at`.
    ///
    /// Single-statement increment; no read step, so concurrent requests
    /// cannot lose updates.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn increment_clicks(
        &self,
        short_link_id: i64,
        visited_at: DateTime<Utc>,
    ) -> Result<(), AppError>;
}
