//! Short link entity as resolved for a public redirect request.

use chrono::{DateTime, Utc};

/// A short link joined with the redirect-relevant fields of its domain.
///
/// Produced by the single lookup query of the redirect engine: the row is
/// already filtered to non-deleted, non-disabled links on active domains, so
/// only the per-request guards (expiry, quota, password) remain to be
/// evaluated.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ResolvedLink {
    pub id: i64,
    pub domain_id: i64,
    pub code: String,
    pub target_url: String,
    /// One of 301, 302, 307, 308.
    pub redirect_http_code: i16,
    pub use_interstitial: bool,
    pub template_id: Option<i64>,
    pub password_hash: Option<String>,
    pub max_visits: Option<i64>,
    pub expire_at: Option<DateTime<Utc>>,
    pub total_clicks: i64,
    pub password_template_id: Option<i64>,
    /// The owning domain's password template, used as fallback.
    pub domain_password_template_id: Option<i64>,
}

impl ResolvedLink {
    /// Returns true if the link has passed its expiry time.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expire_at.is_some_and(|e| e < now)
    }

    /// Returns true if the visit quota has been exhausted.
    ///
    /// The counter is advanced by deferred accounting, so this is a soft
    /// bound: concurrent requests near the limit may all pass before the
    /// increments land.
    pub fn limit_reached(&self) -> bool {
        self.max_visits.is_some_and(|m| self.total_clicks >= m)
    }

    /// Resolves the effective password template: the link-level value,
    /// falling back to the domain-level one.
    pub fn effective_password_template(&self) -> Option<i64> {
        self.password_template_id
            .or(self.domain_password_template_id)
    }
}
