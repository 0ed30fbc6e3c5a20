//! PostgreSQL implementation of the link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::ResolvedLink;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// PostgreSQL repository for redirect lookups and click accounting.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn find_for_redirect(
        &self,
        host: &str,
        code: &str,
    ) -> Result<Option<ResolvedLink>, AppError> {
        let link = sqlx::query_as::<_, ResolvedLink>(
            r#"
            SELECT
                sl.id,
                sl.domain_id,
                sl.code,
                sl.target_url,
                sl.redirect_http_code,
                sl.use_interstitial,
                sl.template_id,
                sl.password_hash,
                sl.max_visits,
                sl.expire_at,
                sl.total_clicks,
                sl.password_template_id,
                d.password_template_id AS domain_password_template_id
            FROM short_links sl
            JOIN domains d ON d.id = sl.domain_id
            WHERE sl.code = $1
              AND d.host = $2
              AND sl.deleted_at IS NULL
              AND sl.is_disabled = FALSE
              AND d.is_active = TRUE
            "#,
        )
        .bind(code)
        .bind(host)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(link)
    }

    async fn increment_clicks(
        &self,
        short_link_id: i64,
        visited_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE short_links
            SET total_clicks = total_clicks + 1, last_access_at = $2
            WHERE id = $1
            "#,
        )
        .bind(short_link_id)
        .bind(visited_at)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }
}
