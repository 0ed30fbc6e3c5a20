//! PostgreSQL implementation of the visit event repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::NewVisitEvent;
use crate::domain::repositories::VisitRepository;
use crate::error::AppError;

/// PostgreSQL repository for the append-only visit log.
pub struct PgVisitRepository {
    pool: Arc<PgPool>,
}

impl PgVisitRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VisitRepository for PgVisitRepository {
    async fn record(&self, event: NewVisitEvent) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO link_visit_events
                (short_link_id, domain_id, code, visited_at, ip, user_agent, referer,
                 country, region, city, device_type, os, browser,
                 is_blocked, block_reason, http_status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(event.short_link_id)
        .bind(event.domain_id)
        .bind(event.code)
        .bind(event.visited_at)
        .bind(event.ip)
        .bind(event.user_agent)
        .bind(event.referer)
        .bind(event.country)
        .bind(event.region)
        .bind(event.city)
        .bind(event.device_type)
        .bind(event.os)
        .bind(event.browser)
        .bind(event.is_blocked)
        .bind(event.block_reason)
        .bind(event.http_status)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }
}
