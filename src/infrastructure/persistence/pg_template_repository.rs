//! PostgreSQL implementation of the template repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::TemplateRow;
use crate::domain::repositories::TemplateRepository;
use crate::error::AppError;

/// PostgreSQL repository for redirect template rows.
pub struct PgTemplateRepository {
    pool: Arc<PgPool>,
}

impl PgTemplateRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TemplateRepository for PgTemplateRepository {
    async fn find_active(&self, id: i64) -> Result<Option<TemplateRow>, AppError> {
        let row = sqlx::query_as::<_, TemplateRow>(
            r#"
            SELECT id, content_type, html_content, main_file, asset_prefix
            FROM redirect_templates
            WHERE id = $1 AND is_active = TRUE
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row)
    }
}
