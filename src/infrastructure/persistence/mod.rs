//! PostgreSQL repository implementations.

mod pg_asset_repository;
mod pg_link_repository;
mod pg_template_repository;
mod pg_visit_repository;

pub use pg_asset_repository::PgAssetRepository;
pub use pg_link_repository::PgLinkRepository;
pub use pg_template_repository::PgTemplateRepository;
pub use pg_visit_repository::PgVisitRepository;
