//! Template resolution and placeholder substitution.

use std::sync::Arc;

use crate::application::services::AssetService;
use crate::domain::entities::TemplateSource;
use crate::domain::repositories::TemplateRepository;
use crate::error::AppError;

/// Service producing final HTML for redirect templates.
pub struct TemplateService {
    templates: Arc<dyn TemplateRepository>,
    assets: Arc<AssetService>,
}

impl TemplateService {
    /// Creates the service over a template repository and the asset store.
    pub fn new(templates: Arc<dyn TemplateRepository>, assets: Arc<AssetService>) -> Self {
        Self { templates, assets }
    }

    /// Renders a template with the given placeholder values.
    ///
    /// Inline templates use their stored HTML verbatim; file-backed templates
    /// resolve their main file through the asset store and decode it as
    /// UTF-8 text. Returns `Ok(None)` when the template is inactive,
    /// missing, malformed, or its backing asset cannot be resolved.
    ///
    /// Substitution replaces every literal `{{key}}` occurrence for each
    /// supplied key. Unrecognized placeholders are left verbatim, and no
    /// HTML escaping is applied: templates are trusted admin-authored
    /// content, and values flow into them unchanged by contract.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage faults.
    pub async fn render(
        &self,
        template_id: i64,
        placeholders: &[(&str, &str)],
    ) -> Result<Option<String>, AppError> {
        let Some(row) = self.templates.find_active(template_id).await? else {
            return Ok(None);
        };

        let Some(template) = row.into_template() else {
            return Ok(None);
        };

        let html = match template.source {
            TemplateSource::Inline { html } => html,
            TemplateSource::File {
                main_file,
                asset_prefix,
            } => match self.assets.resolve(&asset_prefix, &main_file).await? {
                Some(asset) => String::from_utf8_lossy(&asset.bytes).into_owned(),
                None => return Ok(None),
            },
        };

        Ok(Some(apply_placeholders(html, placeholders)))
    }
}

fn apply_placeholders(mut html: String, placeholders: &[(&str, &str)]) -> String {
    for (key, value) in placeholders {
        let token = format!("{{{{{}}}}}", key);
        html = html.replace(&token, value);
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{TemplateRow, template};
    use crate::domain::repositories::{MockAssetRepository, MockTemplateRepository};
    use crate::infrastructure::object_store::MemoryObjectStore;

    fn inline_row(html: &str) -> TemplateRow {
        TemplateRow {
            id: 1,
            content_type: template::CONTENT_TYPE_INLINE,
            html_content: Some(html.to_string()),
            main_file: None,
            asset_prefix: None,
        }
    }

    fn file_row(prefix: &str, main_file: &str) -> TemplateRow {
        TemplateRow {
            id: 2,
            content_type: template::CONTENT_TYPE_FILE,
            html_content: None,
            main_file: Some(main_file.to_string()),
            asset_prefix: Some(prefix.to_string()),
        }
    }

    fn service_with(templates: MockTemplateRepository, catalog: MockAssetRepository) -> TemplateService {
        let assets = Arc::new(AssetService::new(
            Arc::new(catalog),
            Arc::new(MemoryObjectStore::new()),
            1024,
        ));
        TemplateService::new(Arc::new(templates), assets)
    }

    #[test]
    fn test_substitution_replaces_every_occurrence() {
        let html = "<a href=\"{{target_url}}\">{{target_url}}</a>".to_string();
        let out = apply_placeholders(html, &[("target_url", "https://x.com")]);
        assert_eq!(out, "<a href=\"https://x.com\">https://x.com</a>");
    }

    #[test]
    fn test_substitution_leaves_unknown_tokens_verbatim() {
        let html = "{{known}} and {{unknown}}".to_string();
        let out = apply_placeholders(html, &[("known", "yes")]);
        assert_eq!(out, "yes and {{unknown}}");
    }

    #[test]
    fn test_substitution_does_not_escape_html() {
        let html = "{{v}}".to_string();
        let out = apply_placeholders(html, &[("v", "<b>&amp;</b>")]);
        assert_eq!(out, "<b>&amp;</b>");
    }

    #[tokio::test]
    async fn test_render_inline_template() {
        let mut templates = MockTemplateRepository::new();
        templates
            .expect_find_active()
            .returning(|_| Ok(Some(inline_row("<p>{{errorpassword}}</p>"))));

        let svc = service_with(templates, MockAssetRepository::new());
        let html = svc.render(1, &[("errorpassword", "true")]).await.unwrap();
        assert_eq!(html.as_deref(), Some("<p>true</p>"));
    }

    #[tokio::test]
    async fn test_render_file_template_through_asset_store() {
        use crate::domain::entities::{AssetRow, asset};

        let mut templates = MockTemplateRepository::new();
        templates
            .expect_find_active()
            .returning(|_| Ok(Some(file_row("landing", "index.html"))));

        let mut catalog = MockAssetRepository::new();
        catalog.expect_find_by_name().returning(|_, _| {
            Ok(Some(AssetRow {
                id: 3,
                asset_prefix: "landing".to_string(),
                filename: "index.html".to_string(),
                content_type: Some("text/html".to_string()),
                size: 11,
                storage_type: asset::STORAGE_DB,
                content: Some(b"go to {{target_url}}".to_vec()),
                remote_key: None,
            }))
        });

        let svc = service_with(templates, catalog);
        let html = svc.render(2, &[("target_url", "https://x.com")]).await.unwrap();
        assert_eq!(html.as_deref(), Some("go to https://x.com"));
    }

    #[tokio::test]
    async fn test_render_missing_template_is_none() {
        let mut templates = MockTemplateRepository::new();
        templates.expect_find_active().returning(|_| Ok(None));

        let svc = service_with(templates, MockAssetRepository::new());
        assert!(svc.render(99, &[]).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_render_malformed_template_is_none() {
        let mut templates = MockTemplateRepository::new();
        // Inline tag but no html_content.
        templates.expect_find_active().returning(|_| {
            Ok(Some(TemplateRow {
                id: 4,
                content_type: template::CONTENT_TYPE_INLINE,
                html_content: None,
                main_file: None,
                asset_prefix: None,
            }))
        });

        let svc = service_with(templates, MockAssetRepository::new());
        assert!(svc.render(4, &[]).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_render_file_template_with_missing_asset_is_none() {
        let mut templates = MockTemplateRepository::new();
        templates
            .expect_find_active()
            .returning(|_| Ok(Some(file_row("landing", "index.html"))));

        let mut catalog = MockAssetRepository::new();
        catalog.expect_find_by_name().returning(|_, _| Ok(None));

        let svc = service_with(templates, catalog);
        assert!(svc.render(2, &[]).await.unwrap().is_none());
    }
}
