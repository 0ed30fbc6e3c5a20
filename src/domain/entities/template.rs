//! Redirect page template entity with polymorphic content sourcing.

/// `content_type` column value for inline HTML templates.
pub const CONTENT_TYPE_INLINE: i16 = 0;
/// `content_type` column value for file-backed templates.
pub const CONTENT_TYPE_FILE: i16 = 1;

/// Where a template's HTML comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// HTML stored directly on the template row.
    Inline { html: String },
    /// Main file resolved through the asset store under a prefix.
    File {
        main_file: String,
        asset_prefix: String,
    },
}

/// An active redirect template with validated content source.
#[derive(Debug, Clone)]
pub struct RedirectTemplate {
    pub id: i64,
    pub source: TemplateSource,
}

/// Raw template row as stored.
///
/// Kept separate from [`RedirectTemplate`] so a malformed row (content field
/// absent for its `content_type` tag) degrades to "not found" instead of an
/// error, matching the treatment of other storage-integrity gaps.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TemplateRow {
    pub id: i64,
    pub content_type: i16,
    pub html_content: Option<String>,
    pub main_file: Option<String>,
    pub asset_prefix: Option<String>,
}

impl TemplateRow {
    /// Validates the row into a usable template, or `None` when malformed.
    pub fn into_template(self) -> Option<RedirectTemplate> {
        let source = match self.content_type {
            CONTENT_TYPE_INLINE => TemplateSource::Inline {
                html: self.html_content?,
            },
            CONTENT_TYPE_FILE => TemplateSource::File {
                main_file: self.main_file?,
                asset_prefix: self.asset_prefix?,
            },
            _ => return None,
        };

        Some(RedirectTemplate {
            id: self.id,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(content_type: i16) -> TemplateRow {
        TemplateRow {
            id: 1,
            content_type,
            html_content: None,
            main_file: None,
            asset_prefix: None,
        }
    }

    #[test]
    fn test_inline_template() {
        let mut r = row(CONTENT_TYPE_INLINE);
        r.html_content = Some("<h1>hi</h1>".to_string());
        let tpl = r.into_template().unwrap();
        assert_eq!(
            tpl.source,
            TemplateSource::Inline {
                html: "<h1>hi</h1>".to_string()
            }
        );
    }

    #[test]
    fn test_inline_without_content_is_malformed() {
        assert!(row(CONTENT_TYPE_INLINE).into_template().is_none());
    }

    #[test]
    fn test_file_template_requires_both_fields() {
        let mut r = row(CONTENT_TYPE_FILE);
        r.main_file = Some("index.html".to_string());
        assert!(r.clone().into_template().is_none());

        r.asset_prefix = Some("landing".to_string());
        let tpl = r.into_template().unwrap();
        assert!(matches!(tpl.source, TemplateSource::File { .. }));
    }

    #[test]
    fn test_unknown_content_type_is_malformed() {
        assert!(row(9).into_template().is_none());
    }
}
