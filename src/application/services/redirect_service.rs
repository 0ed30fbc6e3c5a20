//! Redirect resolution engine.
//!
//! Evaluates the guard chain for a public `(host, code)` request and decides
//! the terminal outcome. Guards run strictly in order: lookup, expiry,
//! quota, password. Every guarded request produces exactly one visit event,
//! except a raw lookup miss, which produces none.

use std::sync::Arc;

use chrono::Utc;
use metrics::counter;

use crate::application::services::TemplateService;
use crate::domain::entities::{BlockReason, NewVisitEvent, ResolvedLink};
use crate::domain::repositories::LinkRepository;
use crate::domain::visit_queue::VisitQueue;
use crate::error::AppError;
use crate::utils::client_info::ClientInfo;
use crate::utils::password::verify_password;

/// Terminal outcome of redirect resolution.
///
/// Lookup misses and guard rejections are intended outcomes, not errors;
/// only storage faults surface as [`AppError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectOutcome {
    /// No servable link for `(host, code)`.
    NotFound,
    /// Link expired.
    Expired,
    /// Visit quota exhausted.
    LimitReached,
    /// Password required or wrong; `html` is the rendered entry page when a
    /// template resolved.
    PasswordPage { html: Option<String> },
    /// Interstitial page to serve instead of an immediate redirect.
    Interstitial { html: String },
    /// Plain HTTP redirect.
    Redirect { target_url: String, http_code: i16 },
}

/// The redirect engine.
pub struct RedirectService {
    links: Arc<dyn LinkRepository>,
    templates: Arc<TemplateService>,
    visits: VisitQueue,
}

impl RedirectService {
    pub fn new(
        links: Arc<dyn LinkRepository>,
        templates: Arc<TemplateService>,
        visits: VisitQueue,
    ) -> Self {
        Self {
            links,
            templates,
            visits,
        }
    }

    /// Resolves a public request to its terminal outcome.
    ///
    /// Accounting is deferred: events are enqueued here and written by the
    /// background worker after the response is underway. The quota guard
    /// reads a counter the deferred increment may not have advanced yet, so
    /// the visit limit is a soft bound under concurrency.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] when a guard read hits a storage
    /// fault; that request fails, nothing is retried.
    pub async fn resolve(
        &self,
        host: &str,
        code: &str,
        password: Option<&str>,
        client: &ClientInfo,
    ) -> Result<RedirectOutcome, AppError> {
        let Some(link) = self.links.find_for_redirect(host, code).await? else {
            counter!("linkgate_redirects_total", "outcome" => "not_found").increment(1);
            return Ok(RedirectOutcome::NotFound);
        };

        let now = Utc::now();

        if link.is_expired(now) {
            self.visits
                .dispatch(NewVisitEvent::blocked(&link, client, now, BlockReason::Expired));
            counter!("linkgate_redirects_total", "outcome" => "expired").increment(1);
            return Ok(RedirectOutcome::Expired);
        }

        if link.limit_reached() {
            self.visits
                .dispatch(NewVisitEvent::blocked(&link, client, now, BlockReason::Limit));
            counter!("linkgate_redirects_total", "outcome" => "limit").increment(1);
            return Ok(RedirectOutcome::LimitReached);
        }

        if let Some(hash) = link.password_hash.as_deref() {
            match password {
                None => {
                    self.visits.dispatch(NewVisitEvent::blocked(
                        &link,
                        client,
                        now,
                        BlockReason::Password,
                    ));
                    counter!("linkgate_redirects_total", "outcome" => "password").increment(1);
                    let html = self.render_password_page(&link, "false").await?;
                    return Ok(RedirectOutcome::PasswordPage { html });
                }
                Some(candidate) if !verify_password(hash, candidate) => {
                    self.visits.dispatch(NewVisitEvent::blocked(
                        &link,
                        client,
                        now,
                        BlockReason::PasswordWrong,
                    ));
                    counter!("linkgate_redirects_total", "outcome" => "password_wrong")
                        .increment(1);
                    let html = self.render_password_page(&link, "true").await?;
                    return Ok(RedirectOutcome::PasswordPage { html });
                }
                Some(_) => {}
            }
        }

        self.visits
            .dispatch(NewVisitEvent::success(&link, client, now));
        counter!("linkgate_redirects_total", "outcome" => "redirect").increment(1);

        if link.use_interstitial {
            if let Some(template_id) = link.template_id {
                // A failed render falls through to the plain redirect.
                if let Some(html) = self
                    .templates
                    .render(template_id, &[("target_url", &link.target_url)])
                    .await?
                {
                    return Ok(RedirectOutcome::Interstitial { html });
                }
            }
        }

        Ok(RedirectOutcome::Redirect {
            target_url: link.target_url,
            http_code: link.redirect_http_code,
        })
    }

    /// Renders the password entry page via the two-tier template fallback:
    /// link-level template first, then domain-level. No system-wide default.
    async fn render_password_page(
        &self,
        link: &ResolvedLink,
        error_flag: &str,
    ) -> Result<Option<String>, AppError> {
        let Some(template_id) = link.effective_password_template() else {
            return Ok(None);
        };

        self.templates
            .render(template_id, &[("errorpassword", error_flag)])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::AssetService;
    use crate::domain::entities::{TemplateRow, template};
    use crate::domain::repositories::{
        MockAssetRepository, MockLinkRepository, MockTemplateRepository,
    };
    use crate::infrastructure::object_store::MemoryObjectStore;
    use crate::utils::password::hash_password;
    use chrono::Duration;
    use tokio::sync::mpsc;

    fn link() -> ResolvedLink {
        ResolvedLink {
            id: 1,
            domain_id: 1,
            code: "promo".to_string(),
            target_url: "https://x.com".to_string(),
            redirect_http_code: 302,
            use_interstitial: false,
            template_id: None,
            password_hash: None,
            max_visits: None,
            expire_at: None,
            total_clicks: 0,
            password_template_id: None,
            domain_password_template_id: None,
        }
    }

    fn engine(
        links: MockLinkRepository,
        templates: MockTemplateRepository,
    ) -> (RedirectService, mpsc::Receiver<NewVisitEvent>) {
        let assets = Arc::new(AssetService::new(
            Arc::new(MockAssetRepository::new()),
            Arc::new(MemoryObjectStore::new()),
            1024,
        ));
        let (queue, rx) = VisitQueue::new(16);
        let svc = RedirectService::new(
            Arc::new(links),
            Arc::new(TemplateService::new(Arc::new(templates), assets)),
            queue,
        );
        (svc, rx)
    }

    fn password_template() -> TemplateRow {
        TemplateRow {
            id: 5,
            content_type: template::CONTENT_TYPE_INLINE,
            html_content: Some("<form data-error=\"{{errorpassword}}\"></form>".to_string()),
            main_file: None,
            asset_prefix: None,
        }
    }

    #[tokio::test]
    async fn test_lookup_miss_produces_no_event() {
        let mut links = MockLinkRepository::new();
        links.expect_find_for_redirect().returning(|_, _| Ok(None));

        let (svc, mut rx) = engine(links, MockTemplateRepository::new());
        let outcome = svc
            .resolve("sho.rt", "missing", None, &ClientInfo::default())
            .await
            .unwrap();

        assert_eq!(outcome, RedirectOutcome::NotFound);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_plain_link_redirects_with_configured_status() {
        let mut links = MockLinkRepository::new();
        links
            .expect_find_for_redirect()
            .withf(|host, code| host == "sho.rt" && code == "promo")
            .returning(|_, _| Ok(Some(link())));

        let (svc, mut rx) = engine(links, MockTemplateRepository::new());
        let outcome = svc
            .resolve("sho.rt", "promo", None, &ClientInfo::default())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            RedirectOutcome::Redirect {
                target_url: "https://x.com".to_string(),
                http_code: 302,
            }
        );

        let event = rx.try_recv().unwrap();
        assert!(!event.is_blocked);
        assert_eq!(event.http_status, 302);
    }

    #[tokio::test]
    async fn test_expired_link_blocks_with_reason() {
        let mut l = link();
        l.expire_at = Some(Utc::now() - Duration::hours(1));

        let mut links = MockLinkRepository::new();
        links
            .expect_find_for_redirect()
            .returning(move |_, _| Ok(Some(l.clone())));

        let (svc, mut rx) = engine(links, MockTemplateRepository::new());
        let outcome = svc
            .resolve("sho.rt", "promo", None, &ClientInfo::default())
            .await
            .unwrap();

        assert_eq!(outcome, RedirectOutcome::Expired);
        let event = rx.try_recv().unwrap();
        assert!(event.is_blocked);
        assert_eq!(event.block_reason.as_deref(), Some("expired"));
        assert_eq!(event.http_status, 410);
    }

    #[tokio::test]
    async fn test_quota_guard_is_a_soft_bound() {
        // The counter only moves when deferred increments land, so a link at
        // the limit blocks while one just below it passes, whatever requests
        // may be racing.
        let mut at_limit = link();
        at_limit.max_visits = Some(1);
        at_limit.total_clicks = 1;

        let mut below_limit = link();
        below_limit.max_visits = Some(1);
        below_limit.total_clicks = 0;

        let mut links = MockLinkRepository::new();
        let mut responses = vec![Some(below_limit), Some(at_limit)];
        links
            .expect_find_for_redirect()
            .times(2)
            .returning(move |_, _| Ok(responses.remove(0)));

        let (svc, mut rx) = engine(links, MockTemplateRepository::new());

        let first = svc
            .resolve("sho.rt", "promo", None, &ClientInfo::default())
            .await
            .unwrap();
        assert!(matches!(first, RedirectOutcome::Redirect { .. }));

        let second = svc
            .resolve("sho.rt", "promo", None, &ClientInfo::default())
            .await
            .unwrap();
        assert_eq!(second, RedirectOutcome::LimitReached);

        assert!(!rx.try_recv().unwrap().is_blocked);
        let blocked = rx.try_recv().unwrap();
        assert_eq!(blocked.block_reason.as_deref(), Some("limit"));
        assert_eq!(blocked.http_status, 410);
    }

    #[tokio::test]
    async fn test_password_missing_renders_entry_page() {
        let mut l = link();
        l.password_hash = Some(hash_password("secret"));
        l.password_template_id = Some(5);

        let mut links = MockLinkRepository::new();
        links
            .expect_find_for_redirect()
            .returning(move |_, _| Ok(Some(l.clone())));

        let mut templates = MockTemplateRepository::new();
        templates
            .expect_find_active()
            .withf(|id| *id == 5)
            .returning(|_| Ok(Some(password_template())));

        let (svc, mut rx) = engine(links, templates);
        let outcome = svc
            .resolve("sho.rt", "promo", None, &ClientInfo::default())
            .await
            .unwrap();

        match outcome {
            RedirectOutcome::PasswordPage { html: Some(html) } => {
                assert!(html.contains("data-error=\"false\""));
                assert!(!html.contains("https://x.com"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }

        let event = rx.try_recv().unwrap();
        assert_eq!(event.block_reason.as_deref(), Some("password"));
        assert_eq!(event.http_status, 401);
    }

    #[tokio::test]
    async fn test_wrong_password_rejections_are_independent() {
        let mut l = link();
        l.password_hash = Some(hash_password("secret"));
        l.domain_password_template_id = Some(5);

        let mut links = MockLinkRepository::new();
        links
            .expect_find_for_redirect()
            .times(2)
            .returning(move |_, _| Ok(Some(l.clone())));

        let mut templates = MockTemplateRepository::new();
        templates
            .expect_find_active()
            .withf(|id| *id == 5)
            .returning(|_| Ok(Some(password_template())));

        let (svc, mut rx) = engine(links, templates);

        for _ in 0..2 {
            let outcome = svc
                .resolve("sho.rt", "promo", Some("nope"), &ClientInfo::default())
                .await
                .unwrap();
            match outcome {
                RedirectOutcome::PasswordPage { html: Some(html) } => {
                    assert!(html.contains("data-error=\"true\""));
                }
                other => panic!("unexpected outcome: {:?}", other),
            }
        }

        for _ in 0..2 {
            let event = rx.try_recv().unwrap();
            assert_eq!(event.block_reason.as_deref(), Some("password_wrong"));
        }
    }

    #[tokio::test]
    async fn test_password_page_without_template_falls_back() {
        let mut l = link();
        l.password_hash = Some(hash_password("secret"));

        let mut links = MockLinkRepository::new();
        links
            .expect_find_for_redirect()
            .returning(move |_, _| Ok(Some(l.clone())));

        let (svc, _rx) = engine(links, MockTemplateRepository::new());
        let outcome = svc
            .resolve("sho.rt", "promo", None, &ClientInfo::default())
            .await
            .unwrap();

        assert_eq!(outcome, RedirectOutcome::PasswordPage { html: None });
    }

    #[tokio::test]
    async fn test_correct_password_proceeds_to_redirect() {
        let mut l = link();
        l.password_hash = Some(hash_password("secret"));

        let mut links = MockLinkRepository::new();
        links
            .expect_find_for_redirect()
            .returning(move |_, _| Ok(Some(l.clone())));

        let (svc, mut rx) = engine(links, MockTemplateRepository::new());
        let outcome = svc
            .resolve("sho.rt", "promo", Some("secret"), &ClientInfo::default())
            .await
            .unwrap();

        assert!(matches!(outcome, RedirectOutcome::Redirect { .. }));
        assert!(!rx.try_recv().unwrap().is_blocked);
    }

    #[tokio::test]
    async fn test_interstitial_rendered_when_configured() {
        let mut l = link();
        l.use_interstitial = true;
        l.template_id = Some(8);

        let mut links = MockLinkRepository::new();
        links
            .expect_find_for_redirect()
            .returning(move |_, _| Ok(Some(l.clone())));

        let mut templates = MockTemplateRepository::new();
        templates.expect_find_active().withf(|id| *id == 8).returning(|_| {
            Ok(Some(TemplateRow {
                id: 8,
                content_type: template::CONTENT_TYPE_INLINE,
                html_content: Some("<meta refresh content=\"{{target_url}}\">".to_string()),
                main_file: None,
                asset_prefix: None,
            }))
        });

        let (svc, _rx) = engine(links, templates);
        let outcome = svc
            .resolve("sho.rt", "promo", None, &ClientInfo::default())
            .await
            .unwrap();

        match outcome {
            RedirectOutcome::Interstitial { html } => {
                assert!(html.contains("https://x.com"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_interstitial_render_failure_falls_back_to_redirect() {
        let mut l = link();
        l.use_interstitial = true;
        l.template_id = Some(8);

        let mut links = MockLinkRepository::new();
        links
            .expect_find_for_redirect()
            .returning(move |_, _| Ok(Some(l.clone())));

        let mut templates = MockTemplateRepository::new();
        templates.expect_find_active().returning(|_| Ok(None));

        let (svc, _rx) = engine(links, templates);
        let outcome = svc
            .resolve("sho.rt", "promo", None, &ClientInfo::default())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            RedirectOutcome::Redirect {
                target_url: "https://x.com".to_string(),
                http_code: 302,
            }
        );
    }
}
