//! Visit event facts for the append-only accounting log.

use chrono::{DateTime, Utc};

use crate::domain::entities::ResolvedLink;
use crate::utils::client_info::ClientInfo;

/// Why a request was rejected by a redirect guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    Expired,
    Limit,
    Password,
    PasswordWrong,
}

impl BlockReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Expired => "expired",
            Self::Limit => "limit",
            Self::Password => "password",
            Self::PasswordWrong => "password_wrong",
        }
    }

    /// The HTTP status recorded on the blocked event.
    pub fn http_status(self) -> i16 {
        match self {
            Self::Expired | Self::Limit => 410,
            Self::Password | Self::PasswordWrong => 401,
        }
    }
}

/// One visit fact, written exactly once per guarded request.
///
/// Append-only: never mutated or deleted by this engine. A raw lookup miss
/// produces no event at all.
#[derive(Debug, Clone)]
pub struct NewVisitEvent {
    pub short_link_id: i64,
    pub domain_id: i64,
    pub code: String,
    pub visited_at: DateTime<Utc>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub country: String,
    pub region: String,
    pub city: String,
    pub device_type: String,
    pub os: String,
    pub browser: String,
    pub is_blocked: bool,
    pub block_reason: Option<String>,
    pub http_status: i16,
}

impl NewVisitEvent {
    /// An admitted visit, recorded with the link's redirect status code.
    pub fn success(link: &ResolvedLink, client: &ClientInfo, visited_at: DateTime<Utc>) -> Self {
        Self::base(link, client, visited_at, false, None, link.redirect_http_code)
    }

    /// A guard-rejected visit.
    pub fn blocked(
        link: &ResolvedLink,
        client: &ClientInfo,
        visited_at: DateTime<Utc>,
        reason: BlockReason,
    ) -> Self {
        Self::base(
            link,
            client,
            visited_at,
            true,
            Some(reason.as_str().to_string()),
            reason.http_status(),
        )
    }

    fn base(
        link: &ResolvedLink,
        client: &ClientInfo,
        visited_at: DateTime<Utc>,
        is_blocked: bool,
        block_reason: Option<String>,
        http_status: i16,
    ) -> Self {
        Self {
            short_link_id: link.id,
            domain_id: link.domain_id,
            code: link.code.clone(),
            visited_at,
            ip: client.ip.clone(),
            user_agent: client.user_agent.clone(),
            referer: client.referer.clone(),
            country: client.country.clone(),
            region: client.region.clone(),
            city: client.city.clone(),
            device_type: client.device_type.clone(),
            os: client.os.clone(),
            browser: client.browser.clone(),
            is_blocked,
            block_reason,
            http_status,
        }
    }
}
