//! Best-effort extraction of client context from request headers.

use axum::http::{HeaderMap, header};
use woothee::parser::Parser;

const UNKNOWN: &str = "unknown";

/// Client context captured per request for visit accounting.
///
/// Everything here is best-effort: absent headers leave the corresponding
/// fields `None` or empty, and user-agent parsing falls back to `"unknown"`.
/// Geo fields come from edge-provided headers and are treated as opaque
/// strings.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub country: String,
    pub region: String,
    pub city: String,
    pub device_type: String,
    pub os: String,
    pub browser: String,
}

impl ClientInfo {
    /// Builds client context from request headers.
    ///
    /// The client IP is the first entry of `X-Forwarded-For`, if present.
    /// Geo context is read from `X-Geo-Country` / `X-Geo-Region` /
    /// `X-Geo-City`, defaulting to empty strings.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let ip = header_str(headers, "x-forwarded-for")
            .and_then(|v| v.split(',').next().map(|s| s.trim().to_string()))
            .filter(|s| !s.is_empty());

        let user_agent = headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let referer = headers
            .get(header::REFERER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let (device_type, os, browser) = parse_user_agent(user_agent.as_deref());

        Self {
            ip,
            user_agent,
            referer,
            country: header_str(headers, "x-geo-country").unwrap_or_default(),
            region: header_str(headers, "x-geo-region").unwrap_or_default(),
            city: header_str(headers, "x-geo-city").unwrap_or_default(),
            device_type,
            os,
            browser,
        }
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Parses a user-agent string into `(device_type, os, browser)`.
fn parse_user_agent(ua: Option<&str>) -> (String, String, String) {
    let Some(ua) = ua else {
        return (UNKNOWN.into(), UNKNOWN.into(), UNKNOWN.into());
    };

    let parser = Parser::new();
    let Some(result) = parser.parse(ua) else {
        return (UNKNOWN.into(), UNKNOWN.into(), UNKNOWN.into());
    };

    let device_type = match &*result.category {
        "pc" => "desktop",
        "smartphone" | "mobilephone" => "mobile",
        "crawler" => "bot",
        _ => UNKNOWN,
    }
    .to_string();

    let os = join_name_version(&result.os, &result.os_version);
    let browser = join_name_version(&result.name, &result.version);

    (device_type, os, browser)
}

fn join_name_version(name: &str, version: &str) -> String {
    if name.is_empty() || name == "UNKNOWN" {
        return UNKNOWN.to_string();
    }
    if version.is_empty() || version == "UNKNOWN" {
        name.to_string()
    } else {
        format!("{} {}", name, version)
    }
}
