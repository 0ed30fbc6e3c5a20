//! Host extraction from HTTP request headers.

use crate::AppError;
use axum::http::{HeaderMap, header};

/// Extracts the serving host from the `Host` header.
///
/// Handles IPv6 literals (`[::1]`), hostnames with ports
/// (`sho.rt:3000`), and plain hostnames. Port numbers are stripped; the
/// remaining value is matched against `domains.host` exactly and
/// case-sensitively.
///
/// # Errors
///
/// Returns [`AppError::Validation`] if the `Host` header is missing or not
/// valid UTF-8.
pub fn extract_host(headers: &HeaderMap) -> Result<String, AppError> {
    let host = headers
        .get(header::HOST)
        .ok_or_else(|| AppError::bad_request("Missing Host header", serde_json::json!({})))?
        .to_str()
        .map_err(|_| AppError::bad_request("Invalid Host header", serde_json::json!({})))?;

    let host = if host.starts_with('[') {
        // IPv6 literal, possibly with a port suffix
        if let Some(end_bracket) = host.find(']') {
            host[..=end_bracket].to_string()
        } else {
            host.to_string()
        }
    } else {
        host.split(':').next().unwrap_or(host).to_string()
    };

    Ok(host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue, header};

    fn headers_with_host(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_extract_host_simple() {
        assert_eq!(extract_host(&headers_with_host("sho.rt")).unwrap(), "sho.rt");
    }

    #[test]
    fn test_extract_host_strips_port() {
        assert_eq!(
            extract_host(&headers_with_host("sho.rt:3000")).unwrap(),
            "sho.rt"
        );
    }

    #[test]
    fn test_extract_host_preserves_case() {
        assert_eq!(
            extract_host(&headers_with_host("Sho.RT")).unwrap(),
            "Sho.RT"
        );
    }

    #[test]
    fn test_extract_host_ipv6_with_port() {
        assert_eq!(
            extract_host(&headers_with_host("[::1]:8080")).unwrap(),
            "[::1]"
        );
    }

    #[test]
    fn test_extract_host_missing_header() {
        assert!(extract_host(&HeaderMap::new()).is_err());
    }
}
