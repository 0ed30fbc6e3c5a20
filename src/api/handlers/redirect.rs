//! Handler for the public short link endpoint.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;

use crate::application::services::RedirectOutcome;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_info::ClientInfo;
use crate::utils::extract_host::extract_host;

#[derive(Debug, Deserialize)]
pub struct RedirectQuery {
    pub password: Option<String>,
}

/// Resolves a short code against the `Host` header and serves the outcome.
///
/// # Endpoint
///
/// `GET /{code}?password=...`
///
/// # Responses
///
/// - lookup miss: JSON `"no short url"` with HTTP 200; the public endpoint
///   deliberately does not 404
/// - expired / visit limit: `text/plain` 410
/// - password page or interstitial: `text/html` 200
/// - password required with no template: `text/plain` 401
/// - otherwise: HTTP redirect with the link's configured status code
///
/// All responses carry no-cache headers so intermediaries never replay a
/// guard decision.
///
/// # Errors
///
/// Returns 400 when the `Host` header is missing and 500 on storage faults
/// during guard evaluation.
pub async fn redirect_handler(
    Path(code): Path<String>,
    Query(query): Query<RedirectQuery>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let host = extract_host(&headers)?;
    let client = ClientInfo::from_headers(&headers);

    // An empty password parameter counts as no password supplied.
    let password = query.password.as_deref().filter(|p| !p.is_empty());

    let outcome = state
        .redirect_service
        .resolve(&host, &code, password, &client)
        .await?;

    Ok(with_no_cache_headers(outcome_response(outcome)))
}

fn outcome_response(outcome: RedirectOutcome) -> Response {
    match outcome {
        RedirectOutcome::NotFound => Json("no short url").into_response(),
        RedirectOutcome::Expired => (StatusCode::GONE, "Link expired").into_response(),
        RedirectOutcome::LimitReached => {
            (StatusCode::GONE, "Link visit limit reached").into_response()
        }
        RedirectOutcome::PasswordPage { html: Some(html) } => Html(html).into_response(),
        RedirectOutcome::PasswordPage { html: None } => {
            (StatusCode::UNAUTHORIZED, "Password required").into_response()
        }
        RedirectOutcome::Interstitial { html } => Html(html).into_response(),
        RedirectOutcome::Redirect {
            target_url,
            http_code,
        } => {
            let status =
                StatusCode::from_u16(http_code as u16).unwrap_or(StatusCode::FOUND);
            (status, [(header::LOCATION, target_url)]).into_response()
        }
    }
}

fn with_no_cache_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store, no-cache, must-revalidate, max-age=0"),
    );
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
    response
}
