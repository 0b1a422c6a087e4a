use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::Operation;
use crate::error::ApiError;
use crate::state::AppState;

/// Query parameter accepted when no Authorization header is sent
pub const TOKEN_QUERY_PARAM: &str = "token";

/// Token middleware: resolves the operation from the route path and checks the
/// caller's token against the allow-list before the handler runs.
pub async fn token_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let operation = Operation::from_path(request.uri().path()).ok_or_else(|| {
        tracing::warn!("No operation mapped for {}", request.uri().path());
        ApiError::unauthorized()
    })?;

    let token = extract_token(&headers, request.uri().query()).ok_or_else(|| {
        tracing::debug!("Rejected {}: no token supplied", operation);
        ApiError::unauthorized()
    })?;

    if !state.tokens.is_authorized(&token, operation).await {
        tracing::warn!("Rejected {}: token not permitted", operation);
        return Err(ApiError::unauthorized());
    }

    Ok(next.run(request).await)
}

/// Token from the Authorization header (raw or `Bearer <token>`), falling back
/// to the `token` query parameter.
pub fn extract_token(headers: &HeaderMap, query: Option<&str>) -> Option<String> {
    let from_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|raw| {
            let raw = raw.trim_start();
            raw.strip_prefix("Bearer ").unwrap_or(raw).trim().to_string()
        })
        .filter(|token| !token.is_empty());

    if from_header.is_some() {
        return from_header;
    }

    query.and_then(|q| {
        url::form_urlencoded::parse(q.as_bytes())
            .find(|(key, _)| key == TOKEN_QUERY_PARAM)
            .map(|(_, value)| value.trim().to_string())
            .filter(|token| !token.is_empty())
    })
}
