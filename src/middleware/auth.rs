use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::auth::{self, Principal};
use crate::error::ApiError;

/// Raw bearer token of the current request, kept so logout can revoke it
#[derive(Clone, Debug)]
pub struct BearerToken {
    pub token: String,
    pub expires_at: i64,
}

/// JWT authentication middleware that validates tokens and injects the principal
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(&headers).map_err(|msg| {
        tracing::debug!("Rejected request to {}: {}", request.uri().path(), msg);
        ApiError::unauthorized(msg)
    })?;

    if state.revocations.is_revoked(&token).await {
        tracing::warn!("Rejected revoked token on {}", request.uri().path());
        return Err(ApiError::unauthorized("Token has been revoked"));
    }

    let claims = auth::validate_token(&state.config.security.jwt_secret, &token).map_err(|e| {
        tracing::warn!("Token validation failed: {}", e);
        ApiError::unauthorized("Unauthenticated.")
    })?;

    let principal = Principal::from(&claims);
    tracing::debug!("Authenticated principal {}", principal.id);

    request.extensions_mut().insert(principal);
    request.extensions_mut().insert(BearerToken {
        token,
        expires_at: claims.exp,
    });

    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, &'static str> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or("Missing Authorization header")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if token.trim().is_empty() => Err("Empty JWT token"),
        Some(token) => Ok(token.trim().to_string()),
        None => Err("Authorization header must use Bearer token format"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(axum::http::header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(extract_jwt_from_headers(&headers_with("Bearer abc.def")).unwrap(), "abc.def");
    }

    #[test]
    fn rejects_missing_empty_and_non_bearer() {
        assert!(extract_jwt_from_headers(&HeaderMap::new()).is_err());
        assert_eq!(extract_jwt_from_headers(&headers_with("Bearer   ")), Err("Empty JWT token"));
        assert!(extract_jwt_from_headers(&headers_with("Basic dXNlcjpwYXNz")).is_err());
    }
}
