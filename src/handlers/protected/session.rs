use axum::{extract::State, Extension};

use crate::app::AppState;
use crate::auth::Principal;
use crate::middleware::{ApiResponse, ApiResult, BearerToken};

/// POST /api/logout - revoke the presented bearer token
pub async fn logout(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Extension(bearer): Extension<BearerToken>,
) -> ApiResult<()> {
    state.revocations.revoke(&bearer.token, bearer.expires_at).await;
    tracing::info!("Principal {} logged out", principal.id);
    Ok(ApiResponse::no_content())
}
