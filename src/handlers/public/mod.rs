use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::app::AppState;

/// GET / - service description
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Catalog API",
            "version": version,
            "endpoints": {
                "health": "/health (public)",
                "products": "/api/products[/:id] (protected)",
                "logout": "/api/logout (protected)",
            }
        }
    }))
}

/// GET /health - liveness plus a storage ping
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let store = state.products.store();

    match store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "storage": store.backend(),
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "SERVICE_UNAVAILABLE",
                    "message": "storage unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "storage": store.backend(),
                    }
                })),
            )
        }
    }
}
