use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Extension, Json,
};

use crate::app::AppState;
use crate::auth::Principal;
use crate::database::models::{Product, ProductId, ProductPayload};
use crate::middleware::{ApiResponse, ApiResult};

fn principal_of(principal: &Option<Extension<Principal>>) -> Option<&Principal> {
    principal.as_ref().map(|Extension(p)| p)
}

/// GET /api/products - every product, ordered by id
pub async fn index(State(state): State<AppState>) -> ApiResult<Vec<Product>> {
    let products = state.products.list().await?;
    tracing::debug!("Listing {} products", products.len());
    Ok(ApiResponse::success(products))
}

/// POST /api/products - create a product owned by the caller
pub async fn store(
    State(state): State<AppState>,
    principal: Option<Extension<Principal>>,
    payload: Result<Json<ProductPayload>, JsonRejection>,
) -> ApiResult<Product> {
    let Json(payload) = payload?;
    let product = state.products.create(principal_of(&principal), payload).await?;
    Ok(ApiResponse::created(product))
}

/// GET /api/products/:id
pub async fn show(
    State(state): State<AppState>,
    id: Result<Path<ProductId>, PathRejection>,
) -> ApiResult<Product> {
    let Path(id) = id?;
    Ok(ApiResponse::success(state.products.show(id).await?))
}

/// PUT /api/products/:id - owner only
pub async fn update(
    State(state): State<AppState>,
    id: Result<Path<ProductId>, PathRejection>,
    principal: Option<Extension<Principal>>,
    payload: Result<Json<ProductPayload>, JsonRejection>,
) -> ApiResult<Product> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let product = state
        .products
        .update(principal_of(&principal), id, payload)
        .await?;
    Ok(ApiResponse::success(product))
}

/// DELETE /api/products/:id - owner only
pub async fn destroy(
    State(state): State<AppState>,
    id: Result<Path<ProductId>, PathRejection>,
    principal: Option<Extension<Principal>>,
) -> ApiResult<()> {
    let Path(id) = id?;
    state.products.delete(principal_of(&principal), id).await?;
    Ok(ApiResponse::no_content())
}
