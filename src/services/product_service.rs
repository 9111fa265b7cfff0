use std::sync::Arc;

use tracing::info;

use crate::auth::Principal;
use crate::database::models::{Product, ProductId, ProductPayload};
use crate::database::ProductStore;
use crate::error::ApiError;
use crate::policy::{self, Ability};

/// Product use cases. Every mutation loads the target, asks the policy, and
/// only then touches the store.
#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn ProductStore>,
}

impl ProductService {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn ProductStore> {
        &self.store
    }

    /// All products, regardless of owner
    pub async fn list(&self) -> Result<Vec<Product>, ApiError> {
        Ok(self.store.list().await?)
    }

    pub async fn show(&self, id: ProductId) -> Result<Product, ApiError> {
        Ok(self.store.find_404(id).await?)
    }

    pub async fn create(
        &self,
        principal: Option<&Principal>,
        payload: ProductPayload,
    ) -> Result<Product, ApiError> {
        let principal = principal.ok_or_else(|| ApiError::unauthorized("Unauthenticated."))?;
        let fields = payload.validate()?;

        let product = self.store.insert(principal.id, fields).await?;
        info!("Product {} created by {}", product.id, principal.id);
        Ok(product)
    }

    pub async fn update(
        &self,
        principal: Option<&Principal>,
        id: ProductId,
        payload: ProductPayload,
    ) -> Result<Product, ApiError> {
        let existing = self.store.find_404(id).await?;
        policy::authorize(Ability::Update, principal, &existing)?;
        let fields = payload.validate()?;

        let product = self.store.update(id, fields).await?;
        info!("Product {} updated by {}", id, existing.owner_id);
        Ok(product)
    }

    pub async fn delete(&self, principal: Option<&Principal>, id: ProductId) -> Result<(), ApiError> {
        let existing = self.store.find_404(id).await?;
        policy::authorize(Ability::Delete, principal, &existing)?;

        self.store.delete(id).await?;
        info!("Product {} deleted by {}", id, existing.owner_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryProductStore;
    use axum::http::StatusCode;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> ProductPayload {
        serde_json::from_value(value).unwrap()
    }

    fn service() -> ProductService {
        ProductService::new(Arc::new(MemoryProductStore::new()))
    }

    #[tokio::test]
    async fn creator_becomes_owner() {
        let svc = service();
        let u1 = Principal::new(1);
        let p1 = svc
            .create(Some(&u1), payload(json!({"name": "Widget", "price": "12.5", "owner_id": 99})))
            .await
            .unwrap();
        assert_eq!(p1.owner_id, 1);
        assert_eq!(p1.price, Decimal::new(1250, 2));
    }

    #[tokio::test]
    async fn create_requires_principal() {
        let err = service()
            .create(None, payload(json!({"name": "Widget", "price": 1})))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn non_owner_update_leaves_product_unchanged() {
        let svc = service();
        let p1 = svc
            .create(Some(&Principal::new(1)), payload(json!({"name": "P1", "price": 3})))
            .await
            .unwrap();

        let err = svc
            .update(Some(&Principal::new(2)), p1.id, payload(json!({"name": "hijacked", "price": 0})))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(svc.show(p1.id).await.unwrap(), p1);
    }

    #[tokio::test]
    async fn denial_precedes_validation() {
        let svc = service();
        let p1 = svc
            .create(Some(&Principal::new(1)), payload(json!({"name": "P1", "price": 3})))
            .await
            .unwrap();

        // Invalid body from a non-owner still yields 403, not 422
        let err = svc.update(None, p1.id, ProductPayload::default()).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn owner_update_applies_fields() {
        let svc = service();
        let u1 = Principal::new(1);
        let p1 = svc
            .create(Some(&u1), payload(json!({"name": "P1", "price": 3})))
            .await
            .unwrap();

        let updated = svc
            .update(Some(&u1), p1.id, payload(json!({"name": "P1b", "description": "new", "price": "4.25"})))
            .await
            .unwrap();
        assert_eq!(updated.name, "P1b");
        assert_eq!(updated.description.as_deref(), Some("new"));
        assert_eq!(updated.price, Decimal::new(425, 2));
        assert_eq!(updated.owner_id, 1);
    }

    #[tokio::test]
    async fn delete_checks_existence_then_ownership() {
        let svc = service();
        let u1 = Principal::new(1);
        let p1 = svc
            .create(Some(&u1), payload(json!({"name": "P1", "price": 3})))
            .await
            .unwrap();

        let missing = svc.delete(Some(&u1), 404).await.unwrap_err();
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

        let denied = svc.delete(Some(&Principal::new(2)), p1.id).await.unwrap_err();
        assert_eq!(denied.status_code(), StatusCode::FORBIDDEN);
        assert!(svc.show(p1.id).await.is_ok());

        svc.delete(Some(&u1), p1.id).await.unwrap();
        assert_eq!(svc.show(p1.id).await.unwrap_err().status_code(), StatusCode::NOT_FOUND);
    }
}
