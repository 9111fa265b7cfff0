use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::manager::DatabaseError;
use super::models::{Product, ProductFields, ProductId, UserId};
use super::store::ProductStore;

#[derive(Default)]
struct Inner {
    next_id: ProductId,
    products: BTreeMap<ProductId, Product>,
}

/// Process-local store used when no `DATABASE_URL` is configured, and by tests
#[derive(Clone, Default)]
pub struct MemoryProductStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Product>, DatabaseError> {
        Ok(self.inner.read().await.products.values().cloned().collect())
    }

    async fn find(&self, id: ProductId) -> Result<Option<Product>, DatabaseError> {
        Ok(self.inner.read().await.products.get(&id).cloned())
    }

    async fn insert(&self, owner_id: UserId, fields: ProductFields) -> Result<Product, DatabaseError> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let now = Utc::now();
        let product = Product {
            id: inner.next_id,
            name: fields.name,
            description: fields.description,
            price: fields.price,
            owner_id,
            created_at: now,
            updated_at: now,
        };
        inner.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update(&self, id: ProductId, fields: ProductFields) -> Result<Product, DatabaseError> {
        let mut inner = self.inner.write().await;
        let product = inner
            .products
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::NotFound(format!("Product {id} not found")))?;
        product.name = fields.name;
        product.description = fields.description;
        product.price = fields.price;
        product.updated_at = Utc::now();
        Ok(product.clone())
    }

    async fn delete(&self, id: ProductId) -> Result<(), DatabaseError> {
        self.inner
            .write()
            .await
            .products
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DatabaseError::NotFound(format!("Product {id} not found")))
    }
}
