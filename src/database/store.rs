use async_trait::async_trait;

use super::manager::DatabaseError;
use super::models::{Product, ProductFields, ProductId, UserId};

/// Persistence seam for products.
///
/// Implementations never make authorization decisions; callers consult the
/// policy before invoking `update` or `delete`.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Short name of the backend, reported by `/health`
    fn backend(&self) -> &'static str;

    async fn ping(&self) -> Result<(), DatabaseError>;

    /// Every product, ordered by id ascending
    async fn list(&self) -> Result<Vec<Product>, DatabaseError>;

    async fn find(&self, id: ProductId) -> Result<Option<Product>, DatabaseError>;

    async fn insert(&self, owner_id: UserId, fields: ProductFields) -> Result<Product, DatabaseError>;

    /// Replace the mutable fields of an existing product; `owner_id` is untouched
    async fn update(&self, id: ProductId, fields: ProductFields) -> Result<Product, DatabaseError>;

    async fn delete(&self, id: ProductId) -> Result<(), DatabaseError>;

    /// Like `find`, but a missing row becomes `DatabaseError::NotFound`
    async fn find_404(&self, id: ProductId) -> Result<Product, DatabaseError> {
        self.find(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Product {id} not found")))
    }
}
