use async_trait::async_trait;
use sqlx::PgPool;

use super::manager::{DatabaseError, DatabaseManager};
use super::models::{Product, ProductFields, ProductId, UserId};
use super::store::ProductStore;

const PRODUCT_COLUMNS: &str = "id, name, description, price, owner_id, created_at, updated_at";

/// PostgreSQL-backed store over the `products` table
/// (`id BIGSERIAL`, `price NUMERIC(10,2)`, `owner_id BIGINT`, timestamps as `TIMESTAMPTZ`).
#[derive(Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `products` table when it does not exist yet
    pub async fn ensure_schema(&self) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS products (
                id BIGSERIAL PRIMARY KEY,
                name VARCHAR(255) NOT NULL,
                description TEXT,
                price NUMERIC(10, 2) NOT NULL DEFAULT 0,
                owner_id BIGINT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }

    async fn list(&self) -> Result<Vec<Product>, DatabaseError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id");
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    async fn find(&self, id: ProductId) -> Result<Option<Product>, DatabaseError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    async fn insert(&self, owner_id: UserId, fields: ProductFields) -> Result<Product, DatabaseError> {
        let sql = format!(
            "INSERT INTO products (name, description, price, owner_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, NOW(), NOW()) RETURNING {PRODUCT_COLUMNS}"
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(&fields.name)
            .bind(&fields.description)
            .bind(fields.price)
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(product)
    }

    async fn update(&self, id: ProductId, fields: ProductFields) -> Result<Product, DatabaseError> {
        let sql = format!(
            "UPDATE products SET name = $2, description = $3, price = $4, updated_at = NOW() \
             WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(&fields.name)
            .bind(&fields.description)
            .bind(fields.price)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Product {id} not found")))
    }

    async fn delete(&self, id: ProductId) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Product {id} not found")));
        }
        Ok(())
    }
}
