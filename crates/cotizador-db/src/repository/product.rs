//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! ## Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Catalog Search                                      │
//! │                                                                         │
//! │  User types: "cem"                                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  LIKE '%cem%' against code and description                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │ CEM-25KG  | Cemento 25kg     | $8.500  │ ← MATCH                   │
//! │  │ CEM-42KG  | Cemento 42,5kg   | $12.900 │ ← MATCH                   │
//! │  │ FIE-12MM  | Fierro 12mm      | $15.000 │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │                                                                         │
//! │  A branch catalog is a few thousand rows; an indexed LIKE scan is      │
//! │  well under the interactive threshold, no FTS table needed.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use cotizador_core::Product;

const PRODUCT_COLUMNS: &str =
    "id, code, description, unit, price_pesos, is_active, created_at, updated_at";

/// Repository for product catalog operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
/// let results = repo.search("cemento", 20).await?;
/// let product = repo.get_by_id("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Searches active products by code or description substring.
    ///
    /// An empty query returns the most recently updated products, which is
    /// what the picker shows before the user types anything.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let query = query.trim();

        debug!(query = %query, limit = %limit, "Searching products");

        if query.is_empty() {
            return self.list_active(limit).await;
        }

        let sql = format!(
            r#"
            SELECT {}
            FROM products
            WHERE is_active = 1
              AND (code LIKE '%' || ?1 || '%' OR description LIKE '%' || ?1 || '%')
            ORDER BY code
            LIMIT ?2
            "#,
            PRODUCT_COLUMNS
        );

        let products: Vec<Product> = sqlx::query_as(&sql)
            .bind(query)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Lists active products, most recently updated first.
    pub async fn list_active(&self, limit: u32) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE is_active = 1 ORDER BY updated_at DESC LIMIT ?1",
            PRODUCT_COLUMNS
        );

        let products: Vec<Product> = sqlx::query_as(&sql)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Gets a product by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLUMNS);

        let product: Option<Product> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Inserts a new product. The code must be unique.
    pub async fn insert(&self, code: &str, description: &str, unit: &str, price_pesos: i64) -> DbResult<Product> {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            code: code.to_string(),
            description: description.to_string(),
            unit: unit.to_string(),
            price_pesos,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %product.id, code = %product.code, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (id, code, description, unit, price_pesos, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?7)
            "#,
        )
        .bind(&product.id)
        .bind(&product.code)
        .bind(&product.description)
        .bind(&product.unit)
        .bind(product.price_pesos)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    /// Updates a product's description, unit and price.
    ///
    /// Existing quotes are unaffected: line items carry their own frozen
    /// snapshot of these fields.
    pub async fn update(&self, id: &str, description: &str, unit: &str, price_pesos: i64) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET description = ?2, unit = ?3, price_pesos = ?4, updated_at = ?5
            WHERE id = ?1 AND is_active = 1
            "#,
        )
        .bind(id)
        .bind(description)
        .bind(unit)
        .bind(price_pesos)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Soft-deletes a product: it disappears from search, quotes keep it.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result =
            sqlx::query("UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1 AND is_active = 1")
                .bind(id)
                .bind(now)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_search() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert("CEM-25KG", "Cemento 25kg", "saco", 8_500).await.unwrap();
        repo.insert("FIE-12MM", "Fierro 12mm", "un", 15_000).await.unwrap();

        let hits = repo.search("cem", 20).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].code, "CEM-25KG");

        // Matches against description too
        let hits = repo.search("Fierro", 20).await.unwrap();
        assert_eq!(hits.len(), 1);

        // Empty query lists everything
        let hits = repo.search("", 20).await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert("CEM-25KG", "Cemento 25kg", "saco", 8_500).await.unwrap();
        let err = repo
            .insert("CEM-25KG", "Otro cemento", "saco", 9_000)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_update_price() {
        let db = test_db().await;
        let repo = db.products();

        let product = repo.insert("CEM-25KG", "Cemento 25kg", "saco", 8_500).await.unwrap();
        repo.update(&product.id, "Cemento 25kg", "saco", 8_900).await.unwrap();

        let updated = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(updated.price_pesos, 8_900);
    }

    #[tokio::test]
    async fn test_soft_delete_hides_from_search() {
        let db = test_db().await;
        let repo = db.products();

        let product = repo.insert("CEM-25KG", "Cemento 25kg", "saco", 8_500).await.unwrap();
        repo.soft_delete(&product.id).await.unwrap();

        assert!(repo.search("cem", 20).await.unwrap().is_empty());
        // Still reachable directly (quotes reference it)
        assert!(repo.get_by_id(&product.id).await.unwrap().is_some());
    }
}
