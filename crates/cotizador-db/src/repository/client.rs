//! # Client Repository
//!
//! Database operations for the client catalog.
//!
//! The catalog exists so the salesperson can pick a known client instead of
//! retyping their data; the quote itself always embeds a frozen snapshot
//! (`client_json` on the quote row), never a foreign key into this table.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use cotizador_core::{Client, ClientInfo};

const CLIENT_COLUMNS: &str = "\
    id, legal_name, tax_id, trade_name, business_line, address, city, district, \
    phone, email, contact_name, contact_phone, is_active, created_at, updated_at";

/// Repository for client catalog operations.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    pool: SqlitePool,
}

impl ClientRepository {
    /// Creates a new ClientRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ClientRepository { pool }
    }

    /// Searches active clients by legal name, trade name or tax id.
    ///
    /// An empty query lists the most recently used clients.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Client>> {
        let query = query.trim();

        debug!(query = %query, limit = %limit, "Searching clients");

        if query.is_empty() {
            return self.list_active(limit).await;
        }

        let sql = format!(
            r#"
            SELECT {}
            FROM clients
            WHERE is_active = 1
              AND (legal_name LIKE '%' || ?1 || '%'
                   OR trade_name LIKE '%' || ?1 || '%'
                   OR tax_id LIKE '%' || ?1 || '%')
            ORDER BY legal_name
            LIMIT ?2
            "#,
            CLIENT_COLUMNS
        );

        let clients: Vec<Client> = sqlx::query_as(&sql)
            .bind(query)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        Ok(clients)
    }

    /// Lists active clients, most recently updated first.
    pub async fn list_active(&self, limit: u32) -> DbResult<Vec<Client>> {
        let sql = format!(
            "SELECT {} FROM clients WHERE is_active = 1 ORDER BY updated_at DESC LIMIT ?1",
            CLIENT_COLUMNS
        );

        let clients: Vec<Client> = sqlx::query_as(&sql)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        Ok(clients)
    }

    /// Gets a client by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Client>> {
        let sql = format!("SELECT {} FROM clients WHERE id = ?1", CLIENT_COLUMNS);

        let client: Option<Client> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(client)
    }

    /// Inserts a new client. The tax id must be unique.
    pub async fn insert(&self, info: &ClientInfo) -> DbResult<Client> {
        let now = Utc::now();
        let client = Client {
            id: Uuid::new_v4().to_string(),
            info: info.clone(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %client.id, tax_id = %info.tax_id, "Inserting client");

        sqlx::query(
            r#"
            INSERT INTO clients (
                id, legal_name, tax_id, trade_name, business_line, address,
                city, district, phone, email, contact_name, contact_phone,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, 1, ?13, ?14)
            "#,
        )
        .bind(&client.id)
        .bind(&info.legal_name)
        .bind(&info.tax_id)
        .bind(&info.trade_name)
        .bind(&info.business_line)
        .bind(&info.address)
        .bind(&info.city)
        .bind(&info.district)
        .bind(&info.phone)
        .bind(&info.email)
        .bind(&info.contact_name)
        .bind(&info.contact_phone)
        .bind(client.created_at)
        .bind(client.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(client)
    }

    /// Replaces a client's data.
    pub async fn update(&self, id: &str, info: &ClientInfo) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE clients SET
                legal_name = ?2, tax_id = ?3, trade_name = ?4, business_line = ?5,
                address = ?6, city = ?7, district = ?8, phone = ?9, email = ?10,
                contact_name = ?11, contact_phone = ?12, updated_at = ?13
            WHERE id = ?1 AND is_active = 1
            "#,
        )
        .bind(id)
        .bind(&info.legal_name)
        .bind(&info.tax_id)
        .bind(&info.trade_name)
        .bind(&info.business_line)
        .bind(&info.address)
        .bind(&info.city)
        .bind(&info.district)
        .bind(&info.phone)
        .bind(&info.email)
        .bind(&info.contact_name)
        .bind(&info.contact_phone)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Client", id));
        }

        Ok(())
    }

    /// Soft-deletes a client; quotes keep their embedded snapshot.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result =
            sqlx::query("UPDATE clients SET is_active = 0, updated_at = ?2 WHERE id = ?1 AND is_active = 1")
                .bind(id)
                .bind(now)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Client", id));
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

    fn andes() -> ClientInfo {
        ClientInfo {
            legal_name: "Constructora Andes Ltda.".to_string(),
            tax_id: "76.543.210-K".to_string(),
            trade_name: Some("Andes".to_string()),
            address: "Av. Las Obras 123".to_string(),
            ..ClientInfo::default()
        }
    }

    #[tokio::test]
    async fn test_insert_and_search() {
        let db = test_db().await;
        let repo = db.clients();

        repo.insert(&andes()).await.unwrap();

        // By legal name, trade name and tax id
        assert_eq!(repo.search("Constructora", 20).await.unwrap().len(), 1);
        assert_eq!(repo.search("Andes", 20).await.unwrap().len(), 1);
        assert_eq!(repo.search("76.543", 20).await.unwrap().len(), 1);
        assert!(repo.search("Inexistente", 20).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_tax_id_rejected() {
        let db = test_db().await;
        let repo = db.clients();

        repo.insert(&andes()).await.unwrap();
        let err = repo.insert(&andes()).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_update() {
        let db = test_db().await;
        let repo = db.clients();

        let client = repo.insert(&andes()).await.unwrap();
        let mut info = andes();
        info.city = Some("Santiago".to_string());
        repo.update(&client.id, &info).await.unwrap();

        let updated = repo.get_by_id(&client.id).await.unwrap().unwrap();
        assert_eq!(updated.info.city.as_deref(), Some("Santiago"));
    }

    #[tokio::test]
    async fn test_soft_delete() {
        let db = test_db().await;
        let repo = db.clients();

        let client = repo.insert(&andes()).await.unwrap();
        repo.soft_delete(&client.id).await.unwrap();

        assert!(repo.search("Andes", 20).await.unwrap().is_empty());
        assert!(repo.get_by_id(&client.id).await.unwrap().is_some());
    }
}
