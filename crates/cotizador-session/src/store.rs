//! # SQLite-backed Collaborators
//!
//! Implements the [`QuoteStore`] and [`Catalog`] gateways on top of the
//! cotizador-db [`Database`] handle. Thin by design: every method is a
//! repository call plus the DbError → GatewayError conversion.

use async_trait::async_trait;
use chrono::Utc;

use crate::gateway::{Address, Catalog, GatewayError, QuoteStore};
use cotizador_core::{Client, Product, Quote, QuoteDraft, QuoteStatus};
use cotizador_db::{Database, QuoteFilter, QuoteSummary, StatusCount};

#[async_trait]
impl QuoteStore for Database {
    async fn create(&self, draft: &QuoteDraft) -> Result<Quote, GatewayError> {
        Ok(self.quotes().create(draft).await?)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Quote>, GatewayError> {
        Ok(self.quotes().get_by_id(id).await?)
    }

    async fn list(&self, filter: QuoteFilter) -> Result<Vec<QuoteSummary>, GatewayError> {
        Ok(self.quotes().list(filter).await?)
    }

    async fn update_draft(&self, id: &str, draft: &QuoteDraft) -> Result<Quote, GatewayError> {
        Ok(self.quotes().update_draft(id, draft).await?)
    }

    async fn update_status(&self, id: &str, to: QuoteStatus) -> Result<(), GatewayError> {
        Ok(self.quotes().update_status(id, to).await?)
    }

    async fn soft_delete(&self, id: &str) -> Result<(), GatewayError> {
        Ok(self.quotes().soft_delete(id).await?)
    }

    async fn expire_overdue(&self) -> Result<u64, GatewayError> {
        Ok(self.quotes().expire_overdue(Utc::now()).await?)
    }

    async fn count_by_status(&self) -> Result<Vec<StatusCount>, GatewayError> {
        Ok(self.quotes().count_by_status().await?)
    }
}

#[async_trait]
impl Catalog for Database {
    async fn search_products(&self, query: &str, limit: u32) -> Result<Vec<Product>, GatewayError> {
        Ok(self.products().search(query, limit).await?)
    }

    async fn search_clients(&self, query: &str, limit: u32) -> Result<Vec<Client>, GatewayError> {
        Ok(self.clients().search(query, limit).await?)
    }

    /// A local installation carries no geocoder; suggestions are simply
    /// absent and the user types the address by hand.
    async fn search_addresses(&self, _query: &str) -> Result<Vec<Address>, GatewayError> {
        Ok(Vec::new())
    }

    async fn reverse_geocode(
        &self,
        _latitude: f64,
        _longitude: f64,
    ) -> Result<Option<Address>, GatewayError> {
        Ok(None)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use cotizador_db::DbConfig;

    #[tokio::test]
    async fn test_catalog_search_through_gateway() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.products()
            .insert("CEM-25KG", "Cemento 25kg", "saco", 8_500)
            .await
            .unwrap();

        // Call through the trait, the way the session does
        let catalog: &dyn Catalog = &db;
        let hits = catalog.search_products("cem", 10).await.unwrap();
        assert_eq!(hits.len(), 1);

        // Address lookups are advisory and empty on a local install
        assert!(catalog.search_addresses("obra").await.unwrap().is_empty());
        assert!(catalog.reverse_geocode(-33.45, -70.66).await.unwrap().is_none());
    }
}
