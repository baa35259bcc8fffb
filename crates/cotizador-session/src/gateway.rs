//! # Collaborator Gateways
//!
//! Traits for everything the editing session talks to but does not own:
//! the quote store, the catalogs and the document exporter.
//!
//! ## Why Traits Here
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Collaborator Boundary                                │
//! │                                                                         │
//! │   QuoteSession ──► dyn QuoteStore ────► cotizador-db (production)      │
//! │               ──► dyn Catalog ───────► cotizador-db / geocoder         │
//! │               ──► dyn QuoteExporter ─► CSV today, PDF later            │
//! │                                                                         │
//! │  The session never names a concrete backend. Tests swap in an          │
//! │  in-memory database; a future cloud sync swaps in an HTTP client.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use cotizador_core::{Client, Product, Quote, QuoteDraft, QuoteStatus};
use cotizador_db::{QuoteFilter, QuoteSummary, StatusCount};

// =============================================================================
// Gateway Error
// =============================================================================

/// Failure at a collaborator boundary.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The backing service could not be reached or answered abnormally.
    #[error("Collaborator unavailable: {0}")]
    Unavailable(String),

    /// The requested entity does not exist at the collaborator.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The collaborator rejected the request as invalid.
    #[error("Collaborator rejected request: {0}")]
    Rejected(String),

    /// Underlying persistence failure.
    #[error(transparent)]
    Persistence(#[from] cotizador_db::DbError),
}

// =============================================================================
// Users
// =============================================================================

/// Role of the signed-in salesperson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Seller,
    Supervisor,
    Admin,
}

/// The signed-in user a session acts on behalf of.
///
/// Stamped onto every quote at submission; the builder itself never sees
/// seller identity.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CurrentUser {
    pub id: String,
    pub name: String,
    pub role: UserRole,
}

impl CurrentUser {
    /// Everyone who can sign in can quote.
    pub fn can_create_quotes(&self) -> bool {
        true
    }

    /// Editing drafts is open to every role.
    pub fn can_edit_quotes(&self) -> bool {
        true
    }

    /// Deleting (even soft) is restricted to supervisors and admins.
    pub fn can_delete_quotes(&self) -> bool {
        matches!(self.role, UserRole::Supervisor | UserRole::Admin)
    }
}

// =============================================================================
// Address Lookup Types
// =============================================================================

/// A delivery address suggestion from the lookup collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Address {
    /// Display label ("Av. Las Obras 123, Maipú").
    pub label: String,
    pub city: Option<String>,
    pub district: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

// =============================================================================
// Quote Store
// =============================================================================

/// Persistence collaborator for quotes.
///
/// Production backend is the SQLite database in cotizador-db; the trait
/// exists so the session and its tests never depend on a concrete store.
#[async_trait]
pub trait QuoteStore: Send + Sync {
    /// Persists a new quote; the store assigns identity and sequence number.
    async fn create(&self, draft: &QuoteDraft) -> Result<Quote, GatewayError>;

    /// Fetches a quote with its line items.
    async fn get_by_id(&self, id: &str) -> Result<Option<Quote>, GatewayError>;

    /// Lists quotes matching the filter, newest first.
    async fn list(&self, filter: QuoteFilter) -> Result<Vec<QuoteSummary>, GatewayError>;

    /// Replaces the content of a draft quote.
    async fn update_draft(&self, id: &str, draft: &QuoteDraft) -> Result<Quote, GatewayError>;

    /// Moves a quote along its one-directional status lifecycle.
    async fn update_status(&self, id: &str, to: QuoteStatus) -> Result<(), GatewayError>;

    /// Soft-deletes a quote.
    async fn soft_delete(&self, id: &str) -> Result<(), GatewayError>;

    /// Expires sent quotes past their validity window; returns the count.
    async fn expire_overdue(&self) -> Result<u64, GatewayError>;

    /// Active quote counts per status.
    async fn count_by_status(&self) -> Result<Vec<StatusCount>, GatewayError>;
}

// =============================================================================
// Catalog
// =============================================================================

/// Lookup collaborator feeding the builder's pickers.
///
/// All four searches are advisory: an empty result set never blocks the
/// user, who can always type data in manually.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Product picker search.
    async fn search_products(&self, query: &str, limit: u32) -> Result<Vec<Product>, GatewayError>;

    /// Client picker search.
    async fn search_clients(&self, query: &str, limit: u32) -> Result<Vec<Client>, GatewayError>;

    /// Delivery address suggestions.
    async fn search_addresses(&self, query: &str) -> Result<Vec<Address>, GatewayError>;

    /// Closest known address to a coordinate, if any.
    async fn reverse_geocode(&self, latitude: f64, longitude: f64)
        -> Result<Option<Address>, GatewayError>;
}

// =============================================================================
// Exporter
// =============================================================================

/// A rendered quote document ready to hand to the host shell.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    /// Suggested filename ("COT-2026-0042.csv").
    pub filename: String,

    /// MIME type of the payload.
    pub mime: &'static str,

    /// The document bytes.
    pub bytes: Vec<u8>,
}

/// Document rendering collaborator.
#[async_trait]
pub trait QuoteExporter: Send + Sync {
    /// Renders a persisted quote into a shareable document.
    async fn export(&self, quote: &Quote) -> Result<ExportArtifact, GatewayError>;
}

// =============================================================================
// Unit Tests
// =============================================================================
