//! # Cotizador Session
//!
//! Orchestration layer between the host UI and the domain crates.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     cotizador-session                                   │
//! │                                                                         │
//! │   Host UI commands                                                      │
//! │         │                                                               │
//! │         ▼                                                               │
//! │   QuoteSession ───────── owns the live QuoteBuilder                    │
//! │         │                 (cotizador-core, pure)                        │
//! │         │                                                               │
//! │         ├──► dyn QuoteStore ───► cotizador-db (SQLite)                 │
//! │         ├──► dyn Catalog ──────► cotizador-db (products/clients)       │
//! │         └──► dyn QuoteExporter ► CsvExporter                           │
//! │                                                                         │
//! │   Every command returns Result<T, ApiError> with a stable code the     │
//! │   frontend can switch on.                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod exporter;
pub mod gateway;
pub mod session;
pub mod store;

pub use error::{ApiError, ErrorCode};
pub use exporter::CsvExporter;
pub use gateway::{
    Address, Catalog, CurrentUser, ExportArtifact, GatewayError, QuoteExporter, QuoteStore,
    UserRole,
};
pub use session::QuoteSession;

use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber for the application.
///
/// Respects `RUST_LOG` when set; otherwise defaults to info-level with
/// debug detail for our own crates and quiet sqlx.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cotizador=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
