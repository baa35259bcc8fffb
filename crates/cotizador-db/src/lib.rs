//! # cotizador-db: Database Layer for the Cotizador
//!
//! This crate provides database access for the quoting system.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cotizador Data Flow                               │
//! │                                                                         │
//! │  Session command (save_quote, list_quotes, search_products)            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   cotizador-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  (quote.rs)   │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ QuoteRepo     │    │ 001_init.sql │  │   │
//! │  │   │ Connection    │    │ ProductRepo   │    │ ...          │  │   │
//! │  │   │ Management    │    │ ClientRepo    │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (one per branch installation)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (quote, product, client)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cotizador_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/cotizador.db")).await?;
//!
//! let quote = db.quotes().create(&draft).await?;
//! let products = db.products().search("cemento", 20).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::client::ClientRepository;
pub use repository::product::ProductRepository;
pub use repository::quote::{QuoteFilter, QuoteRepository, QuoteSummary, StatusCount};
