//! # Repository Module
//!
//! Database repository implementations for the Cotizador.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Session command                                                       │
//! │       │                                                                 │
//! │       │  db.quotes().list(filter)                                       │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  QuoteRepository                                                       │
//! │  ├── create(&self, draft)                                              │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── update_status(&self, id, to)                                      │
//! │  └── expire_overdue(&self, now)                                        │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • Easy to test (in-memory database per test)                          │
//! │  • SQL is isolated in one place                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`quote::QuoteRepository`] - Quote lifecycle and line items
//! - [`product::ProductRepository`] - Product catalog CRUD and search
//! - [`client::ClientRepository`] - Client catalog CRUD and search

pub mod client;
pub mod product;
pub mod quote;
