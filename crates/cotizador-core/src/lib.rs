//! # cotizador-core: Pure Business Logic for the Cotizador
//!
//! This crate is the **heart** of the quoting system. It contains all business
//! logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cotizador Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Frontend (React)                             │   │
//! │  │   Client UI ──► Products UI ──► Delivery ──► Terms ──► Summary  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON commands                          │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                cotizador-session (Orchestration)                │   │
//! │  │    quote session, search tokens, submit guard, gateways         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ cotizador-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  builder  │  │  totals   │  │   │
//! │  │   │   Quote   │  │   Money   │  │ QuoteStep │  │  engine   │  │   │
//! │  │   │ LineItem  │  │  TaxRate  │  │  wizard   │  │ 7 figures │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 cotizador-db (Database Layer)                   │   │
//! │  │             SQLite queries, migrations, repositories            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Quote, LineItem, ClientInfo, etc.)
//! - [`money`] - Money type with integer peso arithmetic (no floating point!)
//! - [`totals`] - The quote totals engine (seven derived figures)
//! - [`builder`] - The step-wizard state machine that accumulates a draft
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are whole pesos (i64), percentages
//!    are integer basis points, rounding happens once per aggregate
//! 4. **Explicit Errors**: All errors are typed, never strings or panics;
//!    step validation failures are plain data, not errors at all
//!
//! ## Example Usage
//!
//! ```rust
//! use cotizador_core::money::Money;
//! use cotizador_core::types::TaxRate;
//!
//! // Create money from whole pesos (never from floats!)
//! let net = Money::from_pesos(1_557_500);
//!
//! // IVA at 19%, rounded half up
//! let iva = net.calculate_tax(TaxRate::from_bps(1_900));
//! assert_eq!(iva.pesos(), 295_925);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod builder;
pub mod error;
pub mod money;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use cotizador_core::Money` instead of
// `use cotizador_core::money::Money`

pub use builder::{QuoteBuilder, QuoteStep};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use totals::{line_subtotal, quote_totals, QuoteTotals};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default tax rate in basis points: 19% IVA.
///
/// ## Why a constant?
/// Every quote starts with the statutory rate; the builder can override it
/// per quote (exempt clients) but the default lives in exactly one place.
pub const DEFAULT_TAX_RATE_BPS: u32 = 1_900;

/// Default offer validity in days when the terms step is skipped.
pub const DEFAULT_VALIDITY_DAYS: u32 = 30;

/// Minimum accepted offer validity in days.
pub const MIN_VALIDITY_DAYS: u32 = 1;

/// Maximum accepted offer validity in days.
pub const MAX_VALIDITY_DAYS: u32 = 365;

/// Maximum line items allowed on a single quote.
///
/// ## Business Reason
/// Keeps quotes printable on a reasonable number of PDF pages and bounds
/// the totals pipeline. Can be made configurable in future versions.
pub const MAX_QUOTE_ITEMS: usize = 100;

/// Maximum quantity of a single line item.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 10000 instead of 100).
pub const MAX_ITEM_QUANTITY: i64 = 9_999;
