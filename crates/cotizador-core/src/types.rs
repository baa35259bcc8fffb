//! # Domain Types
//!
//! Core domain types used throughout Cotizador.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Quote       │   │    Client       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  code (business)│   │  sequence_number│   │  tax_id (RUT)   │       │
//! │  │  description    │   │  status         │   │  legal_name     │       │
//! │  │  price_pesos    │   │  line items     │   │  address        │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    TaxRate      │   │   QuoteStatus   │   │  DeliveryInfo   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │ CommercialTerms │       │
//! │  │  bps (u32)      │   │  Draft → Sent → │   │  (optional/     │       │
//! │  │  1900 = 19%     │   │  Accepted | ... │   │   defaulted)    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: (product code, quote sequence number, client RUT) -
//!   human-readable, potentially mutable

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::money::Money;
use crate::totals::{line_subtotal_raw, QuoteTotals};
use crate::{DEFAULT_TAX_RATE_BPS, DEFAULT_VALIDITY_DAYS};

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1900 bps = 19% (Chilean IVA)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    /// Chilean IVA, 19%.
    fn default() -> Self {
        TaxRate(DEFAULT_TAX_RATE_BPS)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product available for quoting.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Business code shown on the quote (e.g. "CEM-25KG").
    pub code: String,

    /// Description shown to the salesperson and on the quote.
    pub description: String,

    /// Sale unit ("saco", "m3", "un", ...).
    pub unit: String,

    /// List price in whole pesos.
    pub price_pesos: i64,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    /// When the product was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the list price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_pesos(self.price_pesos)
    }
}

// =============================================================================
// Client
// =============================================================================

/// The client a quote is addressed to.
///
/// Stored both as a catalog entity (`clients` table) and embedded into each
/// quote as a snapshot, so a quote keeps the data it was issued with even if
/// the client record changes later.
///
/// Required for a valid quote: `legal_name`, `tax_id`, `address`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ClientInfo {
    /// Legal name (razón social).
    pub legal_name: String,

    /// Tax identifier (RUT).
    pub tax_id: String,

    /// Trade name (nombre de fantasía).
    pub trade_name: Option<String>,

    /// Business line (giro).
    pub business_line: Option<String>,

    /// Street address.
    pub address: String,

    pub city: Option<String>,
    pub district: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
}

// =============================================================================
// Delivery Info
// =============================================================================

/// Optional delivery section of a quote.
///
/// Present only when the user supplies at least an address or a shipping
/// cost. The shipping cost is the only part that feeds the totals engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DeliveryInfo {
    pub address: String,
    pub city: Option<String>,
    pub district: Option<String>,

    /// Estimated delivery date.
    #[ts(as = "Option<String>")]
    pub estimated_date: Option<DateTime<Utc>>,

    /// Shipping cost in whole pesos (non-negative).
    pub shipping_pesos: i64,

    pub notes: Option<String>,
}

impl DeliveryInfo {
    /// Whether this section carries anything worth keeping.
    ///
    /// An all-empty delivery form is treated as "no delivery info" and
    /// dropped from the draft.
    pub fn is_meaningful(&self) -> bool {
        !self.address.trim().is_empty() || self.shipping_pesos > 0
    }

    /// Returns the shipping cost as Money.
    #[inline]
    pub fn shipping_cost(&self) -> Money {
        Money::from_pesos(self.shipping_pesos)
    }
}

// =============================================================================
// Commercial Terms
// =============================================================================

/// Commercial conditions printed on the quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CommercialTerms {
    /// Offer validity in days (1-365).
    pub validity_days: u32,

    /// Payment method. Open string on purpose: the business keeps adding
    /// variants ("contado", "30 días", "50% anticipo").
    pub payment_method: String,

    /// Delivery lead time, free text.
    pub delivery_lead_time: String,

    /// Warranty, free text.
    pub warranty: String,

    pub notes: Option<String>,
}

impl Default for CommercialTerms {
    fn default() -> Self {
        CommercialTerms {
            validity_days: DEFAULT_VALIDITY_DAYS,
            payment_method: String::new(),
            delivery_lead_time: String::new(),
            warranty: String::new(),
            notes: None,
        }
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// One quoted product or custom entry.
///
/// Uses the snapshot pattern: code, description, unit and price are frozen
/// at the moment the product is added, so the quote stays consistent even
/// if the catalog changes afterwards. `line_subtotal` is derived, never
/// stored independently of its inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineItem {
    /// Opaque identifier, unique within a quote.
    pub id: String,

    /// Catalog product this line came from, if any. Manual entries have none.
    pub product_id: Option<String>,

    /// Code at time of adding (frozen).
    pub code: String,

    /// Description at time of adding (frozen).
    pub description: String,

    /// Sale unit at time of adding (frozen).
    pub unit: String,

    /// Quantity quoted (whole units, >= 1).
    pub quantity: i64,

    /// Unit price in whole pesos at time of adding (frozen).
    pub unit_price_pesos: i64,

    /// Per-line discount in basis points (0-10000).
    pub discount_bps: u32,
}

impl LineItem {
    /// Creates a line item from a catalog product, freezing its data.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        LineItem {
            id: Uuid::new_v4().to_string(),
            product_id: Some(product.id.clone()),
            code: product.code.clone(),
            description: product.description.clone(),
            unit: product.unit.clone(),
            quantity,
            unit_price_pesos: product.price_pesos,
            discount_bps: 0,
        }
    }

    /// Creates a manual line item not backed by the catalog.
    pub fn manual(description: impl Into<String>, unit: impl Into<String>, quantity: i64, unit_price_pesos: i64) -> Self {
        LineItem {
            id: Uuid::new_v4().to_string(),
            product_id: None,
            code: String::new(),
            description: description.into(),
            unit: unit.into(),
            quantity,
            unit_price_pesos,
            discount_bps: 0,
        }
    }

    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_pesos(self.unit_price_pesos)
    }

    /// Line amount before any discount (quantity × unit price).
    #[inline]
    pub fn gross(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }

    /// Line amount after the per-line discount.
    ///
    /// Always recomputed from quantity/price/discount; builder mutators
    /// keep those three within valid ranges.
    #[inline]
    pub fn line_subtotal(&self) -> Money {
        line_subtotal_raw(self.quantity, self.unit_price(), self.discount_bps)
    }
}

// =============================================================================
// Quote Status
// =============================================================================

/// The lifecycle status of a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    /// Being assembled in the builder; the only editable status.
    Draft,
    /// Delivered to the client, awaiting an answer.
    Sent,
    /// Client accepted the offer.
    Accepted,
    /// Client rejected the offer.
    Rejected,
    /// Validity window elapsed without an answer.
    Expired,
}

impl QuoteStatus {
    /// Whether moving from this status to `next` is allowed.
    ///
    /// Transitions are one-directional; the only way back to Draft is
    /// duplicating the quote into a fresh one.
    pub fn can_transition_to(&self, next: QuoteStatus) -> bool {
        matches!(
            (self, next),
            (QuoteStatus::Draft, QuoteStatus::Sent)
                | (QuoteStatus::Sent, QuoteStatus::Accepted)
                | (QuoteStatus::Sent, QuoteStatus::Rejected)
                | (QuoteStatus::Sent, QuoteStatus::Expired)
        )
    }

    /// Canonical lowercase label (matches the stored column value).
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Draft => "draft",
            QuoteStatus::Sent => "sent",
            QuoteStatus::Accepted => "accepted",
            QuoteStatus::Rejected => "rejected",
            QuoteStatus::Expired => "expired",
        }
    }
}

impl Default for QuoteStatus {
    fn default() -> Self {
        QuoteStatus::Draft
    }
}

// =============================================================================
// Quote
// =============================================================================

/// A quote aggregate as it exists in persistence.
///
/// ## Invariants
/// - `items` is non-empty for any status other than Draft
/// - `totals` is always re-derived from items + discounts + tax + shipping,
///   never edited directly (see [`Quote::recompute_totals`])
/// - status transitions follow [`QuoteStatus::can_transition_to`]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Quote {
    pub id: String,

    /// Human-readable sequence number, e.g. "COT-2026-0042".
    pub sequence_number: String,

    pub status: QuoteStatus,

    /// Owning salesperson.
    pub seller_id: String,
    pub seller_name: String,

    pub client: ClientInfo,

    /// Ordered line items.
    pub items: Vec<LineItem>,

    pub delivery: Option<DeliveryInfo>,
    pub terms: CommercialTerms,

    /// Global discount applied on top of line discounts, in basis points.
    pub global_discount_bps: u32,

    /// Tax rate the totals were computed with, in basis points.
    pub tax_rate_bps: u32,

    /// Computed totals snapshot (always derivable from the fields above).
    pub totals: QuoteTotals,

    pub notes: Option<String>,

    /// Expiration date (= created_at + validity days).
    #[ts(as = "Option<String>")]
    pub valid_until: Option<DateTime<Utc>>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,

    /// Soft delete flag: inactive quotes disappear from listings.
    pub is_active: bool,
}

impl Quote {
    /// Shipping cost carried by the delivery section, if any.
    pub fn shipping_cost(&self) -> Money {
        self.delivery
            .as_ref()
            .map(DeliveryInfo::shipping_cost)
            .unwrap_or_else(Money::zero)
    }

    /// Re-derives the totals from the quote's own fields.
    ///
    /// The stored `totals` snapshot exists for cheap listings; any code
    /// that mutates items or discounts must go through this.
    pub fn recompute_totals(&mut self) -> crate::error::CoreResult<()> {
        self.totals = crate::totals::quote_totals(
            &self.items,
            self.global_discount_bps,
            self.shipping_cost(),
            TaxRate::from_bps(self.tax_rate_bps),
        )?;
        Ok(())
    }

    /// Produces a new draft copying all commercial content but none of the
    /// identity: id, sequence number and timestamps are left for the
    /// persistence layer to generate, and status is forced back to Draft.
    pub fn duplicate_as_draft(&self) -> QuoteDraft {
        QuoteDraft {
            status: QuoteStatus::Draft,
            seller_id: self.seller_id.clone(),
            seller_name: self.seller_name.clone(),
            client: self.client.clone(),
            items: self
                .items
                .iter()
                .map(|item| LineItem {
                    // New line identity inside the new quote
                    id: Uuid::new_v4().to_string(),
                    ..item.clone()
                })
                .collect(),
            delivery: self.delivery.clone(),
            terms: self.terms.clone(),
            global_discount_bps: self.global_discount_bps,
            tax_rate_bps: self.tax_rate_bps,
            totals: self.totals.clone(),
            notes: self.notes.clone(),
        }
    }
}

// =============================================================================
// Quote Draft
// =============================================================================

/// A quote ready to be handed to the persistence collaborator.
///
/// Identity (id, sequence number, timestamps) is intentionally absent: the
/// store generates those on `create`. Produced by the builder's `save` and
/// by [`Quote::duplicate_as_draft`].
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct QuoteDraft {
    pub status: QuoteStatus,
    pub seller_id: String,
    pub seller_name: String,
    pub client: ClientInfo,
    pub items: Vec<LineItem>,
    pub delivery: Option<DeliveryInfo>,
    pub terms: CommercialTerms,
    pub global_discount_bps: u32,
    pub tax_rate_bps: u32,
    pub totals: QuoteTotals,
    pub notes: Option<String>,
}

// =============================================================================
// Client catalog entity
// =============================================================================

/// A client as stored in the catalog (`clients` table).
///
/// Wraps the same `ClientInfo` the quote embeds, plus entity identity.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Client {
    pub id: String,

    #[serde(flatten)]
    #[ts(flatten)]
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub info: ClientInfo,

    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_default_is_iva() {
        let rate = TaxRate::default();
        assert_eq!(rate.bps(), 1_900);
        assert!((rate.percentage() - 19.0).abs() < 0.001);
    }

    #[test]
    fn test_quote_status_transitions() {
        assert!(QuoteStatus::Draft.can_transition_to(QuoteStatus::Sent));
        assert!(QuoteStatus::Sent.can_transition_to(QuoteStatus::Accepted));
        assert!(QuoteStatus::Sent.can_transition_to(QuoteStatus::Rejected));
        assert!(QuoteStatus::Sent.can_transition_to(QuoteStatus::Expired));

        // One-directional: no going back
        assert!(!QuoteStatus::Sent.can_transition_to(QuoteStatus::Draft));
        assert!(!QuoteStatus::Accepted.can_transition_to(QuoteStatus::Sent));
        assert!(!QuoteStatus::Draft.can_transition_to(QuoteStatus::Accepted));
        assert!(!QuoteStatus::Expired.can_transition_to(QuoteStatus::Sent));
    }

    #[test]
    fn test_delivery_meaningful() {
        let empty = DeliveryInfo::default();
        assert!(!empty.is_meaningful());

        let with_address = DeliveryInfo {
            address: "Av. Las Obras 123".to_string(),
            ..DeliveryInfo::default()
        };
        assert!(with_address.is_meaningful());

        let with_shipping = DeliveryInfo {
            shipping_pesos: 50_000,
            ..DeliveryInfo::default()
        };
        assert!(with_shipping.is_meaningful());
    }

    #[test]
    fn test_line_item_snapshot_from_product() {
        let now = Utc::now();
        let product = Product {
            id: "p-1".to_string(),
            code: "CEM-25KG".to_string(),
            description: "Cemento 25kg".to_string(),
            unit: "saco".to_string(),
            price_pesos: 8_500,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let item = LineItem::from_product(&product, 100);
        assert_eq!(item.product_id.as_deref(), Some("p-1"));
        assert_eq!(item.code, "CEM-25KG");
        assert_eq!(item.quantity, 100);
        assert_eq!(item.unit_price_pesos, 8_500);
        assert_eq!(item.discount_bps, 0);
        assert_eq!(item.gross().pesos(), 850_000);
    }

    #[test]
    fn test_manual_line_item() {
        let item = LineItem::manual("Flete especial", "un", 1, 35_000);
        assert!(item.product_id.is_none());
        assert!(item.code.is_empty());
        assert_eq!(item.line_subtotal().pesos(), 35_000);
    }
}
