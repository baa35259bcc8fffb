//! # Quote Totals Engine
//!
//! Deterministic, side-effect-free computation of all monetary aggregates
//! for a quote draft. Leaf module: depends on nothing but `money` and the
//! line item type.
//!
//! ## Computation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     quote_totals() pipeline                             │
//! │                                                                         │
//! │  line items ──► Σ line_subtotal ───────────────► subtotal               │
//! │             ──► Σ gross - subtotal ────────────► line_discount_total    │
//! │                                                                         │
//! │  subtotal × global_discount_bps ───────────────► global_discount        │
//! │  subtotal - global_discount ───────────────────► net_after_discounts    │
//! │  net × tax_rate ───────────────────────────────► tax                    │
//! │  net + tax + shipping ─────────────────────────► grand_total            │
//! │  line_discount_total + global_discount ────────► total_discount         │
//! │                                                                         │
//! │  The step ORDER is a contract: tax applies after the global             │
//! │  discount, shipping is never discounted nor taxed.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rounding
//! No rounding mid-calculation. Each aggregate rounds exactly once
//! (round-half-up, i128 intermediates) at its own boundary, so chained
//! computations never compound rounding error.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::{Money, BPS_SCALE};
use crate::types::{LineItem, TaxRate};

// =============================================================================
// Totals Value Type
// =============================================================================

/// The single totals shape every consumer uses.
///
/// Summary display, PDF export and the persistence payload all read this
/// one struct instead of recomputing their own ad hoc aggregates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct QuoteTotals {
    /// Σ line subtotals (post line discounts, pre global discount).
    pub subtotal_pesos: i64,

    /// Money absorbed by per-line discounts (Σ gross − subtotal).
    pub line_discount_pesos: i64,

    /// Money absorbed by the global discount (subtotal × global bps).
    pub global_discount_pesos: i64,

    /// subtotal − global discount.
    pub net_pesos: i64,

    /// Tax on the net amount.
    pub tax_pesos: i64,

    /// Shipping cost, echoed for display (never discounted nor taxed).
    pub shipping_pesos: i64,

    /// net + tax + shipping.
    pub grand_total_pesos: i64,

    /// line discount + global discount, reported for display.
    pub total_discount_pesos: i64,
}

impl QuoteTotals {
    /// Returns the grand total as Money.
    #[inline]
    pub fn grand_total(&self) -> Money {
        Money::from_pesos(self.grand_total_pesos)
    }

    /// Returns the subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_pesos(self.subtotal_pesos)
    }

    /// Returns the tax amount as Money.
    #[inline]
    pub fn tax(&self) -> Money {
        Money::from_pesos(self.tax_pesos)
    }
}

// =============================================================================
// Line Subtotal
// =============================================================================

/// Raw line subtotal formula, no input checks.
///
/// `qty × price × (1 − d/10000)` with a single round-half-up at the end.
/// Callers guarantee validity: the checked wrapper below for engine input,
/// builder clamping for stored line items.
pub(crate) fn line_subtotal_raw(quantity: i64, unit_price: Money, discount_bps: u32) -> Money {
    let gross = quantity as i128 * unit_price.pesos() as i128;
    let kept_bps = (BPS_SCALE - discount_bps as i64) as i128;
    let subtotal = (gross * kept_bps + 5_000) / BPS_SCALE as i128;
    Money::from_pesos(subtotal as i64)
}

/// Computes one line's subtotal: `quantity × unit_price × (1 − discount)`.
///
/// ## Errors
/// `CoreError::InvalidInput` when:
/// - `quantity <= 0`
/// - `unit_price < 0`
/// - `discount_bps > 10000` (over 100%)
///
/// ## Example
/// ```rust
/// use cotizador_core::money::Money;
/// use cotizador_core::totals::line_subtotal;
///
/// // 100 sacks at $8.500 with 5% discount
/// let line = line_subtotal(100, Money::from_pesos(8_500), 500).unwrap();
/// assert_eq!(line.pesos(), 807_500);
/// ```
pub fn line_subtotal(quantity: i64, unit_price: Money, discount_bps: u32) -> CoreResult<Money> {
    if quantity <= 0 {
        return Err(CoreError::invalid_input("quantity", "must be positive"));
    }
    if unit_price.is_negative() {
        return Err(CoreError::invalid_input("unit price", "must not be negative"));
    }
    if discount_bps as i64 > BPS_SCALE {
        return Err(CoreError::invalid_input("discount", "must be between 0% and 100%"));
    }

    Ok(line_subtotal_raw(quantity, unit_price, discount_bps))
}

// =============================================================================
// Quote Totals
// =============================================================================

/// Computes all monetary aggregates for a quote draft.
///
/// ## Contract
/// - Exact step order as documented in the module header; callers may not
///   reorder (tax after global discount, shipping untouched by both).
/// - Pure and idempotent: identical inputs produce identical outputs,
///   inputs are never mutated.
/// - An empty item list yields all-zero totals. That is a valid
///   intermediate draft state, not an error (the builder refuses to leave
///   Draft without items, but a draft may legitimately have none yet).
///
/// ## Errors
/// - `CoreError::InvalidInput` for out-of-range commercial parameters or
///   any malformed line item.
/// - `CoreError::InvariantViolation` if a computed aggregate comes out
///   negative despite valid inputs. That cannot happen unless the math
///   here is broken, which is exactly why it fails loudly.
pub fn quote_totals(
    items: &[LineItem],
    global_discount_bps: u32,
    shipping_cost: Money,
    tax_rate: TaxRate,
) -> CoreResult<QuoteTotals> {
    if global_discount_bps as i64 > BPS_SCALE {
        return Err(CoreError::invalid_input(
            "global discount",
            "must be between 0% and 100%",
        ));
    }
    if shipping_cost.is_negative() {
        return Err(CoreError::invalid_input("shipping cost", "must not be negative"));
    }

    if items.is_empty() {
        return Ok(QuoteTotals::default());
    }

    // 1. subtotal = Σ line subtotals (each line individually validated)
    let mut subtotal = Money::zero();
    let mut gross_total = Money::zero();
    for item in items {
        let line = line_subtotal(item.quantity, item.unit_price(), item.discount_bps)?;
        subtotal += line;
        gross_total += item.gross();
    }

    // 2. money absorbed by per-line discounts
    let line_discount = gross_total - subtotal;

    // 3-4. global discount on the post-line-discount subtotal
    let global_discount = subtotal.portion_bps(global_discount_bps);
    let net = subtotal - global_discount;

    // 5. tax on the net amount
    let tax = net.calculate_tax(tax_rate);

    // 6. shipping joins at the very end, never discounted nor taxed
    let grand_total = net + tax + shipping_cost;

    // 7. combined discount, for display only
    let total_discount = line_discount + global_discount;

    let totals = QuoteTotals {
        subtotal_pesos: subtotal.pesos(),
        line_discount_pesos: line_discount.pesos(),
        global_discount_pesos: global_discount.pesos(),
        net_pesos: net.pesos(),
        tax_pesos: tax.pesos(),
        shipping_pesos: shipping_cost.pesos(),
        grand_total_pesos: grand_total.pesos(),
        total_discount_pesos: total_discount.pesos(),
    };

    check_invariants(&totals)?;
    Ok(totals)
}

/// All aggregates must be non-negative once inputs passed validation.
fn check_invariants(totals: &QuoteTotals) -> CoreResult<()> {
    let checks = [
        ("subtotal", totals.subtotal_pesos),
        ("line discount", totals.line_discount_pesos),
        ("global discount", totals.global_discount_pesos),
        ("net", totals.net_pesos),
        ("tax", totals.tax_pesos),
        ("grand total", totals.grand_total_pesos),
    ];

    for (name, value) in checks {
        if value < 0 {
            return Err(CoreError::InvariantViolation(format!(
                "{} is negative: {}",
                name, value
            )));
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LineItem;

    fn item(quantity: i64, unit_price_pesos: i64, discount_bps: u32) -> LineItem {
        LineItem {
            id: format!("item-{}-{}", quantity, unit_price_pesos),
            product_id: None,
            code: "TEST".to_string(),
            description: "Test item".to_string(),
            unit: "un".to_string(),
            quantity,
            unit_price_pesos,
            discount_bps,
        }
    }

    #[test]
    fn test_line_subtotal_formula() {
        // 100 × 8.500 × 0,95 = 807.500
        let line = line_subtotal(100, Money::from_pesos(8_500), 500).unwrap();
        assert_eq!(line.pesos(), 807_500);

        // No discount
        let line = line_subtotal(50, Money::from_pesos(15_000), 0).unwrap();
        assert_eq!(line.pesos(), 750_000);

        // Full discount
        let line = line_subtotal(10, Money::from_pesos(1_000), 10_000).unwrap();
        assert_eq!(line.pesos(), 0);
    }

    #[test]
    fn test_line_subtotal_rejects_bad_input() {
        assert!(line_subtotal(0, Money::from_pesos(100), 0).is_err());
        assert!(line_subtotal(-3, Money::from_pesos(100), 0).is_err());
        assert!(line_subtotal(1, Money::from_pesos(-1), 0).is_err());
        assert!(line_subtotal(1, Money::from_pesos(100), 10_001).is_err());

        // Zero price is fine (bonus lines)
        assert!(line_subtotal(1, Money::zero(), 0).is_ok());
    }

    #[test]
    fn test_line_subtotal_monotonic_in_discount() {
        let price = Money::from_pesos(8_333);
        let mut previous = line_subtotal(7, price, 0).unwrap();
        for bps in (500..=10_000).step_by(500) {
            let current = line_subtotal(7, price, bps).unwrap();
            assert!(current <= previous, "discount {} bps increased subtotal", bps);
            previous = current;
        }
    }

    #[test]
    fn test_empty_items_yield_zero_totals() {
        let totals = quote_totals(&[], 0, Money::from_pesos(50_000), TaxRate::default()).unwrap();
        assert_eq!(totals, QuoteTotals::default());
    }

    #[test]
    fn test_no_discounts_no_shipping() {
        let items = vec![item(10, 1_000, 0)];
        let totals = quote_totals(&items, 0, Money::zero(), TaxRate::default()).unwrap();

        assert_eq!(totals.subtotal_pesos, 10_000);
        assert_eq!(totals.line_discount_pesos, 0);
        assert_eq!(totals.global_discount_pesos, 0);
        assert_eq!(totals.tax_pesos, 1_900);
        assert_eq!(totals.grand_total_pesos, totals.subtotal_pesos + totals.tax_pesos);
    }

    /// The reference scenario used against the manual spreadsheet:
    /// [100 × 8.500 @ 5%, 50 × 15.000 @ 0%], no global discount,
    /// shipping 50.000, IVA 19%.
    #[test]
    fn test_reference_scenario() {
        let items = vec![item(100, 8_500, 500), item(50, 15_000, 0)];
        let totals =
            quote_totals(&items, 0, Money::from_pesos(50_000), TaxRate::from_bps(1_900)).unwrap();

        assert_eq!(totals.subtotal_pesos, 1_557_500);
        assert_eq!(totals.line_discount_pesos, 42_500);
        assert_eq!(totals.global_discount_pesos, 0);
        assert_eq!(totals.net_pesos, 1_557_500);
        assert_eq!(totals.tax_pesos, 295_925);
        assert_eq!(totals.shipping_pesos, 50_000);
        assert_eq!(totals.grand_total_pesos, 1_903_425);
        assert_eq!(totals.total_discount_pesos, 42_500);
    }

    #[test]
    fn test_full_global_discount_leaves_only_shipping() {
        let items = vec![item(100, 8_500, 0)];
        let totals =
            quote_totals(&items, 10_000, Money::from_pesos(50_000), TaxRate::default()).unwrap();

        assert_eq!(totals.net_pesos, 0);
        assert_eq!(totals.tax_pesos, 0);
        assert_eq!(totals.global_discount_pesos, totals.subtotal_pesos);
        assert_eq!(totals.grand_total_pesos, 50_000);
    }

    #[test]
    fn test_idempotent() {
        let items = vec![item(3, 7_777, 1_250), item(9, 4_321, 0)];
        let a = quote_totals(&items, 750, Money::from_pesos(12_000), TaxRate::default()).unwrap();
        let b = quote_totals(&items, 750, Money::from_pesos(12_000), TaxRate::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_never_mutates_inputs() {
        let items = vec![item(4, 2_500, 1_000)];
        let before = items.clone();
        let _ = quote_totals(&items, 500, Money::zero(), TaxRate::default()).unwrap();
        assert_eq!(items, before);
    }

    #[test]
    fn test_rejects_out_of_range_parameters() {
        let items = vec![item(1, 100, 0)];
        assert!(quote_totals(&items, 10_001, Money::zero(), TaxRate::default()).is_err());
        assert!(quote_totals(&items, 0, Money::from_pesos(-1), TaxRate::default()).is_err());
    }

    #[test]
    fn test_malformed_line_item_is_invalid_input() {
        let bad = vec![item(0, 100, 0)];
        let err = quote_totals(&bad, 0, Money::zero(), TaxRate::default()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput { .. }));
    }

    #[test]
    fn test_tax_applies_after_global_discount() {
        // 10.000 subtotal, 50% global → net 5.000, tax 950
        let items = vec![item(10, 1_000, 0)];
        let totals = quote_totals(&items, 5_000, Money::zero(), TaxRate::default()).unwrap();
        assert_eq!(totals.net_pesos, 5_000);
        assert_eq!(totals.tax_pesos, 950);
        assert_eq!(totals.grand_total_pesos, 5_950);
    }
}
