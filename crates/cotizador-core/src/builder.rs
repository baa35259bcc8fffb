//! # Quote Builder State Machine
//!
//! A finite sequence of named steps that accumulates a draft quote,
//! validates required steps before allowing forward navigation, and hands
//! the assembled draft to the totals engine and then to the persistence
//! collaborator.
//!
//! ## Step Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Quote Builder Steps                                │
//! │                                                                         │
//! │   Client ──► Products ──► Delivery ──► Terms ──► Summary                │
//! │   (req)      (req)        (opt)        (opt)     (req)                  │
//! │                                                                         │
//! │   FORWARD:  blocked while the CURRENT step is required and its          │
//! │             predicate fails (errors stored for inline display)          │
//! │   BACKWARD: always allowed, even from a failing step, so the user       │
//! │             can go fix earlier data                                     │
//! │                                                                         │
//! │   Summary is "ready to submit", not terminal: the user may             │
//! │   navigate back from it at any time.                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Validation Policy
//! Every data-changing operation re-validates the CURRENT step only and
//! clears its stored error list if it now passes. Other steps are left
//! alone so an unrelated edit never flashes errors elsewhere. Step errors
//! are data (`Vec<String>`), never panics or exceptions.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::{Money, BPS_SCALE};
use crate::totals::quote_totals;
use crate::types::{
    ClientInfo, CommercialTerms, DeliveryInfo, LineItem, Product, QuoteDraft, QuoteStatus, TaxRate,
};
use crate::validation::{client_step_errors, validate_item_count};
use crate::{MAX_ITEM_QUANTITY, MAX_VALIDITY_DAYS, MIN_VALIDITY_DAYS};

// =============================================================================
// Steps
// =============================================================================

/// The five builder steps, in order.
///
/// A closed enum on purpose: the source of step identity is the type
/// system, not free-form strings, so an invalid step name cannot exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStep {
    Client,
    Products,
    Delivery,
    Terms,
    Summary,
}

impl QuoteStep {
    /// All steps in navigation order.
    pub const ALL: [QuoteStep; 5] = [
        QuoteStep::Client,
        QuoteStep::Products,
        QuoteStep::Delivery,
        QuoteStep::Terms,
        QuoteStep::Summary,
    ];

    /// Position in the navigation order.
    #[inline]
    pub const fn index(&self) -> usize {
        *self as usize
    }

    /// Whether this step must pass validation before moving past it.
    /// Delivery and terms are optional sections.
    #[inline]
    pub const fn is_required(&self) -> bool {
        matches!(
            self,
            QuoteStep::Client | QuoteStep::Products | QuoteStep::Summary
        )
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Accumulates a draft quote across the wizard steps.
///
/// ## Invariants
/// - `current` always names a valid step; `Client` is the initial state
/// - stored line items always satisfy the clamped ranges (quantity >= 1,
///   discount within 0-100%), so derived subtotals never need a Result
/// - `errors[step]` holds the messages from the step's last failed
///   navigation attempt; cleared as soon as the predicate passes again
#[derive(Debug, Clone)]
pub struct QuoteBuilder {
    current: QuoteStep,
    visited: [bool; 5],
    errors: [Vec<String>; 5],

    client: ClientInfo,
    items: Vec<LineItem>,
    delivery: Option<DeliveryInfo>,
    terms: CommercialTerms,
    notes: Option<String>,

    global_discount_bps: u32,
    tax_rate: TaxRate,
}

impl QuoteBuilder {
    /// Creates an empty builder positioned on the client step.
    pub fn new() -> Self {
        let mut visited = [false; 5];
        visited[QuoteStep::Client.index()] = true;

        QuoteBuilder {
            current: QuoteStep::Client,
            visited,
            errors: Default::default(),
            client: ClientInfo::default(),
            items: Vec::new(),
            delivery: None,
            terms: CommercialTerms::default(),
            notes: None,
            global_discount_bps: 0,
            tax_rate: TaxRate::default(),
        }
    }

    /// Reopens an existing draft (e.g. a duplicate) for editing.
    ///
    /// Only the client step counts as visited: pre-filled data never marks
    /// later steps completed until the user actually walks through them.
    pub fn from_draft(draft: QuoteDraft) -> Self {
        let mut builder = QuoteBuilder::new();
        builder.client = draft.client;
        builder.items = draft.items;
        builder.delivery = draft.delivery.filter(DeliveryInfo::is_meaningful);
        builder.terms = draft.terms;
        builder.notes = draft.notes;
        builder.global_discount_bps = draft.global_discount_bps;
        builder.tax_rate = TaxRate::from_bps(draft.tax_rate_bps);
        builder
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// The step the user is currently on.
    #[inline]
    pub fn current_step(&self) -> QuoteStep {
        self.current
    }

    pub fn client(&self) -> &ClientInfo {
        &self.client
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn delivery(&self) -> Option<&DeliveryInfo> {
        self.delivery.as_ref()
    }

    pub fn terms(&self) -> &CommercialTerms {
        &self.terms
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn global_discount_bps(&self) -> u32 {
        self.global_discount_bps
    }

    pub fn tax_rate(&self) -> TaxRate {
        self.tax_rate
    }

    /// Shipping cost contributed by the delivery section (zero when absent).
    pub fn shipping_cost(&self) -> Money {
        self.delivery
            .as_ref()
            .map(DeliveryInfo::shipping_cost)
            .unwrap_or_else(Money::zero)
    }

    /// Stored errors from the step's last failed navigation attempt.
    pub fn step_errors(&self, step: QuoteStep) -> &[String] {
        &self.errors[step.index()]
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    /// Pure per-step validation predicate. Re-evaluated on demand; never
    /// touches stored state.
    ///
    /// Summary validity is transitive over client and products rather than
    /// independently specified.
    pub fn validate_step(&self, step: QuoteStep) -> Vec<String> {
        match step {
            QuoteStep::Client => client_step_errors(&self.client),
            QuoteStep::Products => {
                if self.items.is_empty() {
                    vec![ValidationError::Empty {
                        field: "line items".to_string(),
                    }
                    .to_string()]
                } else {
                    Vec::new()
                }
            }
            // Optional sections: visiting them is all it takes
            QuoteStep::Delivery | QuoteStep::Terms => Vec::new(),
            QuoteStep::Summary => {
                let mut errors = self.validate_step(QuoteStep::Client);
                errors.extend(self.validate_step(QuoteStep::Products));
                errors
            }
        }
    }

    /// A step is completed only if it has been visited at least once AND
    /// its predicate currently passes.
    ///
    /// Unvisited steps are never shown completed, even when pre-filled
    /// data happens to satisfy the predicate.
    pub fn is_step_completed(&self, step: QuoteStep) -> bool {
        self.visited[step.index()] && self.validate_step(step).is_empty()
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    /// Navigates to `step`.
    ///
    /// ## Rules
    /// - Backward or re-selecting a step: always permitted, regardless of
    ///   validation state, so earlier errors can be fixed
    /// - Forward: blocked if the CURRENT step is required and its
    ///   predicate fails; the failing messages are stored for inline
    ///   display and returned
    pub fn goto(&mut self, step: QuoteStep) -> Result<(), Vec<String>> {
        let moving_forward = step.index() > self.current.index();

        if moving_forward && self.current.is_required() {
            let errors = self.validate_step(self.current);
            if !errors.is_empty() {
                self.errors[self.current.index()] = errors.clone();
                return Err(errors);
            }
        }

        self.current = step;
        self.visited[step.index()] = true;
        self.revalidate_current();
        Ok(())
    }

    /// Advances to the next step in order. No-op on the summary step.
    pub fn next(&mut self) -> Result<(), Vec<String>> {
        match QuoteStep::ALL.get(self.current.index() + 1) {
            Some(step) => self.goto(*step),
            None => Ok(()),
        }
    }

    /// Returns to the previous step in order. No-op on the client step.
    pub fn back(&mut self) -> Result<(), Vec<String>> {
        match self.current.index().checked_sub(1) {
            Some(i) => self.goto(QuoteStep::ALL[i]),
            None => Ok(()),
        }
    }

    /// Clears the current step's stored errors once its predicate passes.
    ///
    /// Runs after every mutator and navigation. Deliberately touches only
    /// the current step: eager validation of other steps would flash
    /// errors on unrelated edits.
    fn revalidate_current(&mut self) {
        if self.validate_step(self.current).is_empty() {
            self.errors[self.current.index()].clear();
        }
    }

    // -------------------------------------------------------------------------
    // Mutators
    // -------------------------------------------------------------------------

    /// Replaces the client section.
    pub fn set_client_info(&mut self, client: ClientInfo) {
        self.client = client;
        self.revalidate_current();
    }

    /// Adds a catalog product to the draft, freezing its data.
    ///
    /// Quantity below 1 is coerced to 1 at this edit boundary rather than
    /// rejected; quantities beyond the hard cap are a real error.
    pub fn add_item(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        validate_item_count(self.items.len())?;

        let quantity = clamp_quantity(quantity)?;
        self.items.push(LineItem::from_product(product, quantity));
        self.revalidate_current();
        Ok(())
    }

    /// Adds a manual (non-catalog) entry to the draft.
    pub fn add_manual_item(
        &mut self,
        description: impl Into<String>,
        unit: impl Into<String>,
        quantity: i64,
        unit_price_pesos: i64,
    ) -> CoreResult<()> {
        validate_item_count(self.items.len())?;

        if unit_price_pesos < 0 {
            return Err(CoreError::invalid_input("unit price", "must not be negative"));
        }

        let quantity = clamp_quantity(quantity)?;
        self.items
            .push(LineItem::manual(description, unit, quantity, unit_price_pesos));
        self.revalidate_current();
        Ok(())
    }

    /// Edits a line item's quantity and discount in place.
    ///
    /// Quantity is clamped up to 1, discount clamped into 0-100%; the
    /// derived subtotal follows automatically since it is never stored.
    pub fn update_item(&mut self, item_id: &str, quantity: i64, discount_bps: u32) -> CoreResult<()> {
        let quantity = clamp_quantity(quantity)?;
        let discount_bps = discount_bps.min(BPS_SCALE as u32);

        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| CoreError::invalid_input("line item", format!("{} not in draft", item_id)))?;

        item.quantity = quantity;
        item.discount_bps = discount_bps;
        self.revalidate_current();
        Ok(())
    }

    /// Removes a line item from the draft.
    pub fn remove_item(&mut self, item_id: &str) -> CoreResult<()> {
        let initial_len = self.items.len();
        self.items.retain(|i| i.id != item_id);

        if self.items.len() == initial_len {
            return Err(CoreError::invalid_input(
                "line item",
                format!("{} not in draft", item_id),
            ));
        }

        self.revalidate_current();
        Ok(())
    }

    /// Replaces the whole item list (bulk edit from the products screen).
    ///
    /// Each incoming item goes through the same clamping as single edits.
    pub fn set_line_items(&mut self, items: Vec<LineItem>) -> CoreResult<()> {
        if items.len() > crate::MAX_QUOTE_ITEMS {
            return Err(CoreError::QuoteTooLarge {
                max: crate::MAX_QUOTE_ITEMS,
            });
        }

        let mut clamped = Vec::with_capacity(items.len());
        for mut item in items {
            item.quantity = clamp_quantity(item.quantity)?;
            item.discount_bps = item.discount_bps.min(BPS_SCALE as u32);
            if item.unit_price_pesos < 0 {
                return Err(CoreError::invalid_input("unit price", "must not be negative"));
            }
            clamped.push(item);
        }

        self.items = clamped;
        self.revalidate_current();
        Ok(())
    }

    /// Sets or clears the delivery section.
    ///
    /// An all-empty delivery form (no address, no shipping) normalizes to
    /// "absent" so it stays out of totals and persistence.
    pub fn set_delivery_info(&mut self, delivery: Option<DeliveryInfo>) -> CoreResult<()> {
        if let Some(d) = &delivery {
            if d.shipping_pesos < 0 {
                return Err(CoreError::invalid_input("shipping cost", "must not be negative"));
            }
        }

        self.delivery = delivery.filter(DeliveryInfo::is_meaningful);
        self.revalidate_current();
        Ok(())
    }

    /// Sets only the shipping cost, creating a minimal delivery section if
    /// none exists yet. Zero with no address clears the section.
    pub fn set_shipping_cost(&mut self, shipping_pesos: i64) -> CoreResult<()> {
        let mut delivery = self.delivery.take().unwrap_or_default();
        delivery.shipping_pesos = shipping_pesos;
        self.set_delivery_info(Some(delivery))
    }

    /// Replaces the commercial terms, clamping validity into 1-365 days.
    pub fn set_commercial_terms(&mut self, mut terms: CommercialTerms) {
        terms.validity_days = terms.validity_days.clamp(MIN_VALIDITY_DAYS, MAX_VALIDITY_DAYS);
        self.terms = terms;
        self.revalidate_current();
    }

    /// Sets the free-text notes.
    pub fn set_notes(&mut self, notes: Option<String>) {
        self.notes = notes.filter(|n| !n.trim().is_empty());
        self.revalidate_current();
    }

    /// Sets the global discount, clamped into 0-100%.
    pub fn set_global_discount(&mut self, bps: u32) {
        self.global_discount_bps = bps.min(BPS_SCALE as u32);
        self.revalidate_current();
    }

    /// Overrides the tax rate (exempt clients, mostly).
    pub fn set_tax_rate(&mut self, rate: TaxRate) {
        self.tax_rate = rate;
        self.revalidate_current();
    }

    // -------------------------------------------------------------------------
    // Submission
    // -------------------------------------------------------------------------

    /// Assembles the draft for hand-off to the persistence collaborator.
    ///
    /// ## Steps
    /// 1. Force-validate the summary step, visited or not
    /// 2. On failure: `CoreError::NotSubmittable` carrying the aggregated
    ///    client + products messages; nothing is handed off
    /// 3. On success: compute totals through the engine and return the
    ///    assembled [`QuoteDraft`]
    ///
    /// The builder itself is not consumed or cleared: if persistence later
    /// fails, the caller still holds the full draft state and no work is
    /// lost. Seller identity is stamped by the session layer.
    ///
    /// Only `Draft` and `Sent` are acceptable target statuses.
    pub fn save(&self, status: QuoteStatus) -> CoreResult<QuoteDraft> {
        match status {
            QuoteStatus::Draft | QuoteStatus::Sent => {}
            other => {
                return Err(CoreError::invalid_input(
                    "status",
                    format!("cannot save a draft directly as {:?}", other),
                ))
            }
        }

        let messages = self.validate_step(QuoteStep::Summary);
        if !messages.is_empty() {
            return Err(CoreError::NotSubmittable { messages });
        }

        let totals = quote_totals(
            &self.items,
            self.global_discount_bps,
            self.shipping_cost(),
            self.tax_rate,
        )?;

        Ok(QuoteDraft {
            status,
            seller_id: String::new(),
            seller_name: String::new(),
            client: self.client.clone(),
            items: self.items.clone(),
            delivery: self.delivery.clone(),
            terms: self.terms.clone(),
            global_discount_bps: self.global_discount_bps,
            tax_rate_bps: self.tax_rate.bps(),
            totals,
            notes: self.notes.clone(),
        })
    }
}

impl Default for QuoteBuilder {
    fn default() -> Self {
        QuoteBuilder::new()
    }
}

/// Coerces quantity up to the minimum of 1 (recover-locally policy for
/// negative/zero input) but rejects quantities beyond the hard cap.
fn clamp_quantity(quantity: i64) -> CoreResult<i64> {
    if quantity > MAX_ITEM_QUANTITY {
        return Err(CoreError::QuantityTooLarge {
            requested: quantity,
            max: MAX_ITEM_QUANTITY,
        });
    }
    Ok(quantity.max(1))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_product(id: &str, price_pesos: i64) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            code: format!("COD-{}", id),
            description: format!("Producto {}", id),
            unit: "un".to_string(),
            price_pesos,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn valid_client() -> ClientInfo {
        ClientInfo {
            legal_name: "Constructora Andes Ltda.".to_string(),
            tax_id: "76.543.210-K".to_string(),
            address: "Av. Las Obras 123".to_string(),
            ..ClientInfo::default()
        }
    }

    #[test]
    fn test_initial_state() {
        let builder = QuoteBuilder::new();
        assert_eq!(builder.current_step(), QuoteStep::Client);
        assert!(!builder.is_step_completed(QuoteStep::Client)); // visited but failing
        assert!(builder.step_errors(QuoteStep::Client).is_empty()); // no attempt yet
    }

    #[test]
    fn test_forward_blocked_by_failing_required_step() {
        let mut builder = QuoteBuilder::new();

        let result = builder.goto(QuoteStep::Products);
        assert!(result.is_err());
        // Step index did not change
        assert_eq!(builder.current_step(), QuoteStep::Client);
        // Errors are now stored for inline display
        assert!(!builder.step_errors(QuoteStep::Client).is_empty());

        // Fix the data, retry, and the same navigation succeeds
        builder.set_client_info(valid_client());
        assert!(builder.goto(QuoteStep::Products).is_ok());
        assert_eq!(builder.current_step(), QuoteStep::Products);
    }

    #[test]
    fn test_backward_always_allowed() {
        let mut builder = QuoteBuilder::new();
        builder.set_client_info(valid_client());
        builder.add_item(&test_product("1", 1_000), 1).unwrap();
        builder.goto(QuoteStep::Products).unwrap();
        builder.goto(QuoteStep::Summary).unwrap();

        // Break the client step while standing on summary
        builder.set_client_info(ClientInfo::default());

        // Backward navigation still works
        assert!(builder.goto(QuoteStep::Client).is_ok());
        assert_eq!(builder.current_step(), QuoteStep::Client);
    }

    #[test]
    fn test_optional_steps_never_block() {
        let mut builder = QuoteBuilder::new();
        builder.set_client_info(valid_client());
        builder.add_item(&test_product("1", 1_000), 1).unwrap();
        builder.goto(QuoteStep::Products).unwrap();
        builder.goto(QuoteStep::Delivery).unwrap();

        // Delivery has no data at all, moving forward is still fine
        assert!(builder.goto(QuoteStep::Terms).is_ok());
        assert!(builder.goto(QuoteStep::Summary).is_ok());
    }

    #[test]
    fn test_completed_requires_visit_and_passing_predicate() {
        let mut builder = QuoteBuilder::new();
        builder.set_client_info(valid_client());
        builder.add_item(&test_product("1", 1_000), 1).unwrap();

        // Products data is already valid but the step was never visited
        assert!(!builder.is_step_completed(QuoteStep::Products));

        builder.goto(QuoteStep::Products).unwrap();
        assert!(builder.is_step_completed(QuoteStep::Products));
        assert!(builder.is_step_completed(QuoteStep::Client));
    }

    #[test]
    fn test_mutator_clears_current_step_errors() {
        let mut builder = QuoteBuilder::new();

        // Failed attempt stores errors on the client step
        assert!(builder.goto(QuoteStep::Summary).is_err());
        assert!(!builder.step_errors(QuoteStep::Client).is_empty());

        // Fixing the data clears them synchronously, no timers involved
        builder.set_client_info(valid_client());
        assert!(builder.step_errors(QuoteStep::Client).is_empty());
    }

    #[test]
    fn test_quantity_clamped_to_minimum() {
        let mut builder = QuoteBuilder::new();
        let product = test_product("1", 5_000);

        builder.add_item(&product, -4).unwrap();
        assert_eq!(builder.items()[0].quantity, 1);

        let id = builder.items()[0].id.clone();
        builder.update_item(&id, 0, 0).unwrap();
        assert_eq!(builder.items()[0].quantity, 1);
    }

    #[test]
    fn test_quantity_cap_is_an_error() {
        let mut builder = QuoteBuilder::new();
        let result = builder.add_item(&test_product("1", 5_000), MAX_ITEM_QUANTITY + 1);
        assert!(matches!(result, Err(CoreError::QuantityTooLarge { .. })));
    }

    #[test]
    fn test_discount_clamped() {
        let mut builder = QuoteBuilder::new();
        builder.add_item(&test_product("1", 5_000), 2).unwrap();
        let id = builder.items()[0].id.clone();

        builder.update_item(&id, 2, 25_000).unwrap();
        assert_eq!(builder.items()[0].discount_bps, 10_000);
    }

    #[test]
    fn test_remove_item() {
        let mut builder = QuoteBuilder::new();
        builder.add_item(&test_product("1", 5_000), 2).unwrap();
        let id = builder.items()[0].id.clone();

        builder.remove_item(&id).unwrap();
        assert!(builder.items().is_empty());
        assert!(builder.remove_item(&id).is_err());
    }

    #[test]
    fn test_empty_delivery_normalizes_to_absent() {
        let mut builder = QuoteBuilder::new();
        builder
            .set_delivery_info(Some(DeliveryInfo::default()))
            .unwrap();
        assert!(builder.delivery().is_none());

        builder
            .set_delivery_info(Some(DeliveryInfo {
                shipping_pesos: 50_000,
                ..DeliveryInfo::default()
            }))
            .unwrap();
        assert_eq!(builder.shipping_cost().pesos(), 50_000);
    }

    #[test]
    fn test_set_shipping_cost_manages_delivery_section() {
        let mut builder = QuoteBuilder::new();

        builder.set_shipping_cost(50_000).unwrap();
        assert_eq!(builder.shipping_cost().pesos(), 50_000);

        // Zero shipping with no address removes the section again
        builder.set_shipping_cost(0).unwrap();
        assert!(builder.delivery().is_none());
        assert!(builder.set_shipping_cost(-1).is_err());
    }

    #[test]
    fn test_terms_validity_clamped() {
        let mut builder = QuoteBuilder::new();
        builder.set_commercial_terms(CommercialTerms {
            validity_days: 0,
            ..CommercialTerms::default()
        });
        assert_eq!(builder.terms().validity_days, 1);

        builder.set_commercial_terms(CommercialTerms {
            validity_days: 9_999,
            ..CommercialTerms::default()
        });
        assert_eq!(builder.terms().validity_days, 365);
    }

    #[test]
    fn test_save_rejects_invalid_draft_with_all_messages() {
        let builder = QuoteBuilder::new();

        let err = builder.save(QuoteStatus::Sent).unwrap_err();
        match err {
            CoreError::NotSubmittable { messages } => {
                // Three client messages plus the empty item list
                assert_eq!(messages.len(), 4);
            }
            other => panic!("expected NotSubmittable, got {:?}", other),
        }
    }

    #[test]
    fn test_save_rejects_non_submittable_status() {
        let builder = QuoteBuilder::new();
        assert!(builder.save(QuoteStatus::Accepted).is_err());
        assert!(builder.save(QuoteStatus::Expired).is_err());
    }

    #[test]
    fn test_save_assembles_draft_with_totals() {
        let mut builder = QuoteBuilder::new();
        builder.set_client_info(valid_client());
        builder.add_item(&test_product("cemento", 8_500), 100).unwrap();
        let id = builder.items()[0].id.clone();
        builder.update_item(&id, 100, 500).unwrap();
        builder.add_item(&test_product("fierro", 15_000), 50).unwrap();
        builder
            .set_delivery_info(Some(DeliveryInfo {
                address: "Obra Av. Norte 500".to_string(),
                shipping_pesos: 50_000,
                ..DeliveryInfo::default()
            }))
            .unwrap();

        let draft = builder.save(QuoteStatus::Sent).unwrap();
        assert_eq!(draft.status, QuoteStatus::Sent);
        assert_eq!(draft.items.len(), 2);
        assert_eq!(draft.totals.subtotal_pesos, 1_557_500);
        assert_eq!(draft.totals.grand_total_pesos, 1_903_425);

        // Builder state is preserved for the persistence-failure path
        assert_eq!(builder.items().len(), 2);
    }

    #[test]
    fn test_save_draft_status_also_validates() {
        // Saving as Draft still goes through summary validation: a quote
        // with no items cannot be handed to persistence in any status.
        let mut builder = QuoteBuilder::new();
        builder.set_client_info(valid_client());
        assert!(builder.save(QuoteStatus::Draft).is_err());
    }

    #[test]
    fn test_from_draft_marks_nothing_completed() {
        let mut original = QuoteBuilder::new();
        original.set_client_info(valid_client());
        original.add_item(&test_product("1", 8_500), 10).unwrap();
        let draft = original.save(QuoteStatus::Draft).unwrap();

        let reopened = QuoteBuilder::from_draft(draft);
        assert_eq!(reopened.current_step(), QuoteStep::Client);
        assert_eq!(reopened.items().len(), 1);
        // Data satisfies the predicate but products was never visited
        assert!(!reopened.is_step_completed(QuoteStep::Products));
    }

    #[test]
    fn test_next_and_back() {
        let mut builder = QuoteBuilder::new();
        builder.set_client_info(valid_client());
        builder.add_item(&test_product("1", 1_000), 1).unwrap();

        builder.next().unwrap();
        assert_eq!(builder.current_step(), QuoteStep::Products);
        builder.next().unwrap();
        assert_eq!(builder.current_step(), QuoteStep::Delivery);
        builder.back().unwrap();
        assert_eq!(builder.current_step(), QuoteStep::Products);

        // back() on the first step is a no-op
        builder.goto(QuoteStep::Client).unwrap();
        builder.back().unwrap();
        assert_eq!(builder.current_step(), QuoteStep::Client);
    }
}
