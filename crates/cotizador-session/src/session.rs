//! # Quote Editing Session
//!
//! Owns the live [`QuoteBuilder`] and orchestrates submission against the
//! persistence collaborator.
//!
//! ## Thread Safety
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Session Concurrency                                  │
//! │                                                                         │
//! │  Builder state:    Arc<Mutex<QuoteBuilder>>                            │
//! │    Commands can run concurrently; every edit takes the lock briefly.   │
//! │                                                                         │
//! │  Submission guard: AtomicBool                                          │
//! │    A double-clicked save button must produce exactly one quote.        │
//! │    The first submit flips the flag; the second sees it set and is      │
//! │    rejected with SUBMISSION_IN_PROGRESS before touching anything.      │
//! │                                                                         │
//! │  Search tokens:    AtomicU64                                           │
//! │    Catalog searches resolve out of order. Each keystroke claims a      │
//! │    new token; a response whose token is no longer current is stale     │
//! │    and must be dropped (last request wins).                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Contract
//! A failed submission (validation or persistence) leaves the builder
//! untouched: the user's work survives and the save can be retried. Only a
//! confirmed create clears the session.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use crate::error::ApiError;
use crate::gateway::{CurrentUser, QuoteStore};
use cotizador_core::{Quote, QuoteBuilder, QuoteStatus};

/// The editing session for one quote draft.
pub struct QuoteSession {
    builder: Arc<Mutex<QuoteBuilder>>,
    store: Arc<dyn QuoteStore>,
    user: CurrentUser,

    /// Set while a submission is in flight; rejects concurrent submits.
    submitting: AtomicBool,

    /// Monotonic token for catalog searches; only the latest is current.
    search_generation: AtomicU64,
}

impl QuoteSession {
    /// Creates a fresh session with an empty builder.
    pub fn new(store: Arc<dyn QuoteStore>, user: CurrentUser) -> Self {
        QuoteSession {
            builder: Arc::new(Mutex::new(QuoteBuilder::new())),
            store,
            user,
            submitting: AtomicBool::new(false),
            search_generation: AtomicU64::new(0),
        }
    }

    /// The user this session acts for.
    pub fn user(&self) -> &CurrentUser {
        &self.user
    }

    // -------------------------------------------------------------------------
    // Builder access
    // -------------------------------------------------------------------------

    /// Executes a function with read access to the builder.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let step = session.with_builder(|b| b.current_step());
    /// ```
    pub fn with_builder<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&QuoteBuilder) -> R,
    {
        let builder = self.builder.lock().expect("Builder mutex poisoned");
        f(&builder)
    }

    /// Executes a function with write access to the builder.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// session.with_builder_mut(|b| b.set_global_discount(500));
    /// ```
    pub fn with_builder_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut QuoteBuilder) -> R,
    {
        let mut builder = self.builder.lock().expect("Builder mutex poisoned");
        f(&mut builder)
    }

    /// Throws away the current draft and starts over.
    pub fn discard(&self) {
        self.with_builder_mut(|b| *b = QuoteBuilder::new());
    }

    // -------------------------------------------------------------------------
    // Submission
    // -------------------------------------------------------------------------

    /// Validates, assembles and persists the current draft.
    ///
    /// ## Steps
    /// 1. Claim the in-flight flag; a concurrent submit gets
    ///    `SUBMISSION_IN_PROGRESS` and changes nothing
    /// 2. Force-validate via the builder's `save` (summary validation,
    ///    totals computation); failure returns `NOT_SUBMITTABLE` with the
    ///    collected messages and the builder keeps its state
    /// 3. Stamp the seller identity from the signed-in user
    /// 4. Hand the draft to the store; on success the builder is cleared,
    ///    on failure it is preserved for retry
    pub async fn submit(&self, status: QuoteStatus) -> Result<Quote, ApiError> {
        if !self.user.can_create_quotes() {
            return Err(ApiError::denied("You are not allowed to create quotes"));
        }

        if self
            .submitting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Rejected concurrent quote submission");
            return Err(ApiError::new(
                crate::error::ErrorCode::SubmissionInProgress,
                "A submission is already in progress",
            ));
        }

        let result = self.submit_inner(status).await;
        self.submitting.store(false, Ordering::Release);
        result
    }

    async fn submit_inner(&self, status: QuoteStatus) -> Result<Quote, ApiError> {
        // Assemble under the lock, then release it before the await
        let mut draft = self.with_builder(|b| b.save(status))?;
        draft.seller_id = self.user.id.clone();
        draft.seller_name = self.user.name.clone();

        let quote = self.store.create(&draft).await.map_err(ApiError::from)?;

        info!(
            id = %quote.id,
            sequence_number = %quote.sequence_number,
            status = quote.status.as_str(),
            grand_total = quote.totals.grand_total_pesos,
            "Quote submitted"
        );

        // Only a confirmed create clears the working draft
        self.discard();

        Ok(quote)
    }

    /// Reopens an existing quote as a fresh draft in this session.
    ///
    /// Duplication is the only way back to Draft: the original keeps its
    /// status and identity, the copy gets new line ids and starts the
    /// wizard from the client step.
    pub async fn duplicate(&self, quote_id: &str) -> Result<(), ApiError> {
        let quote = self
            .store
            .get_by_id(quote_id)
            .await
            .map_err(ApiError::from)?
            .ok_or_else(|| ApiError::not_found("Quote", quote_id))?;

        let draft = quote.duplicate_as_draft();
        self.with_builder_mut(|b| *b = QuoteBuilder::from_draft(draft));

        info!(source = %quote_id, "Opened duplicate draft");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Search tokens
    // -------------------------------------------------------------------------

    /// Claims a new search token, making every earlier token stale.
    ///
    /// Call once per keystroke, before firing the catalog query.
    pub fn begin_search(&self) -> u64 {
        self.search_generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Whether a token still represents the latest search.
    ///
    /// A response arriving with a stale token must be dropped, never
    /// rendered: the user has already typed past it.
    pub fn is_current_search(&self, token: u64) -> bool {
        self.search_generation.load(Ordering::Acquire) == token
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::UserRole;
    use chrono::Utc;
    use cotizador_core::{ClientInfo, Product, QuoteStep};
    use cotizador_db::{Database, DbConfig};

    async fn test_session() -> QuoteSession {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        QuoteSession::new(
            Arc::new(db),
            CurrentUser {
                id: "u-1".to_string(),
                name: "Valentina Rojas".to_string(),
                role: UserRole::Seller,
            },
        )
    }

    fn test_product(price_pesos: i64) -> Product {
        let now = Utc::now();
        Product {
            id: "p-1".to_string(),
            code: "CEM-25KG".to_string(),
            description: "Cemento 25kg".to_string(),
            unit: "saco".to_string(),
            price_pesos,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn fill_valid_draft(session: &QuoteSession) {
        session.with_builder_mut(|b| {
            b.set_client_info(ClientInfo {
                legal_name: "Constructora Andes Ltda.".to_string(),
                tax_id: "76.543.210-K".to_string(),
                address: "Av. Las Obras 123".to_string(),
                ..ClientInfo::default()
            });
            b.add_item(&test_product(8_500), 100).unwrap();
        });
    }

    #[tokio::test]
    async fn test_submit_persists_and_clears_builder() {
        let session = test_session().await;
        fill_valid_draft(&session);

        let quote = session.submit(QuoteStatus::Sent).await.unwrap();
        assert_eq!(quote.status, QuoteStatus::Sent);
        assert_eq!(quote.seller_name, "Valentina Rojas");
        assert!(quote.sequence_number.starts_with("COT-"));

        // Builder was cleared for the next quote
        assert!(session.with_builder(|b| b.items().is_empty()));
        assert_eq!(session.with_builder(|b| b.current_step()), QuoteStep::Client);
    }

    #[tokio::test]
    async fn test_failed_submit_preserves_builder() {
        let session = test_session().await;
        // Client data only, no items: summary validation must fail
        session.with_builder_mut(|b| {
            b.set_client_info(ClientInfo {
                legal_name: "Constructora Andes Ltda.".to_string(),
                tax_id: "76.543.210-K".to_string(),
                address: "Av. Las Obras 123".to_string(),
                ..ClientInfo::default()
            });
        });

        let err = session.submit(QuoteStatus::Sent).await.unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::NotSubmittable);

        // The typed client data is still there
        assert_eq!(
            session.with_builder(|b| b.client().legal_name.clone()),
            "Constructora Andes Ltda."
        );

        // And the guard flag was released: a corrected retry succeeds
        session.with_builder_mut(|b| b.add_item(&test_product(8_500), 10).unwrap());
        assert!(session.submit(QuoteStatus::Draft).await.is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_opens_fresh_draft() {
        let session = test_session().await;
        fill_valid_draft(&session);
        let original = session.submit(QuoteStatus::Sent).await.unwrap();

        session.duplicate(&original.id).await.unwrap();

        session.with_builder(|b| {
            assert_eq!(b.items().len(), 1);
            assert_eq!(b.current_step(), QuoteStep::Client);
            // New line identity, same commercial content
            assert_ne!(b.items()[0].id, original.items[0].id);
            assert_eq!(b.items()[0].code, original.items[0].code);
        });

        // Submitting the duplicate creates a distinct quote
        let copy = session.submit(QuoteStatus::Draft).await.unwrap();
        assert_ne!(copy.id, original.id);
        assert_ne!(copy.sequence_number, original.sequence_number);
        assert_eq!(copy.status, QuoteStatus::Draft);
    }

    #[tokio::test]
    async fn test_duplicate_missing_quote() {
        let session = test_session().await;
        let err = session.duplicate("nope").await.unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_search_tokens_last_request_wins() {
        let session = test_session().await;

        let first = session.begin_search();
        assert!(session.is_current_search(first));

        let second = session.begin_search();
        // The older token is now stale and its results must be dropped
        assert!(!session.is_current_search(first));
        assert!(session.is_current_search(second));
    }

    #[tokio::test]
    async fn test_discard_resets_builder() {
        let session = test_session().await;
        fill_valid_draft(&session);
        assert!(!session.with_builder(|b| b.items().is_empty()));

        session.discard();
        assert!(session.with_builder(|b| b.items().is_empty()));
    }
}
