//! # Quote Repository
//!
//! Database operations for quotes and their line items.
//!
//! ## Quote Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Quote Lifecycle                                   │
//! │                                                                         │
//! │  1. CREATE                                                             │
//! │     └── create(draft) → Quote { id, COT-YYYY-NNNN, valid_until }       │
//! │         (quote + items + sequence counter in one transaction)          │
//! │                                                                         │
//! │  2. EDIT (drafts only)                                                 │
//! │     └── update_draft() → replaces content, items re-inserted           │
//! │                                                                         │
//! │  3. STATUS CHANGES (one-directional)                                   │
//! │     └── update_status() → draft→sent, sent→accepted/rejected/expired   │
//! │                                                                         │
//! │  4. HOUSEKEEPING                                                       │
//! │     └── expire_overdue() → sent quotes past valid_until → expired      │
//! │     └── soft_delete()    → hidden from listings, data kept             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Columns
//! The client, delivery and terms sections are stored as JSON snapshots on
//! the quote row. A quote keeps exactly the data it was issued with, no
//! matter what happens to the catalogs afterwards.

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use tracing::debug;
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use cotizador_core::{
    ClientInfo, CommercialTerms, CoreError, DeliveryInfo, LineItem, Quote, QuoteDraft, QuoteStatus,
    QuoteTotals,
};

// =============================================================================
// Listing Types
// =============================================================================

/// Filter for quote listings.
#[derive(Debug, Clone, Default)]
pub struct QuoteFilter {
    /// Only quotes in this status, if set.
    pub status: Option<QuoteStatus>,

    /// Case-insensitive substring match against client legal name, tax id
    /// and sequence number, if set.
    pub search: Option<String>,

    /// Maximum rows to return. Zero means the default of 50.
    pub limit: u32,
}

/// One row of the quote listing.
///
/// Reads the denormalized columns only; no JSON parsing, no items join.
#[derive(Debug, Clone, FromRow, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct QuoteSummary {
    pub id: String,
    pub sequence_number: String,
    pub status: QuoteStatus,
    pub client_legal_name: String,
    pub grand_total_pesos: i64,
    #[ts(as = "Option<String>")]
    pub valid_until: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Quote count per status, for the dashboard.
#[derive(Debug, Clone, FromRow, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StatusCount {
    pub status: QuoteStatus,
    pub count: i64,
}

// =============================================================================
// Row Types
// =============================================================================

/// Raw quote row as stored; JSON snapshots still serialized.
#[derive(Debug, FromRow)]
struct QuoteRow {
    id: String,
    sequence_number: String,
    status: QuoteStatus,
    seller_id: String,
    seller_name: String,
    client_json: String,
    delivery_json: Option<String>,
    terms_json: String,
    global_discount_bps: u32,
    tax_rate_bps: u32,
    subtotal_pesos: i64,
    line_discount_pesos: i64,
    global_discount_pesos: i64,
    net_pesos: i64,
    tax_pesos: i64,
    shipping_pesos: i64,
    grand_total_pesos: i64,
    total_discount_pesos: i64,
    notes: Option<String>,
    valid_until: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    is_active: bool,
}

const QUOTE_COLUMNS: &str = "\
    id, sequence_number, status, seller_id, seller_name, \
    client_json, delivery_json, terms_json, \
    global_discount_bps, tax_rate_bps, \
    subtotal_pesos, line_discount_pesos, global_discount_pesos, net_pesos, \
    tax_pesos, shipping_pesos, grand_total_pesos, total_discount_pesos, \
    notes, valid_until, created_at, updated_at, is_active";

impl QuoteRow {
    /// Deserializes the snapshot columns and assembles the domain aggregate.
    fn into_quote(self, items: Vec<LineItem>) -> DbResult<Quote> {
        let client: ClientInfo = serde_json::from_str(&self.client_json)?;
        let delivery: Option<DeliveryInfo> = self
            .delivery_json
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;
        let terms: CommercialTerms = serde_json::from_str(&self.terms_json)?;

        Ok(Quote {
            id: self.id,
            sequence_number: self.sequence_number,
            status: self.status,
            seller_id: self.seller_id,
            seller_name: self.seller_name,
            client,
            items,
            delivery,
            terms,
            global_discount_bps: self.global_discount_bps,
            tax_rate_bps: self.tax_rate_bps,
            totals: QuoteTotals {
                subtotal_pesos: self.subtotal_pesos,
                line_discount_pesos: self.line_discount_pesos,
                global_discount_pesos: self.global_discount_pesos,
                net_pesos: self.net_pesos,
                tax_pesos: self.tax_pesos,
                shipping_pesos: self.shipping_pesos,
                grand_total_pesos: self.grand_total_pesos,
                total_discount_pesos: self.total_discount_pesos,
            },
            notes: self.notes,
            valid_until: self.valid_until,
            created_at: self.created_at,
            updated_at: self.updated_at,
            is_active: self.is_active,
        })
    }
}

/// Raw line item row.
#[derive(Debug, FromRow)]
struct ItemRow {
    id: String,
    product_id: Option<String>,
    code: String,
    description: String,
    unit: String,
    quantity: i64,
    unit_price_pesos: i64,
    discount_bps: u32,
}

impl From<ItemRow> for LineItem {
    fn from(row: ItemRow) -> Self {
        LineItem {
            id: row.id,
            product_id: row.product_id,
            code: row.code,
            description: row.description,
            unit: row.unit,
            quantity: row.quantity,
            unit_price_pesos: row.unit_price_pesos,
            discount_bps: row.discount_bps,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for quote database operations.
#[derive(Debug, Clone)]
pub struct QuoteRepository {
    pool: SqlitePool,
}

impl QuoteRepository {
    /// Creates a new QuoteRepository.
    pub fn new(pool: SqlitePool) -> Self {
        QuoteRepository { pool }
    }

    /// Persists a new quote from an assembled draft.
    ///
    /// ## What Runs In One Transaction
    /// 1. Claim the next per-year sequence number (COT-YYYY-NNNN)
    /// 2. Insert the quote row with JSON snapshots and totals
    /// 3. Insert all line items in order
    ///
    /// `valid_until` is derived from the terms' validity window.
    pub async fn create(&self, draft: &QuoteDraft) -> DbResult<Quote> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let year = now.year();

        let mut tx = self.pool.begin().await?;

        // Per-year counter: seed the year row on first use, then claim the
        // next number. RETURNING keeps claim-and-read atomic.
        sqlx::query("INSERT INTO quote_sequences (year, next_seq) VALUES (?1, 1) ON CONFLICT(year) DO NOTHING")
            .bind(year)
            .execute(&mut *tx)
            .await?;

        let seq: i64 = sqlx::query_scalar(
            "UPDATE quote_sequences SET next_seq = next_seq + 1 WHERE year = ?1 RETURNING next_seq - 1",
        )
        .bind(year)
        .fetch_one(&mut *tx)
        .await?;

        let sequence_number = format!("COT-{}-{:04}", year, seq);
        let valid_until = now + Duration::days(draft.terms.validity_days as i64);

        debug!(id = %id, sequence_number = %sequence_number, "Creating quote");

        let client_json = serde_json::to_string(&draft.client)?;
        let delivery_json = draft
            .delivery
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let terms_json = serde_json::to_string(&draft.terms)?;

        sqlx::query(
            r#"
            INSERT INTO quotes (
                id, sequence_number, status, seller_id, seller_name,
                client_legal_name, client_tax_id,
                client_json, delivery_json, terms_json,
                global_discount_bps, tax_rate_bps,
                subtotal_pesos, line_discount_pesos, global_discount_pesos, net_pesos,
                tax_pesos, shipping_pesos, grand_total_pesos, total_discount_pesos,
                notes, valid_until, created_at, updated_at, is_active
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7,
                ?8, ?9, ?10,
                ?11, ?12,
                ?13, ?14, ?15, ?16,
                ?17, ?18, ?19, ?20,
                ?21, ?22, ?23, ?24, 1
            )
            "#,
        )
        .bind(&id)
        .bind(&sequence_number)
        .bind(draft.status)
        .bind(&draft.seller_id)
        .bind(&draft.seller_name)
        .bind(&draft.client.legal_name)
        .bind(&draft.client.tax_id)
        .bind(&client_json)
        .bind(&delivery_json)
        .bind(&terms_json)
        .bind(draft.global_discount_bps)
        .bind(draft.tax_rate_bps)
        .bind(draft.totals.subtotal_pesos)
        .bind(draft.totals.line_discount_pesos)
        .bind(draft.totals.global_discount_pesos)
        .bind(draft.totals.net_pesos)
        .bind(draft.totals.tax_pesos)
        .bind(draft.totals.shipping_pesos)
        .bind(draft.totals.grand_total_pesos)
        .bind(draft.totals.total_discount_pesos)
        .bind(&draft.notes)
        .bind(valid_until)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        insert_items(&mut tx, &id, &draft.items).await?;

        tx.commit().await?;

        Ok(Quote {
            id,
            sequence_number,
            status: draft.status,
            seller_id: draft.seller_id.clone(),
            seller_name: draft.seller_name.clone(),
            client: draft.client.clone(),
            items: draft.items.clone(),
            delivery: draft.delivery.clone(),
            terms: draft.terms.clone(),
            global_discount_bps: draft.global_discount_bps,
            tax_rate_bps: draft.tax_rate_bps,
            totals: draft.totals.clone(),
            notes: draft.notes.clone(),
            valid_until: Some(valid_until),
            created_at: now,
            updated_at: now,
            is_active: true,
        })
    }

    /// Gets a quote by ID with its line items, soft-deleted ones included.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Quote>> {
        let sql = format!("SELECT {} FROM quotes WHERE id = ?1", QUOTE_COLUMNS);
        let row: Option<QuoteRow> = sqlx::query_as(&sql).bind(id).fetch_optional(&self.pool).await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = self.get_items(id).await?;
        Ok(Some(row.into_quote(items)?))
    }

    /// Gets all line items of a quote, in stored order.
    async fn get_items(&self, quote_id: &str) -> DbResult<Vec<LineItem>> {
        let rows: Vec<ItemRow> = sqlx::query_as(
            r#"
            SELECT id, product_id, code, description, unit,
                   quantity, unit_price_pesos, discount_bps
            FROM quote_items
            WHERE quote_id = ?1
            ORDER BY position
            "#,
        )
        .bind(quote_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(LineItem::from).collect())
    }

    /// Lists active quotes, newest first.
    pub async fn list(&self, filter: QuoteFilter) -> DbResult<Vec<QuoteSummary>> {
        let limit = if filter.limit == 0 { 50 } else { filter.limit };
        let search = filter.search.filter(|s| !s.trim().is_empty());

        let summaries: Vec<QuoteSummary> = sqlx::query_as(
            r#"
            SELECT id, sequence_number, status, client_legal_name,
                   grand_total_pesos, valid_until, created_at
            FROM quotes
            WHERE is_active = 1
              AND (?1 IS NULL OR status = ?1)
              AND (?2 IS NULL
                   OR client_legal_name LIKE '%' || ?2 || '%'
                   OR client_tax_id LIKE '%' || ?2 || '%'
                   OR sequence_number LIKE '%' || ?2 || '%')
            ORDER BY created_at DESC
            LIMIT ?3
            "#,
        )
        .bind(filter.status)
        .bind(search)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(summaries)
    }

    /// Moves a quote to a new status.
    ///
    /// The transition table lives in the core crate; this method checks it
    /// before touching the database and the UPDATE is additionally guarded
    /// on the expected current status, so a concurrent change loses cleanly.
    pub async fn update_status(&self, id: &str, to: QuoteStatus) -> DbResult<()> {
        let from: Option<QuoteStatus> =
            sqlx::query_scalar("SELECT status FROM quotes WHERE id = ?1 AND is_active = 1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        let from = from.ok_or_else(|| DbError::not_found("Quote", id))?;

        if !from.can_transition_to(to) {
            return Err(DbError::Domain(CoreError::InvalidStatusTransition {
                quote_id: id.to_string(),
                from,
                to,
            }));
        }

        debug!(id = %id, from = from.as_str(), to = to.as_str(), "Updating quote status");

        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE quotes SET status = ?2, updated_at = ?3 WHERE id = ?1 AND status = ?4",
        )
        .bind(id)
        .bind(to)
        .bind(now)
        .bind(from)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Lost a race with another writer
            return Err(DbError::not_found("Quote", id));
        }

        Ok(())
    }

    /// Replaces the content of a draft quote.
    ///
    /// Only drafts are editable; any other status makes this a NotFound on
    /// purpose, the guard clause in the UPDATE enforces it. Line items are
    /// replaced wholesale and `valid_until` is re-anchored at the edit time.
    pub async fn update_draft(&self, id: &str, draft: &QuoteDraft) -> DbResult<Quote> {
        let now = Utc::now();
        let valid_until = now + Duration::days(draft.terms.validity_days as i64);

        let client_json = serde_json::to_string(&draft.client)?;
        let delivery_json = draft
            .delivery
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let terms_json = serde_json::to_string(&draft.terms)?;

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE quotes SET
                client_legal_name = ?2,
                client_tax_id = ?3,
                client_json = ?4,
                delivery_json = ?5,
                terms_json = ?6,
                global_discount_bps = ?7,
                tax_rate_bps = ?8,
                subtotal_pesos = ?9,
                line_discount_pesos = ?10,
                global_discount_pesos = ?11,
                net_pesos = ?12,
                tax_pesos = ?13,
                shipping_pesos = ?14,
                grand_total_pesos = ?15,
                total_discount_pesos = ?16,
                notes = ?17,
                valid_until = ?18,
                updated_at = ?19
            WHERE id = ?1 AND status = 'draft' AND is_active = 1
            "#,
        )
        .bind(id)
        .bind(&draft.client.legal_name)
        .bind(&draft.client.tax_id)
        .bind(&client_json)
        .bind(&delivery_json)
        .bind(&terms_json)
        .bind(draft.global_discount_bps)
        .bind(draft.tax_rate_bps)
        .bind(draft.totals.subtotal_pesos)
        .bind(draft.totals.line_discount_pesos)
        .bind(draft.totals.global_discount_pesos)
        .bind(draft.totals.net_pesos)
        .bind(draft.totals.tax_pesos)
        .bind(draft.totals.shipping_pesos)
        .bind(draft.totals.grand_total_pesos)
        .bind(draft.totals.total_discount_pesos)
        .bind(&draft.notes)
        .bind(valid_until)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Quote (draft)", id));
        }

        sqlx::query("DELETE FROM quote_items WHERE quote_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        insert_items(&mut tx, id, &draft.items).await?;

        tx.commit().await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Quote", id))
    }

    /// Soft-deletes a quote: hidden from listings, data kept.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();
        let result =
            sqlx::query("UPDATE quotes SET is_active = 0, updated_at = ?2 WHERE id = ?1 AND is_active = 1")
                .bind(id)
                .bind(now)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Quote", id));
        }

        Ok(())
    }

    /// Expires every sent quote whose validity window has elapsed.
    ///
    /// ## Returns
    /// Number of quotes moved to Expired.
    ///
    /// ## When To Call
    /// On app startup and before listings; cheap enough to run often.
    pub async fn expire_overdue(&self, now: DateTime<Utc>) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE quotes SET status = 'expired', updated_at = ?1
            WHERE status = 'sent' AND is_active = 1
              AND valid_until IS NOT NULL AND valid_until < ?1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await?;

        let expired = result.rows_affected();
        if expired > 0 {
            debug!(count = expired, "Expired overdue quotes");
        }

        Ok(expired)
    }

    /// Counts active quotes per status, for the dashboard header.
    pub async fn count_by_status(&self) -> DbResult<Vec<StatusCount>> {
        let counts: Vec<StatusCount> = sqlx::query_as(
            "SELECT status, COUNT(*) as count FROM quotes WHERE is_active = 1 GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }
}

/// Inserts a draft's line items, preserving their order via `position`.
async fn insert_items(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    quote_id: &str,
    items: &[LineItem],
) -> DbResult<()> {
    for (position, item) in items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO quote_items (
                id, quote_id, position, product_id,
                code, description, unit,
                quantity, unit_price_pesos, discount_bps
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&item.id)
        .bind(quote_id)
        .bind(position as i64)
        .bind(&item.product_id)
        .bind(&item.code)
        .bind(&item.description)
        .bind(&item.unit)
        .bind(item.quantity)
        .bind(item.unit_price_pesos)
        .bind(item.discount_bps)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
