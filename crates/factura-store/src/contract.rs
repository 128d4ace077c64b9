//! # Storage Contract
//!
//! The trait family every backend implements. Services depend on
//! `Arc<dyn Storage>` and never on a concrete backend.
//!
//! ## Contract Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Storage (supertrait)                            │
//! │                                                                         │
//! │   ClientStore      insert / get / list / update / soft & hard delete   │
//! │   InvoiceStore     insert / get / list / update / status / finalize    │
//! │   QuoteStore       insert / get / list / update / status / convert     │
//! │   SettingsStore    get / save (singleton row)                          │
//! │   NumberSource     max_number(kind, pattern)                           │
//! │   SnapshotStore    snapshot / replace_all (backup support)             │
//! │                                                                         │
//! │   Implemented by:  sqlite::Database          kv::KvStorage             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Who Guards What
//! Lifecycle decisions (which transitions are legal, when numbering runs,
//! what a snapshot contains) belong to the engine. The backends only enforce
//! the integrity guards that must hold even under concurrent writers:
//! finalized invoices reject content updates, converted quotes reject updates
//! and re-conversion, document numbers are unique, and `convert_quote` is
//! atomic.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreResult;
use factura_core::numbering::DocumentKind;
use factura_core::{
    Client, Invoice, InvoiceStatus, InvoiceWithLines, LineItem, Quote, QuoteStatus,
    QuoteWithLines, Settings,
};

// =============================================================================
// Clients
// =============================================================================

#[async_trait]
pub trait ClientStore: Send + Sync {
    /// Inserts a new client row.
    async fn insert_client(&self, client: &Client) -> StoreResult<()>;

    /// Fetches a client by id, soft-deleted ones included. Documents keep
    /// resolving their client reference after deletion.
    async fn get_client(&self, id: &str) -> StoreResult<Option<Client>>;

    /// Lists non-deleted clients ordered by display name
    /// (company name, else last name, case-insensitive).
    async fn list_clients(&self) -> StoreResult<Vec<Client>>;

    /// Updates all mutable fields of an existing client.
    async fn update_client(&self, client: &Client) -> StoreResult<()>;

    /// Marks a client deleted without removing the row.
    async fn soft_delete_client(&self, id: &str, deleted_at: DateTime<Utc>) -> StoreResult<()>;

    /// Removes the row entirely. Fails with a foreign key violation while
    /// documents still reference the client.
    async fn hard_delete_client(&self, id: &str) -> StoreResult<()>;
}

// =============================================================================
// Invoices
// =============================================================================

#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Inserts an invoice header and its lines in one transaction.
    async fn insert_invoice(&self, invoice: &Invoice, lines: &[LineItem]) -> StoreResult<()>;

    /// Fetches an invoice with its lines ordered by `sort_order`.
    async fn get_invoice(&self, id: &str) -> StoreResult<Option<InvoiceWithLines>>;

    /// Lists invoice headers, newest issue date first (id breaks ties).
    async fn list_invoices(&self) -> StoreResult<Vec<Invoice>>;

    /// Replaces the mutable content of a draft invoice: header fields and
    /// the full line set. Never touches `invoice_number`, `status`,
    /// `created_at` or `finalized_at`.
    ///
    /// Fails with `Finalized` if the invoice has been finalized.
    async fn update_invoice(&self, invoice: &Invoice, lines: &[LineItem]) -> StoreResult<()>;

    /// Sets the status column. No transition check here; the engine decides
    /// which transitions are legal.
    async fn update_invoice_status(
        &self,
        id: &str,
        status: InvoiceStatus,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<()>;

    /// Stamps `finalized_at` and moves the invoice to `sent`, once.
    /// A second call is a no-op (the stamp survives).
    async fn finalize_invoice(&self, id: &str, finalized_at: DateTime<Utc>) -> StoreResult<()>;
}

// =============================================================================
// Quotes
// =============================================================================

#[async_trait]
pub trait QuoteStore: Send + Sync {
    /// Inserts a quote header and its lines in one transaction.
    async fn insert_quote(&self, quote: &Quote, lines: &[LineItem]) -> StoreResult<()>;

    /// Fetches a quote with its lines ordered by `sort_order`.
    async fn get_quote(&self, id: &str) -> StoreResult<Option<QuoteWithLines>>;

    /// Lists quote headers, newest issue date first (id breaks ties).
    async fn list_quotes(&self) -> StoreResult<Vec<Quote>>;

    /// Replaces the mutable content of a quote. Never touches
    /// `quote_number`, `status`, `created_at` or `converted_invoice_id`.
    ///
    /// Fails with `Converted` if the quote has been converted.
    async fn update_quote(&self, quote: &Quote, lines: &[LineItem]) -> StoreResult<()>;

    /// Sets the status column. No transition check here.
    async fn update_quote_status(
        &self,
        id: &str,
        status: QuoteStatus,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<()>;

    /// Atomically records a conversion: inserts the new invoice with its
    /// lines and stamps `converted_invoice_id` on the quote. Either both
    /// happen or neither does.
    ///
    /// Fails with `Converted` if the quote was already converted, and with
    /// `InvalidState` if it is not `accepted` (checked again inside the
    /// transaction, so concurrent conversions cannot both win).
    async fn convert_quote(
        &self,
        quote_id: &str,
        invoice: &Invoice,
        lines: &[LineItem],
        converted_at: DateTime<Utc>,
    ) -> StoreResult<()>;
}

// =============================================================================
// Settings
// =============================================================================

#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Fetches the settings singleton, `None` until first saved.
    async fn get_settings(&self) -> StoreResult<Option<Settings>>;

    /// Creates or replaces the settings singleton.
    async fn save_settings(&self, settings: &Settings) -> StoreResult<()>;
}

// =============================================================================
// Numbering Source
// =============================================================================

#[async_trait]
pub trait NumberSource: Send + Sync {
    /// The highest existing document number matching a `PREFIX-YYYY-%`
    /// pattern, or `None` when the sequence is empty.
    ///
    /// "Highest" is the lexicographic maximum, which equals the numeric
    /// maximum while sequences stay zero-padded to the same width.
    async fn max_number(&self, kind: DocumentKind, pattern: &str) -> StoreResult<Option<String>>;
}

// =============================================================================
// Snapshots (backup / restore)
// =============================================================================

/// Complete contents of a store, used by backup and restore.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    pub settings: Option<Settings>,
    /// All clients, soft-deleted ones included.
    pub clients: Vec<Client>,
    pub invoices: Vec<InvoiceWithLines>,
    pub quotes: Vec<QuoteWithLines>,
}

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Reads the entire store contents.
    async fn snapshot(&self) -> StoreResult<StoreSnapshot>;

    /// Replaces the entire store contents atomically. Existing data is
    /// dropped; on failure the store is left unchanged.
    async fn replace_all(&self, snapshot: &StoreSnapshot) -> StoreResult<()>;
}

// =============================================================================
// Storage Supertrait
// =============================================================================

/// The full storage contract. Anything implementing all sub-traits is a
/// valid backend; the blanket impl below makes that automatic.
pub trait Storage:
    ClientStore + InvoiceStore + QuoteStore + SettingsStore + NumberSource + SnapshotStore
{
}

impl<T> Storage for T where
    T: ClientStore + InvoiceStore + QuoteStore + SettingsStore + NumberSource + SnapshotStore
{
}
