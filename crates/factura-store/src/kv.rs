//! # KV Backend
//!
//! The lightweight backend: the whole store lives in memory behind one
//! `RwLock` and is mirrored to a single JSON file after every mutation.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         KvStorage                                       │
//! │                                                                         │
//! │   RwLock<KvData>                      factura.json (optional)          │
//! │   ├── settings: Option<Settings>      ┌─────────────────────────┐      │
//! │   ├── clients:  Vec<Client>           │ { "settings": {...},    │      │
//! │   ├── invoices: Vec<Invoice>     ──►  │   "clients": [...],     │      │
//! │   ├── invoice_lines: id → lines       │   ... }                 │      │
//! │   ├── quotes:   Vec<Quote>            └─────────────────────────┘      │
//! │   └── quote_lines: id → lines         written via tmp + rename         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Contract Parity
//! Every guard the SQLite backend gets from constraints is replicated here
//! by hand: unique document numbers, client references, the finalized and
//! converted checks, and the same list orderings. The engine integration
//! tests run against both backends to keep them honest.
//!
//! Mutations run under the write lock and persist before releasing it, so
//! the file on disk never interleaves two writers.

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::contract::{
    ClientStore, InvoiceStore, NumberSource, QuoteStore, SettingsStore, SnapshotStore,
    StoreSnapshot,
};
use crate::error::{StoreError, StoreResult};
use factura_core::numbering::DocumentKind;
use factura_core::{
    Client, Invoice, InvoiceStatus, InvoiceWithLines, LineItem, Quote, QuoteStatus,
    QuoteWithLines, Settings,
};

// =============================================================================
// Data Model
// =============================================================================

/// The entire store contents, exactly what gets serialized to the file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct KvData {
    settings: Option<Settings>,
    clients: Vec<Client>,
    invoices: Vec<Invoice>,
    invoice_lines: BTreeMap<String, Vec<LineItem>>,
    quotes: Vec<Quote>,
    quote_lines: BTreeMap<String, Vec<LineItem>>,
}

/// JSON-file backed storage. `in_memory()` skips the file entirely.
#[derive(Debug)]
pub struct KvStorage {
    state: RwLock<KvData>,
    path: Option<PathBuf>,
}

impl KvStorage {
    /// Creates an empty, purely in-memory store (for tests and previews).
    pub fn in_memory() -> Self {
        KvStorage {
            state: RwLock::new(KvData::default()),
            path: None,
        }
    }

    /// Opens a file-backed store, loading existing contents if the file
    /// exists.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();

        let data = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => KvData::default(),
            Err(e) => return Err(e.into()),
        };

        info!(path = %path.display(), "Opened KV store");

        Ok(KvStorage {
            state: RwLock::new(data),
            path: Some(path),
        })
    }

    /// Writes the full contents to disk via a temp file and rename, so a
    /// crash mid-write never leaves a truncated store.
    async fn persist(&self, data: &KvData) -> StoreResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let json = serde_json::to_string_pretty(data)?;
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, json.as_bytes()).await?;
        tokio::fs::rename(&tmp, path).await?;

        Ok(())
    }
}

// =============================================================================
// Locked Helpers
// =============================================================================
// Free functions over &mut KvData so the conversion and restore paths can
// reuse the same integrity checks the public inserts apply.

fn insert_invoice_locked(
    data: &mut KvData,
    invoice: &Invoice,
    lines: &[LineItem],
) -> StoreResult<()> {
    if data.invoices.iter().any(|i| i.id == invoice.id) {
        return Err(StoreError::UniqueViolation {
            field: "invoices.id".to_string(),
            value: invoice.id.clone(),
        });
    }
    if data
        .invoices
        .iter()
        .any(|i| i.invoice_number == invoice.invoice_number)
    {
        return Err(StoreError::UniqueViolation {
            field: "invoices.invoice_number".to_string(),
            value: invoice.invoice_number.clone(),
        });
    }
    if !data.clients.iter().any(|c| c.id == invoice.client_id) {
        return Err(StoreError::ForeignKeyViolation {
            message: format!("invoice references missing client {}", invoice.client_id),
        });
    }

    let mut lines = lines.to_vec();
    lines.sort_by_key(|l| l.sort_order);
    data.invoice_lines.insert(invoice.id.clone(), lines);
    data.invoices.push(invoice.clone());

    Ok(())
}

fn insert_quote_locked(data: &mut KvData, quote: &Quote, lines: &[LineItem]) -> StoreResult<()> {
    if data.quotes.iter().any(|q| q.id == quote.id) {
        return Err(StoreError::UniqueViolation {
            field: "quotes.id".to_string(),
            value: quote.id.clone(),
        });
    }
    if data.quotes.iter().any(|q| q.quote_number == quote.quote_number) {
        return Err(StoreError::UniqueViolation {
            field: "quotes.quote_number".to_string(),
            value: quote.quote_number.clone(),
        });
    }
    if !data.clients.iter().any(|c| c.id == quote.client_id) {
        return Err(StoreError::ForeignKeyViolation {
            message: format!("quote references missing client {}", quote.client_id),
        });
    }
    if let Some(invoice_id) = &quote.converted_invoice_id {
        if !data.invoices.iter().any(|i| &i.id == invoice_id) {
            return Err(StoreError::ForeignKeyViolation {
                message: format!("quote references missing invoice {invoice_id}"),
            });
        }
    }

    let mut lines = lines.to_vec();
    lines.sort_by_key(|l| l.sort_order);
    data.quote_lines.insert(quote.id.clone(), lines);
    data.quotes.push(quote.clone());

    Ok(())
}

fn sorted_lines(map: &BTreeMap<String, Vec<LineItem>>, id: &str) -> Vec<LineItem> {
    let mut lines = map.get(id).cloned().unwrap_or_default();
    lines.sort_by_key(|l| l.sort_order);
    lines
}

// =============================================================================
// Clients
// =============================================================================

#[async_trait]
impl ClientStore for KvStorage {
    async fn insert_client(&self, client: &Client) -> StoreResult<()> {
        debug!(id = %client.id, "Inserting client");

        let mut data = self.state.write().await;

        if data.clients.iter().any(|c| c.id == client.id) {
            return Err(StoreError::UniqueViolation {
                field: "clients.id".to_string(),
                value: client.id.clone(),
            });
        }

        data.clients.push(client.clone());
        self.persist(&data).await
    }

    async fn get_client(&self, id: &str) -> StoreResult<Option<Client>> {
        let data = self.state.read().await;
        Ok(data.clients.iter().find(|c| c.id == id).cloned())
    }

    async fn list_clients(&self) -> StoreResult<Vec<Client>> {
        let data = self.state.read().await;

        let mut clients: Vec<Client> = data
            .clients
            .iter()
            .filter(|c| c.deleted_at.is_none())
            .cloned()
            .collect();

        // Same ordering as the SQL backend: company name, else last name,
        // case-insensitive
        clients.sort_by_key(|c| {
            c.company_name
                .clone()
                .or_else(|| c.last_name.clone())
                .unwrap_or_default()
                .to_lowercase()
        });

        Ok(clients)
    }

    async fn update_client(&self, client: &Client) -> StoreResult<()> {
        debug!(id = %client.id, "Updating client");

        let mut data = self.state.write().await;

        {
            let Some(stored) = data.clients.iter_mut().find(|c| c.id == client.id) else {
                return Err(StoreError::not_found("Client", &client.id));
            };

            // Mirror the SQL column set: created_at and deleted_at are not
            // touched by an update
            let mut updated = client.clone();
            updated.created_at = stored.created_at;
            updated.deleted_at = stored.deleted_at;
            *stored = updated;
        }

        self.persist(&data).await
    }

    async fn soft_delete_client(&self, id: &str, deleted_at: DateTime<Utc>) -> StoreResult<()> {
        debug!(id = %id, "Soft-deleting client");

        let mut data = self.state.write().await;

        {
            let Some(stored) = data.clients.iter_mut().find(|c| c.id == id) else {
                return Err(StoreError::not_found("Client", id));
            };
            stored.deleted_at = Some(deleted_at);
            stored.updated_at = deleted_at;
        }

        self.persist(&data).await
    }

    async fn hard_delete_client(&self, id: &str) -> StoreResult<()> {
        debug!(id = %id, "Hard-deleting client");

        let mut data = self.state.write().await;

        let referenced = data.invoices.iter().any(|i| i.client_id == id)
            || data.quotes.iter().any(|q| q.client_id == id);
        if referenced {
            return Err(StoreError::ForeignKeyViolation {
                message: format!("client {id} is still referenced by documents"),
            });
        }

        let before = data.clients.len();
        data.clients.retain(|c| c.id != id);
        if data.clients.len() == before {
            return Err(StoreError::not_found("Client", id));
        }

        self.persist(&data).await
    }
}

// =============================================================================
// Invoices
// =============================================================================

#[async_trait]
impl InvoiceStore for KvStorage {
    async fn insert_invoice(&self, invoice: &Invoice, lines: &[LineItem]) -> StoreResult<()> {
        debug!(id = %invoice.id, number = %invoice.invoice_number, "Inserting invoice");

        let mut data = self.state.write().await;
        insert_invoice_locked(&mut data, invoice, lines)?;
        self.persist(&data).await
    }

    async fn get_invoice(&self, id: &str) -> StoreResult<Option<InvoiceWithLines>> {
        let data = self.state.read().await;

        Ok(data.invoices.iter().find(|i| i.id == id).map(|invoice| {
            InvoiceWithLines {
                invoice: invoice.clone(),
                lines: sorted_lines(&data.invoice_lines, id),
            }
        }))
    }

    async fn list_invoices(&self) -> StoreResult<Vec<Invoice>> {
        let data = self.state.read().await;

        let mut invoices = data.invoices.clone();
        invoices.sort_by(|a, b| {
            b.issue_date
                .cmp(&a.issue_date)
                .then_with(|| b.id.cmp(&a.id))
        });

        Ok(invoices)
    }

    async fn update_invoice(&self, invoice: &Invoice, lines: &[LineItem]) -> StoreResult<()> {
        debug!(id = %invoice.id, "Updating invoice content");

        let mut data = self.state.write().await;

        {
            let Some(stored) = data.invoices.iter_mut().find(|i| i.id == invoice.id) else {
                return Err(StoreError::not_found("Invoice", &invoice.id));
            };
            if stored.finalized_at.is_some() {
                return Err(StoreError::Finalized {
                    id: invoice.id.clone(),
                });
            }

            // The immutable columns stay as stored, same as the SQL UPDATE
            let mut updated = invoice.clone();
            updated.invoice_number = stored.invoice_number.clone();
            updated.status = stored.status;
            updated.created_at = stored.created_at;
            updated.finalized_at = stored.finalized_at;
            *stored = updated;
        }

        let mut new_lines = lines.to_vec();
        new_lines.sort_by_key(|l| l.sort_order);
        data.invoice_lines.insert(invoice.id.clone(), new_lines);

        self.persist(&data).await
    }

    async fn update_invoice_status(
        &self,
        id: &str,
        status: InvoiceStatus,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        debug!(id = %id, status = %status, "Updating invoice status");

        let mut data = self.state.write().await;

        {
            let Some(stored) = data.invoices.iter_mut().find(|i| i.id == id) else {
                return Err(StoreError::not_found("Invoice", id));
            };
            stored.status = status;
            stored.updated_at = updated_at;
        }

        self.persist(&data).await
    }

    async fn finalize_invoice(&self, id: &str, finalized_at: DateTime<Utc>) -> StoreResult<()> {
        debug!(id = %id, "Finalizing invoice");

        let mut data = self.state.write().await;

        {
            let Some(stored) = data.invoices.iter_mut().find(|i| i.id == id) else {
                return Err(StoreError::not_found("Invoice", id));
            };
            if stored.finalized_at.is_some() {
                // Already finalized: the first stamp stands.
                return Ok(());
            }
            stored.status = InvoiceStatus::Sent;
            stored.finalized_at = Some(finalized_at);
            stored.updated_at = finalized_at;
        }

        self.persist(&data).await
    }
}

// =============================================================================
// Quotes
// =============================================================================

#[async_trait]
impl QuoteStore for KvStorage {
    async fn insert_quote(&self, quote: &Quote, lines: &[LineItem]) -> StoreResult<()> {
        debug!(id = %quote.id, number = %quote.quote_number, "Inserting quote");

        let mut data = self.state.write().await;
        insert_quote_locked(&mut data, quote, lines)?;
        self.persist(&data).await
    }

    async fn get_quote(&self, id: &str) -> StoreResult<Option<QuoteWithLines>> {
        let data = self.state.read().await;

        Ok(data
            .quotes
            .iter()
            .find(|q| q.id == id)
            .map(|quote| QuoteWithLines {
                quote: quote.clone(),
                lines: sorted_lines(&data.quote_lines, id),
            }))
    }

    async fn list_quotes(&self) -> StoreResult<Vec<Quote>> {
        let data = self.state.read().await;

        let mut quotes = data.quotes.clone();
        quotes.sort_by(|a, b| {
            b.issue_date
                .cmp(&a.issue_date)
                .then_with(|| b.id.cmp(&a.id))
        });

        Ok(quotes)
    }

    async fn update_quote(&self, quote: &Quote, lines: &[LineItem]) -> StoreResult<()> {
        debug!(id = %quote.id, "Updating quote content");

        let mut data = self.state.write().await;

        {
            let Some(stored) = data.quotes.iter_mut().find(|q| q.id == quote.id) else {
                return Err(StoreError::not_found("Quote", &quote.id));
            };
            if stored.converted_invoice_id.is_some() {
                return Err(StoreError::Converted {
                    id: quote.id.clone(),
                });
            }

            let mut updated = quote.clone();
            updated.quote_number = stored.quote_number.clone();
            updated.status = stored.status;
            updated.created_at = stored.created_at;
            updated.converted_invoice_id = stored.converted_invoice_id.clone();
            *stored = updated;
        }

        let mut new_lines = lines.to_vec();
        new_lines.sort_by_key(|l| l.sort_order);
        data.quote_lines.insert(quote.id.clone(), new_lines);

        self.persist(&data).await
    }

    async fn update_quote_status(
        &self,
        id: &str,
        status: QuoteStatus,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        debug!(id = %id, status = %status, "Updating quote status");

        let mut data = self.state.write().await;

        {
            let Some(stored) = data.quotes.iter_mut().find(|q| q.id == id) else {
                return Err(StoreError::not_found("Quote", id));
            };
            stored.status = status;
            stored.updated_at = updated_at;
        }

        self.persist(&data).await
    }

    async fn convert_quote(
        &self,
        quote_id: &str,
        invoice: &Invoice,
        lines: &[LineItem],
        converted_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        debug!(
            quote_id = %quote_id,
            invoice_id = %invoice.id,
            invoice_number = %invoice.invoice_number,
            "Converting quote to invoice"
        );

        let mut data = self.state.write().await;

        // All checks run before the first mutation, so a failure leaves
        // the store untouched.
        {
            let Some(quote) = data.quotes.iter().find(|q| q.id == quote_id) else {
                return Err(StoreError::not_found("Quote", quote_id));
            };
            if quote.converted_invoice_id.is_some() {
                return Err(StoreError::Converted {
                    id: quote_id.to_string(),
                });
            }
            if quote.status != QuoteStatus::Accepted {
                return Err(StoreError::invalid_state(
                    "Quote",
                    quote_id,
                    quote.status.as_str(),
                ));
            }
        }

        insert_invoice_locked(&mut data, invoice, lines)?;

        {
            let Some(stored) = data.quotes.iter_mut().find(|q| q.id == quote_id) else {
                return Err(StoreError::not_found("Quote", quote_id));
            };
            stored.converted_invoice_id = Some(invoice.id.clone());
            stored.updated_at = converted_at;
        }

        self.persist(&data).await
    }
}

// =============================================================================
// Settings
// =============================================================================

#[async_trait]
impl SettingsStore for KvStorage {
    async fn get_settings(&self) -> StoreResult<Option<Settings>> {
        let data = self.state.read().await;
        Ok(data.settings.clone())
    }

    async fn save_settings(&self, settings: &Settings) -> StoreResult<()> {
        debug!("Saving settings");

        let mut data = self.state.write().await;
        data.settings = Some(settings.clone());
        self.persist(&data).await
    }
}

// =============================================================================
// Numbering
// =============================================================================

#[async_trait]
impl NumberSource for KvStorage {
    async fn max_number(
        &self,
        kind: DocumentKind,
        pattern: &str,
    ) -> StoreResult<Option<String>> {
        // Patterns are always `PREFIX-YYYY-%`; a plain prefix match is the
        // same filter
        let prefix = pattern.strip_suffix('%').unwrap_or(pattern);
        let data = self.state.read().await;

        let max = match kind {
            DocumentKind::Invoice => data
                .invoices
                .iter()
                .map(|i| &i.invoice_number)
                .filter(|n| n.starts_with(prefix))
                .max()
                .cloned(),
            DocumentKind::Quote => data
                .quotes
                .iter()
                .map(|q| &q.quote_number)
                .filter(|n| n.starts_with(prefix))
                .max()
                .cloned(),
        };

        Ok(max)
    }
}

// =============================================================================
// Snapshots
// =============================================================================

#[async_trait]
impl SnapshotStore for KvStorage {
    async fn snapshot(&self) -> StoreResult<StoreSnapshot> {
        debug!("Reading store snapshot");

        let data = self.state.read().await;

        let mut clients = data.clients.clone();
        clients.sort_by(|a, b| a.id.cmp(&b.id));

        let mut invoices = data.invoices.clone();
        invoices.sort_by(|a, b| {
            b.issue_date
                .cmp(&a.issue_date)
                .then_with(|| b.id.cmp(&a.id))
        });
        let invoices = invoices
            .into_iter()
            .map(|invoice| {
                let lines = sorted_lines(&data.invoice_lines, &invoice.id);
                InvoiceWithLines { invoice, lines }
            })
            .collect();

        let mut quotes = data.quotes.clone();
        quotes.sort_by(|a, b| {
            b.issue_date
                .cmp(&a.issue_date)
                .then_with(|| b.id.cmp(&a.id))
        });
        let quotes = quotes
            .into_iter()
            .map(|quote| {
                let lines = sorted_lines(&data.quote_lines, &quote.id);
                QuoteWithLines { quote, lines }
            })
            .collect();

        Ok(StoreSnapshot {
            settings: data.settings.clone(),
            clients,
            invoices,
            quotes,
        })
    }

    async fn replace_all(&self, snapshot: &StoreSnapshot) -> StoreResult<()> {
        info!(
            clients = snapshot.clients.len(),
            invoices = snapshot.invoices.len(),
            quotes = snapshot.quotes.len(),
            "Replacing store contents"
        );

        // Build the replacement aside first; the live data is only swapped
        // once everything passed the integrity checks.
        let mut next = KvData {
            settings: snapshot.settings.clone(),
            ..KvData::default()
        };

        for client in &snapshot.clients {
            if next.clients.iter().any(|c| c.id == client.id) {
                return Err(StoreError::UniqueViolation {
                    field: "clients.id".to_string(),
                    value: client.id.clone(),
                });
            }
            next.clients.push(client.clone());
        }

        for InvoiceWithLines { invoice, lines } in &snapshot.invoices {
            insert_invoice_locked(&mut next, invoice, lines)?;
        }

        for QuoteWithLines { quote, lines } in &snapshot.quotes {
            insert_quote_locked(&mut next, quote, lines)?;
        }

        let mut data = self.state.write().await;
        *data = next;
        self.persist(&data).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn temp_path(name: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("factura-kv-{name}-{}-{nanos}.json", std::process::id()))
    }

    fn client(id: &str, company: Option<&str>, last: Option<&str>) -> Client {
        Client {
            id: id.to_string(),
            company_name: company.map(String::from),
            first_name: None,
            last_name: last.map(String::from),
            email: None,
            phone: None,
            address: "1 rue Test".to_string(),
            postal_code: "75001".to_string(),
            city: "Paris".to_string(),
            country: "France".to_string(),
            siret: None,
            vat_number: None,
            notes: None,
            is_professional: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    fn invoice(id: &str, number: &str, client_id: &str) -> Invoice {
        Invoice {
            id: id.to_string(),
            invoice_number: number.to_string(),
            client_id: client_id.to_string(),
            status: InvoiceStatus::Draft,
            issue_date: chrono::NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            due_date: chrono::NaiveDate::from_ymd_opt(2025, 4, 9).unwrap(),
            service_date: None,
            seller_name: "Seller".to_string(),
            seller_siret: "73282932000074".to_string(),
            seller_address: "2 rue Vendeur, 69001 Lyon".to_string(),
            seller_vat_number: None,
            buyer_name: "Buyer".to_string(),
            buyer_address: "1 rue Test, 75001 Paris".to_string(),
            buyer_siret: None,
            buyer_is_professional: true,
            total_ht: dec!(100.00),
            total_vat: dec!(0.00),
            total_ttc: dec!(100.00),
            vat_exempt: true,
            vat_exemption_text: None,
            payment_terms_days: 30,
            late_penalty_rate: dec!(3.0),
            late_penalty_text: "penalites".to_string(),
            recovery_costs_text: "recouvrement".to_string(),
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            finalized_at: None,
        }
    }

    #[tokio::test]
    async fn test_persistence_roundtrip() {
        let path = temp_path("roundtrip");

        let store = KvStorage::open(&path).await.unwrap();
        store.insert_client(&client("c-1", Some("ACME"), None)).await.unwrap();
        drop(store);

        let reopened = KvStorage::open(&path).await.unwrap();
        let loaded = reopened.get_client("c-1").await.unwrap().unwrap();
        assert_eq!(loaded.company_name.as_deref(), Some("ACME"));

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_list_clients_hides_deleted_and_sorts() {
        let store = KvStorage::in_memory();
        store.insert_client(&client("c-1", Some("zeta"), None)).await.unwrap();
        store.insert_client(&client("c-2", Some("Alpha"), None)).await.unwrap();
        store.insert_client(&client("c-3", None, Some("maron"))).await.unwrap();
        store.soft_delete_client("c-1", Utc::now()).await.unwrap();

        let listed = store.list_clients().await.unwrap();
        let ids: Vec<&str> = listed.iter().map(|c| c.id.as_str()).collect();
        // "Alpha" < "maron" case-insensitively, deleted "zeta" is gone
        assert_eq!(ids, vec!["c-2", "c-3"]);
    }

    #[tokio::test]
    async fn test_duplicate_invoice_number_rejected() {
        let store = KvStorage::in_memory();
        store.insert_client(&client("c-1", Some("ACME"), None)).await.unwrap();
        store
            .insert_invoice(&invoice("i-1", "F-2025-0001", "c-1"), &[])
            .await
            .unwrap();

        let err = store
            .insert_invoice(&invoice("i-2", "F-2025-0001", "c-1"), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_max_number_scans_prefix() {
        let store = KvStorage::in_memory();
        store.insert_client(&client("c-1", Some("ACME"), None)).await.unwrap();
        store
            .insert_invoice(&invoice("i-1", "F-2025-0003", "c-1"), &[])
            .await
            .unwrap();
        store
            .insert_invoice(&invoice("i-2", "F-2025-0010", "c-1"), &[])
            .await
            .unwrap();
        store
            .insert_invoice(&invoice("i-3", "F-2024-0099", "c-1"), &[])
            .await
            .unwrap();

        let max = store
            .max_number(DocumentKind::Invoice, "F-2025-%")
            .await
            .unwrap();
        assert_eq!(max.as_deref(), Some("F-2025-0010"));

        let none = store
            .max_number(DocumentKind::Quote, "D-2025-%")
            .await
            .unwrap();
        assert_eq!(none, None);
    }

    #[tokio::test]
    async fn test_hard_delete_blocked_by_documents() {
        let store = KvStorage::in_memory();
        store.insert_client(&client("c-1", Some("ACME"), None)).await.unwrap();
        store
            .insert_invoice(&invoice("i-1", "F-2025-0001", "c-1"), &[])
            .await
            .unwrap();

        let err = store.hard_delete_client("c-1").await.unwrap_err();
        assert!(matches!(err, StoreError::ForeignKeyViolation { .. }));

        // Soft delete still fine
        store.soft_delete_client("c-1", Utc::now()).await.unwrap();
        assert!(store.get_client("c-1").await.unwrap().unwrap().is_deleted());
    }
}
