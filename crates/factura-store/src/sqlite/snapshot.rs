//! # Whole-Store Snapshot
//!
//! Backup support: read everything, or replace everything atomically.
//!
//! ## Restore Ordering
//! ```text
//! DELETE: invoice_lines, quote_lines, quotes, invoices, clients, settings
//! INSERT: settings, clients, invoices (+lines), quotes (+lines)
//! ```
//! Quotes go last on insert and early on delete because
//! `converted_invoice_id` references invoices, which reference clients.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::contract::{
    InvoiceStore, QuoteStore, SettingsStore, SnapshotStore, StoreSnapshot,
};
use crate::error::{StoreError, StoreResult};
use crate::sqlite::clients::insert_client_row;
use crate::sqlite::invoices::{
    fetch_invoice_lines, insert_invoice_header, insert_invoice_lines,
};
use crate::sqlite::pool::Database;
use crate::sqlite::quotes::{fetch_quote_lines, insert_quote_header, insert_quote_lines};
use crate::sqlite::rows::ClientRow;
use crate::sqlite::settings::upsert_settings;
use factura_core::{InvoiceWithLines, QuoteWithLines};

#[async_trait]
impl SnapshotStore for Database {
    async fn snapshot(&self) -> StoreResult<StoreSnapshot> {
        debug!("Reading store snapshot");

        let settings = self.get_settings().await?;

        // All clients, soft-deleted included: a backup must roundtrip them
        let client_rows: Vec<ClientRow> = sqlx::query_as(
            "SELECT id, company_name, first_name, last_name, email, phone, \
             address, postal_code, city, country, siret, vat_number, notes, \
             is_professional, created_at, updated_at, deleted_at \
             FROM clients ORDER BY id",
        )
        .fetch_all(self.pool())
        .await?;
        let clients = client_rows
            .into_iter()
            .map(ClientRow::into_client)
            .collect::<StoreResult<Vec<_>>>()?;

        let mut invoices = Vec::new();
        for invoice in self.list_invoices().await? {
            let lines = fetch_invoice_lines(self.pool(), &invoice.id).await?;
            invoices.push(InvoiceWithLines { invoice, lines });
        }

        let mut quotes = Vec::new();
        for quote in self.list_quotes().await? {
            let lines = fetch_quote_lines(self.pool(), &quote.id).await?;
            quotes.push(QuoteWithLines { quote, lines });
        }

        Ok(StoreSnapshot {
            settings,
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

        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| StoreError::TransactionFailed(e.to_string()))?;

        for table in [
            "invoice_lines",
            "quote_lines",
            "quotes",
            "invoices",
            "clients",
            "settings",
        ] {
            sqlx::query(&format!("DELETE FROM {table}"))
                .execute(&mut *tx)
                .await?;
        }

        if let Some(settings) = &snapshot.settings {
            upsert_settings(&mut tx, settings).await?;
        }

        for client in &snapshot.clients {
            insert_client_row(&mut tx, client).await?;
        }

        for InvoiceWithLines { invoice, lines } in &snapshot.invoices {
            insert_invoice_header(&mut tx, invoice).await?;
            insert_invoice_lines(&mut tx, &invoice.id, lines).await?;
        }

        for QuoteWithLines { quote, lines } in &snapshot.quotes {
            insert_quote_header(&mut tx, quote).await?;
            insert_quote_lines(&mut tx, &quote.id, lines).await?;
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::TransactionFailed(e.to_string()))?;

        Ok(())
    }
}
