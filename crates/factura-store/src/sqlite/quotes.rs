//! # Quote Table Operations
//!
//! ## Conversion Atomicity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      convert_quote                                      │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    SELECT status, converted_invoice_id                                  │
//! │      ├── no row              → NotFound                                 │
//! │      ├── already converted   → Converted                                │
//! │      └── not 'accepted'      → InvalidState                             │
//! │    INSERT invoice header + lines                                        │
//! │    UPDATE quotes SET converted_invoice_id = ...                         │
//! │          WHERE status = 'accepted' AND converted_invoice_id IS NULL     │
//! │      └── 0 rows → rollback (lost the race)                              │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  The invoice and the stamp land together or not at all, so a quote     │
//! │  can never produce two invoices.                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::contract::QuoteStore;
use crate::error::{StoreError, StoreResult};
use crate::sqlite::invoices::{insert_invoice_header, insert_invoice_lines};
use crate::sqlite::pool::Database;
use crate::sqlite::rows::{format_date, format_datetime, LineRow, QuoteRow};
use factura_core::{Invoice, LineItem, Quote, QuoteStatus, QuoteWithLines};

const QUOTE_COLUMNS: &str = "id, quote_number, client_id, status, issue_date, validity_date, \
     seller_name, seller_siret, seller_address, seller_vat_number, \
     buyer_name, buyer_address, buyer_siret, buyer_is_professional, \
     total_ht, total_vat, total_ttc, vat_exempt, vat_exemption_text, \
     notes, converted_invoice_id, created_at, updated_at";

const LINE_COLUMNS: &str = "id, description, quantity, unit, unit_price_ht, vat_rate, \
     total_ht, total_vat, total_ttc, sort_order";

/// Inserts a quote header on an open connection. Shared with the snapshot
/// restore path.
pub(crate) async fn insert_quote_header(
    conn: &mut SqliteConnection,
    quote: &Quote,
) -> StoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO quotes (
            id, quote_number, client_id, status, issue_date, validity_date,
            seller_name, seller_siret, seller_address, seller_vat_number,
            buyer_name, buyer_address, buyer_siret, buyer_is_professional,
            total_ht, total_vat, total_ttc, vat_exempt, vat_exemption_text,
            notes, converted_invoice_id, created_at, updated_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6,
            ?7, ?8, ?9, ?10,
            ?11, ?12, ?13, ?14,
            ?15, ?16, ?17, ?18, ?19,
            ?20, ?21, ?22, ?23
        )
        "#,
    )
    .bind(&quote.id)
    .bind(&quote.quote_number)
    .bind(&quote.client_id)
    .bind(quote.status)
    .bind(format_date(quote.issue_date))
    .bind(format_date(quote.validity_date))
    .bind(&quote.seller_name)
    .bind(&quote.seller_siret)
    .bind(&quote.seller_address)
    .bind(&quote.seller_vat_number)
    .bind(&quote.buyer_name)
    .bind(&quote.buyer_address)
    .bind(&quote.buyer_siret)
    .bind(quote.buyer_is_professional)
    .bind(quote.total_ht.to_string())
    .bind(quote.total_vat.to_string())
    .bind(quote.total_ttc.to_string())
    .bind(quote.vat_exempt)
    .bind(&quote.vat_exemption_text)
    .bind(&quote.notes)
    .bind(&quote.converted_invoice_id)
    .bind(format_datetime(quote.created_at))
    .bind(format_datetime(quote.updated_at))
    .execute(conn)
    .await?;

    Ok(())
}

/// Inserts the line set of a quote on an open connection.
pub(crate) async fn insert_quote_lines(
    conn: &mut SqliteConnection,
    quote_id: &str,
    lines: &[LineItem],
) -> StoreResult<()> {
    for line in lines {
        sqlx::query(
            r#"
            INSERT INTO quote_lines (
                id, quote_id, description, quantity, unit, unit_price_ht, vat_rate,
                total_ht, total_vat, total_ttc, sort_order
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&line.id)
        .bind(quote_id)
        .bind(&line.description)
        .bind(line.quantity.to_string())
        .bind(line.unit)
        .bind(line.unit_price_ht.to_string())
        .bind(line.vat_rate.to_string())
        .bind(line.total_ht.to_string())
        .bind(line.total_vat.to_string())
        .bind(line.total_ttc.to_string())
        .bind(line.sort_order)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Fetches the lines of a quote, ordered by position.
pub(crate) async fn fetch_quote_lines(
    pool: &SqlitePool,
    quote_id: &str,
) -> StoreResult<Vec<LineItem>> {
    let rows: Vec<LineRow> = sqlx::query_as(&format!(
        "SELECT {LINE_COLUMNS} FROM quote_lines WHERE quote_id = ?1 ORDER BY sort_order"
    ))
    .bind(quote_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(LineRow::into_line).collect()
}

#[async_trait]
impl QuoteStore for Database {
    async fn insert_quote(&self, quote: &Quote, lines: &[LineItem]) -> StoreResult<()> {
        debug!(id = %quote.id, number = %quote.quote_number, "Inserting quote");

        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| StoreError::TransactionFailed(e.to_string()))?;

        insert_quote_header(&mut tx, quote).await?;
        insert_quote_lines(&mut tx, &quote.id, lines).await?;

        tx.commit()
            .await
            .map_err(|e| StoreError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    async fn get_quote(&self, id: &str) -> StoreResult<Option<QuoteWithLines>> {
        let row: Option<QuoteRow> = sqlx::query_as(&format!(
            "SELECT {QUOTE_COLUMNS} FROM quotes WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let quote = row.into_quote()?;
        let lines = fetch_quote_lines(self.pool(), id).await?;

        Ok(Some(QuoteWithLines { quote, lines }))
    }

    async fn list_quotes(&self) -> StoreResult<Vec<Quote>> {
        let rows: Vec<QuoteRow> = sqlx::query_as(&format!(
            "SELECT {QUOTE_COLUMNS} FROM quotes ORDER BY issue_date DESC, id DESC"
        ))
        .fetch_all(self.pool())
        .await?;

        rows.into_iter().map(QuoteRow::into_quote).collect()
    }

    async fn update_quote(&self, quote: &Quote, lines: &[LineItem]) -> StoreResult<()> {
        debug!(id = %quote.id, "Updating quote content");

        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| StoreError::TransactionFailed(e.to_string()))?;

        let converted: Option<Option<String>> =
            sqlx::query_scalar("SELECT converted_invoice_id FROM quotes WHERE id = ?1")
                .bind(&quote.id)
                .fetch_optional(&mut *tx)
                .await?;

        match converted {
            None => return Err(StoreError::not_found("Quote", &quote.id)),
            Some(Some(_)) => {
                return Err(StoreError::Converted {
                    id: quote.id.clone(),
                })
            }
            Some(None) => {}
        }

        sqlx::query(
            r#"
            UPDATE quotes SET
                client_id = ?2,
                issue_date = ?3,
                validity_date = ?4,
                seller_name = ?5,
                seller_siret = ?6,
                seller_address = ?7,
                seller_vat_number = ?8,
                buyer_name = ?9,
                buyer_address = ?10,
                buyer_siret = ?11,
                buyer_is_professional = ?12,
                total_ht = ?13,
                total_vat = ?14,
                total_ttc = ?15,
                vat_exempt = ?16,
                vat_exemption_text = ?17,
                notes = ?18,
                updated_at = ?19
            WHERE id = ?1
            "#,
        )
        .bind(&quote.id)
        .bind(&quote.client_id)
        .bind(format_date(quote.issue_date))
        .bind(format_date(quote.validity_date))
        .bind(&quote.seller_name)
        .bind(&quote.seller_siret)
        .bind(&quote.seller_address)
        .bind(&quote.seller_vat_number)
        .bind(&quote.buyer_name)
        .bind(&quote.buyer_address)
        .bind(&quote.buyer_siret)
        .bind(quote.buyer_is_professional)
        .bind(quote.total_ht.to_string())
        .bind(quote.total_vat.to_string())
        .bind(quote.total_ttc.to_string())
        .bind(quote.vat_exempt)
        .bind(&quote.vat_exemption_text)
        .bind(&quote.notes)
        .bind(format_datetime(quote.updated_at))
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM quote_lines WHERE quote_id = ?1")
            .bind(&quote.id)
            .execute(&mut *tx)
            .await?;

        insert_quote_lines(&mut tx, &quote.id, lines).await?;

        tx.commit()
            .await
            .map_err(|e| StoreError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    async fn update_quote_status(
        &self,
        id: &str,
        status: QuoteStatus,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        debug!(id = %id, status = %status, "Updating quote status");

        let result = sqlx::query("UPDATE quotes SET status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(status)
            .bind(format_datetime(updated_at))
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Quote", id));
        }

        Ok(())
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

        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| StoreError::TransactionFailed(e.to_string()))?;

        let row: Option<(QuoteStatus, Option<String>)> =
            sqlx::query_as("SELECT status, converted_invoice_id FROM quotes WHERE id = ?1")
                .bind(quote_id)
                .fetch_optional(&mut *tx)
                .await?;

        let (status, converted) = row.ok_or_else(|| StoreError::not_found("Quote", quote_id))?;

        if converted.is_some() {
            return Err(StoreError::Converted {
                id: quote_id.to_string(),
            });
        }
        if status != QuoteStatus::Accepted {
            return Err(StoreError::invalid_state("Quote", quote_id, status.as_str()));
        }

        insert_invoice_header(&mut tx, invoice).await?;
        insert_invoice_lines(&mut tx, &invoice.id, lines).await?;

        let result = sqlx::query(
            r#"
            UPDATE quotes SET
                converted_invoice_id = ?2,
                updated_at = ?3
            WHERE id = ?1 AND status = 'accepted' AND converted_invoice_id IS NULL
            "#,
        )
        .bind(quote_id)
        .bind(&invoice.id)
        .bind(format_datetime(converted_at))
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            // Raced with another conversion or status change; drop the tx
            // and the invoice insert with it.
            return Err(StoreError::invalid_state(
                "Quote",
                quote_id,
                "no longer convertible",
            ));
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::TransactionFailed(e.to_string()))?;

        Ok(())
    }
}
