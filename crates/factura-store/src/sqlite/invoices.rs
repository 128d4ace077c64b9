//! # Invoice Table Operations
//!
//! ## Finalization Guard
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Invoice Write Paths                                  │
//! │                                                                         │
//! │  insert_invoice            header + lines, one transaction             │
//! │                                                                         │
//! │  update_invoice            BEGIN                                       │
//! │                              SELECT finalized_at  ── Some → Finalized  │
//! │                              UPDATE header (mutable columns only)      │
//! │                              DELETE lines, re-INSERT lines             │
//! │                            COMMIT                                      │
//! │                                                                         │
//! │  finalize_invoice          UPDATE ... WHERE finalized_at IS NULL       │
//! │                            0 rows + row exists → already stamped, ok   │
//! │                                                                         │
//! │  update_invoice_status     plain status write (engine guards)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::contract::InvoiceStore;
use crate::error::{StoreError, StoreResult};
use crate::sqlite::pool::Database;
use crate::sqlite::rows::{format_date, format_datetime, InvoiceRow, LineRow};
use factura_core::{Invoice, InvoiceStatus, InvoiceWithLines, LineItem};

const INVOICE_COLUMNS: &str = "id, invoice_number, client_id, status, issue_date, due_date, \
     service_date, seller_name, seller_siret, seller_address, seller_vat_number, \
     buyer_name, buyer_address, buyer_siret, buyer_is_professional, \
     total_ht, total_vat, total_ttc, vat_exempt, vat_exemption_text, \
     payment_terms_days, late_penalty_rate, late_penalty_text, recovery_costs_text, \
     notes, created_at, updated_at, finalized_at";

const LINE_COLUMNS: &str = "id, description, quantity, unit, unit_price_ht, vat_rate, \
     total_ht, total_vat, total_ttc, sort_order";

/// Inserts an invoice header on an open connection. Shared with the quote
/// conversion and snapshot restore paths.
pub(crate) async fn insert_invoice_header(
    conn: &mut SqliteConnection,
    invoice: &Invoice,
) -> StoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO invoices (
            id, invoice_number, client_id, status, issue_date, due_date, service_date,
            seller_name, seller_siret, seller_address, seller_vat_number,
            buyer_name, buyer_address, buyer_siret, buyer_is_professional,
            total_ht, total_vat, total_ttc, vat_exempt, vat_exemption_text,
            payment_terms_days, late_penalty_rate, late_penalty_text, recovery_costs_text,
            notes, created_at, updated_at, finalized_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6, ?7,
            ?8, ?9, ?10, ?11,
            ?12, ?13, ?14, ?15,
            ?16, ?17, ?18, ?19, ?20,
            ?21, ?22, ?23, ?24,
            ?25, ?26, ?27, ?28
        )
        "#,
    )
    .bind(&invoice.id)
    .bind(&invoice.invoice_number)
    .bind(&invoice.client_id)
    .bind(invoice.status)
    .bind(format_date(invoice.issue_date))
    .bind(format_date(invoice.due_date))
    .bind(invoice.service_date.map(format_date))
    .bind(&invoice.seller_name)
    .bind(&invoice.seller_siret)
    .bind(&invoice.seller_address)
    .bind(&invoice.seller_vat_number)
    .bind(&invoice.buyer_name)
    .bind(&invoice.buyer_address)
    .bind(&invoice.buyer_siret)
    .bind(invoice.buyer_is_professional)
    .bind(invoice.total_ht.to_string())
    .bind(invoice.total_vat.to_string())
    .bind(invoice.total_ttc.to_string())
    .bind(invoice.vat_exempt)
    .bind(&invoice.vat_exemption_text)
    .bind(invoice.payment_terms_days)
    .bind(invoice.late_penalty_rate.to_string())
    .bind(&invoice.late_penalty_text)
    .bind(&invoice.recovery_costs_text)
    .bind(&invoice.notes)
    .bind(format_datetime(invoice.created_at))
    .bind(format_datetime(invoice.updated_at))
    .bind(invoice.finalized_at.map(format_datetime))
    .execute(conn)
    .await?;

    Ok(())
}

/// Inserts the line set of an invoice on an open connection.
pub(crate) async fn insert_invoice_lines(
    conn: &mut SqliteConnection,
    invoice_id: &str,
    lines: &[LineItem],
) -> StoreResult<()> {
    for line in lines {
        sqlx::query(
            r#"
            INSERT INTO invoice_lines (
                id, invoice_id, description, quantity, unit, unit_price_ht, vat_rate,
                total_ht, total_vat, total_ttc, sort_order
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&line.id)
        .bind(invoice_id)
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

/// Fetches the lines of an invoice, ordered by position.
pub(crate) async fn fetch_invoice_lines(
    pool: &SqlitePool,
    invoice_id: &str,
) -> StoreResult<Vec<LineItem>> {
    let rows: Vec<LineRow> = sqlx::query_as(&format!(
        "SELECT {LINE_COLUMNS} FROM invoice_lines WHERE invoice_id = ?1 ORDER BY sort_order"
    ))
    .bind(invoice_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(LineRow::into_line).collect()
}

#[async_trait]
impl InvoiceStore for Database {
    async fn insert_invoice(&self, invoice: &Invoice, lines: &[LineItem]) -> StoreResult<()> {
        debug!(id = %invoice.id, number = %invoice.invoice_number, "Inserting invoice");

        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| StoreError::TransactionFailed(e.to_string()))?;

        insert_invoice_header(&mut tx, invoice).await?;
        insert_invoice_lines(&mut tx, &invoice.id, lines).await?;

        tx.commit()
            .await
            .map_err(|e| StoreError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    async fn get_invoice(&self, id: &str) -> StoreResult<Option<InvoiceWithLines>> {
        let row: Option<InvoiceRow> = sqlx::query_as(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let invoice = row.into_invoice()?;
        let lines = fetch_invoice_lines(self.pool(), id).await?;

        Ok(Some(InvoiceWithLines { invoice, lines }))
    }

    async fn list_invoices(&self) -> StoreResult<Vec<Invoice>> {
        let rows: Vec<InvoiceRow> = sqlx::query_as(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices ORDER BY issue_date DESC, id DESC"
        ))
        .fetch_all(self.pool())
        .await?;

        rows.into_iter().map(InvoiceRow::into_invoice).collect()
    }

    async fn update_invoice(&self, invoice: &Invoice, lines: &[LineItem]) -> StoreResult<()> {
        debug!(id = %invoice.id, "Updating invoice content");

        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| StoreError::TransactionFailed(e.to_string()))?;

        // The guard and the rewrite sit in one transaction so a concurrent
        // finalize cannot slip between them.
        let finalized: Option<Option<String>> =
            sqlx::query_scalar("SELECT finalized_at FROM invoices WHERE id = ?1")
                .bind(&invoice.id)
                .fetch_optional(&mut *tx)
                .await?;

        match finalized {
            None => return Err(StoreError::not_found("Invoice", &invoice.id)),
            Some(Some(_)) => {
                return Err(StoreError::Finalized {
                    id: invoice.id.clone(),
                })
            }
            Some(None) => {}
        }

        sqlx::query(
            r#"
            UPDATE invoices SET
                client_id = ?2,
                issue_date = ?3,
                due_date = ?4,
                service_date = ?5,
                seller_name = ?6,
                seller_siret = ?7,
                seller_address = ?8,
                seller_vat_number = ?9,
                buyer_name = ?10,
                buyer_address = ?11,
                buyer_siret = ?12,
                buyer_is_professional = ?13,
                total_ht = ?14,
                total_vat = ?15,
                total_ttc = ?16,
                vat_exempt = ?17,
                vat_exemption_text = ?18,
                payment_terms_days = ?19,
                late_penalty_rate = ?20,
                late_penalty_text = ?21,
                recovery_costs_text = ?22,
                notes = ?23,
                updated_at = ?24
            WHERE id = ?1
            "#,
        )
        .bind(&invoice.id)
        .bind(&invoice.client_id)
        .bind(format_date(invoice.issue_date))
        .bind(format_date(invoice.due_date))
        .bind(invoice.service_date.map(format_date))
        .bind(&invoice.seller_name)
        .bind(&invoice.seller_siret)
        .bind(&invoice.seller_address)
        .bind(&invoice.seller_vat_number)
        .bind(&invoice.buyer_name)
        .bind(&invoice.buyer_address)
        .bind(&invoice.buyer_siret)
        .bind(invoice.buyer_is_professional)
        .bind(invoice.total_ht.to_string())
        .bind(invoice.total_vat.to_string())
        .bind(invoice.total_ttc.to_string())
        .bind(invoice.vat_exempt)
        .bind(&invoice.vat_exemption_text)
        .bind(invoice.payment_terms_days)
        .bind(invoice.late_penalty_rate.to_string())
        .bind(&invoice.late_penalty_text)
        .bind(&invoice.recovery_costs_text)
        .bind(&invoice.notes)
        .bind(format_datetime(invoice.updated_at))
        .execute(&mut *tx)
        .await?;

        // Full line replacement: simpler than diffing, and the line set is
        // small
        sqlx::query("DELETE FROM invoice_lines WHERE invoice_id = ?1")
            .bind(&invoice.id)
            .execute(&mut *tx)
            .await?;

        insert_invoice_lines(&mut tx, &invoice.id, lines).await?;

        tx.commit()
            .await
            .map_err(|e| StoreError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    async fn update_invoice_status(
        &self,
        id: &str,
        status: InvoiceStatus,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        debug!(id = %id, status = %status, "Updating invoice status");

        let result = sqlx::query("UPDATE invoices SET status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(status)
            .bind(format_datetime(updated_at))
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Invoice", id));
        }

        Ok(())
    }

    async fn finalize_invoice(&self, id: &str, finalized_at: DateTime<Utc>) -> StoreResult<()> {
        debug!(id = %id, "Finalizing invoice");

        let result = sqlx::query(
            r#"
            UPDATE invoices SET
                status = 'sent',
                finalized_at = ?2,
                updated_at = ?2
            WHERE id = ?1 AND finalized_at IS NULL
            "#,
        )
        .bind(id)
        .bind(format_datetime(finalized_at))
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM invoices WHERE id = ?1)")
                    .bind(id)
                    .fetch_one(self.pool())
                    .await?;

            if !exists {
                return Err(StoreError::not_found("Invoice", id));
            }
            // Already finalized: the first stamp stands.
        }

        Ok(())
    }
}
