//! # Invoice Service
//!
//! The invoice lifecycle: creation from a draft input, content updates
//! while still editable, the one-way finalization gate, and the terminal
//! status transitions.
//!
//! ## State Machine
//! ```text
//! ┌─────────┐  finalize    ┌─────────┐  mark_paid   ┌─────────┐
//! │  draft  │─────────────►│  sent   │─────────────►│  paid   │
//! └────┬────┘              └────┬────┘              └─────────┘
//!      │                        │
//!      │ cancel                 │ cancel
//!      ▼                        ▼
//! ┌─────────────────────────────────────┐
//! │              cancelled              │
//! └─────────────────────────────────────┘
//! ```
//!
//! `draft` is the only editable state. Finalization stamps `finalized_at`
//! and moves to `sent`; from then on the content is frozen and only
//! `mark_paid` and `cancel` remain. Finalizing twice is a safe no-op.
//!
//! ## Snapshots
//! Creation and update both compose the seller identity from the current
//! settings and the buyer identity from the referenced client. Once the
//! invoice is finalized those snapshots never change again, which is what
//! keeps old documents legally accurate after a client moves or the issuer
//! profile changes.

use std::sync::Arc;

use chrono::{Datelike, Duration, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::lines::build_lines;
use crate::numbering::NumberingService;
use factura_core::money::document_totals;
use factura_core::numbering::DocumentKind;
use factura_core::validation::validate_payment_terms;
use factura_core::{
    Invoice, InvoiceDraft, InvoiceStatus, InvoiceWithLines, Settings, RECOVERY_COSTS_TEXT,
};
use factura_store::Storage;

// =============================================================================
// Invoice Service
// =============================================================================

pub struct InvoiceService {
    store: Arc<dyn Storage>,
    numbering: NumberingService,
}

impl InvoiceService {
    pub fn new(store: Arc<dyn Storage>) -> Self {
        let numbering = NumberingService::new(store.clone());
        InvoiceService { store, numbering }
    }

    /// Creates a draft invoice from the input.
    ///
    /// Allocates the next number under the issuer's invoice prefix for the
    /// current year, snapshots seller and buyer identity, computes every
    /// line's totals and the document totals, and derives the due date from
    /// the payment terms (input override, else the settings default).
    pub async fn create(&self, draft: InvoiceDraft) -> EngineResult<InvoiceWithLines> {
        let settings = self.require_settings().await?;
        let client = self
            .store
            .get_client(&draft.client_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Client", draft.client_id.as_str()))?;

        let payment_terms_days = draft
            .payment_terms_days
            .unwrap_or(settings.default_payment_terms_days);
        validate_payment_terms(payment_terms_days)?;

        let lines = build_lines(&draft.lines, settings.is_vat_exempt)?;
        let totals = document_totals(&lines);

        let due_date = draft
            .issue_date
            .checked_add_signed(Duration::days(payment_terms_days))
            .ok_or_else(|| {
                EngineError::DateOutOfRange(format!(
                    "{} plus {payment_terms_days} days",
                    draft.issue_date
                ))
            })?;

        let number = self
            .numbering
            .next_number(
                DocumentKind::Invoice,
                &settings.invoice_prefix,
                Utc::now().year(),
            )
            .await?;

        let now = Utc::now();
        let invoice = Invoice {
            id: Uuid::new_v4().to_string(),
            invoice_number: number,
            client_id: client.id.clone(),
            status: InvoiceStatus::Draft,
            issue_date: draft.issue_date,
            due_date,
            service_date: draft.service_date,
            seller_name: settings.seller_name(),
            seller_siret: settings.siret.clone(),
            seller_address: settings.seller_address(),
            seller_vat_number: settings.vat_number.clone(),
            buyer_name: client.display_name(),
            buyer_address: client.billing_address(),
            buyer_siret: client.siret.clone(),
            buyer_is_professional: client.is_professional,
            total_ht: totals.total_ht,
            total_vat: totals.total_vat,
            total_ttc: totals.total_ttc,
            vat_exempt: settings.is_vat_exempt,
            vat_exemption_text: exemption_text(&settings),
            payment_terms_days,
            late_penalty_rate: settings.default_late_penalty_rate,
            late_penalty_text: settings.late_penalty_text(),
            recovery_costs_text: RECOVERY_COSTS_TEXT.to_string(),
            notes: draft.notes,
            created_at: now,
            updated_at: now,
            finalized_at: None,
        };

        self.store.insert_invoice(&invoice, &lines).await?;
        info!(
            id = %invoice.id,
            number = %invoice.invoice_number,
            total_ttc = %invoice.total_ttc,
            "Created invoice"
        );

        Ok(InvoiceWithLines { invoice, lines })
    }

    /// Replaces the content of a draft invoice.
    ///
    /// Snapshots are recomposed from the current settings and the (possibly
    /// different) client, and the lines are rebuilt from scratch. The
    /// number, status and creation timestamp are immutable.
    pub async fn update(&self, id: &str, draft: InvoiceDraft) -> EngineResult<InvoiceWithLines> {
        let existing = self.get(id).await?.invoice;

        if existing.is_finalized() {
            return Err(EngineError::FinalizedDocument { id: id.to_string() });
        }
        if existing.status != InvoiceStatus::Draft {
            return Err(EngineError::invalid_transition(
                "Invoice",
                id,
                existing.status.as_str(),
                "update content",
            ));
        }

        let settings = self.require_settings().await?;
        let client = self
            .store
            .get_client(&draft.client_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Client", draft.client_id.as_str()))?;

        let payment_terms_days = draft
            .payment_terms_days
            .unwrap_or(settings.default_payment_terms_days);
        validate_payment_terms(payment_terms_days)?;

        let lines = build_lines(&draft.lines, settings.is_vat_exempt)?;
        let totals = document_totals(&lines);

        let due_date = draft
            .issue_date
            .checked_add_signed(Duration::days(payment_terms_days))
            .ok_or_else(|| {
                EngineError::DateOutOfRange(format!(
                    "{} plus {payment_terms_days} days",
                    draft.issue_date
                ))
            })?;

        let invoice = Invoice {
            id: existing.id,
            invoice_number: existing.invoice_number,
            client_id: client.id.clone(),
            status: existing.status,
            issue_date: draft.issue_date,
            due_date,
            service_date: draft.service_date,
            seller_name: settings.seller_name(),
            seller_siret: settings.siret.clone(),
            seller_address: settings.seller_address(),
            seller_vat_number: settings.vat_number.clone(),
            buyer_name: client.display_name(),
            buyer_address: client.billing_address(),
            buyer_siret: client.siret.clone(),
            buyer_is_professional: client.is_professional,
            total_ht: totals.total_ht,
            total_vat: totals.total_vat,
            total_ttc: totals.total_ttc,
            vat_exempt: settings.is_vat_exempt,
            vat_exemption_text: exemption_text(&settings),
            payment_terms_days,
            late_penalty_rate: settings.default_late_penalty_rate,
            late_penalty_text: settings.late_penalty_text(),
            recovery_costs_text: RECOVERY_COSTS_TEXT.to_string(),
            notes: draft.notes,
            created_at: existing.created_at,
            updated_at: Utc::now(),
            finalized_at: existing.finalized_at,
        };

        self.store.update_invoice(&invoice, &lines).await?;
        info!(id = %id, "Updated invoice content");

        self.get(id).await
    }

    /// Finalizes the invoice: stamps `finalized_at`, moves to `sent` and
    /// freezes the content. Calling it again is a no-op.
    pub async fn finalize(&self, id: &str) -> EngineResult<InvoiceWithLines> {
        let current = self.get(id).await?;

        if current.invoice.is_finalized() {
            debug!(id = %id, "Invoice already finalized");
            return Ok(current);
        }
        if current.invoice.status != InvoiceStatus::Draft {
            return Err(EngineError::invalid_transition(
                "Invoice",
                id,
                current.invoice.status.as_str(),
                "finalize",
            ));
        }

        self.store.finalize_invoice(id, Utc::now()).await?;
        info!(id = %id, number = %current.invoice.invoice_number, "Finalized invoice");

        self.get(id).await
    }

    /// Marks a sent invoice as paid. Terminal.
    pub async fn mark_paid(&self, id: &str) -> EngineResult<Invoice> {
        let current = self.get(id).await?.invoice;

        if current.status != InvoiceStatus::Sent {
            return Err(EngineError::invalid_transition(
                "Invoice",
                id,
                current.status.as_str(),
                "mark as paid",
            ));
        }

        self.store
            .update_invoice_status(id, InvoiceStatus::Paid, Utc::now())
            .await?;
        info!(id = %id, "Invoice marked paid");

        Ok(self.get(id).await?.invoice)
    }

    /// Cancels a draft or sent invoice. Terminal.
    pub async fn cancel(&self, id: &str) -> EngineResult<Invoice> {
        let current = self.get(id).await?.invoice;

        match current.status {
            InvoiceStatus::Draft | InvoiceStatus::Sent => {}
            InvoiceStatus::Paid | InvoiceStatus::Cancelled => {
                return Err(EngineError::invalid_transition(
                    "Invoice",
                    id,
                    current.status.as_str(),
                    "cancel",
                ));
            }
        }

        self.store
            .update_invoice_status(id, InvoiceStatus::Cancelled, Utc::now())
            .await?;
        info!(id = %id, "Invoice cancelled");

        Ok(self.get(id).await?.invoice)
    }

    /// Fetches one invoice with its lines.
    pub async fn get(&self, id: &str) -> EngineResult<InvoiceWithLines> {
        self.store
            .get_invoice(id)
            .await?
            .ok_or_else(|| EngineError::not_found("Invoice", id))
    }

    /// All invoice headers, newest issue date first.
    pub async fn list(&self) -> EngineResult<Vec<Invoice>> {
        Ok(self.store.list_invoices().await?)
    }

    async fn require_settings(&self) -> EngineResult<Settings> {
        self.store
            .get_settings()
            .await?
            .ok_or(EngineError::SettingsMissing)
    }
}

fn exemption_text(settings: &Settings) -> Option<String> {
    if settings.is_vat_exempt {
        Some(settings.vat_exemption_text.clone())
    } else {
        None
    }
}
