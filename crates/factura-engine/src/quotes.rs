//! # Quote Service
//!
//! The quote lifecycle and the conversion into an invoice.
//!
//! ## State Machine
//! ```text
//! ┌─────────┐  mark_sent   ┌─────────┐   accept    ┌──────────┐
//! │  draft  │─────────────►│  sent   │────────────►│ accepted │
//! └─────────┘              └────┬────┘             └─────┬────┘
//!                               │                        │
//!                 reject        │        mark_expired    │ convert_to_invoice
//!              ┌────────────────┼────────────────┐       ▼
//!              ▼                                 ▼   new draft Invoice,
//!        ┌──────────┐                     ┌──────────┐  converted_invoice_id
//!        │ rejected │                     │ expired  │  stamped on the quote
//!        └──────────┘                     └──────────┘
//! ```
//!
//! Expiry is an explicit action; the validity date is informational and
//! nothing fires on the clock. A converted quote keeps status `accepted`
//! with `converted_invoice_id` set, and can never convert again.
//!
//! ## Conversion
//! The produced invoice reuses the quote's seller/buyer snapshots, VAT
//! flags, totals, notes and lines verbatim (no recomputation); only the
//! number, the dates and the payment mentions are fresh: issue date is
//! today, terms come from the current settings. Eligibility is checked
//! before the number is even read, and the store inserts the invoice and
//! stamps the quote in one atomic operation.

use std::sync::Arc;

use chrono::{Datelike, Duration, Utc};
use tracing::info;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::lines::build_lines;
use crate::numbering::NumberingService;
use factura_core::money::document_totals;
use factura_core::numbering::DocumentKind;
use factura_core::{
    Invoice, InvoiceStatus, InvoiceWithLines, LineItem, Quote, QuoteDraft, QuoteStatus,
    QuoteWithLines, Settings, RECOVERY_COSTS_TEXT,
};
use factura_store::Storage;

// =============================================================================
// Quote Service
// =============================================================================

pub struct QuoteService {
    store: Arc<dyn Storage>,
    numbering: NumberingService,
}

impl QuoteService {
    pub fn new(store: Arc<dyn Storage>) -> Self {
        let numbering = NumberingService::new(store.clone());
        QuoteService { store, numbering }
    }

    /// Creates a draft quote from the input.
    pub async fn create(&self, draft: QuoteDraft) -> EngineResult<QuoteWithLines> {
        let settings = self.require_settings().await?;
        let client = self
            .store
            .get_client(&draft.client_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Client", draft.client_id.as_str()))?;

        let lines = build_lines(&draft.lines, settings.is_vat_exempt)?;
        let totals = document_totals(&lines);

        let number = self
            .numbering
            .next_number(
                DocumentKind::Quote,
                &settings.quote_prefix,
                Utc::now().year(),
            )
            .await?;

        let now = Utc::now();
        let quote = Quote {
            id: Uuid::new_v4().to_string(),
            quote_number: number,
            client_id: client.id.clone(),
            status: QuoteStatus::Draft,
            issue_date: draft.issue_date,
            validity_date: draft.validity_date,
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
            notes: draft.notes,
            converted_invoice_id: None,
            created_at: now,
            updated_at: now,
        };

        self.store.insert_quote(&quote, &lines).await?;
        info!(
            id = %quote.id,
            number = %quote.quote_number,
            total_ttc = %quote.total_ttc,
            "Created quote"
        );

        Ok(QuoteWithLines { quote, lines })
    }

    /// Replaces the content of a draft quote. Same recomposition rules as
    /// invoice updates; the number, status and conversion stamp are
    /// immutable.
    pub async fn update(&self, id: &str, draft: QuoteDraft) -> EngineResult<QuoteWithLines> {
        let existing = self.get(id).await?.quote;

        if existing.is_converted() {
            return Err(EngineError::ConvertedQuote { id: id.to_string() });
        }
        if existing.status != QuoteStatus::Draft {
            return Err(EngineError::invalid_transition(
                "Quote",
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

        let lines = build_lines(&draft.lines, settings.is_vat_exempt)?;
        let totals = document_totals(&lines);

        let quote = Quote {
            id: existing.id,
            quote_number: existing.quote_number,
            client_id: client.id.clone(),
            status: existing.status,
            issue_date: draft.issue_date,
            validity_date: draft.validity_date,
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
            notes: draft.notes,
            converted_invoice_id: existing.converted_invoice_id,
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };

        self.store.update_quote(&quote, &lines).await?;
        info!(id = %id, "Updated quote content");

        self.get(id).await
    }

    /// draft → sent.
    pub async fn mark_sent(&self, id: &str) -> EngineResult<Quote> {
        self.transition(id, QuoteStatus::Draft, QuoteStatus::Sent, "mark as sent")
            .await
    }

    /// sent → accepted.
    pub async fn accept(&self, id: &str) -> EngineResult<Quote> {
        self.transition(id, QuoteStatus::Sent, QuoteStatus::Accepted, "accept")
            .await
    }

    /// sent → rejected. Terminal.
    pub async fn reject(&self, id: &str) -> EngineResult<Quote> {
        self.transition(id, QuoteStatus::Sent, QuoteStatus::Rejected, "reject")
            .await
    }

    /// sent → expired. Terminal, explicit only.
    pub async fn mark_expired(&self, id: &str) -> EngineResult<Quote> {
        self.transition(id, QuoteStatus::Sent, QuoteStatus::Expired, "mark as expired")
            .await
    }

    /// Produces a draft invoice from an accepted, unconverted quote and
    /// stamps the quote's `converted_invoice_id`, atomically.
    pub async fn convert_to_invoice(
        &self,
        id: &str,
    ) -> EngineResult<(InvoiceWithLines, QuoteWithLines)> {
        let QuoteWithLines { quote, lines } = self.get(id).await?;

        // Eligibility first; nothing is read or written past this point
        // for a quote that cannot convert.
        if quote.is_converted() {
            return Err(EngineError::ConversionIneligible {
                quote_id: id.to_string(),
                reason: "already converted".to_string(),
            });
        }
        if quote.status != QuoteStatus::Accepted {
            return Err(EngineError::ConversionIneligible {
                quote_id: id.to_string(),
                reason: format!("status is {}, must be accepted", quote.status),
            });
        }

        let settings = self.require_settings().await?;

        let number = self
            .numbering
            .next_number(
                DocumentKind::Invoice,
                &settings.invoice_prefix,
                Utc::now().year(),
            )
            .await?;

        let today = Utc::now().date_naive();
        let due_date = today
            .checked_add_signed(Duration::days(settings.default_payment_terms_days))
            .ok_or_else(|| {
                EngineError::DateOutOfRange(format!(
                    "{today} plus {} days",
                    settings.default_payment_terms_days
                ))
            })?;

        // Lines carry over verbatim, amounts included; only the ids are new.
        let invoice_lines: Vec<LineItem> = lines
            .iter()
            .map(|line| LineItem {
                id: Uuid::new_v4().to_string(),
                description: line.description.clone(),
                quantity: line.quantity,
                unit: line.unit,
                unit_price_ht: line.unit_price_ht,
                vat_rate: line.vat_rate,
                total_ht: line.total_ht,
                total_vat: line.total_vat,
                total_ttc: line.total_ttc,
                sort_order: line.sort_order,
            })
            .collect();

        let now = Utc::now();
        let invoice = Invoice {
            id: Uuid::new_v4().to_string(),
            invoice_number: number,
            client_id: quote.client_id.clone(),
            status: InvoiceStatus::Draft,
            issue_date: today,
            due_date,
            service_date: None,
            seller_name: quote.seller_name.clone(),
            seller_siret: quote.seller_siret.clone(),
            seller_address: quote.seller_address.clone(),
            seller_vat_number: quote.seller_vat_number.clone(),
            buyer_name: quote.buyer_name.clone(),
            buyer_address: quote.buyer_address.clone(),
            buyer_siret: quote.buyer_siret.clone(),
            buyer_is_professional: quote.buyer_is_professional,
            total_ht: quote.total_ht,
            total_vat: quote.total_vat,
            total_ttc: quote.total_ttc,
            vat_exempt: quote.vat_exempt,
            vat_exemption_text: quote.vat_exemption_text.clone(),
            payment_terms_days: settings.default_payment_terms_days,
            late_penalty_rate: settings.default_late_penalty_rate,
            late_penalty_text: settings.late_penalty_text(),
            recovery_costs_text: RECOVERY_COSTS_TEXT.to_string(),
            notes: quote.notes.clone(),
            created_at: now,
            updated_at: now,
            finalized_at: None,
        };

        self.store
            .convert_quote(id, &invoice, &invoice_lines, now)
            .await?;
        info!(
            quote_id = %id,
            invoice_id = %invoice.id,
            number = %invoice.invoice_number,
            "Converted quote to invoice"
        );

        let created = self
            .store
            .get_invoice(&invoice.id)
            .await?
            .ok_or_else(|| EngineError::not_found("Invoice", invoice.id.as_str()))?;
        let converted = self.get(id).await?;

        Ok((created, converted))
    }

    /// Fetches one quote with its lines.
    pub async fn get(&self, id: &str) -> EngineResult<QuoteWithLines> {
        self.store
            .get_quote(id)
            .await?
            .ok_or_else(|| EngineError::not_found("Quote", id))
    }

    /// All quote headers, newest issue date first.
    pub async fn list(&self) -> EngineResult<Vec<Quote>> {
        Ok(self.store.list_quotes().await?)
    }

    async fn transition(
        &self,
        id: &str,
        from: QuoteStatus,
        to: QuoteStatus,
        action: &'static str,
    ) -> EngineResult<Quote> {
        let current = self.get(id).await?.quote;

        if current.status != from {
            return Err(EngineError::invalid_transition(
                "Quote",
                id,
                current.status.as_str(),
                action,
            ));
        }

        self.store.update_quote_status(id, to, Utc::now()).await?;
        info!(id = %id, status = to.as_str(), "Quote status changed");

        Ok(self.get(id).await?.quote)
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
