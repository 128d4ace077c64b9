//! # Row Mapping
//!
//! Row structs mirroring the SQLite schema, plus the parsing boundary
//! between stored TEXT and domain types.
//!
//! ## Column Encoding
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Domain type          SQLite column        Read path                   │
//! │  ──────────────────   ─────────────────    ──────────────────────────  │
//! │  Decimal              TEXT "1234.56"       parse_decimal (exact)       │
//! │  NaiveDate            TEXT "2025-03-10"    parse_date                  │
//! │  DateTime<Utc>        TEXT RFC 3339        parse_datetime              │
//! │  InvoiceStatus etc.   TEXT "draft"         sqlx::Type derive           │
//! │  bool                 INTEGER 0/1          native sqlx decode          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every parse failure carries the offending column name in
//! [`StoreError::Decode`], so a corrupt database names the column instead
//! of failing with a bare type error.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::error::{StoreError, StoreResult};
use factura_core::{
    Client, Invoice, InvoiceStatus, LineItem, LineUnit, Quote, QuoteStatus, Settings,
};

// =============================================================================
// Parse Helpers (TEXT → domain)
// =============================================================================

pub(crate) fn parse_decimal(column: &str, raw: &str) -> StoreResult<Decimal> {
    raw.parse()
        .map_err(|e: rust_decimal::Error| StoreError::decode(column, e))
}

pub(crate) fn parse_date(column: &str, raw: &str) -> StoreResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| StoreError::decode(column, e))
}

pub(crate) fn parse_datetime(column: &str, raw: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::decode(column, e))
}

fn parse_opt_date(column: &str, raw: Option<&str>) -> StoreResult<Option<NaiveDate>> {
    raw.map(|s| parse_date(column, s)).transpose()
}

fn parse_opt_datetime(column: &str, raw: Option<&str>) -> StoreResult<Option<DateTime<Utc>>> {
    raw.map(|s| parse_datetime(column, s)).transpose()
}

fn parse_opt_decimal(column: &str, raw: Option<&str>) -> StoreResult<Option<Decimal>> {
    raw.map(|s| parse_decimal(column, s)).transpose()
}

// =============================================================================
// Format Helpers (domain → TEXT)
// =============================================================================

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub(crate) fn format_datetime(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

// =============================================================================
// Client Row
// =============================================================================

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct ClientRow {
    pub id: String,
    pub company_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: String,
    pub postal_code: String,
    pub city: String,
    pub country: String,
    pub siret: Option<String>,
    pub vat_number: Option<String>,
    pub notes: Option<String>,
    pub is_professional: bool,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
}

impl ClientRow {
    pub(crate) fn into_client(self) -> StoreResult<Client> {
        Ok(Client {
            id: self.id,
            company_name: self.company_name,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            postal_code: self.postal_code,
            city: self.city,
            country: self.country,
            siret: self.siret,
            vat_number: self.vat_number,
            notes: self.notes,
            is_professional: self.is_professional,
            created_at: parse_datetime("clients.created_at", &self.created_at)?,
            updated_at: parse_datetime("clients.updated_at", &self.updated_at)?,
            deleted_at: parse_opt_datetime("clients.deleted_at", self.deleted_at.as_deref())?,
        })
    }
}

// =============================================================================
// Line Row (shared by invoice_lines and quote_lines)
// =============================================================================

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct LineRow {
    pub id: String,
    pub description: String,
    pub quantity: String,
    pub unit: LineUnit,
    pub unit_price_ht: String,
    pub vat_rate: String,
    pub total_ht: String,
    pub total_vat: String,
    pub total_ttc: String,
    pub sort_order: i64,
}

impl LineRow {
    pub(crate) fn into_line(self) -> StoreResult<LineItem> {
        Ok(LineItem {
            id: self.id,
            description: self.description,
            quantity: parse_decimal("lines.quantity", &self.quantity)?,
            unit: self.unit,
            unit_price_ht: parse_decimal("lines.unit_price_ht", &self.unit_price_ht)?,
            vat_rate: parse_decimal("lines.vat_rate", &self.vat_rate)?,
            total_ht: parse_decimal("lines.total_ht", &self.total_ht)?,
            total_vat: parse_decimal("lines.total_vat", &self.total_vat)?,
            total_ttc: parse_decimal("lines.total_ttc", &self.total_ttc)?,
            sort_order: self.sort_order,
        })
    }
}

// =============================================================================
// Invoice Row
// =============================================================================

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct InvoiceRow {
    pub id: String,
    pub invoice_number: String,
    pub client_id: String,
    pub status: InvoiceStatus,
    pub issue_date: String,
    pub due_date: String,
    pub service_date: Option<String>,
    pub seller_name: String,
    pub seller_siret: String,
    pub seller_address: String,
    pub seller_vat_number: Option<String>,
    pub buyer_name: String,
    pub buyer_address: String,
    pub buyer_siret: Option<String>,
    pub buyer_is_professional: bool,
    pub total_ht: String,
    pub total_vat: String,
    pub total_ttc: String,
    pub vat_exempt: bool,
    pub vat_exemption_text: Option<String>,
    pub payment_terms_days: i64,
    pub late_penalty_rate: String,
    pub late_penalty_text: String,
    pub recovery_costs_text: String,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub finalized_at: Option<String>,
}

impl InvoiceRow {
    pub(crate) fn into_invoice(self) -> StoreResult<Invoice> {
        Ok(Invoice {
            id: self.id,
            invoice_number: self.invoice_number,
            client_id: self.client_id,
            status: self.status,
            issue_date: parse_date("invoices.issue_date", &self.issue_date)?,
            due_date: parse_date("invoices.due_date", &self.due_date)?,
            service_date: parse_opt_date("invoices.service_date", self.service_date.as_deref())?,
            seller_name: self.seller_name,
            seller_siret: self.seller_siret,
            seller_address: self.seller_address,
            seller_vat_number: self.seller_vat_number,
            buyer_name: self.buyer_name,
            buyer_address: self.buyer_address,
            buyer_siret: self.buyer_siret,
            buyer_is_professional: self.buyer_is_professional,
            total_ht: parse_decimal("invoices.total_ht", &self.total_ht)?,
            total_vat: parse_decimal("invoices.total_vat", &self.total_vat)?,
            total_ttc: parse_decimal("invoices.total_ttc", &self.total_ttc)?,
            vat_exempt: self.vat_exempt,
            vat_exemption_text: self.vat_exemption_text,
            payment_terms_days: self.payment_terms_days,
            late_penalty_rate: parse_decimal(
                "invoices.late_penalty_rate",
                &self.late_penalty_rate,
            )?,
            late_penalty_text: self.late_penalty_text,
            recovery_costs_text: self.recovery_costs_text,
            notes: self.notes,
            created_at: parse_datetime("invoices.created_at", &self.created_at)?,
            updated_at: parse_datetime("invoices.updated_at", &self.updated_at)?,
            finalized_at: parse_opt_datetime(
                "invoices.finalized_at",
                self.finalized_at.as_deref(),
            )?,
        })
    }
}

// =============================================================================
// Quote Row
// =============================================================================

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct QuoteRow {
    pub id: String,
    pub quote_number: String,
    pub client_id: String,
    pub status: QuoteStatus,
    pub issue_date: String,
    pub validity_date: String,
    pub seller_name: String,
    pub seller_siret: String,
    pub seller_address: String,
    pub seller_vat_number: Option<String>,
    pub buyer_name: String,
    pub buyer_address: String,
    pub buyer_siret: Option<String>,
    pub buyer_is_professional: bool,
    pub total_ht: String,
    pub total_vat: String,
    pub total_ttc: String,
    pub vat_exempt: bool,
    pub vat_exemption_text: Option<String>,
    pub notes: Option<String>,
    pub converted_invoice_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl QuoteRow {
    pub(crate) fn into_quote(self) -> StoreResult<Quote> {
        Ok(Quote {
            id: self.id,
            quote_number: self.quote_number,
            client_id: self.client_id,
            status: self.status,
            issue_date: parse_date("quotes.issue_date", &self.issue_date)?,
            validity_date: parse_date("quotes.validity_date", &self.validity_date)?,
            seller_name: self.seller_name,
            seller_siret: self.seller_siret,
            seller_address: self.seller_address,
            seller_vat_number: self.seller_vat_number,
            buyer_name: self.buyer_name,
            buyer_address: self.buyer_address,
            buyer_siret: self.buyer_siret,
            buyer_is_professional: self.buyer_is_professional,
            total_ht: parse_decimal("quotes.total_ht", &self.total_ht)?,
            total_vat: parse_decimal("quotes.total_vat", &self.total_vat)?,
            total_ttc: parse_decimal("quotes.total_ttc", &self.total_ttc)?,
            vat_exempt: self.vat_exempt,
            vat_exemption_text: self.vat_exemption_text,
            notes: self.notes,
            converted_invoice_id: self.converted_invoice_id,
            created_at: parse_datetime("quotes.created_at", &self.created_at)?,
            updated_at: parse_datetime("quotes.updated_at", &self.updated_at)?,
        })
    }
}

// =============================================================================
// Settings Row
// =============================================================================

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct SettingsRow {
    pub business_name: String,
    pub first_name: String,
    pub last_name: String,
    pub siret: String,
    pub address: String,
    pub postal_code: String,
    pub city: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub vat_number: Option<String>,
    pub is_vat_exempt: bool,
    pub vat_exemption_text: String,
    pub default_payment_terms_days: i64,
    pub default_late_penalty_rate: String,
    pub invoice_prefix: String,
    pub quote_prefix: String,
    pub legal_form: Option<String>,
    pub rcs_number: Option<String>,
    pub share_capital: Option<String>,
    pub payment_methods: String,
    pub iban: Option<String>,
    pub bic: Option<String>,
    pub updated_at: String,
}

impl SettingsRow {
    pub(crate) fn into_settings(self) -> StoreResult<Settings> {
        Ok(Settings {
            business_name: self.business_name,
            first_name: self.first_name,
            last_name: self.last_name,
            siret: self.siret,
            address: self.address,
            postal_code: self.postal_code,
            city: self.city,
            email: self.email,
            phone: self.phone,
            vat_number: self.vat_number,
            is_vat_exempt: self.is_vat_exempt,
            vat_exemption_text: self.vat_exemption_text,
            default_payment_terms_days: self.default_payment_terms_days,
            default_late_penalty_rate: parse_decimal(
                "settings.default_late_penalty_rate",
                &self.default_late_penalty_rate,
            )?,
            invoice_prefix: self.invoice_prefix,
            quote_prefix: self.quote_prefix,
            legal_form: self.legal_form,
            rcs_number: self.rcs_number,
            share_capital: parse_opt_decimal(
                "settings.share_capital",
                self.share_capital.as_deref(),
            )?,
            payment_methods: self.payment_methods,
            iban: self.iban,
            bic: self.bic,
            updated_at: parse_datetime("settings.updated_at", &self.updated_at)?,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_decimal_exact() {
        assert_eq!(parse_decimal("t", "1234.56").unwrap(), dec!(1234.56));
        assert_eq!(parse_decimal("t", "0").unwrap(), dec!(0));
        assert_eq!(parse_decimal("t", "3.0").unwrap(), dec!(3.0));
    }

    #[test]
    fn test_parse_decimal_failure_names_column() {
        let err = parse_decimal("invoices.total_ht", "not-a-number").unwrap_err();
        assert!(err.to_string().contains("invoices.total_ht"));
    }

    #[test]
    fn test_date_roundtrip() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        assert_eq!(parse_date("t", &format_date(date)).unwrap(), date);
        assert!(parse_date("t", "10/03/2025").is_err());
    }

    #[test]
    fn test_datetime_roundtrip() {
        let ts = Utc::now();
        let parsed = parse_datetime("t", &format_datetime(ts)).unwrap();
        assert_eq!(parsed, ts);
    }
}
