//! # Domain Types
//!
//! Core domain types used throughout Factura.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Invoice      │   │     Quote       │   │    Client       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  invoice_number │   │  quote_number   │   │  company_name   │       │
//! │  │  status         │   │  status         │   │  siret          │       │
//! │  │  seller/buyer   │   │  seller/buyer   │   │  deleted_at     │       │
//! │  │  snapshot       │   │  snapshot       │   └─────────────────┘       │
//! │  │  finalized_at   │   │  converted_     │                             │
//! │  └─────────────────┘   │  invoice_id     │   ┌─────────────────┐       │
//! │                        └─────────────────┘   │    Settings     │       │
//! │  ┌─────────────────┐   ┌─────────────────┐   │  ─────────────  │       │
//! │  │  InvoiceStatus  │   │   QuoteStatus   │   │  singleton      │       │
//! │  │  draft → sent   │   │  draft → sent   │   │  issuer identity│       │
//! │  │  sent → paid    │   │  sent → accepted│   │  prefixes,      │       │
//! │  │  → cancelled    │   │  → rejected     │   │  VAT regime     │       │
//! │  └─────────────────┘   │  → expired      │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Invoices and quotes carry frozen copies of seller and buyer identity
//! (`seller_name`, `buyer_address`, ...) taken at creation time. Editing the
//! client registry or settings afterwards never changes what an issued
//! document says.
//!
//! ## Dual-Key Identity Pattern
//! Every document has:
//! - `id`: UUID v4 - immutable, used for storage relations
//! - Document number (`F-2025-0001`) - human-readable, legally sequential

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

// =============================================================================
// Line Unit
// =============================================================================

/// Unit of measure for a document line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum LineUnit {
    /// Per item (unité).
    Unite,
    /// Per hour.
    Heure,
    /// Per day.
    Jour,
    /// Flat fee (forfait).
    Forfait,
}

impl LineUnit {
    /// Stable lowercase identifier, matching the serialized form.
    pub const fn as_str(&self) -> &'static str {
        match self {
            LineUnit::Unite => "unite",
            LineUnit::Heure => "heure",
            LineUnit::Jour => "jour",
            LineUnit::Forfait => "forfait",
        }
    }
}

impl Default for LineUnit {
    fn default() -> Self {
        LineUnit::Unite
    }
}

impl fmt::Display for LineUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Invoice Status
// =============================================================================

/// The lifecycle status of an invoice.
///
/// ```text
/// draft ──finalize──► sent ──► paid
///   │                  │
///   └──────cancel──────┴─────► cancelled
/// ```
///
/// `sent` is only reachable through finalization, which also stamps
/// `finalized_at` and freezes the document content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    /// Editable working copy; not yet numbered into legal existence.
    Draft,
    /// Finalized and issued to the client. Content is immutable.
    Sent,
    /// Payment received.
    Paid,
    /// Withdrawn. Terminal; keeps its number (no reuse).
    Cancelled,
}

impl InvoiceStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }
}

impl Default for InvoiceStatus {
    fn default() -> Self {
        InvoiceStatus::Draft
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Quote Status
// =============================================================================

/// The lifecycle status of a quote.
///
/// ```text
/// draft ──► sent ──► accepted ──convert──► (invoice created,
///             │                             converted_invoice_id stamped)
///             ├─────► rejected
///             └─────► expired
/// ```
///
/// Expiry is an explicit action by the caller; passing the validity date
/// never flips the status on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    Draft,
    Sent,
    Accepted,
    Rejected,
    Expired,
}

impl QuoteStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Draft => "draft",
            QuoteStatus::Sent => "sent",
            QuoteStatus::Accepted => "accepted",
            QuoteStatus::Rejected => "rejected",
            QuoteStatus::Expired => "expired",
        }
    }
}

impl Default for QuoteStatus {
    fn default() -> Self {
        QuoteStatus::Draft
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Client
// =============================================================================

/// A customer in the registry. Either a company (`company_name`) or an
/// individual (`first_name` / `last_name`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub company_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,

    /// Street address (required for invoicing).
    pub address: String,
    pub postal_code: String,
    pub city: String,
    pub country: String,

    /// SIRET of professional clients (stored as given, not checksum-gated).
    pub siret: Option<String>,
    pub vat_number: Option<String>,
    pub notes: Option<String>,

    /// Professional (B2B) or individual (B2C). Drives which legal mentions
    /// apply on documents issued to this client.
    pub is_professional: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,

    /// Soft-delete marker. A deleted client disappears from listings but
    /// stays resolvable by id so existing documents keep their reference.
    #[ts(as = "Option<String>")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Client {
    /// Human-readable name: company name, else "First Last", else an
    /// em-dash placeholder.
    pub fn display_name(&self) -> String {
        if let Some(company) = non_blank(self.company_name.as_deref()) {
            return company.to_string();
        }

        let person = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .filter_map(non_blank)
            .collect::<Vec<_>>()
            .join(" ");

        if person.is_empty() {
            "—".to_string()
        } else {
            person
        }
    }

    /// Single-line billing address: "12 rue X, 75001 Paris".
    pub fn billing_address(&self) -> String {
        format!("{}, {} {}", self.address, self.postal_code, self.city)
    }

    /// Whether this client is soft-deleted.
    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Mutable client fields, used for create and update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ClientInput {
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
}

// =============================================================================
// Line Items
// =============================================================================

/// One line of an invoice or quote, with its stored computed amounts.
///
/// Amounts are computed once via [`crate::money::line_total`] and persisted;
/// readers never recompute them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: String,
    pub description: String,
    #[ts(as = "String")]
    pub quantity: Decimal,
    pub unit: LineUnit,
    #[ts(as = "String")]
    pub unit_price_ht: Decimal,
    /// VAT rate as a percentage (0, 5.5, 10 or 20).
    #[ts(as = "String")]
    pub vat_rate: Decimal,
    #[ts(as = "String")]
    pub total_ht: Decimal,
    #[ts(as = "String")]
    pub total_vat: Decimal,
    #[ts(as = "String")]
    pub total_ttc: Decimal,
    /// Position within the document, dense from 0.
    pub sort_order: i64,
}

/// Caller-supplied line content; ids, totals and positions are assigned
/// by the services.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineInput {
    pub description: String,
    #[ts(as = "String")]
    pub quantity: Decimal,
    pub unit: LineUnit,
    #[ts(as = "String")]
    pub unit_price_ht: Decimal,
    #[ts(as = "String")]
    pub vat_rate: Decimal,
}

// =============================================================================
// Invoice
// =============================================================================

/// An invoice header.
///
/// Seller and buyer fields are snapshots frozen at creation time, so the
/// document stays legally accurate when settings or clients change later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Sequential business number, e.g. `F-2025-0042`. Unique.
    pub invoice_number: String,

    /// Registry reference; documents survive client soft-deletion.
    pub client_id: String,

    pub status: InvoiceStatus,

    #[ts(as = "String")]
    pub issue_date: NaiveDate,
    /// issue_date + payment terms.
    #[ts(as = "String")]
    pub due_date: NaiveDate,
    /// Date the service was performed, when distinct from the issue date.
    #[ts(as = "Option<String>")]
    pub service_date: Option<NaiveDate>,

    // Seller snapshot
    pub seller_name: String,
    pub seller_siret: String,
    pub seller_address: String,
    pub seller_vat_number: Option<String>,

    // Buyer snapshot
    pub buyer_name: String,
    pub buyer_address: String,
    pub buyer_siret: Option<String>,
    pub buyer_is_professional: bool,

    #[ts(as = "String")]
    pub total_ht: Decimal,
    #[ts(as = "String")]
    pub total_vat: Decimal,
    #[ts(as = "String")]
    pub total_ttc: Decimal,

    /// Franchise en base de TVA. When true every line carries rate 0 and
    /// `vat_exemption_text` holds the mandatory mention.
    pub vat_exempt: bool,
    pub vat_exemption_text: Option<String>,

    pub payment_terms_days: i64,
    /// Late-payment penalty rate (percentage), snapshotted from settings.
    #[ts(as = "String")]
    pub late_penalty_rate: Decimal,
    pub late_penalty_text: String,
    pub recovery_costs_text: String,

    pub notes: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,

    /// When the invoice was finalized. `Some` means the content is frozen;
    /// only status changes (paid, cancelled) remain possible.
    #[ts(as = "Option<String>")]
    pub finalized_at: Option<DateTime<Utc>>,
}

impl Invoice {
    /// Whether the document content is frozen.
    #[inline]
    pub fn is_finalized(&self) -> bool {
        self.finalized_at.is_some()
    }
}

/// An invoice with its lines, ordered by `sort_order`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceWithLines {
    #[serde(flatten)]
    #[ts(flatten)]
    pub invoice: Invoice,
    pub lines: Vec<LineItem>,
}

/// Caller input for creating or updating an invoice. Numbers, snapshots,
/// totals and timestamps are filled in by the service.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDraft {
    pub client_id: String,
    #[ts(as = "String")]
    pub issue_date: NaiveDate,
    #[ts(as = "Option<String>")]
    pub service_date: Option<NaiveDate>,
    /// Overrides the settings default when present.
    pub payment_terms_days: Option<i64>,
    pub notes: Option<String>,
    pub lines: Vec<LineInput>,
}

// =============================================================================
// Quote
// =============================================================================

/// A quote header. Same snapshot pattern as [`Invoice`], without payment
/// terms (those are decided at conversion time).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: String,
    /// Sequential business number, e.g. `D-2025-0007`. Unique.
    pub quote_number: String,
    pub client_id: String,
    pub status: QuoteStatus,

    #[ts(as = "String")]
    pub issue_date: NaiveDate,
    /// Last day the offer stands. Informational; see [`QuoteStatus`].
    #[ts(as = "String")]
    pub validity_date: NaiveDate,

    // Seller snapshot
    pub seller_name: String,
    pub seller_siret: String,
    pub seller_address: String,
    pub seller_vat_number: Option<String>,

    // Buyer snapshot
    pub buyer_name: String,
    pub buyer_address: String,
    pub buyer_siret: Option<String>,
    pub buyer_is_professional: bool,

    #[ts(as = "String")]
    pub total_ht: Decimal,
    #[ts(as = "String")]
    pub total_vat: Decimal,
    #[ts(as = "String")]
    pub total_ttc: Decimal,

    pub vat_exempt: bool,
    pub vat_exemption_text: Option<String>,

    pub notes: Option<String>,

    /// Set once the quote has been converted; a converted quote is frozen
    /// and can never be converted again.
    pub converted_invoice_id: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Quote {
    /// Whether this quote has already produced an invoice.
    #[inline]
    pub fn is_converted(&self) -> bool {
        self.converted_invoice_id.is_some()
    }
}

/// A quote with its lines, ordered by `sort_order`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct QuoteWithLines {
    #[serde(flatten)]
    #[ts(flatten)]
    pub quote: Quote,
    pub lines: Vec<LineItem>,
}

/// Caller input for creating or updating a quote.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct QuoteDraft {
    pub client_id: String,
    #[ts(as = "String")]
    pub issue_date: NaiveDate,
    #[ts(as = "String")]
    pub validity_date: NaiveDate,
    pub notes: Option<String>,
    pub lines: Vec<LineInput>,
}

// =============================================================================
// Settings
// =============================================================================

/// Issuer profile and document defaults. A single instance exists per
/// installation; document creation fails until it has been saved once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub business_name: String,
    pub first_name: String,
    pub last_name: String,
    /// Seller SIRET, printed on every document.
    pub siret: String,
    pub address: String,
    pub postal_code: String,
    pub city: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub vat_number: Option<String>,

    /// Franchise en base de TVA (article 293 B du CGI).
    pub is_vat_exempt: bool,
    pub vat_exemption_text: String,

    pub default_payment_terms_days: i64,
    /// Late-payment penalty rate (percentage).
    #[ts(as = "String")]
    pub default_late_penalty_rate: Decimal,

    pub invoice_prefix: String,
    pub quote_prefix: String,

    pub legal_form: Option<String>,
    pub rcs_number: Option<String>,
    #[ts(as = "Option<String>")]
    pub share_capital: Option<Decimal>,
    pub payment_methods: String,
    pub iban: Option<String>,
    pub bic: Option<String>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Settings {
    /// Seller display name snapshot: "Business - First Last".
    pub fn seller_name(&self) -> String {
        format!(
            "{} - {} {}",
            self.business_name, self.first_name, self.last_name
        )
    }

    /// Single-line seller address snapshot: "12 rue X, 75001 Paris".
    pub fn seller_address(&self) -> String {
        format!("{}, {} {}", self.address, self.postal_code, self.city)
    }

    /// The legal late-penalty mention with the configured rate inlined.
    /// `normalize()` drops trailing zeros so 3.0 prints as "3".
    pub fn late_penalty_text(&self) -> String {
        format!(
            "En cas de retard de paiement, une pénalité de {}% sera appliquée, \
             conformément à l'article L.441-10 du Code de commerce.",
            self.default_late_penalty_rate.normalize()
        )
    }
}

/// Mutable settings fields, used for save. [`Default`] gives the French
/// micro-entrepreneur defaults with blank identity fields.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SettingsInput {
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
    #[ts(as = "String")]
    pub default_late_penalty_rate: Decimal,
    pub invoice_prefix: String,
    pub quote_prefix: String,
    pub legal_form: Option<String>,
    pub rcs_number: Option<String>,
    #[ts(as = "Option<String>")]
    pub share_capital: Option<Decimal>,
    pub payment_methods: String,
    pub iban: Option<String>,
    pub bic: Option<String>,
}

impl Default for SettingsInput {
    fn default() -> Self {
        SettingsInput {
            business_name: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            siret: String::new(),
            address: String::new(),
            postal_code: String::new(),
            city: String::new(),
            email: None,
            phone: None,
            vat_number: None,
            is_vat_exempt: true,
            vat_exemption_text: crate::VAT_EXEMPTION_TEXT_DEFAULT.to_string(),
            default_payment_terms_days: crate::DEFAULT_PAYMENT_TERMS_DAYS,
            default_late_penalty_rate: Decimal::new(30, 1),
            invoice_prefix: crate::DEFAULT_INVOICE_PREFIX.to_string(),
            quote_prefix: crate::DEFAULT_QUOTE_PREFIX.to_string(),
            legal_form: None,
            rcs_number: None,
            share_capital: None,
            payment_methods: "Virement bancaire".to_string(),
            iban: None,
            bic: None,
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Trims and filters out blank strings.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn client() -> Client {
        Client {
            id: "c-1".to_string(),
            company_name: None,
            first_name: None,
            last_name: None,
            email: None,
            phone: None,
            address: "12 rue de la Paix".to_string(),
            postal_code: "75002".to_string(),
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

    #[test]
    fn test_display_name_prefers_company() {
        let mut c = client();
        c.company_name = Some("ACME SARL".to_string());
        c.first_name = Some("Jean".to_string());
        assert_eq!(c.display_name(), "ACME SARL");
    }

    #[test]
    fn test_display_name_falls_back_to_person() {
        let mut c = client();
        c.first_name = Some("Jean".to_string());
        c.last_name = Some("Dupont".to_string());
        assert_eq!(c.display_name(), "Jean Dupont");

        c.first_name = None;
        assert_eq!(c.display_name(), "Dupont");
    }

    #[test]
    fn test_display_name_blank_company_is_skipped() {
        let mut c = client();
        c.company_name = Some("   ".to_string());
        c.last_name = Some("Dupont".to_string());
        assert_eq!(c.display_name(), "Dupont");
    }

    #[test]
    fn test_display_name_placeholder_when_empty() {
        assert_eq!(client().display_name(), "—");
    }

    #[test]
    fn test_billing_address_composition() {
        assert_eq!(client().billing_address(), "12 rue de la Paix, 75002 Paris");
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&InvoiceStatus::Sent).unwrap();
        assert_eq!(json, "\"sent\"");
        let json = serde_json::to_string(&QuoteStatus::Accepted).unwrap();
        assert_eq!(json, "\"accepted\"");
        let json = serde_json::to_string(&LineUnit::Forfait).unwrap();
        assert_eq!(json, "\"forfait\"");
    }

    #[test]
    fn test_settings_snapshots_and_penalty_text() {
        let mut s = Settings {
            business_name: "Dupont Conseil".to_string(),
            first_name: "Marie".to_string(),
            last_name: "Dupont".to_string(),
            siret: "73282932000074".to_string(),
            address: "3 allée des Tilleuls".to_string(),
            postal_code: "69003".to_string(),
            city: "Lyon".to_string(),
            email: None,
            phone: None,
            vat_number: None,
            is_vat_exempt: true,
            vat_exemption_text: crate::VAT_EXEMPTION_TEXT_DEFAULT.to_string(),
            default_payment_terms_days: 30,
            default_late_penalty_rate: dec!(3.0),
            invoice_prefix: "F".to_string(),
            quote_prefix: "D".to_string(),
            legal_form: None,
            rcs_number: None,
            share_capital: None,
            payment_methods: "Virement bancaire".to_string(),
            iban: None,
            bic: None,
            updated_at: Utc::now(),
        };

        assert_eq!(s.seller_name(), "Dupont Conseil - Marie Dupont");
        assert_eq!(s.seller_address(), "3 allée des Tilleuls, 69003 Lyon");
        // 3.0 normalizes to "3"
        assert!(s.late_penalty_text().contains("pénalité de 3%"));

        s.default_late_penalty_rate = dec!(10.5);
        assert!(s.late_penalty_text().contains("pénalité de 10.5%"));
    }

    #[test]
    fn test_settings_input_defaults() {
        let input = SettingsInput::default();
        assert!(input.is_vat_exempt);
        assert_eq!(input.vat_exemption_text, crate::VAT_EXEMPTION_TEXT_DEFAULT);
        assert_eq!(input.default_payment_terms_days, 30);
        assert_eq!(input.default_late_penalty_rate, dec!(3.0));
        assert_eq!(input.invoice_prefix, "F");
        assert_eq!(input.quote_prefix, "D");
        assert_eq!(input.payment_methods, "Virement bancaire");
    }

    #[test]
    fn test_invoice_with_lines_flattens_header() {
        let invoice = Invoice {
            id: "inv-1".to_string(),
            invoice_number: "F-2025-0001".to_string(),
            client_id: "c-1".to_string(),
            status: InvoiceStatus::Draft,
            issue_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2025, 4, 9).unwrap(),
            service_date: None,
            seller_name: "Dupont Conseil - Marie Dupont".to_string(),
            seller_siret: "73282932000074".to_string(),
            seller_address: "3 allée des Tilleuls, 69003 Lyon".to_string(),
            seller_vat_number: None,
            buyer_name: "ACME SARL".to_string(),
            buyer_address: "12 rue de la Paix, 75002 Paris".to_string(),
            buyer_siret: None,
            buyer_is_professional: true,
            total_ht: dec!(100.00),
            total_vat: dec!(0.00),
            total_ttc: dec!(100.00),
            vat_exempt: true,
            vat_exemption_text: Some(crate::VAT_EXEMPTION_TEXT_DEFAULT.to_string()),
            payment_terms_days: 30,
            late_penalty_rate: dec!(3.0),
            late_penalty_text: "texte".to_string(),
            recovery_costs_text: crate::RECOVERY_COSTS_TEXT.to_string(),
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            finalized_at: None,
        };

        let with_lines = InvoiceWithLines {
            invoice,
            lines: vec![],
        };
        let json = serde_json::to_value(&with_lines).unwrap();
        // Header fields sit at the top level next to `lines`
        assert_eq!(json["invoiceNumber"], "F-2025-0001");
        assert!(json["lines"].is_array());
    }
}
