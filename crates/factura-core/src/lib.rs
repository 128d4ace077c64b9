//! # factura-core: Pure Business Logic for Factura
//!
//! This crate is the **heart** of Factura, an invoicing and quoting core for
//! French sole proprietors (micro-entrepreneurs). It contains all business
//! logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Factura Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 factura-engine (Services)                       │   │
//! │  │   InvoiceService ─ QuoteService ─ ClientRegistry ─ CSV export   │   │
//! │  └───────────┬─────────────────────────────────────┬───────────────┘   │
//! │              │                                     │                    │
//! │  ┌───────────▼─────────────────────┐   ┌───────────▼───────────────┐   │
//! │  │   ★ factura-core (THIS CRATE) ★ │   │   factura-store           │   │
//! │  │                                 │   │                           │   │
//! │  │  ┌───────┐ ┌───────┐ ┌───────┐  │   │  Storage trait            │   │
//! │  │  │ types │ │ money │ │number-│  │   │  ├── SQLite (sqlx)        │   │
//! │  │  │Invoice│ │ VAT   │ │  ing  │  │   │  └── KV (JSON file)       │   │
//! │  │  │ Quote │ │ calc  │ │F-2025-│  │   │                           │   │
//! │  │  │Client │ │round2 │ │  0001 │  │   └───────────────────────────┘   │
//! │  │  └───────┘ └───────┘ └───────┘  │                                    │
//! │  │                                 │                                    │
//! │  │  NO I/O • NO CLOCK • PURE       │                                    │
//! │  └─────────────────────────────────┘                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Invoice, Quote, Client, Settings, line items)
//! - [`money`] - Decimal arithmetic: per-line totals, document totals, VAT breakdown
//! - [`numbering`] - Document number formatting and parsing (`F-2025-0001`)
//! - [`validation`] - Business rule validation, SIRET/SIREN checksums
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system, and clock access are FORBIDDEN here
//! 3. **Exact Decimals**: All monetary values use [`rust_decimal::Decimal`], never floats
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use factura_core::money::line_total;
//! use rust_decimal::Decimal;
//!
//! // 3 hours at 100.00 EUR/h with 20% VAT
//! let totals = line_total(
//!     Decimal::new(3, 0),
//!     Decimal::new(10000, 2),
//!     Decimal::new(20, 0),
//! );
//!
//! assert_eq!(totals.total_ht, Decimal::new(30000, 2));  // 300.00
//! assert_eq!(totals.total_vat, Decimal::new(6000, 2));  //  60.00
//! assert_eq!(totals.total_ttc, Decimal::new(36000, 2)); // 360.00
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod numbering;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use factura_core::Invoice` instead of
// `use factura_core::types::Invoice`

pub use error::{ValidationError, ValidationResult};
pub use money::{DocumentTotals, LineTotals, VatBreakdownEntry};
pub use numbering::DocumentKind;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default VAT exemption mention for micro-entrepreneurs under the
/// franchise en base de TVA (article 293 B du CGI).
///
/// Printed on every document issued by a VAT-exempt seller; French law
/// requires the mention verbatim.
pub const VAT_EXEMPTION_TEXT_DEFAULT: &str = "TVA non applicable, article 293 B du CGI";

/// Fixed recovery-costs mention required on French invoices
/// (article D.441-5 du Code de commerce).
pub const RECOVERY_COSTS_TEXT: &str =
    "Indemnité forfaitaire pour frais de recouvrement : 40 EUR";

/// Default payment terms when neither the draft nor settings say otherwise.
pub const DEFAULT_PAYMENT_TERMS_DAYS: i64 = 30;

/// Default document number prefixes ("F-2025-0001" / "D-2025-0001").
pub const DEFAULT_INVOICE_PREFIX: &str = "F";
pub const DEFAULT_QUOTE_PREFIX: &str = "D";
