//! # Money Module
//!
//! Decimal arithmetic for document amounts: per-line totals, document totals,
//! and the VAT breakdown grouped by rate.
//!
//! ## Rounding Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PER-LINE, HALF-UP, TWO DECIMALS                                        │
//! │                                                                         │
//! │  Every rounding step uses half-up (midpoint away from zero):           │
//! │    0.105 → 0.11     0.114 → 0.11     0.115 → 0.12                      │
//! │                                                                         │
//! │  Rounding happens PER LINE, then document totals sum the already-      │
//! │  rounded line amounts:                                                  │
//! │                                                                         │
//! │    line 1: round2(qty × price) ─┐                                      │
//! │    line 2: round2(qty × price) ─┼─► round2(sum)  = document total HT   │
//! │    line 3: round2(qty × price) ─┘                                      │
//! │                                                                         │
//! │  So two lines of 10.004 give 10.00 + 10.00 = 20.00, not 20.01.        │
//! │  The printed line amounts always add up to the printed totals.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use factura_core::money::line_total;
//! use rust_decimal::Decimal;
//!
//! // 2.5 days at 450.00 EUR/day, 20% VAT
//! let totals = line_total(
//!     Decimal::new(25, 1),
//!     Decimal::new(45000, 2),
//!     Decimal::new(20, 0),
//! );
//! assert_eq!(totals.total_ht, Decimal::new(112500, 2));  // 1125.00
//! assert_eq!(totals.total_vat, Decimal::new(22500, 2));  //  225.00
//! assert_eq!(totals.total_ttc, Decimal::new(135000, 2)); // 1350.00
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::types::LineItem;

// =============================================================================
// Rounding
// =============================================================================

/// Rounds to 2 decimal places, half-up (midpoint away from zero).
///
/// ## Example
/// ```rust
/// use factura_core::money::round2;
/// use rust_decimal::Decimal;
///
/// assert_eq!(round2(Decimal::new(105, 3)), Decimal::new(11, 2));  // 0.105 → 0.11
/// assert_eq!(round2(Decimal::new(114, 3)), Decimal::new(11, 2));  // 0.114 → 0.11
/// ```
#[inline]
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

// =============================================================================
// Line Totals
// =============================================================================

/// The three computed amounts of a single document line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineTotals {
    /// Amount excluding VAT (hors taxes).
    #[ts(as = "String")]
    pub total_ht: Decimal,
    /// VAT amount for this line.
    #[ts(as = "String")]
    pub total_vat: Decimal,
    /// Amount including VAT (toutes taxes comprises).
    #[ts(as = "String")]
    pub total_ttc: Decimal,
}

/// Computes the totals of one line, rounding at each stage.
///
/// Each stage rounds before feeding the next, so the TTC amount is always
/// exactly HT + VAT as printed:
///
/// ```text
/// total_ht  = round2(quantity × unit_price_ht)
/// total_vat = round2(total_ht × vat_rate / 100)
/// total_ttc = round2(total_ht + total_vat)
/// ```
///
/// A zero `vat_rate` (VAT-exempt seller) yields `total_vat = 0` and
/// `total_ttc = total_ht`.
pub fn line_total(quantity: Decimal, unit_price_ht: Decimal, vat_rate: Decimal) -> LineTotals {
    let total_ht = round2(quantity * unit_price_ht);
    let total_vat = round2(total_ht * vat_rate / Decimal::ONE_HUNDRED);
    let total_ttc = round2(total_ht + total_vat);

    LineTotals {
        total_ht,
        total_vat,
        total_ttc,
    }
}

// =============================================================================
// Document Totals
// =============================================================================

/// Aggregated totals of a whole document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DocumentTotals {
    #[ts(as = "String")]
    pub total_ht: Decimal,
    #[ts(as = "String")]
    pub total_vat: Decimal,
    #[ts(as = "String")]
    pub total_ttc: Decimal,
}

/// Sums the stored per-line amounts of a document.
///
/// Inputs are the already-rounded line totals; each sum is rounded once more
/// so the stored document totals are normalized to 2 decimals.
pub fn document_totals(lines: &[LineItem]) -> DocumentTotals {
    let mut total_ht = Decimal::ZERO;
    let mut total_vat = Decimal::ZERO;
    let mut total_ttc = Decimal::ZERO;

    for line in lines {
        total_ht += line.total_ht;
        total_vat += line.total_vat;
        total_ttc += line.total_ttc;
    }

    DocumentTotals {
        total_ht: round2(total_ht),
        total_vat: round2(total_vat),
        total_ttc: round2(total_ttc),
    }
}

// =============================================================================
// VAT Breakdown
// =============================================================================

/// One row of the per-rate VAT summary printed on documents with mixed rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct VatBreakdownEntry {
    /// VAT rate as a percentage (e.g. 20 for 20%).
    #[ts(as = "String")]
    pub rate: Decimal,
    /// Sum of line HT amounts taxed at this rate.
    #[ts(as = "String")]
    pub base_ht: Decimal,
    /// Sum of line VAT amounts at this rate.
    #[ts(as = "String")]
    pub vat_amount: Decimal,
}

/// Groups line amounts by VAT rate, ascending.
///
/// Per-rate sums are rounded after aggregation. Lines at rate 0 appear as
/// their own entry with a zero VAT amount.
pub fn vat_breakdown(lines: &[LineItem]) -> Vec<VatBreakdownEntry> {
    // Decimal compares by value, so 20 and 20.0 land in the same bucket.
    let mut groups: BTreeMap<Decimal, (Decimal, Decimal)> = BTreeMap::new();

    for line in lines {
        let entry = groups
            .entry(line.vat_rate)
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        entry.0 += line.total_ht;
        entry.1 += line.total_vat;
    }

    groups
        .into_iter()
        .map(|(rate, (base_ht, vat_amount))| VatBreakdownEntry {
            rate,
            base_ht: round2(base_ht),
            vat_amount: round2(vat_amount),
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
