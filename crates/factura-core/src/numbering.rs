//! # Document Numbering
//!
//! Formatting and parsing of sequential document numbers.
//!
//! ## Number Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   F-2025-0042                                                           │
//! │   │  │     │                                                            │
//! │   │  │     └─ sequence, zero-padded to 4, restarts at 1 each year      │
//! │   │  └─────── issuing year                                              │
//! │   └────────── configurable prefix ("F" invoices, "D" quotes)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Invoices and quotes number independently, and each prefix+year pair has
//! its own sequence. The next sequence is derived from the highest existing
//! number for the prefix+year; gaps from cancelled documents are never
//! reused, and a cancelled number stays taken.
//!
//! These functions are pure. The storage layer supplies the current maximum
//! (see the engine's `NumberingService`); the year is an input, never read
//! from a clock here.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Document Kind
// =============================================================================

/// Which independent numbering sequence a document belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Invoice,
    Quote,
}

// =============================================================================
// Formatting and Parsing
// =============================================================================

/// Formats a document number: `format_number("F", 2025, 42)` = `"F-2025-0042"`.
///
/// Sequences past 9999 widen naturally instead of wrapping.
#[inline]
pub fn format_number(prefix: &str, year: i32, sequence: u32) -> String {
    format!("{prefix}-{year}-{sequence:04}")
}

/// The SQL LIKE pattern matching all numbers of a prefix+year:
/// `like_pattern("F", 2025)` = `"F-2025-%"`.
#[inline]
pub fn like_pattern(prefix: &str, year: i32) -> String {
    format!("{prefix}-{year}-%")
}

/// Extracts the trailing sequence from a document number.
///
/// Takes everything after the last `-` and parses it as a number.
/// Returns `None` for malformed input, which callers treat as "start
/// the sequence at 1".
///
/// ## Example
/// ```rust
/// use factura_core::numbering::parse_sequence;
///
/// assert_eq!(parse_sequence("F-2025-0041"), Some(41));
/// assert_eq!(parse_sequence("F-2025-BAD"), None);
/// ```
pub fn parse_sequence(number: &str) -> Option<u32> {
    number.rsplit('-').next()?.parse().ok()
}

/// Checks the `PREFIX-YYYY-NNNN` shape: non-empty alphanumeric prefix,
/// 4-digit year, sequence of at least 4 digits.
pub fn is_valid_number(number: &str) -> bool {
    let parts: Vec<&str> = number.split('-').collect();
    if parts.len() != 3 {
        return false;
    }

    let (prefix, year, seq) = (parts[0], parts[1], parts[2]);

    !prefix.is_empty()
        && prefix.chars().all(|c| c.is_ascii_alphanumeric())
        && year.len() == 4
        && year.chars().all(|c| c.is_ascii_digit())
        && seq.len() >= 4
        && seq.chars().all(|c| c.is_ascii_digit())
}

/// The sequence that follows `current_max`, where `current_max` is the
/// highest existing number for a prefix+year (or `None` when the sequence
/// is empty). Malformed maxima restart the sequence at 1.
pub fn next_sequence(current_max: Option<&str>) -> u32 {
    match current_max.and_then(parse_sequence) {
        Some(seq) => seq + 1,
        None => 1,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
