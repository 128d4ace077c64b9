//! # Document Number Allocation
//!
//! Produces the next `PREFIX-YYYY-NNNN` number by scanning the stored
//! maximum for the prefix/year pair and incrementing its trailing sequence.
//!
//! ## Allocation Flow
//! ```text
//! next_number(Invoice, "F", 2025)
//!      │
//!      ▼
//! store.max_number(Invoice, "F-2025-%")     ──► Some("F-2025-0012")
//!      │
//!      ▼
//! parse trailing sequence (12) + 1          ──► 13
//!      │
//!      ▼
//! "F-2025-0013"
//! ```
//!
//! A malformed or missing maximum restarts the sequence at 1, so a store
//! restored from a partial backup still produces usable numbers. Sequences
//! are zero-padded to four digits and keep counting past 9999.

use std::sync::Arc;

use tracing::debug;

use crate::error::EngineResult;
use factura_core::numbering::{self, DocumentKind};
use factura_store::Storage;

// =============================================================================
// Numbering Service
// =============================================================================

/// Allocates document numbers from the stored maximum.
///
/// Allocation is read-then-format; the UNIQUE constraint on the number
/// column is the final arbiter if two writers race.
pub struct NumberingService {
    store: Arc<dyn Storage>,
}

impl NumberingService {
    pub fn new(store: Arc<dyn Storage>) -> Self {
        NumberingService { store }
    }

    /// Computes the next number for `kind` under `prefix`, scoped to `year`.
    pub async fn next_number(
        &self,
        kind: DocumentKind,
        prefix: &str,
        year: i32,
    ) -> EngineResult<String> {
        let pattern = numbering::like_pattern(prefix, year);
        let current_max = self.store.max_number(kind, &pattern).await?;
        let sequence = numbering::next_sequence(current_max.as_deref());
        let number = numbering::format_number(prefix, year, sequence);

        debug!(
            kind = %kind_label(kind),
            previous = current_max.as_deref().unwrap_or("<none>"),
            number = %number,
            "Allocated document number"
        );

        Ok(number)
    }
}

fn kind_label(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::Invoice => "invoice",
        DocumentKind::Quote => "quote",
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
