//! Line construction shared by the invoice and quote services.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::EngineResult;
use factura_core::money::line_total;
use factura_core::validation::{validate_line, validate_vat_rate};
use factura_core::{LineInput, LineItem};

/// Validates each input line, computes its totals and assigns ids and dense
/// zero-based positions. Caller-supplied ordering is the input order.
///
/// When the issuer is VAT-exempt every rate is forced to 0 regardless of
/// input; otherwise the rate must be one of the allowed French rates.
pub(crate) fn build_lines(inputs: &[LineInput], vat_exempt: bool) -> EngineResult<Vec<LineItem>> {
    let mut lines = Vec::with_capacity(inputs.len());

    for (position, input) in inputs.iter().enumerate() {
        validate_line(input)?;

        let vat_rate = if vat_exempt {
            Decimal::ZERO
        } else {
            validate_vat_rate(input.vat_rate)?;
            input.vat_rate
        };

        let totals = line_total(input.quantity, input.unit_price_ht, vat_rate);

        lines.push(LineItem {
            id: Uuid::new_v4().to_string(),
            description: input.description.trim().to_string(),
            quantity: input.quantity,
            unit: input.unit,
            unit_price_ht: input.unit_price_ht,
            vat_rate,
            total_ht: totals.total_ht,
            total_vat: totals.total_vat,
            total_ttc: totals.total_ttc,
            sort_order: position as i64,
        });
    }

    Ok(lines)
}
