//! # CSV Export
//!
//! Spreadsheet-friendly dumps of the document registers. Pure functions
//! over stored headers; amounts and dates are formatted, never recomputed.
//!
//! ## Format
//! - UTF-8 with a BOM prefix so Excel detects the encoding
//! - Semicolon separator, CRLF line endings
//! - Dates as DD/MM/YYYY, amounts with a French decimal comma
//! - Fields containing a separator, quote or newline are double-quoted,
//!   embedded quotes doubled

use factura_core::money::round2;
use factura_core::{Invoice, InvoiceStatus, Quote, QuoteStatus};
use rust_decimal::Decimal;

/// Byte-order mark; Excel needs it to pick UTF-8.
const BOM: &str = "\u{FEFF}";

const INVOICE_HEADERS: [&str; 10] = [
    "Numero",
    "Date emission",
    "Date echeance",
    "Client",
    "SIRET client",
    "Total HT",
    "TVA",
    "Total TTC",
    "Statut",
    "Date paiement",
];

const QUOTE_HEADERS: [&str; 9] = [
    "Numero",
    "Date emission",
    "Date validite",
    "Client",
    "SIRET client",
    "Total HT",
    "TVA",
    "Total TTC",
    "Statut",
];

// =============================================================================
// Status Labels
// =============================================================================

/// French label for an invoice status.
pub fn invoice_status_label(status: InvoiceStatus) -> &'static str {
    match status {
        InvoiceStatus::Draft => "Brouillon",
        InvoiceStatus::Sent => "Envoyee",
        InvoiceStatus::Paid => "Payee",
        InvoiceStatus::Cancelled => "Annulee",
    }
}

/// French label for a quote status.
pub fn quote_status_label(status: QuoteStatus) -> &'static str {
    match status {
        QuoteStatus::Draft => "Brouillon",
        QuoteStatus::Sent => "Envoye",
        QuoteStatus::Accepted => "Accepte",
        QuoteStatus::Rejected => "Refuse",
        QuoteStatus::Expired => "Expire",
    }
}

// =============================================================================
// Exports
// =============================================================================

/// Renders the invoice register.
///
/// The payment date column holds `updated_at` for paid invoices (the last
/// touch on a paid invoice is the mark-paid action) and stays empty
/// otherwise.
pub fn invoices_to_csv(invoices: &[Invoice]) -> String {
    let mut out = String::from(BOM);
    out.push_str(&INVOICE_HEADERS.join(";"));

    for invoice in invoices {
        let payment_date = match invoice.status {
            InvoiceStatus::Paid => invoice.updated_at.date_naive().format("%d/%m/%Y").to_string(),
            InvoiceStatus::Draft | InvoiceStatus::Sent | InvoiceStatus::Cancelled => String::new(),
        };

        let row = [
            escape_field(&invoice.invoice_number),
            escape_field(&invoice.issue_date.format("%d/%m/%Y").to_string()),
            escape_field(&invoice.due_date.format("%d/%m/%Y").to_string()),
            escape_field(&invoice.buyer_name),
            escape_field(invoice.buyer_siret.as_deref().unwrap_or("")),
            escape_field(&format_amount(invoice.total_ht)),
            escape_field(&format_amount(invoice.total_vat)),
            escape_field(&format_amount(invoice.total_ttc)),
            escape_field(invoice_status_label(invoice.status)),
            escape_field(&payment_date),
        ];

        out.push_str("\r\n");
        out.push_str(&row.join(";"));
    }

    out
}

/// Renders the quote register.
pub fn quotes_to_csv(quotes: &[Quote]) -> String {
    let mut out = String::from(BOM);
    out.push_str(&QUOTE_HEADERS.join(";"));

    for quote in quotes {
        let row = [
            escape_field(&quote.quote_number),
            escape_field(&quote.issue_date.format("%d/%m/%Y").to_string()),
            escape_field(&quote.validity_date.format("%d/%m/%Y").to_string()),
            escape_field(&quote.buyer_name),
            escape_field(quote.buyer_siret.as_deref().unwrap_or("")),
            escape_field(&format_amount(quote.total_ht)),
            escape_field(&format_amount(quote.total_vat)),
            escape_field(&format_amount(quote.total_ttc)),
            escape_field(quote_status_label(quote.status)),
        ];

        out.push_str("\r\n");
        out.push_str(&row.join(";"));
    }

    out
}

// =============================================================================
// Field Formatting
// =============================================================================

/// "1234.5" to "1234,50". Stored totals are already at two decimals, so
/// this only pads.
fn format_amount(value: Decimal) -> String {
    format!("{:.2}", round2(value)).replace('.', ",")
}

fn escape_field(value: &str) -> String {
    if value.contains(';') || value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn invoice(status: InvoiceStatus) -> Invoice {
        Invoice {
            id: "inv-1".to_string(),
            invoice_number: "F-2025-0001".to_string(),
            client_id: "c-1".to_string(),
            status,
            issue_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2025, 4, 9).unwrap(),
            service_date: None,
            seller_name: "Dupont Conseil - Marie Dupont".to_string(),
            seller_siret: "73282932000074".to_string(),
            seller_address: "8 rue des Lilas, 69003 Lyon".to_string(),
            seller_vat_number: None,
            buyer_name: "ACME; SARL".to_string(),
            buyer_address: "1 rue Test, 75001 Paris".to_string(),
            buyer_siret: Some("12345678900012".to_string()),
            buyer_is_professional: true,
            total_ht: dec!(1234.5),
            total_vat: dec!(246.9),
            total_ttc: dec!(1481.4),
            vat_exempt: false,
            vat_exemption_text: None,
            payment_terms_days: 30,
            late_penalty_rate: dec!(3.0),
            late_penalty_text: "penalites".to_string(),
            recovery_costs_text: "recouvrement".to_string(),
            notes: None,
            created_at: Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2025, 5, 2, 14, 30, 0).unwrap(),
            finalized_at: None,
        }
    }

    #[test]
    fn test_bom_and_headers() {
        let csv = invoices_to_csv(&[]);
        assert!(csv.starts_with('\u{FEFF}'));
        assert_eq!(
            &csv[3..],
            "Numero;Date emission;Date echeance;Client;SIRET client;Total HT;TVA;Total TTC;Statut;Date paiement"
        );
    }

    #[test]
    fn test_invoice_row_formatting() {
        let csv = invoices_to_csv(&[invoice(InvoiceStatus::Sent)]);
        let lines: Vec<&str> = csv.split("\r\n").collect();
        assert_eq!(lines.len(), 2);

        // Semicolon inside the buyer name forces quoting; amounts use a
        // decimal comma and dates DD/MM/YYYY
        assert_eq!(
            lines[1],
            "F-2025-0001;10/03/2025;09/04/2025;\"ACME; SARL\";12345678900012;1234,50;246,90;1481,40;Envoyee;"
        );
    }

    #[test]
    fn test_payment_date_only_when_paid() {
        let csv = invoices_to_csv(&[invoice(InvoiceStatus::Paid)]);
        assert!(csv.ends_with(";Payee;02/05/2025"));

        let csv = invoices_to_csv(&[invoice(InvoiceStatus::Cancelled)]);
        assert!(csv.ends_with(";Annulee;"));
    }

    #[test]
    fn test_embedded_quotes_doubled() {
        assert_eq!(escape_field("dit \"oui\""), "\"dit \"\"oui\"\"\"");
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
    }

    #[test]
    fn test_quote_labels_exhaustive() {
        assert_eq!(quote_status_label(QuoteStatus::Draft), "Brouillon");
        assert_eq!(quote_status_label(QuoteStatus::Sent), "Envoye");
        assert_eq!(quote_status_label(QuoteStatus::Accepted), "Accepte");
        assert_eq!(quote_status_label(QuoteStatus::Rejected), "Refuse");
        assert_eq!(quote_status_label(QuoteStatus::Expired), "Expire");
    }

    #[test]
    fn test_quotes_csv_shape() {
        let quote = Quote {
            id: "q-1".to_string(),
            quote_number: "D-2025-0002".to_string(),
            client_id: "c-1".to_string(),
            status: QuoteStatus::Accepted,
            issue_date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            validity_date: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
            seller_name: "Dupont Conseil - Marie Dupont".to_string(),
            seller_siret: "73282932000074".to_string(),
            seller_address: "8 rue des Lilas, 69003 Lyon".to_string(),
            seller_vat_number: None,
            buyer_name: "Petit Atelier".to_string(),
            buyer_address: "4 rue Neuve, 33000 Bordeaux".to_string(),
            buyer_siret: None,
            buyer_is_professional: false,
            total_ht: dec!(500),
            total_vat: dec!(0),
            total_ttc: dec!(500),
            vat_exempt: true,
            vat_exemption_text: Some("TVA non applicable".to_string()),
            notes: None,
            converted_invoice_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let csv = quotes_to_csv(&[quote]);
        let lines: Vec<&str> = csv.split("\r\n").collect();
        assert_eq!(
            lines[1],
            "D-2025-0002;01/02/2025;03/03/2025;Petit Atelier;;500,00;0,00;500,00;Accepte"
        );
    }
}
