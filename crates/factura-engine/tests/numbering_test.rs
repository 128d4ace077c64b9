//! Number allocation across persisted documents, on both backends.
//!
//! Numbers are year-scoped per prefix: `F-2025-0001`, `F-2025-0002`, ... with
//! invoices and quotes counting independently.

mod common;

use chrono::{Datelike, Utc};
use rust_decimal_macros::dec;

use factura_core::types::{Invoice, InvoiceStatus};

/// A minimal invoice row for seeding the store directly.
fn raw_invoice(client_id: &str, number: &str) -> Invoice {
    let today = Utc::now().date_naive();
    let now = Utc::now();
    Invoice {
        id: format!("raw-{number}"),
        invoice_number: number.to_string(),
        client_id: client_id.to_string(),
        status: InvoiceStatus::Draft,
        issue_date: today,
        due_date: today,
        service_date: None,
        seller_name: "Dupont Conseil".to_string(),
        seller_siret: "73282932000074".to_string(),
        seller_address: "3 allée des Tilleuls, 69003 Lyon".to_string(),
        seller_vat_number: None,
        buyer_name: "ACME SARL".to_string(),
        buyer_address: "4 avenue Victor Hugo, 75116 Paris".to_string(),
        buyer_siret: None,
        buyer_is_professional: true,
        total_ht: dec!(0),
        total_vat: dec!(0),
        total_ttc: dec!(0),
        vat_exempt: false,
        vat_exemption_text: None,
        payment_terms_days: 30,
        late_penalty_rate: dec!(3.0),
        late_penalty_text: String::new(),
        recovery_costs_text: String::new(),
        notes: None,
        created_at: now,
        updated_at: now,
        finalized_at: None,
    }
}

#[tokio::test]
async fn test_invoice_numbers_increment_within_year() {
    let year = Utc::now().year();

    for (backend, engine) in common::engines_with_settings().await {
        let client = common::create_client(backend, &engine, "ACME SARL").await;
        let invoices = engine.invoices();

        for expected in [
            format!("F-{year}-0001"),
            format!("F-{year}-0002"),
            format!("F-{year}-0003"),
        ] {
            let created = invoices
                .create(common::invoice_draft(&client.id, common::consulting_lines()))
                .await
                .unwrap();
            assert_eq!(
                created.invoice.invoice_number, expected,
                "[{backend}] allocated number"
            );
        }
    }
}

#[tokio::test]
async fn test_invoice_and_quote_sequences_are_independent() {
    let year = Utc::now().year();

    for (backend, engine) in common::engines_with_settings().await {
        let client = common::create_client(backend, &engine, "ACME SARL").await;

        let invoice = engine
            .invoices()
            .create(common::invoice_draft(&client.id, common::consulting_lines()))
            .await
            .unwrap();
        let quote = engine
            .quotes()
            .create(common::quote_draft(&client.id, common::consulting_lines()))
            .await
            .unwrap();
        let second_invoice = engine
            .invoices()
            .create(common::invoice_draft(&client.id, common::consulting_lines()))
            .await
            .unwrap();

        assert_eq!(invoice.invoice.invoice_number, format!("F-{year}-0001"), "[{backend}]");
        assert_eq!(quote.quote.quote_number, format!("D-{year}-0001"), "[{backend}]");
        assert_eq!(
            second_invoice.invoice.invoice_number,
            format!("F-{year}-0002"),
            "[{backend}] quote allocation must not advance the invoice sequence"
        );
    }
}

#[tokio::test]
async fn test_custom_prefix_scopes_its_own_sequence() {
    let year = Utc::now().year();

    for (backend, engine) in common::engines().await {
        let mut settings = common::settings_input();
        settings.invoice_prefix = "FAC".to_string();
        engine.settings().save(settings).await.unwrap();

        let client = common::create_client(backend, &engine, "ACME SARL").await;
        let created = engine
            .invoices()
            .create(common::invoice_draft(&client.id, common::consulting_lines()))
            .await
            .unwrap();

        assert_eq!(
            created.invoice.invoice_number,
            format!("FAC-{year}-0001"),
            "[{backend}]"
        );
    }
}

#[tokio::test]
async fn test_malformed_stored_maximum_restarts_at_one() {
    let year = Utc::now().year();

    for (backend, engine) in common::engines_with_settings().await {
        let client = common::create_client(backend, &engine, "ACME SARL").await;

        // A hand-written row whose trailing sequence does not parse, as a
        // partial restore might leave behind.
        let rogue = raw_invoice(&client.id, &format!("F-{year}-BAD"));
        engine.store().insert_invoice(&rogue, &[]).await.unwrap();

        let created = engine
            .invoices()
            .create(common::invoice_draft(&client.id, common::consulting_lines()))
            .await
            .unwrap();
        assert_eq!(
            created.invoice.invoice_number,
            format!("F-{year}-0001"),
            "[{backend}] unparseable maximum falls back to sequence 1"
        );
    }
}

#[tokio::test]
async fn test_sequence_counts_past_existing_maximum() {
    let year = Utc::now().year();

    for (backend, engine) in common::engines_with_settings().await {
        let client = common::create_client(backend, &engine, "ACME SARL").await;

        let rogue = raw_invoice(&client.id, &format!("F-{year}-0041"));
        engine.store().insert_invoice(&rogue, &[]).await.unwrap();

        let created = engine
            .invoices()
            .create(common::invoice_draft(&client.id, common::consulting_lines()))
            .await
            .unwrap();
        assert_eq!(
            created.invoice.invoice_number,
            format!("F-{year}-0042"),
            "[{backend}]"
        );
    }
}
