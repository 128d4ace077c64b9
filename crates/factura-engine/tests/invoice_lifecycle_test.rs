//! Invoice lifecycle end to end: creation with snapshots and totals,
//! finalization immutability, payment and cancellation rules. Every scenario
//! runs on both backends.

mod common;

use chrono::Duration;
use rust_decimal_macros::dec;

use factura_core::types::{InvoiceStatus, LineUnit};
use factura_core::VAT_EXEMPTION_TEXT_DEFAULT;
use factura_engine::EngineError;

#[tokio::test]
async fn test_create_computes_totals_and_snapshots() {
    for (backend, engine) in common::engines_with_settings().await {
        let client = common::create_client(backend, &engine, "ACME SARL").await;
        let draft = common::invoice_draft(&client.id, common::consulting_lines());
        let issue_date = draft.issue_date;

        let created = engine.invoices().create(draft).await.unwrap();
        let invoice = &created.invoice;

        assert_eq!(invoice.status, InvoiceStatus::Draft, "[{backend}]");
        assert!(invoice.finalized_at.is_none(), "[{backend}]");
        assert_eq!(invoice.due_date, issue_date + Duration::days(30), "[{backend}]");

        // Issuer and client are frozen into the document.
        assert_eq!(invoice.seller_name, "Dupont Conseil", "[{backend}]");
        assert_eq!(invoice.seller_siret, "73282932000074", "[{backend}]");
        assert_eq!(invoice.buyer_name, "ACME SARL", "[{backend}]");
        assert!(invoice.buyer_is_professional, "[{backend}]");

        // 2 x 100.00 at 20% plus 1 x 50.00 at 10%.
        assert_eq!(invoice.total_ht, dec!(250.00), "[{backend}]");
        assert_eq!(invoice.total_vat, dec!(45.00), "[{backend}]");
        assert_eq!(invoice.total_ttc, dec!(295.00), "[{backend}]");

        assert_eq!(created.lines.len(), 2, "[{backend}]");
        assert_eq!(created.lines[0].sort_order, 0, "[{backend}]");
        assert_eq!(created.lines[0].total_ttc, dec!(240.00), "[{backend}]");
        assert_eq!(created.lines[1].sort_order, 1, "[{backend}]");
        assert_eq!(created.lines[1].total_ttc, dec!(55.00), "[{backend}]");
    }
}

#[tokio::test]
async fn test_create_without_settings_fails() {
    for (backend, engine) in common::engines().await {
        let result = engine
            .invoices()
            .create(common::invoice_draft("c-any", common::consulting_lines()))
            .await;
        assert!(
            matches!(result, Err(EngineError::SettingsMissing)),
            "[{backend}] got {result:?}"
        );
    }
}

#[tokio::test]
async fn test_create_with_unknown_client_fails() {
    for (backend, engine) in common::engines_with_settings().await {
        let result = engine
            .invoices()
            .create(common::invoice_draft("c-404", common::consulting_lines()))
            .await;
        assert!(
            matches!(result, Err(EngineError::NotFound { entity: "Client", .. })),
            "[{backend}] got {result:?}"
        );
    }
}

#[tokio::test]
async fn test_payment_terms_override() {
    for (backend, engine) in common::engines_with_settings().await {
        let client = common::create_client(backend, &engine, "ACME SARL").await;
        let mut draft = common::invoice_draft(&client.id, common::consulting_lines());
        draft.payment_terms_days = Some(60);
        let issue_date = draft.issue_date;

        let created = engine.invoices().create(draft).await.unwrap();
        assert_eq!(created.invoice.payment_terms_days, 60, "[{backend}]");
        assert_eq!(
            created.invoice.due_date,
            issue_date + Duration::days(60),
            "[{backend}]"
        );
    }
}

#[tokio::test]
async fn test_finalize_moves_to_sent_and_freezes_content() {
    for (backend, engine) in common::engines_with_settings().await {
        let client = common::create_client(backend, &engine, "ACME SARL").await;
        let invoices = engine.invoices();
        let created = invoices
            .create(common::invoice_draft(&client.id, common::consulting_lines()))
            .await
            .unwrap();

        let finalized = invoices.finalize(&created.invoice.id).await.unwrap();
        assert_eq!(finalized.invoice.status, InvoiceStatus::Sent, "[{backend}]");
        assert!(finalized.invoice.finalized_at.is_some(), "[{backend}]");
        assert_eq!(
            finalized.invoice.invoice_number, created.invoice.invoice_number,
            "[{backend}] finalization keeps the allocated number"
        );

        // Content updates are refused and change nothing.
        let update = invoices
            .update(
                &created.invoice.id,
                common::invoice_draft(&client.id, vec![common::line(
                    "Tentative de modification",
                    dec!(1),
                    LineUnit::Forfait,
                    dec!(9999.00),
                    dec!(20),
                )]),
            )
            .await;
        assert!(
            matches!(update, Err(EngineError::FinalizedDocument { .. })),
            "[{backend}] got {update:?}"
        );

        let after = invoices.get(&created.invoice.id).await.unwrap();
        assert_eq!(after, finalized, "[{backend}] document unchanged after refused update");
    }
}

#[tokio::test]
async fn test_finalize_is_idempotent() {
    for (backend, engine) in common::engines_with_settings().await {
        let client = common::create_client(backend, &engine, "ACME SARL").await;
        let invoices = engine.invoices();
        let created = invoices
            .create(common::invoice_draft(&client.id, common::consulting_lines()))
            .await
            .unwrap();

        let first = invoices.finalize(&created.invoice.id).await.unwrap();
        let second = invoices.finalize(&created.invoice.id).await.unwrap();

        assert_eq!(
            first.invoice.finalized_at, second.invoice.finalized_at,
            "[{backend}] the first stamp stands"
        );
        assert_eq!(second.invoice.status, InvoiceStatus::Sent, "[{backend}]");
    }
}

#[tokio::test]
async fn test_mark_paid_requires_sent() {
    for (backend, engine) in common::engines_with_settings().await {
        let client = common::create_client(backend, &engine, "ACME SARL").await;
        let invoices = engine.invoices();
        let created = invoices
            .create(common::invoice_draft(&client.id, common::consulting_lines()))
            .await
            .unwrap();

        let premature = invoices.mark_paid(&created.invoice.id).await;
        assert!(
            matches!(premature, Err(EngineError::InvalidTransition { .. })),
            "[{backend}] draft cannot be paid, got {premature:?}"
        );

        invoices.finalize(&created.invoice.id).await.unwrap();
        let paid = invoices.mark_paid(&created.invoice.id).await.unwrap();
        assert_eq!(paid.status, InvoiceStatus::Paid, "[{backend}]");
    }
}

#[tokio::test]
async fn test_cancel_rules() {
    for (backend, engine) in common::engines_with_settings().await {
        let client = common::create_client(backend, &engine, "ACME SARL").await;
        let invoices = engine.invoices();

        // A draft cancels, then stays cancelled.
        let draft = invoices
            .create(common::invoice_draft(&client.id, common::consulting_lines()))
            .await
            .unwrap();
        let cancelled = invoices.cancel(&draft.invoice.id).await.unwrap();
        assert_eq!(cancelled.status, InvoiceStatus::Cancelled, "[{backend}]");
        let again = invoices.cancel(&draft.invoice.id).await;
        assert!(
            matches!(again, Err(EngineError::InvalidTransition { .. })),
            "[{backend}] got {again:?}"
        );

        // A sent invoice cancels.
        let sent = invoices
            .create(common::invoice_draft(&client.id, common::consulting_lines()))
            .await
            .unwrap();
        invoices.finalize(&sent.invoice.id).await.unwrap();
        let cancelled = invoices.cancel(&sent.invoice.id).await.unwrap();
        assert_eq!(cancelled.status, InvoiceStatus::Cancelled, "[{backend}]");

        // A paid invoice does not.
        let paid = invoices
            .create(common::invoice_draft(&client.id, common::consulting_lines()))
            .await
            .unwrap();
        invoices.finalize(&paid.invoice.id).await.unwrap();
        invoices.mark_paid(&paid.invoice.id).await.unwrap();
        let refused = invoices.cancel(&paid.invoice.id).await;
        assert!(
            matches!(refused, Err(EngineError::InvalidTransition { .. })),
            "[{backend}] got {refused:?}"
        );
    }
}

#[tokio::test]
async fn test_finalize_cancelled_invoice_rejected() {
    for (backend, engine) in common::engines_with_settings().await {
        let client = common::create_client(backend, &engine, "ACME SARL").await;
        let invoices = engine.invoices();
        let created = invoices
            .create(common::invoice_draft(&client.id, common::consulting_lines()))
            .await
            .unwrap();

        invoices.cancel(&created.invoice.id).await.unwrap();
        let result = invoices.finalize(&created.invoice.id).await;
        assert!(
            matches!(result, Err(EngineError::InvalidTransition { .. })),
            "[{backend}] got {result:?}"
        );
    }
}

#[tokio::test]
async fn test_update_draft_refreshes_snapshots_and_totals() {
    for (backend, engine) in common::engines_with_settings().await {
        let client = common::create_client(backend, &engine, "ACME SARL").await;
        let invoices = engine.invoices();
        let created = invoices
            .create(common::invoice_draft(&client.id, common::consulting_lines()))
            .await
            .unwrap();

        // The client was renamed since the draft was written.
        engine
            .clients()
            .update(&client.id, common::client_input("ACME Industries SARL"))
            .await
            .unwrap();

        let updated = invoices
            .update(
                &created.invoice.id,
                common::invoice_draft(&client.id, vec![common::line(
                    "Audit",
                    dec!(3),
                    LineUnit::Jour,
                    dec!(400.00),
                    dec!(20),
                )]),
            )
            .await
            .unwrap();

        assert_eq!(updated.invoice.buyer_name, "ACME Industries SARL", "[{backend}]");
        assert_eq!(
            updated.invoice.invoice_number, created.invoice.invoice_number,
            "[{backend}] number survives content edits"
        );
        assert_eq!(updated.invoice.created_at, created.invoice.created_at, "[{backend}]");
        assert_eq!(updated.invoice.total_ht, dec!(1200.00), "[{backend}]");
        assert_eq!(updated.invoice.total_ttc, dec!(1440.00), "[{backend}]");
        assert_eq!(updated.lines.len(), 1, "[{backend}]");
    }
}

#[tokio::test]
async fn test_vat_exempt_profile_zeroes_rates() {
    for (backend, engine) in common::engines().await {
        let mut settings = common::settings_input();
        settings.is_vat_exempt = true;
        engine.settings().save(settings).await.unwrap();

        let client = common::create_client(backend, &engine, "ACME SARL").await;
        let created = engine
            .invoices()
            .create(common::invoice_draft(&client.id, common::consulting_lines()))
            .await
            .unwrap();

        assert!(created.invoice.vat_exempt, "[{backend}]");
        assert_eq!(
            created.invoice.vat_exemption_text.as_deref(),
            Some(VAT_EXEMPTION_TEXT_DEFAULT),
            "[{backend}]"
        );
        assert_eq!(created.invoice.total_vat, dec!(0), "[{backend}]");
        assert_eq!(created.invoice.total_ht, created.invoice.total_ttc, "[{backend}]");
        for line in &created.lines {
            assert_eq!(line.vat_rate, dec!(0), "[{backend}] line {}", line.description);
        }
    }
}
