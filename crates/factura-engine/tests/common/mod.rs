//! Shared fixtures for the engine integration tests.
//!
//! Every scenario runs against both storage backends through the same
//! `Arc<dyn Storage>` contract. Helpers return `(backend, engine)` pairs so
//! a failing assertion names the backend that diverged.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use factura_core::types::{
    Client, ClientInput, InvoiceDraft, LineInput, LineUnit, QuoteDraft, SettingsInput,
};
use factura_engine::Engine;
use factura_store::{Database, DbConfig, KvStorage, Storage};

/// One engine per backend: SQLite in memory, then the key-value store in
/// memory.
pub async fn engines() -> Vec<(&'static str, Engine)> {
    let db = Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory sqlite");
    let sqlite: Arc<dyn Storage> = Arc::new(db);
    let kv: Arc<dyn Storage> = Arc::new(KvStorage::in_memory());

    vec![("sqlite", Engine::new(sqlite)), ("kv", Engine::new(kv))]
}

/// Engines with the issuer profile already saved, ready for document
/// creation.
pub async fn engines_with_settings() -> Vec<(&'static str, Engine)> {
    let engines = engines().await;
    for (backend, engine) in &engines {
        engine
            .settings()
            .save(settings_input())
            .await
            .unwrap_or_else(|e| panic!("[{backend}] save settings: {e}"));
    }
    engines
}

/// A complete issuer profile. VAT is charged (not franchise en base), terms
/// 30 days, prefixes F / D.
pub fn settings_input() -> SettingsInput {
    SettingsInput {
        business_name: "Dupont Conseil".to_string(),
        first_name: "Marie".to_string(),
        last_name: "Dupont".to_string(),
        siret: "73282932000074".to_string(),
        address: "3 allée des Tilleuls".to_string(),
        postal_code: "69003".to_string(),
        city: "Lyon".to_string(),
        email: Some("contact@dupont-conseil.fr".to_string()),
        phone: None,
        vat_number: Some("FR40303265045".to_string()),
        is_vat_exempt: false,
        default_payment_terms_days: 30,
        default_late_penalty_rate: dec!(3.0),
        iban: Some("FR7630001007941234567890185".to_string()),
        bic: Some("BDFEFRPP".to_string()),
        ..SettingsInput::default()
    }
}

/// A professional client with a full billing address.
pub fn client_input(company: &str) -> ClientInput {
    ClientInput {
        company_name: Some(company.to_string()),
        address: "4 avenue Victor Hugo".to_string(),
        postal_code: "75116".to_string(),
        city: "Paris".to_string(),
        country: "France".to_string(),
        siret: Some("55210055400013".to_string()),
        is_professional: true,
        ..ClientInput::default()
    }
}

/// Creates the standard client and returns it.
pub async fn create_client(backend: &str, engine: &Engine, company: &str) -> Client {
    engine
        .clients()
        .create(client_input(company))
        .await
        .unwrap_or_else(|e| panic!("[{backend}] create client: {e}"))
}

pub fn line(
    description: &str,
    quantity: Decimal,
    unit: LineUnit,
    unit_price_ht: Decimal,
    vat_rate: Decimal,
) -> LineInput {
    LineInput {
        description: description.to_string(),
        quantity,
        unit,
        unit_price_ht,
        vat_rate,
    }
}

/// Two lines totalling 250.00 HT / 45.00 TVA / 295.00 TTC.
pub fn consulting_lines() -> Vec<LineInput> {
    vec![
        line("Développement", dec!(2), LineUnit::Jour, dec!(100.00), dec!(20)),
        line("Maintenance", dec!(1), LineUnit::Forfait, dec!(50.00), dec!(10)),
    ]
}

/// A draft dated today with no payment-terms override.
pub fn invoice_draft(client_id: &str, lines: Vec<LineInput>) -> InvoiceDraft {
    InvoiceDraft {
        client_id: client_id.to_string(),
        issue_date: Utc::now().date_naive(),
        service_date: None,
        payment_terms_days: None,
        notes: None,
        lines,
    }
}

/// A quote dated today, valid for 30 days.
pub fn quote_draft(client_id: &str, lines: Vec<LineInput>) -> QuoteDraft {
    let today = Utc::now().date_naive();
    QuoteDraft {
        client_id: client_id.to_string(),
        issue_date: today,
        validity_date: today + Duration::days(30),
        notes: None,
        lines,
    }
}
