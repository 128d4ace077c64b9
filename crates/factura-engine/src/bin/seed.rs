//! # Seed Data Generator
//!
//! Populates a database with demo data for development: an issuer profile,
//! a client roster, and invoices/quotes spread across every lifecycle
//! state (one quote converted into an invoice).
//!
//! ## Usage
//! ```bash
//! # Seed with defaults (8 clients, 24 documents)
//! cargo run -p factura-engine --bin factura-seed
//!
//! # Custom volumes and database path
//! cargo run -p factura-engine --bin factura-seed -- --db ./data/factura.db --clients 12 --docs 40
//! ```

use std::env;
use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;

use factura_core::{ClientInput, InvoiceDraft, LineInput, LineUnit, QuoteDraft, SettingsInput};
use factura_engine::Engine;
use factura_store::{Database, DbConfig, Storage};

/// Company-style clients.
const COMPANIES: &[&str] = &[
    "Atelier Lumiere SARL",
    "Studio Verne",
    "Boulangerie Martin",
    "Cabinet Arnaud",
    "Transports Leclerc",
    "Librairie du Canal",
    "Menuiserie Delorme",
    "Imprimerie Pascal",
];

/// Individual clients (first name, last name).
const PEOPLE: &[(&str, &str)] = &[
    ("Claire", "Moreau"),
    ("Julien", "Petit"),
    ("Sophie", "Garnier"),
    ("Thomas", "Roux"),
    ("Emma", "Chevalier"),
    ("Lucas", "Faure"),
];

const CITIES: &[(&str, &str)] = &[
    ("69001", "Lyon"),
    ("75011", "Paris"),
    ("33000", "Bordeaux"),
    ("44000", "Nantes"),
    ("59000", "Lille"),
    ("31000", "Toulouse"),
];

/// Billable services: description, unit, unit price, VAT rate.
const SERVICES: &[(&str, LineUnit, &str, &str)] = &[
    ("Developpement site vitrine", LineUnit::Forfait, "1800", "20"),
    ("Maintenance applicative", LineUnit::Heure, "75", "20"),
    ("Conseil en architecture logicielle", LineUnit::Jour, "600", "20"),
    ("Formation equipe technique", LineUnit::Jour, "850", "20"),
    ("Redaction cahier des charges", LineUnit::Forfait, "950", "20"),
    ("Integration API de paiement", LineUnit::Jour, "550", "20"),
    ("Hebergement annuel", LineUnit::Unite, "240", "20"),
    ("Support telephonique", LineUnit::Heure, "45", "10"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./factura_dev.db");
    let mut client_count: usize = 8;
    let mut doc_count: usize = 24;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--clients" | "-c" => {
                if i + 1 < args.len() {
                    client_count = args[i + 1].parse().unwrap_or(8);
                    i += 1;
                }
            }
            "--docs" | "-n" => {
                if i + 1 < args.len() {
                    doc_count = args[i + 1].parse().unwrap_or(24);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Factura Seed Data Generator");
                println!();
                println!("Usage: factura-seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>      Database file path (default: ./factura_dev.db)");
                println!("  -c, --clients <N>    Number of clients to create (default: 8)");
                println!("  -n, --docs <N>       Number of documents to create (default: 24)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    println!("Factura Seed Data Generator");
    println!("===========================");
    println!("Database:  {db_path}");
    println!("Clients:   {client_count}");
    println!("Documents: {doc_count}");
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let store: Arc<dyn Storage> = Arc::new(db);
    let engine = Engine::new(store);

    if engine.settings().get().await?.is_some() {
        println!("⚠ Database already has settings");
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Issuer profile. VAT is charged so the seeded documents exercise the
    // full rate set; flip is_vat_exempt for franchise-en-base data.
    engine
        .settings()
        .save(SettingsInput {
            business_name: "Dupont Conseil".to_string(),
            first_name: "Marie".to_string(),
            last_name: "Dupont".to_string(),
            siret: "73282932000074".to_string(),
            address: "8 rue des Lilas".to_string(),
            postal_code: "69003".to_string(),
            city: "Lyon".to_string(),
            email: Some("contact@dupont-conseil.fr".to_string()),
            is_vat_exempt: false,
            vat_number: Some("FR32732829320".to_string()),
            iban: Some("FR7630006000011234567890189".to_string()),
            bic: Some("AGRIFRPP".to_string()),
            ..SettingsInput::default()
        })
        .await?;
    println!("✓ Settings saved");

    // Client roster, alternating companies and individuals
    println!();
    println!("Creating clients...");

    let mut client_ids = Vec::with_capacity(client_count);
    for n in 0..client_count {
        let (postal_code, city) = CITIES[n % CITIES.len()];

        let input = if n % 2 == 0 {
            let company = COMPANIES[(n / 2) % COMPANIES.len()];
            ClientInput {
                company_name: Some(company.to_string()),
                siret: Some(format!("9{:04}6543210{:02}", n, n % 100)),
                address: format!("{} avenue de la Republique", 3 + n),
                postal_code: postal_code.to_string(),
                city: city.to_string(),
                country: "France".to_string(),
                is_professional: true,
                ..ClientInput::default()
            }
        } else {
            let (first, last) = PEOPLE[(n / 2) % PEOPLE.len()];
            ClientInput {
                first_name: Some(first.to_string()),
                last_name: Some(last.to_string()),
                email: Some(format!(
                    "{}.{}@example.fr",
                    first.to_lowercase(),
                    last.to_lowercase()
                )),
                address: format!("{} rue des Acacias", 10 + n),
                postal_code: postal_code.to_string(),
                city: city.to_string(),
                country: "France".to_string(),
                is_professional: false,
                ..ClientInput::default()
            }
        };

        let client = engine.clients().create(input).await?;
        client_ids.push(client.id);
    }
    println!("✓ Created {} clients", client_ids.len());

    // Documents across the lifecycle states
    if doc_count > 0 && client_ids.is_empty() {
        println!("⚠ No clients to attach documents to, stopping here.");
        return Ok(());
    }

    println!();
    println!("Creating documents...");

    let today = Utc::now().date_naive();
    let mut invoices = 0;
    let mut quotes = 0;
    let mut converted = 0;

    for n in 0..doc_count {
        let client_id = client_ids[n % client_ids.len()].clone();
        let issue_date = today - Duration::days(n as i64);
        let lines = make_lines(n);

        if n % 2 == 0 {
            let created = engine
                .invoices()
                .create(InvoiceDraft {
                    client_id,
                    issue_date,
                    service_date: None,
                    payment_terms_days: None,
                    notes: None,
                    lines,
                })
                .await?;
            let id = created.invoice.id;

            match (n / 2) % 4 {
                0 => {} // stays draft
                1 => {
                    engine.invoices().finalize(&id).await?;
                }
                2 => {
                    engine.invoices().finalize(&id).await?;
                    engine.invoices().mark_paid(&id).await?;
                }
                _ => {
                    engine.invoices().cancel(&id).await?;
                }
            }
            invoices += 1;
        } else {
            let created = engine
                .quotes()
                .create(QuoteDraft {
                    client_id,
                    issue_date,
                    validity_date: issue_date + Duration::days(30),
                    notes: None,
                    lines,
                })
                .await?;
            let id = created.quote.id;

            match n % 10 {
                1 => {} // stays draft
                3 => {
                    engine.quotes().mark_sent(&id).await?;
                }
                5 => {
                    engine.quotes().mark_sent(&id).await?;
                    engine.quotes().reject(&id).await?;
                }
                7 => {
                    engine.quotes().mark_sent(&id).await?;
                    engine.quotes().accept(&id).await?;
                }
                _ => {
                    engine.quotes().mark_sent(&id).await?;
                    engine.quotes().accept(&id).await?;
                    engine.quotes().convert_to_invoice(&id).await?;
                    converted += 1;
                }
            }
            quotes += 1;
        }

        if (n + 1) % 10 == 0 {
            println!("  Created {} documents...", n + 1);
        }
    }

    println!("✓ Created {invoices} invoices and {quotes} quotes ({converted} quotes converted)");

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Builds 1-3 lines for document `n`, cycling through the service list.
fn make_lines(n: usize) -> Vec<LineInput> {
    let count = 1 + n % 3;

    (0..count)
        .map(|k| {
            let (description, unit, price, rate) = SERVICES[(n + k) % SERVICES.len()];
            let quantity = match unit {
                LineUnit::Heure => Decimal::from(2 + (n % 6) as i64),
                LineUnit::Jour => Decimal::from(1 + (n % 4) as i64),
                LineUnit::Forfait | LineUnit::Unite => Decimal::ONE,
            };

            LineInput {
                description: description.to_string(),
                quantity,
                unit,
                unit_price_ht: parse_decimal(price),
                vat_rate: parse_decimal(rate),
            }
        })
        .collect()
}

/// Decimal from a known-good literal in the tables above.
fn parse_decimal(value: &str) -> Decimal {
    value.parse().unwrap_or(Decimal::ZERO)
}
