//! # Settings Table Operations
//!
//! The settings table holds exactly one row with `id = 1` (enforced by a
//! CHECK constraint). `save_settings` is an upsert; `get_settings` returns
//! `None` until the first save.

use async_trait::async_trait;
use sqlx::SqliteConnection;
use tracing::debug;

use crate::contract::SettingsStore;
use crate::error::StoreResult;
use crate::sqlite::pool::Database;
use crate::sqlite::rows::{format_datetime, SettingsRow};
use factura_core::Settings;

const SETTINGS_COLUMNS: &str = "business_name, first_name, last_name, siret, address, \
     postal_code, city, email, phone, vat_number, is_vat_exempt, vat_exemption_text, \
     default_payment_terms_days, default_late_penalty_rate, invoice_prefix, quote_prefix, \
     legal_form, rcs_number, share_capital, payment_methods, iban, bic, updated_at";

/// Upserts the singleton row on an open connection. Shared with the
/// snapshot restore path.
pub(crate) async fn upsert_settings(
    conn: &mut SqliteConnection,
    settings: &Settings,
) -> StoreResult<()> {
    sqlx::query(
        r#"
        INSERT OR REPLACE INTO settings (
            id, business_name, first_name, last_name, siret, address,
            postal_code, city, email, phone, vat_number,
            is_vat_exempt, vat_exemption_text,
            default_payment_terms_days, default_late_penalty_rate,
            invoice_prefix, quote_prefix,
            legal_form, rcs_number, share_capital, payment_methods, iban, bic,
            updated_at
        ) VALUES (
            1, ?1, ?2, ?3, ?4, ?5,
            ?6, ?7, ?8, ?9, ?10,
            ?11, ?12,
            ?13, ?14,
            ?15, ?16,
            ?17, ?18, ?19, ?20, ?21, ?22,
            ?23
        )
        "#,
    )
    .bind(&settings.business_name)
    .bind(&settings.first_name)
    .bind(&settings.last_name)
    .bind(&settings.siret)
    .bind(&settings.address)
    .bind(&settings.postal_code)
    .bind(&settings.city)
    .bind(&settings.email)
    .bind(&settings.phone)
    .bind(&settings.vat_number)
    .bind(settings.is_vat_exempt)
    .bind(&settings.vat_exemption_text)
    .bind(settings.default_payment_terms_days)
    .bind(settings.default_late_penalty_rate.to_string())
    .bind(&settings.invoice_prefix)
    .bind(&settings.quote_prefix)
    .bind(&settings.legal_form)
    .bind(&settings.rcs_number)
    .bind(settings.share_capital.map(|c| c.to_string()))
    .bind(&settings.payment_methods)
    .bind(&settings.iban)
    .bind(&settings.bic)
    .bind(format_datetime(settings.updated_at))
    .execute(conn)
    .await?;

    Ok(())
}

#[async_trait]
impl SettingsStore for Database {
    async fn get_settings(&self) -> StoreResult<Option<Settings>> {
        let row: Option<SettingsRow> = sqlx::query_as(&format!(
            "SELECT {SETTINGS_COLUMNS} FROM settings WHERE id = 1"
        ))
        .fetch_optional(self.pool())
        .await?;

        row.map(SettingsRow::into_settings).transpose()
    }

    async fn save_settings(&self, settings: &Settings) -> StoreResult<()> {
        debug!("Saving settings");

        let mut conn = self.pool().acquire().await?;
        upsert_settings(&mut conn, settings).await
    }
}
