//! # Settings Service
//!
//! Read and save the singleton issuer profile. Documents snapshot these
//! values at creation time, so edits here never rewrite history.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::error::{EngineError, EngineResult};
use factura_core::validation::{validate_payment_terms, validate_settings};
use factura_core::{Settings, SettingsInput};
use factura_store::Storage;

// =============================================================================
// Settings Service
// =============================================================================

pub struct SettingsService {
    store: Arc<dyn Storage>,
}

impl SettingsService {
    pub fn new(store: Arc<dyn Storage>) -> Self {
        SettingsService { store }
    }

    /// The saved profile, `None` until the first save.
    pub async fn get(&self) -> EngineResult<Option<Settings>> {
        Ok(self.store.get_settings().await?)
    }

    /// The saved profile, or [`EngineError::SettingsMissing`].
    ///
    /// Document creation goes through this; nothing sensible can be issued
    /// without a seller identity.
    pub async fn require(&self) -> EngineResult<Settings> {
        self.store
            .get_settings()
            .await?
            .ok_or(EngineError::SettingsMissing)
    }

    /// Validates and saves the profile, refreshing `updated_at`.
    pub async fn save(&self, input: SettingsInput) -> EngineResult<Settings> {
        validate_settings(&input)?;
        validate_payment_terms(input.default_payment_terms_days)?;

        let settings = Settings {
            business_name: input.business_name.trim().to_string(),
            first_name: input.first_name.trim().to_string(),
            last_name: input.last_name.trim().to_string(),
            siret: input.siret.trim().to_string(),
            address: input.address.trim().to_string(),
            postal_code: input.postal_code.trim().to_string(),
            city: input.city.trim().to_string(),
            email: input.email,
            phone: input.phone,
            vat_number: input.vat_number,
            is_vat_exempt: input.is_vat_exempt,
            vat_exemption_text: input.vat_exemption_text,
            default_payment_terms_days: input.default_payment_terms_days,
            default_late_penalty_rate: input.default_late_penalty_rate,
            invoice_prefix: input.invoice_prefix,
            quote_prefix: input.quote_prefix,
            legal_form: input.legal_form,
            rcs_number: input.rcs_number,
            share_capital: input.share_capital,
            payment_methods: input.payment_methods,
            iban: input.iban,
            bic: input.bic,
            updated_at: Utc::now(),
        };

        self.store.save_settings(&settings).await?;
        info!(business = %settings.business_name, "Saved settings");

        Ok(settings)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use factura_store::KvStorage;

    fn filled_input() -> SettingsInput {
        SettingsInput {
            business_name: "Dupont Conseil".to_string(),
            first_name: "Marie".to_string(),
            last_name: "Dupont".to_string(),
            siret: "73282932000074".to_string(),
            address: "8 rue des Lilas".to_string(),
            postal_code: "69003".to_string(),
            city: "Lyon".to_string(),
            ..SettingsInput::default()
        }
    }

    #[tokio::test]
    async fn test_require_before_save_fails() {
        let service = SettingsService::new(Arc::new(KvStorage::in_memory()));

        let err = service.require().await.unwrap_err();
        assert!(matches!(err, EngineError::SettingsMissing));
        assert!(service.get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_get() {
        let service = SettingsService::new(Arc::new(KvStorage::in_memory()));

        let saved = service.save(filled_input()).await.unwrap();
        assert_eq!(saved.invoice_prefix, "F");
        assert_eq!(saved.quote_prefix, "D");
        assert!(saved.is_vat_exempt);

        let loaded = service.require().await.unwrap();
        assert_eq!(loaded.business_name, "Dupont Conseil");
        assert_eq!(loaded.default_payment_terms_days, 30);
    }

    #[tokio::test]
    async fn test_save_requires_identity_fields() {
        let service = SettingsService::new(Arc::new(KvStorage::in_memory()));

        let mut input = filled_input();
        input.siret = String::new();

        let err = service.save(input).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }
}
