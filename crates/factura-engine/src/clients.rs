//! # Client Registry
//!
//! CRUD over the client roster. Clients referenced by documents are soft
//! deleted (the record keeps its historical identity); hard deletion is for
//! records that nothing references.
//!
//! ## Deletion Model
//! ```text
//! delete(id)                         hard_delete(id)
//!      │                                  │
//!      ▼                                  ▼
//! deleted_at = now                   physical DELETE
//! hidden from list()                 store rejects it while any
//! documents keep their snapshot      invoice or quote references id
//! ```
//!
//! SIRET/SIREN checksums are a form-layer concern; the registry persists
//! whatever identifier it is given. The validators live in
//! `factura_core::validation` for callers that want them.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use factura_core::validation::validate_client;
use factura_core::{Client, ClientInput};
use factura_store::Storage;

// =============================================================================
// Client Registry
// =============================================================================

pub struct ClientRegistry {
    store: Arc<dyn Storage>,
}

impl ClientRegistry {
    pub fn new(store: Arc<dyn Storage>) -> Self {
        ClientRegistry { store }
    }

    /// Creates a client after validating the required address fields.
    pub async fn create(&self, input: ClientInput) -> EngineResult<Client> {
        validate_client(&input)?;

        let now = Utc::now();
        let client = Client {
            id: Uuid::new_v4().to_string(),
            company_name: normalize(input.company_name),
            first_name: normalize(input.first_name),
            last_name: normalize(input.last_name),
            email: normalize(input.email),
            phone: normalize(input.phone),
            address: input.address.trim().to_string(),
            postal_code: input.postal_code.trim().to_string(),
            city: input.city.trim().to_string(),
            country: input.country.trim().to_string(),
            siret: normalize(input.siret),
            vat_number: normalize(input.vat_number),
            notes: normalize(input.notes),
            is_professional: input.is_professional,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        self.store.insert_client(&client).await?;
        info!(id = %client.id, name = %client.display_name(), "Created client");

        Ok(client)
    }

    /// Fetches one client, soft-deleted included.
    pub async fn get(&self, id: &str) -> EngineResult<Client> {
        self.store
            .get_client(id)
            .await?
            .ok_or_else(|| EngineError::not_found("Client", id))
    }

    /// Active clients ordered by display name, case-insensitively.
    pub async fn list(&self) -> EngineResult<Vec<Client>> {
        let mut clients = self.store.list_clients().await?;
        clients.sort_by_key(|c| c.display_name().to_lowercase());

        debug!(count = clients.len(), "Listed clients");
        Ok(clients)
    }

    /// Overwrites a client's mutable fields. Timestamps of creation and
    /// deletion are preserved by the store.
    pub async fn update(&self, id: &str, input: ClientInput) -> EngineResult<Client> {
        validate_client(&input)?;

        let existing = self.get(id).await?;
        let client = Client {
            id: existing.id,
            company_name: normalize(input.company_name),
            first_name: normalize(input.first_name),
            last_name: normalize(input.last_name),
            email: normalize(input.email),
            phone: normalize(input.phone),
            address: input.address.trim().to_string(),
            postal_code: input.postal_code.trim().to_string(),
            city: input.city.trim().to_string(),
            country: input.country.trim().to_string(),
            siret: normalize(input.siret),
            vat_number: normalize(input.vat_number),
            notes: normalize(input.notes),
            is_professional: input.is_professional,
            created_at: existing.created_at,
            updated_at: Utc::now(),
            deleted_at: existing.deleted_at,
        };

        self.store.update_client(&client).await?;
        info!(id = %client.id, "Updated client");

        Ok(client)
    }

    /// Marks the client deleted. Documents keep their buyer snapshots and
    /// the record stays readable through [`get`](Self::get).
    pub async fn delete(&self, id: &str) -> EngineResult<()> {
        self.store.soft_delete_client(id, Utc::now()).await?;
        info!(id = %id, "Soft-deleted client");
        Ok(())
    }

    /// Physically removes a client. The store refuses while any document
    /// still references the id.
    pub async fn hard_delete(&self, id: &str) -> EngineResult<()> {
        self.store.hard_delete_client(id).await?;
        info!(id = %id, "Hard-deleted client");
        Ok(())
    }
}

/// Blank optional strings collapse to `None`.
fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use factura_store::KvStorage;

    fn registry() -> ClientRegistry {
        ClientRegistry::new(Arc::new(KvStorage::in_memory()))
    }

    fn input(company: Option<&str>) -> ClientInput {
        ClientInput {
            company_name: company.map(String::from),
            address: "1 rue de la Paix".to_string(),
            postal_code: "75002".to_string(),
            city: "Paris".to_string(),
            country: "France".to_string(),
            is_professional: true,
            ..ClientInput::default()
        }
    }

    #[tokio::test]
    async fn test_create_normalizes_blank_optionals() {
        let registry = registry();

        let mut raw = input(Some("ACME"));
        raw.email = Some("   ".to_string());
        raw.siret = Some(" 73282932000074 ".to_string());

        let client = registry.create(raw).await.unwrap();
        assert_eq!(client.email, None);
        assert_eq!(client.siret.as_deref(), Some("73282932000074"));
    }

    #[tokio::test]
    async fn test_create_requires_address() {
        let registry = registry();

        let mut raw = input(Some("ACME"));
        raw.address = "".to_string();

        let err = registry.create(raw).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[tokio::test]
    async fn test_list_orders_by_display_name() {
        let registry = registry();

        registry.create(input(Some("Zeta SARL"))).await.unwrap();
        let mut person = input(None);
        person.first_name = Some("Alice".to_string());
        person.last_name = Some("Bernard".to_string());
        registry.create(person).await.unwrap();

        let listed = registry.list().await.unwrap();
        let names: Vec<String> = listed.iter().map(|c| c.display_name()).collect();
        assert_eq!(names, vec!["Alice Bernard", "Zeta SARL"]);
    }

    #[tokio::test]
    async fn test_delete_hides_from_list_but_not_get() {
        let registry = registry();

        let client = registry.create(input(Some("ACME"))).await.unwrap();
        registry.delete(&client.id).await.unwrap();

        assert!(registry.list().await.unwrap().is_empty());
        let fetched = registry.get(&client.id).await.unwrap();
        assert!(fetched.is_deleted());
    }

    #[tokio::test]
    async fn test_update_preserves_created_at() {
        let registry = registry();

        let client = registry.create(input(Some("ACME"))).await.unwrap();
        let updated = registry
            .update(&client.id, input(Some("ACME Renamed")))
            .await
            .unwrap();

        assert_eq!(updated.created_at, client.created_at);
        assert_eq!(updated.company_name.as_deref(), Some("ACME Renamed"));
    }
}
