//! # Engine Entry Point
//!
//! One handle over a storage backend, dispensing the per-domain services.
//! Services are cheap to construct (an `Arc` clone), so accessors hand out
//! fresh instances instead of caching them.

use std::sync::Arc;

use crate::backup::BackupService;
use crate::clients::ClientRegistry;
use crate::invoices::InvoiceService;
use crate::numbering::NumberingService;
use crate::quotes::QuoteService;
use crate::settings::SettingsService;
use factura_store::Storage;

// =============================================================================
// Engine
// =============================================================================

/// The application core: all business operations, backend-agnostic.
///
/// ```rust,ignore
/// let store: Arc<dyn Storage> = Arc::new(Database::new(config).await?);
/// let engine = Engine::new(store);
///
/// let client = engine.clients().create(input).await?;
/// let invoice = engine.invoices().create(draft).await?;
/// engine.invoices().finalize(&invoice.invoice.id).await?;
/// ```
#[derive(Clone)]
pub struct Engine {
    store: Arc<dyn Storage>,
}

impl Engine {
    pub fn new(store: Arc<dyn Storage>) -> Self {
        Engine { store }
    }

    pub fn clients(&self) -> ClientRegistry {
        ClientRegistry::new(self.store.clone())
    }

    pub fn invoices(&self) -> InvoiceService {
        InvoiceService::new(self.store.clone())
    }

    pub fn quotes(&self) -> QuoteService {
        QuoteService::new(self.store.clone())
    }

    pub fn settings(&self) -> SettingsService {
        SettingsService::new(self.store.clone())
    }

    pub fn numbering(&self) -> NumberingService {
        NumberingService::new(self.store.clone())
    }

    pub fn backup(&self) -> BackupService {
        BackupService::new(self.store.clone())
    }

    /// Direct storage access, for callers that need raw contract
    /// operations (tests, tooling).
    pub fn store(&self) -> Arc<dyn Storage> {
        self.store.clone()
    }
}
