//! # Backup and Restore
//!
//! A versioned JSON dump of the whole store, and the reverse operation.
//! This is also the migration path between the two storage backends:
//! export from one, import into the other.
//!
//! ## Payload
//! ```json
//! {
//!   "version": 1,
//!   "exportedAt": "2025-03-10T09:00:00Z",
//!   "settings": { ... },
//!   "clients": [ ... ],
//!   "invoices": [ { ..., "lines": [ ... ] } ],
//!   "quotes":   [ { ..., "lines": [ ... ] } ]
//! }
//! ```
//!
//! Soft-deleted clients are included so restored documents keep a valid
//! client reference. Import replaces the entire store contents in one
//! atomic operation; it never merges.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{EngineError, EngineResult};
use factura_core::{Client, InvoiceWithLines, QuoteWithLines, Settings};
use factura_store::{Storage, StoreSnapshot};

/// Current backup payload version.
pub const BACKUP_VERSION: u32 = 1;

// =============================================================================
// Payload
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupData {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub settings: Option<Settings>,
    pub clients: Vec<Client>,
    pub invoices: Vec<InvoiceWithLines>,
    pub quotes: Vec<QuoteWithLines>,
}

/// What an import brought in, for the confirmation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackupSummary {
    pub has_settings: bool,
    pub clients: usize,
    pub invoices: usize,
    pub quotes: usize,
}

// =============================================================================
// Backup Service
// =============================================================================

pub struct BackupService {
    store: Arc<dyn Storage>,
}

impl BackupService {
    pub fn new(store: Arc<dyn Storage>) -> Self {
        BackupService { store }
    }

    /// Serializes the full store contents as pretty-printed JSON.
    pub async fn export(&self) -> EngineResult<String> {
        let snapshot = self.store.snapshot().await?;

        let backup = BackupData {
            version: BACKUP_VERSION,
            exported_at: Utc::now(),
            settings: snapshot.settings,
            clients: snapshot.clients,
            invoices: snapshot.invoices,
            quotes: snapshot.quotes,
        };

        let json =
            serde_json::to_string_pretty(&backup).map_err(factura_store::StoreError::from)?;

        info!(
            clients = backup.clients.len(),
            invoices = backup.invoices.len(),
            quotes = backup.quotes.len(),
            "Exported backup"
        );

        Ok(json)
    }

    /// Parses and validates a backup payload, then replaces the entire
    /// store contents with it.
    pub async fn import(&self, json: &str) -> EngineResult<BackupSummary> {
        let backup: BackupData =
            serde_json::from_str(json).map_err(|e| EngineError::InvalidBackup(e.to_string()))?;

        if backup.version != BACKUP_VERSION {
            return Err(EngineError::InvalidBackup(format!(
                "unsupported version {} (expected {BACKUP_VERSION})",
                backup.version
            )));
        }

        let summary = BackupSummary {
            has_settings: backup.settings.is_some(),
            clients: backup.clients.len(),
            invoices: backup.invoices.len(),
            quotes: backup.quotes.len(),
        };

        let snapshot = StoreSnapshot {
            settings: backup.settings,
            clients: backup.clients,
            invoices: backup.invoices,
            quotes: backup.quotes,
        };
        self.store.replace_all(&snapshot).await?;

        info!(
            clients = summary.clients,
            invoices = summary.invoices,
            quotes = summary.quotes,
            "Imported backup"
        );

        Ok(summary)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use factura_store::KvStorage;

    fn service() -> BackupService {
        BackupService::new(Arc::new(KvStorage::in_memory()))
    }

    #[tokio::test]
    async fn test_rejects_garbage() {
        let err = service().import("not json at all").await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidBackup(_)));
    }

    #[tokio::test]
    async fn test_rejects_unknown_version() {
        let payload = r#"{
            "version": 99,
            "exportedAt": "2025-03-10T09:00:00Z",
            "settings": null,
            "clients": [],
            "invoices": [],
            "quotes": []
        }"#;

        let err = service().import(payload).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidBackup(_)));
    }

    #[tokio::test]
    async fn test_empty_roundtrip() {
        let source = service();
        let json = source.export().await.unwrap();

        let target = service();
        let summary = target.import(&json).await.unwrap();

        assert!(!summary.has_settings);
        assert_eq!(summary.clients, 0);
        assert_eq!(summary.invoices, 0);
        assert_eq!(summary.quotes, 0);
    }
}
