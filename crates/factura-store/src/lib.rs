//! # factura-store: Storage Layer for Factura
//!
//! This crate provides persistence for the Factura invoicing core. Every
//! backend implements the same [`Storage`] contract, so the engine never
//! knows which one it is talking to.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Factura Data Flow                                │
//! │                                                                         │
//! │  factura-engine (InvoiceService, QuoteService, ...)                    │
//! │       │                                                                 │
//! │       ▼  Arc<dyn Storage>                                               │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   factura-store (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────────────┐         ┌────────────────────┐        │   │
//! │  │   │   contract.rs      │         │     error.rs       │        │   │
//! │  │   │                    │         │                    │        │   │
//! │  │   │ ClientStore        │         │ StoreError         │        │   │
//! │  │   │ InvoiceStore       │         │ StoreResult        │        │   │
//! │  │   │ QuoteStore    ...  │         │                    │        │   │
//! │  │   └─────────┬──────────┘         └────────────────────┘        │   │
//! │  │             │ implemented by                                    │   │
//! │  │      ┌──────┴────────┐                                          │   │
//! │  │      ▼               ▼                                          │   │
//! │  │   ┌──────────┐   ┌──────────┐                                  │   │
//! │  │   │ sqlite/  │   │  kv.rs   │                                  │   │
//! │  │   │ Database │   │ KvStorage│                                  │   │
//! │  │   └──────────┘   └──────────┘                                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                          │                                     │
//! │       ▼                          ▼                                     │
//! │   factura.db (SQLite)       factura.json (single file)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`contract`] - The backend-agnostic storage traits and [`StoreSnapshot`]
//! - [`error`] - Storage error types
//! - [`sqlite`] - SQLite backend (pool, migrations, row mapping, queries)
//! - [`kv`] - JSON-file backend with the same semantics
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use factura_store::{Database, DbConfig, Storage};
//!
//! let db = Database::new(DbConfig::new("path/to/factura.db")).await?;
//! let store: Arc<dyn Storage> = Arc::new(db);
//!
//! let clients = store.list_clients().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod contract;
pub mod error;
pub mod kv;
pub mod sqlite;

// =============================================================================
// Re-exports
// =============================================================================

pub use contract::{
    ClientStore, InvoiceStore, NumberSource, QuoteStore, SettingsStore, SnapshotStore, Storage,
    StoreSnapshot,
};
pub use error::{StoreError, StoreResult};

// Backend re-exports for convenience
pub use kv::KvStorage;
pub use sqlite::{Database, DbConfig};
