//! # factura-engine: Business Operations for Factura
//!
//! The lifecycle engine: everything a caller (desktop UI, CLI, test
//! harness) does goes through here. Pure calculation lives in
//! `factura-core`, persistence in `factura-store`; this crate wires them
//! into workflows and enforces the state machines.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Factura Control Flow                             │
//! │                                                                         │
//! │  Caller (UI command, CLI, test)                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  factura-engine (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   Engine ──┬── ClientRegistry      (clients.rs)                │   │
//! │  │            ├── InvoiceService      (invoices.rs)               │   │
//! │  │            ├── QuoteService        (quotes.rs)                 │   │
//! │  │            ├── SettingsService     (settings.rs)               │   │
//! │  │            ├── NumberingService    (numbering.rs)              │   │
//! │  │            ├── BackupService       (backup.rs)                 │   │
//! │  │            └── CSV export          (export.rs, pure)           │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │ money math, validation              │ Arc<dyn Storage>         │
//! │       ▼                                     ▼                          │
//! │  factura-core                          factura-store                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`engine`] - The [`Engine`] handle dispensing the services
//! - [`clients`] - Client registry (CRUD, soft delete)
//! - [`invoices`] - Invoice lifecycle (create, update, finalize, paid/cancel)
//! - [`quotes`] - Quote lifecycle and conversion to invoice
//! - [`settings`] - Issuer profile
//! - [`numbering`] - Document number allocation
//! - [`export`] - CSV rendering of the document registers
//! - [`backup`] - Versioned JSON dump and restore
//! - [`error`] - [`EngineError`]

// =============================================================================
// Module Declarations
// =============================================================================

pub mod backup;
pub mod clients;
pub mod engine;
pub mod error;
pub mod export;
pub mod invoices;
mod lines;
pub mod numbering;
pub mod quotes;
pub mod settings;

// =============================================================================
// Re-exports
// =============================================================================

pub use engine::Engine;
pub use error::{EngineError, EngineResult};

// Service re-exports for convenience
pub use backup::{BackupData, BackupService, BackupSummary, BACKUP_VERSION};
pub use clients::ClientRegistry;
pub use export::{invoices_to_csv, quotes_to_csv};
pub use invoices::InvoiceService;
pub use numbering::NumberingService;
pub use quotes::QuoteService;
pub use settings::SettingsService;
