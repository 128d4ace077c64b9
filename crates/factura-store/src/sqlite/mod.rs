//! # SQLite Backend
//!
//! The durable backend: one SQLite file, accessed through an sqlx pool in
//! WAL mode. [`Database`] implements every trait of the storage contract;
//! the impl blocks live next to the tables they touch.
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded schema migrations
//! - [`rows`] - Row structs and TEXT column parsing
//! - [`clients`] / [`invoices`] / [`quotes`] / [`settings`] - table operations
//! - [`numbering`] - MAX-scan for the next document number
//! - [`snapshot`] - whole-store read and replace for backups

pub mod clients;
pub mod invoices;
pub mod migrations;
pub mod numbering;
pub mod pool;
pub mod quotes;
pub mod rows;
pub mod settings;
pub mod snapshot;

pub use pool::{Database, DbConfig};
