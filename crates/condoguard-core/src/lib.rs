//! CondoGuard Core Library
//!
//! This crate provides the core functionality for CondoGuard, an access
//! register for residential condominiums: who lives where, which service
//! providers they have authorized, and for how long.
//!
//! # Architecture
//!
//! - **Key-value file store**: the resident list is one JSON document
//! - **Lazy expiration**: every read deactivates residents past their end date
//! - **Canvas**: cards and reports are drawn against a small drawing trait,
//!   with a PDF backend
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let store = ResidentStore::open(&config);
//!
//! // Register a resident
//! let mut draft = ResidentDraft::new("Ana Souza", "12");
//! draft.end_date = "2026-08-01".to_string();
//! let resident = store.register(draft)?;
//!
//! // Query residents
//! let matches = store.search("ana");
//! ```
//!
//! # Modules
//!
//! - `store`: The resident register (main entry point)
//! - `models`: Residents, providers, statuses, drafts
//! - `ids`: Id allocation
//! - `query`: Search and report selection
//! - `render`: Card and report generation
//! - `storage`: Key-value persistence
//! - `clock`: Time source
//! - `config`: Application configuration

pub mod clock;
pub mod config;
pub mod ids;
pub mod models;
pub mod query;
pub mod render;
pub mod storage;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use models::{
    AccessLevel, Resident, ResidentDraft, ResidentStatus, ServiceProvider, StorageUsage,
    ValidationError,
};
pub use render::{CardLayout, PdfCanvas, RenderError, ReportLayout};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use store::{ResidentStore, StoreError};
