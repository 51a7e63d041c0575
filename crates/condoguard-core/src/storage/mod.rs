//! Storage layer
//!
//! Handles persistence of the resident register.
//!
//! ## Architecture
//!
//! - **KeyValueStore**: string values under fixed keys, the only seam the
//!   record store depends on
//! - **FileStore**: one JSON file per key, atomic writes
//! - **MemoryStore**: in-process map for tests

pub mod error;
pub mod kv;

pub use error::{StorageError, StorageResult};
pub use kv::{FileStore, KeyValueStore, MemoryStore};
