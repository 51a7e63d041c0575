//! Resident register
//!
//! The `ResidentStore` owns the resident list persisted as one JSON array
//! under a fixed key. Every operation loads the whole list, applies its
//! change, and writes the whole list back.
//!
//! ## Expiration
//!
//! There is no background timer. `list()` flips every ACTIVE resident whose
//! end date is before today to INACTIVE and persists the result, so no
//! caller ever observes an expired ACTIVE record.
//!
//! ## Failure policy
//!
//! Unreadable or corrupt data is logged and read as an empty register.
//! Write failures are returned to the caller.
//!
//! ## Usage
//!
//! ```ignore
//! let store = ResidentStore::open(&config);
//!
//! let resident = store.register(ResidentDraft::new("Ana", "12"))?;
//! let residents = store.list();
//! ```

use chrono::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::{Config, DEFAULT_CAPACITY};
use crate::ids::next_id;
use crate::models::{Resident, ResidentDraft, ResidentStatus, StorageUsage, ValidationError};
use crate::query;
use crate::storage::{FileStore, KeyValueStore, StorageError, StorageResult};

/// Key the resident list is stored under
pub const STORAGE_KEY: &str = "condo_guard_db";

/// Errors from operations that validate before writing
#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// The resident register
pub struct ResidentStore<K, C = SystemClock> {
    kv: K,
    clock: C,
    capacity: usize,
}

impl ResidentStore<FileStore, SystemClock> {
    /// Open the register in the configured data directory
    pub fn open(config: &Config) -> Self {
        ResidentStore::new(FileStore::new(&config.data_dir), SystemClock)
            .with_capacity(config.capacity)
    }
}

impl<K: KeyValueStore, C: Clock> ResidentStore<K, C> {
    pub fn new(kv: K, clock: C) -> Self {
        Self {
            kv,
            clock,
            capacity: DEFAULT_CAPACITY,
        }
    }

    /// Set the advisory capacity reported by `usage()`
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// The clock used for expiration and timestamps
    pub fn clock(&self) -> &C {
        &self.clock
    }

    // ==================== Reads ====================

    /// All residents, with expired ones switched to INACTIVE
    ///
    /// Persists the list if the sweep changed anything. Never fails: read
    /// errors yield an empty list.
    pub fn list(&self) -> Vec<Resident> {
        let mut residents = match self.load() {
            Ok(residents) => residents,
            Err(e) => {
                warn!("Failed to read resident register, treating as empty: {}", e);
                return Vec::new();
            }
        };

        let today = self.clock.today().format("%Y-%m-%d").to_string();
        let mut expired = 0;
        for resident in residents.iter_mut() {
            if resident.is_expired_on(&today) {
                resident.status = ResidentStatus::Inactive;
                expired += 1;
            }
        }

        if expired > 0 {
            info!(expired, %today, "Deactivated residents past their end date");
            if let Err(e) = self.persist(&residents) {
                warn!("Failed to persist expiration sweep: {}", e);
            }
        }

        residents
    }

    /// Look up a resident by id
    pub fn get(&self, id: &str) -> Option<Resident> {
        self.list().into_iter().find(|r| r.id == id)
    }

    /// Residents whose name or house number contains `term`
    pub fn search(&self, term: &str) -> Vec<Resident> {
        query::filter(&self.list(), term)
    }

    /// Residents created within the last `window`, for the periodic report
    pub fn report_candidates(&self, window: Duration) -> Vec<Resident> {
        query::within_report_window(&self.list(), self.clock.now_millis(), window)
    }

    /// Record count against the advisory capacity
    pub fn usage(&self) -> StorageUsage {
        StorageUsage::new(self.list().len(), self.capacity)
    }

    // ==================== Writes ====================

    /// Insert or fully replace a resident, matched by id
    pub fn save(&self, resident: &Resident) -> StorageResult<()> {
        let mut residents = self.list();
        match residents.iter_mut().find(|r| r.id == resident.id) {
            Some(existing) => {
                debug!(id = %resident.id, "Replacing resident");
                *existing = resident.clone();
            }
            None => {
                debug!(id = %resident.id, "Appending resident");
                residents.push(resident.clone());
            }
        }
        self.persist(&residents)
    }

    /// Validate a draft, complete it, and save it
    ///
    /// Blank provider slots are dropped, a new id is allocated when the
    /// draft has none, and `created_at` is stamped on first save. Nothing is
    /// written if validation fails.
    pub fn register(&self, draft: ResidentDraft) -> Result<Resident, StoreError> {
        draft.validate()?;

        let providers = draft.filled_providers();
        let id = match draft.id {
            Some(id) if !id.is_empty() => id,
            _ => next_id(&self.list()),
        };
        let observations = if draft.observations.is_empty() {
            None
        } else {
            Some(draft.observations)
        };

        let resident = Resident {
            id,
            name: draft.name,
            house_number: draft.house_number,
            phone: draft.phone,
            start_date: draft.start_date,
            end_date: draft.end_date,
            status: draft.status.unwrap_or_default(),
            providers,
            created_at: draft
                .created_at
                .filter(|ts| *ts > 0)
                .unwrap_or_else(|| self.clock.now_millis()),
            observations,
        };

        self.save(&resident)?;
        info!(id = %resident.id, house = %resident.house_number, "Saved resident");
        Ok(resident)
    }

    /// Remove a resident; unknown ids are ignored
    pub fn delete(&self, id: &str) -> StorageResult<()> {
        let residents: Vec<Resident> = self.list().into_iter().filter(|r| r.id != id).collect();
        self.persist(&residents)
    }

    /// Drop every INACTIVE resident, returning how many were removed
    pub fn purge_inactive(&self) -> StorageResult<usize> {
        let residents = self.list();
        let before = residents.len();
        let active: Vec<Resident> = residents
            .into_iter()
            .filter(|r| r.status.is_active())
            .collect();
        let removed = before - active.len();

        self.persist(&active)?;
        info!(removed, "Purged inactive residents");
        Ok(removed)
    }

    /// Set a resident's status; unknown ids are ignored
    pub fn set_status(&self, id: &str, status: ResidentStatus) -> StorageResult<()> {
        let mut residents = self.list();
        if let Some(resident) = residents.iter_mut().find(|r| r.id == id) {
            resident.status = status;
            self.persist(&residents)?;
        }
        Ok(())
    }

    /// Flip a resident between ACTIVE and INACTIVE
    ///
    /// Returns the new status, or `None` if the id is unknown.
    pub fn toggle_status(&self, id: &str) -> StorageResult<Option<ResidentStatus>> {
        let mut residents = self.list();
        let Some(resident) = residents.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };

        let status = resident.status.toggled();
        resident.status = status;
        self.persist(&residents)?;
        Ok(Some(status))
    }

    // ==================== Persistence ====================

    fn load(&self) -> StorageResult<Vec<Resident>> {
        let Some(raw) = self.kv.get(STORAGE_KEY)? else {
            return Ok(Vec::new());
        };

        serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt {
            key: STORAGE_KEY.to_string(),
            details: e.to_string(),
        })
    }

    fn persist(&self, residents: &[Resident]) -> StorageResult<()> {
        let raw = serde_json::to_string(residents).map_err(|e| StorageError::Encode {
            key: STORAGE_KEY.to_string(),
            details: e.to_string(),
        })?;
        self.kv.set(STORAGE_KEY, &raw)
    }
}
