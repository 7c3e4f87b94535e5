use crate::error::store::StoreError;
use crate::session_store::SessionStore;

use common::ErrorLocation;

use std::panic::Location;
use std::sync::Mutex;

use models::SessionRecord;

/// In-process slot. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: Mutex<Option<SessionRecord>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a record, as if a previous run had cached it.
    pub fn with_record(record: SessionRecord) -> Self {
        Self {
            slot: Mutex::new(Some(record)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self) -> Option<SessionRecord> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }

    fn set(&self, record: &SessionRecord) -> Result<(), StoreError> {
        let mut slot = self.slot.lock().map_err(|e| StoreError::Slot {
            message: format!("session slot poisoned: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;
        *slot = Some(record.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut slot = self.slot.lock().map_err(|e| StoreError::Slot {
            message: format!("session slot poisoned: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;
        *slot = None;
        Ok(())
    }
}
