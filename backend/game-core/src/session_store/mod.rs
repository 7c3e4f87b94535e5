//! Single-slot cache for the signed session.
//!
//! A store holds at most one [`SessionRecord`]. Reads never fail: a missing or
//! unreadable slot is simply "no session", so a corrupt cache costs the player one
//! extra wallet prompt and nothing else.

mod file;
mod memory;

pub use file::FileSessionStore;
pub use memory::MemorySessionStore;

use crate::error::store::StoreError;

use models::SessionRecord;

/// Persistence contract for the cached session.
///
/// Implementations are synchronous; the engine calls them from its single
/// dispatch flow, so no locking is required on the caller's side.
pub trait SessionStore: Send + Sync {
    /// The cached record, or `None` when absent or unparseable.
    fn get(&self) -> Option<SessionRecord>;

    /// Overwrite the slot.
    fn set(&self, record: &SessionRecord) -> Result<(), StoreError>;

    /// Empty the slot. Clearing an empty slot succeeds.
    fn clear(&self) -> Result<(), StoreError>;
}

impl<S: SessionStore + ?Sized> SessionStore for std::sync::Arc<S> {
    fn get(&self) -> Option<SessionRecord> {
        (**self).get()
    }

    fn set(&self, record: &SessionRecord) -> Result<(), StoreError> {
        (**self).set(record)
    }

    fn clear(&self) -> Result<(), StoreError> {
        (**self).clear()
    }
}
