use crate::error::store::StoreError;
use crate::session_store::SessionStore;

use common::ErrorLocation;

use std::io::ErrorKind;
use std::panic::Location;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use models::SessionRecord;

/// Name of the slot file inside the store directory.
pub const SESSION_FILE_NAME: &str = "session.json";

/// JSON file slot at `{dir}/session.json`.
///
/// Writes go through a temp file and a rename, so a crash mid-write leaves either
/// the old record or the new one, never a torn file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE_NAME)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self) -> Option<SessionRecord> {
        let path = self.path();

        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No cached session at {}", path.display());
                return None;
            }
            Err(e) => {
                warn!("Cached session at {} unreadable, ignoring: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_str::<SessionRecord>(&contents) {
            Ok(record) => {
                debug!("Loaded cached session for {}", record.wallet);
                Some(record)
            }
            Err(e) => {
                warn!("Cached session at {} is corrupt, ignoring: {}", path.display(), e);
                None
            }
        }
    }

    fn set(&self, record: &SessionRecord) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| StoreError::Write {
            path: self.dir.clone(),
            source: e,
            location: ErrorLocation::from(Location::caller()),
        })?;

        let path = self.path();
        let temp_path = self.dir.join(format!("{SESSION_FILE_NAME}.tmp"));

        let json = serde_json::to_string(record).map_err(|e| StoreError::Serialize {
            reason: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        std::fs::write(&temp_path, json).map_err(|e| StoreError::Write {
            path: temp_path.clone(),
            source: e,
            location: ErrorLocation::from(Location::caller()),
        })?;

        std::fs::rename(&temp_path, &path).map_err(|e| StoreError::Write {
            path: path.clone(),
            source: e,
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!("Session cached at {}", path.display());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let path = self.path();

        match std::fs::remove_file(&path) {
            Ok(()) => {
                info!("Cached session removed from {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Write {
                path,
                source: e,
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}
