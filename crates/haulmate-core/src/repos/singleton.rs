//! Singleton repositories.
//!
//! Two flavors:
//!
//! - [`ProfileRepo`] - always-present record, defaulted-and-merged on load
//!   (truck profile);
//! - [`DocumentRepo`] - absent until first saved, removable with attachment
//!   cleanup (health insurance, driver ID).

use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::media::MediaLibrary;
use crate::storage::{SlotStore, StorageError};

use super::{
    import_attachments, managed_names, new_record_id, resolve_attachments, rewrite_at_rest,
    Record, RepoError,
};

fn persist_record<T: Record>(
    store: &SlotStore,
    library: &MediaLibrary,
    slot: &str,
    record: &T,
) -> Result<(), RepoError> {
    let mut at_rest = record.clone();
    rewrite_at_rest(library, &mut at_rest);
    let json = serde_json::to_string(&at_rest).map_err(StorageError::from)?;
    store.write_raw(slot, &json)?;
    Ok(())
}

// ============================================================================
// Profile Repository
// ============================================================================

/// An always-present singleton, merged with defaults on load.
pub struct ProfileRepo<T: Record + Default> {
    slot: &'static str,
    store: Arc<SlotStore>,
    library: Arc<MediaLibrary>,
    record: Mutex<T>,
}

impl<T: Record + Default> ProfileRepo<T> {
    /// Load the profile, falling back to (and self-healing to) the default.
    pub fn load(slot: &'static str, store: Arc<SlotStore>, library: Arc<MediaLibrary>) -> Self {
        let mut record: T = store.load_or_default(slot);
        resolve_attachments(&library, &mut record);

        Self {
            slot,
            store,
            library,
            record: Mutex::new(record),
        }
    }

    /// The current profile.
    pub fn get(&self) -> T {
        self.record.lock().unwrap().clone()
    }

    /// Replace the profile.
    ///
    /// A first save assigns identity; new attachments are imported before
    /// the slot is written, and files displaced by the save are removed
    /// best-effort afterwards.
    pub fn save(&self, mut next: T) -> Result<T, RepoError> {
        let previous = self.record.lock().unwrap().clone();

        if next.id().is_empty() {
            next.assign_identity(new_record_id(), Utc::now());
        }
        import_attachments(&self.library, &mut next)?;

        persist_record(&self.store, &self.library, self.slot, &next)?;
        *self.record.lock().unwrap() = next.clone();

        let kept = managed_names(&self.library, &next);
        for name in managed_names(&self.library, &previous) {
            if !kept.contains(&name) {
                self.library.delete(&name);
            }
        }

        Ok(next)
    }
}

// ============================================================================
// Document Repository
// ============================================================================

/// An optional singleton: absent until first saved.
pub struct DocumentRepo<T: Record> {
    slot: &'static str,
    store: Arc<SlotStore>,
    library: Arc<MediaLibrary>,
    record: Mutex<Option<T>>,
}

impl<T: Record> DocumentRepo<T> {
    /// Load the document if present; corrupt slots self-heal to absent.
    pub fn load(slot: &'static str, store: Arc<SlotStore>, library: Arc<MediaLibrary>) -> Self {
        let record = store.load_optional(slot).map(|mut record: T| {
            resolve_attachments(&library, &mut record);
            record
        });

        Self {
            slot,
            store,
            library,
            record: Mutex::new(record),
        }
    }

    /// The current document, if one has been saved.
    pub fn get(&self) -> Option<T> {
        self.record.lock().unwrap().clone()
    }

    /// Save (or replace) the document.
    pub fn save(&self, mut next: T) -> Result<T, RepoError> {
        let previous = self.record.lock().unwrap().clone();

        if next.id().is_empty() {
            next.assign_identity(new_record_id(), Utc::now());
        }
        import_attachments(&self.library, &mut next)?;

        persist_record(&self.store, &self.library, self.slot, &next)?;
        *self.record.lock().unwrap() = Some(next.clone());

        if let Some(previous) = previous {
            let kept = managed_names(&self.library, &next);
            for name in managed_names(&self.library, &previous) {
                if !kept.contains(&name) {
                    self.library.delete(&name);
                }
            }
        }

        Ok(next)
    }

    /// Remove the document and its attachment files.
    ///
    /// File cleanup is best-effort; clearing an absent document succeeds.
    pub fn clear(&self) -> Result<(), RepoError> {
        let previous = self.record.lock().unwrap().clone();

        if let Some(record) = &previous {
            for name in managed_names(&self.library, record) {
                self.library.delete(&name);
            }
        }

        self.store.clear(self.slot)?;
        *self.record.lock().unwrap() = None;

        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
