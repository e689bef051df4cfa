//! Generic collection repository.
//!
//! One in-memory `Vec` of records mirrored into one slot. Every mutation
//! derives the next collection from the latest in-memory state, persists it,
//! and only then commits it to memory. A failed write leaves both the slot
//! and the in-memory collection as they were.

use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::media::MediaLibrary;
use crate::storage::SlotStore;

use super::{
    import_attachments, managed_names, new_record_id, resolve_attachments, rewrite_at_rest,
    Record, RepoError,
};

/// A repository over a JSON-array slot.
pub struct CollectionRepo<T: Record> {
    slot: &'static str,
    store: Arc<SlotStore>,
    library: Arc<MediaLibrary>,
    /// New records go to the front instead of the back (gallery).
    newest_first: bool,
    /// Reject writes whose serialized payload exceeds this many bytes.
    payload_limit: Option<usize>,
    records: Mutex<Vec<T>>,
}

impl<T: Record> CollectionRepo<T> {
    /// Load a repository from its slot.
    ///
    /// An absent slot yields an empty collection; a corrupt one is cleared
    /// and also yields an empty collection. Every attachment is resolved to
    /// its in-memory form before becoming visible.
    pub fn load(slot: &'static str, store: Arc<SlotStore>, library: Arc<MediaLibrary>) -> Self {
        Self::load_with(slot, store, library, false, None)
    }

    /// Load with ordering and payload-cap options.
    pub fn load_with(
        slot: &'static str,
        store: Arc<SlotStore>,
        library: Arc<MediaLibrary>,
        newest_first: bool,
        payload_limit: Option<usize>,
    ) -> Self {
        let mut records: Vec<T> = store.load_or_default(slot);
        for record in &mut records {
            resolve_attachments(&library, record);
        }

        Self {
            slot,
            store,
            library,
            newest_first,
            payload_limit,
            records: Mutex::new(records),
        }
    }

    /// The slot this repository persists into.
    pub fn slot(&self) -> &'static str {
        self.slot
    }

    /// A snapshot of the current collection.
    pub fn list(&self) -> Vec<T> {
        self.records.lock().unwrap().clone()
    }

    /// Find a record by id.
    pub fn get(&self, id: &str) -> Option<T> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id() == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().unwrap().is_empty()
    }

    /// Create a record from a draft.
    ///
    /// Attachments are imported (copied into the managed directory) first;
    /// the draft then gets its identity and joins the collection, which is
    /// persisted before the in-memory state is committed.
    pub fn create(&self, mut draft: T) -> Result<T, RepoError> {
        import_attachments(&self.library, &mut draft)?;
        draft.assign_identity(new_record_id(), Utc::now());

        let mut next = self.records.lock().unwrap().clone();
        if self.newest_first {
            next.insert(0, draft.clone());
        } else {
            next.push(draft.clone());
        }

        self.persist(&next)?;
        *self.records.lock().unwrap() = next;

        Ok(draft)
    }

    /// Apply a mutation to the record with the given id.
    ///
    /// Attachment values the mutation introduced are imported before the
    /// merge commits; managed files the mutation displaced are deleted
    /// best-effort after the new collection is safely persisted.
    pub fn update(&self, id: &str, mutate: impl FnOnce(&mut T)) -> Result<T, RepoError> {
        let mut next = self.records.lock().unwrap().clone();
        let position = next
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| RepoError::NotFound(id.to_string()))?;

        let before = managed_names(&self.library, &next[position]);

        let mut updated = next[position].clone();
        mutate(&mut updated);
        import_attachments(&self.library, &mut updated)?;

        let after = managed_names(&self.library, &updated);
        next[position] = updated.clone();

        self.persist(&next)?;
        *self.records.lock().unwrap() = next;

        for name in before.iter().filter(|name| !after.contains(name)) {
            self.library.delete(name);
        }

        Ok(updated)
    }

    /// Delete the record with the given id.
    ///
    /// Each attachment is removed from the media library first (best-effort,
    /// never blocking the logical delete), then the remainder is persisted.
    pub fn delete(&self, id: &str) -> Result<(), RepoError> {
        let mut next = self.records.lock().unwrap().clone();
        let position = next
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| RepoError::NotFound(id.to_string()))?;

        let removed = next.remove(position);
        for name in managed_names(&self.library, &removed) {
            self.library.delete(&name);
        }

        self.persist(&next)?;
        *self.records.lock().unwrap() = next;

        Ok(())
    }

    /// Serialize the collection with at-rest attachment forms and write it.
    fn persist(&self, records: &[T]) -> Result<(), RepoError> {
        let mut at_rest = records.to_vec();
        for record in &mut at_rest {
            rewrite_at_rest(&self.library, record);
        }

        let json = serde_json::to_string(&at_rest).map_err(crate::storage::StorageError::from)?;

        if let Some(limit) = self.payload_limit {
            if json.len() > limit {
                return Err(RepoError::QuotaExceeded {
                    size: json.len(),
                    limit,
                });
            }
        }

        self.store.write_raw(self.slot, &json)?;
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
