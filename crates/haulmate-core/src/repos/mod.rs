//! Entity repositories.
//!
//! # Overview
//!
//! One repository per domain, each mirroring an in-memory collection or
//! singleton into its own slot:
//!
//! - **Collections** ([`CollectionRepo`]) - trailers, places, emergency
//!   contacts, scanned files, gallery photos
//! - **Profile singletons** ([`ProfileRepo`]) - truck profile
//!   (defaulted-and-merged on load)
//! - **Document singletons** ([`DocumentRepo`]) - health insurance, driver
//!   ID (absent until first saved)
//! - **Sound settings** ([`SoundSettingsRepo`])
//!
//! # Attachment Discipline
//!
//! Every mutation that carries an attachment runs it through the media
//! library before anything is persisted: transient files are copied into the
//! managed directory, in-memory records hold resolved absolute paths, and
//! the slot only ever sees bare filenames (or verbatim external URIs).
//! Write failures propagate and leave the in-memory state untouched;
//! cleanup of displaced files is best-effort and never blocks.

pub mod collection;
pub mod singleton;
pub mod sounds;
pub mod types;

use chrono::Utc;
use thiserror::Error;

use crate::media::library::base36_fragment;
use crate::media::{LibraryError, MediaLibrary};
use crate::storage::StorageError;

pub use collection::CollectionRepo;
pub use singleton::{DocumentRepo, ProfileRepo};
pub use sounds::{Sound, SoundPlayer, SoundSettings, SoundSettingsRepo, SOUND_SETTINGS_SLOT};
pub use types::{
    DriverId, EmergencyContact, GalleryPhoto, HealthInsurance, Place, Record, ScannedFile,
    Trailer, TruckProfile,
};

// ============================================================================
// Slot Keys
// ============================================================================

pub const TRUCK_PROFILE_SLOT: &str = "truck_profile";
pub const TRAILERS_SLOT: &str = "trailers";
pub const PLACES_SLOT: &str = "places";
pub const EMERGENCY_CONTACTS_SLOT: &str = "emergency_contacts";
pub const HEALTH_INSURANCE_SLOT: &str = "health_insurance";
pub const DRIVER_ID_SLOT: &str = "driver_id";
pub const SCANNED_FILES_SLOT: &str = "scanned_files";
pub const GALLERY_PHOTOS_SLOT: &str = "gallery_photos";

/// Serialized gallery payloads above this size are rejected before write.
pub const GALLERY_PAYLOAD_LIMIT: usize = 5 * 1024 * 1024;

/// Error type for repository operations.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("photo storage is full: collection would be {size} bytes (limit {limit})")]
    QuotaExceeded { size: usize, limit: usize },
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Library(#[from] LibraryError),
}

/// Generate a time-derived record id.
///
/// The base36 fragment keeps two creates inside one millisecond apart.
pub(crate) fn new_record_id() -> String {
    format!("{}-{}", Utc::now().timestamp_millis(), base36_fragment(4))
}

/// Import every attachment a record carries: copy transient files into the
/// managed directory and leave resolved absolute paths in memory.
pub(crate) fn import_attachments<T: Record>(
    library: &MediaLibrary,
    record: &mut T,
) -> Result<(), LibraryError> {
    for field in record.attachments_mut() {
        if field.is_empty() {
            continue;
        }
        let name = library.save(field)?;
        *field = library.resolve(&name);
    }
    Ok(())
}

/// Rewrite every attachment to its at-rest form in place.
pub(crate) fn rewrite_at_rest<T: Record>(library: &MediaLibrary, record: &mut T) {
    for field in record.attachments_mut() {
        *field = library.to_relative(field);
    }
}

/// Resolve every attachment to its in-memory form in place.
pub(crate) fn resolve_attachments<T: Record>(library: &MediaLibrary, record: &mut T) {
    for field in record.attachments_mut() {
        *field = library.resolve(field);
    }
}

/// The bare filenames of a record's managed attachments.
///
/// External URIs and unmanaged paths keep their separators after
/// `to_relative` and are filtered out here.
pub(crate) fn managed_names<T: Record>(library: &MediaLibrary, record: &T) -> Vec<String> {
    let mut clone = record.clone();
    clone
        .attachments_mut()
        .into_iter()
        .map(|field| library.to_relative(field))
        .filter(|name| !name.is_empty() && !name.contains('/'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::new_record_id;

    #[test]
    fn record_ids_are_unique_and_nonempty() {
        let a = new_record_id();
        let b = new_record_id();
        assert!(!a.is_empty());
        assert_ne!(a, b);
    }

    #[test]
    fn record_ids_start_with_millis() {
        let id = new_record_id();
        let millis: &str = id.split('-').next().unwrap();
        assert!(millis.parse::<i64>().unwrap() > 0);
    }
}
