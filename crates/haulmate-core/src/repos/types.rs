//! Entity record types.
//!
//! # Data Model
//!
//! All records are flat, identified by a time-derived string id and a
//! creation timestamp, and serialized camelCase so existing slots written by
//! earlier app versions keep loading. Attachment fields hold a resolved
//! absolute path in memory and a bare filename (or verbatim external URI)
//! at rest; the repositories perform the rewrite on load and save.
//!
//! Drafts are built with the `draft` constructors and get their identity
//! assigned by the owning repository on create.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A persistable record.
///
/// `attachments_mut` exposes every attachment field the record carries so
/// the repositories can import, resolve and rewrite them without knowing
/// the concrete shape.
pub trait Record: Clone + Serialize + DeserializeOwned {
    fn id(&self) -> &str;

    fn assign_identity(&mut self, id: String, created_at: DateTime<Utc>);

    fn attachments_mut(&mut self) -> Vec<&mut String> {
        Vec::new()
    }
}

// ============================================================================
// Truck Profile
// ============================================================================

/// The device's single truck profile.
///
/// Defaulted-and-merged on load: every field is optional at rest and takes
/// its default when missing, so partial slots from older versions load.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TruckProfile {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub truck_number: String,

    #[serde(default)]
    pub make: String,

    #[serde(default)]
    pub model: String,

    #[serde(default)]
    pub year: String,

    #[serde(default)]
    pub license_plate: String,

    #[serde(default)]
    pub vin: String,

    /// Truck photo. Resolved absolute path in memory, bare filename at rest.
    #[serde(default)]
    pub photo_uri: String,
}

impl Record for TruckProfile {
    fn id(&self) -> &str {
        &self.id
    }

    fn assign_identity(&mut self, id: String, created_at: DateTime<Utc>) {
        self.id = id;
        self.created_at = Some(created_at);
    }

    fn attachments_mut(&mut self) -> Vec<&mut String> {
        vec![&mut self.photo_uri]
    }
}

// ============================================================================
// Trailer
// ============================================================================

/// A trailer in the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trailer {
    pub id: String,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    pub name: String,

    #[serde(default)]
    pub trailer_type: String,

    #[serde(default)]
    pub license_plate: String,

    #[serde(default)]
    pub notes: String,

    #[serde(default)]
    pub photo_uri: String,
}

impl Trailer {
    /// Draft a new trailer; the repository assigns its identity on create.
    pub fn draft(name: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            created_at: Utc::now(),
            name: name.into(),
            trailer_type: String::new(),
            license_plate: String::new(),
            notes: String::new(),
            photo_uri: String::new(),
        }
    }
}

impl Record for Trailer {
    fn id(&self) -> &str {
        &self.id
    }

    fn assign_identity(&mut self, id: String, created_at: DateTime<Utc>) {
        self.id = id;
        self.created_at = created_at;
    }

    fn attachments_mut(&mut self) -> Vec<&mut String> {
        vec![&mut self.photo_uri]
    }
}

// ============================================================================
// Place
// ============================================================================

/// A place the driver has visited.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub id: String,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    pub name: String,

    #[serde(default)]
    pub address: String,

    #[serde(default)]
    pub notes: String,

    #[serde(default)]
    pub photo_uri: String,
}

impl Place {
    pub fn draft(name: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            created_at: Utc::now(),
            name: name.into(),
            address: String::new(),
            notes: String::new(),
            photo_uri: String::new(),
        }
    }
}

impl Record for Place {
    fn id(&self) -> &str {
        &self.id
    }

    fn assign_identity(&mut self, id: String, created_at: DateTime<Utc>) {
        self.id = id;
        self.created_at = created_at;
    }

    fn attachments_mut(&mut self) -> Vec<&mut String> {
        vec![&mut self.photo_uri]
    }
}

// ============================================================================
// Emergency Contact
// ============================================================================

/// An emergency contact. Carries no attachments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyContact {
    pub id: String,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    pub name: String,

    #[serde(default)]
    pub phone: String,

    #[serde(default)]
    pub relation: String,
}

impl EmergencyContact {
    pub fn draft(name: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            created_at: Utc::now(),
            name: name.into(),
            phone: String::new(),
            relation: String::new(),
        }
    }
}

impl Record for EmergencyContact {
    fn id(&self) -> &str {
        &self.id
    }

    fn assign_identity(&mut self, id: String, created_at: DateTime<Utc>) {
        self.id = id;
        self.created_at = created_at;
    }
}

// ============================================================================
// Health Insurance
// ============================================================================

/// The driver's health insurance card. Absent until first saved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthInsurance {
    pub id: String,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub provider: String,

    #[serde(default)]
    pub policy_number: String,

    #[serde(default)]
    pub group_number: String,

    #[serde(default)]
    pub front_card_uri: String,

    #[serde(default)]
    pub back_card_uri: String,
}

impl HealthInsurance {
    pub fn draft(provider: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            created_at: Utc::now(),
            provider: provider.into(),
            policy_number: String::new(),
            group_number: String::new(),
            front_card_uri: String::new(),
            back_card_uri: String::new(),
        }
    }
}

impl Record for HealthInsurance {
    fn id(&self) -> &str {
        &self.id
    }

    fn assign_identity(&mut self, id: String, created_at: DateTime<Utc>) {
        self.id = id;
        self.created_at = created_at;
    }

    fn attachments_mut(&mut self) -> Vec<&mut String> {
        vec![&mut self.front_card_uri, &mut self.back_card_uri]
    }
}

// ============================================================================
// Driver ID
// ============================================================================

/// The driver's license card. Absent until first saved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverId {
    pub id: String,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub license_number: String,

    #[serde(default)]
    pub license_class: String,

    /// Expiry date as entered on the form.
    #[serde(default)]
    pub expires: String,

    #[serde(default)]
    pub front_card_uri: String,

    #[serde(default)]
    pub back_card_uri: String,
}

impl DriverId {
    pub fn draft(license_number: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            created_at: Utc::now(),
            license_number: license_number.into(),
            license_class: String::new(),
            expires: String::new(),
            front_card_uri: String::new(),
            back_card_uri: String::new(),
        }
    }
}

impl Record for DriverId {
    fn id(&self) -> &str {
        &self.id
    }

    fn assign_identity(&mut self, id: String, created_at: DateTime<Utc>) {
        self.id = id;
        self.created_at = created_at;
    }

    fn attachments_mut(&mut self) -> Vec<&mut String> {
        vec![&mut self.front_card_uri, &mut self.back_card_uri]
    }
}

// ============================================================================
// Scanned File
// ============================================================================

/// A scanned document: a named bundle of page images.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannedFile {
    pub id: String,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    pub name: String,

    /// Page images, in scan order.
    #[serde(default)]
    pub scan_images: Vec<String>,
}

impl ScannedFile {
    pub fn draft(name: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            created_at: Utc::now(),
            name: name.into(),
            scan_images: Vec::new(),
        }
    }
}

impl Record for ScannedFile {
    fn id(&self) -> &str {
        &self.id
    }

    fn assign_identity(&mut self, id: String, created_at: DateTime<Utc>) {
        self.id = id;
        self.created_at = created_at;
    }

    fn attachments_mut(&mut self) -> Vec<&mut String> {
        self.scan_images.iter_mut().collect()
    }
}

// ============================================================================
// Gallery Photo
// ============================================================================

/// A gallery photo. The gallery collection is kept newest-first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryPhoto {
    pub id: String,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    pub uri: String,

    #[serde(default)]
    pub caption: String,
}

impl GalleryPhoto {
    pub fn draft(uri: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            created_at: Utc::now(),
            uri: uri.into(),
            caption: String::new(),
        }
    }
}

impl Record for GalleryPhoto {
    fn id(&self) -> &str {
        &self.id
    }

    fn assign_identity(&mut self, id: String, created_at: DateTime<Utc>) {
        self.id = id;
        self.created_at = created_at;
    }

    fn attachments_mut(&mut self) -> Vec<&mut String> {
        vec![&mut self.uri]
    }
}

// ============================================================================
// TESTS
// ============================================================================
