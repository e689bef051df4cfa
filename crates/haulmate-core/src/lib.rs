//! # haulmate-core
//!
//! Core business logic for Haulmate, a companion app for truck drivers.
//!
//! This crate is framework-agnostic and can be used by:
//! - a mobile shell (via bindings)
//! - the `haulmate` CLI
//! - tests
//!
//! ## Key Concepts
//!
//! - **Slot**: one named entry in the flat key-value store holding one
//!   entity type's full collection or singleton
//! - **Managed directory**: the private `user_files` directory where every
//!   attachment file is copied and from which it is resolved
//! - **Repository**: the owner of one entity type, mirroring an in-memory
//!   collection into its slot

pub mod chat;
pub mod context;
pub mod media;
pub mod news;
pub mod paths;
pub mod repos;
pub mod storage;

// Re-export commonly used types
pub use chat::{ChatClient, ChatConfig, ChatMessage};
pub use context::{AppContext, AppContextBuilder};
pub use media::MediaLibrary;
pub use news::NewsFeed;
pub use repos::RepoError;
pub use storage::SlotStore;
