//! Attachment file management.
//!
//! # Overview
//!
//! Every record with an image or document attachment stores that attachment
//! in two representations:
//!
//! - **At rest** (in the slot): a relative filename with no directory
//!   component, or a legacy external URI kept verbatim.
//! - **In memory** (after load): an absolute path under the current storage
//!   root, reconstructed from the filename. The root can change between
//!   installs even though the filename persists.
//!
//! [`resolve`] holds the pure string transforms between the two forms;
//! [`library`] owns the managed `user_files` directory and the physical
//! copy/delete of attachment files.

pub mod library;
pub mod resolve;

pub use library::{LibraryError, MediaLibrary};
pub use resolve::MANAGED_DIR_NAME;
