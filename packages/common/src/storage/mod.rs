//! Flat, name-addressed storage for uploaded media files.
//!
//! Files are written under a generated name derived from the client's
//! original file name, and looked up again by that name when served.

mod error;
mod hash;
mod name;
mod traits;

pub mod filesystem;

pub use error::StorageError;
pub use filesystem::FilesystemMediaStore;
pub use hash::{ContentHash, ContentHasher};
pub use name::{MediaName, validate_flat_name};
pub use traits::{BoxReader, MediaStore, StoredMedia};
