mod checksum;
mod error;
mod traits;

pub mod filesystem;

pub use checksum::Checksum;
pub use error::StorageError;
pub use traits::{FileStore, StoredFile};
