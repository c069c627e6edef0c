pub mod config;
pub mod error;
pub mod types;

pub use error::{MarcError, MarcResult};
pub use types::{Algorithm, Entry, NameEncoding};

/// File extension carried by every persisted archive.
pub const ARCHIVE_EXTENSION: &str = ".mar";
