//! marc-storage: where archive bytes and extracted files come from and go to
//!
//! The orchestrator only ever reads whole files and writes whole files, so
//! the abstraction is two calls wide.

pub mod local;
pub mod memory;

use std::path::Path;

use marc_core::MarcResult;

pub use local::LocalFileSystem;
pub use memory::MemoryFileSystem;

/// File-system collaborator used by the archive orchestrator.
pub trait FileSystem: Send + Sync {
    /// Read a whole file. A missing file is [`marc_core::MarcError::NotFound`].
    fn read_all_bytes(&self, path: &Path) -> MarcResult<Vec<u8>>;

    /// Write a whole file, creating parent directories and replacing any
    /// existing file.
    fn save_file(&self, path: &Path, bytes: &[u8]) -> MarcResult<()>;
}

impl<F: FileSystem + ?Sized> FileSystem for &F {
    fn read_all_bytes(&self, path: &Path) -> MarcResult<Vec<u8>> {
        (**self).read_all_bytes(path)
    }

    fn save_file(&self, path: &Path, bytes: &[u8]) -> MarcResult<()> {
        (**self).save_file(path, bytes)
    }
}
