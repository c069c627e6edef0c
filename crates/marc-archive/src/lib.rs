//! marc-archive: create, open, list and extract `.mar` files
//!
//! On disk an archive is the container buffer (plain, or wrapped in the
//! encryption envelope) followed by a 4-byte algorithm tag:
//!
//! ```text
//! [ container buffer | envelope(container buffer) ][ u32 LE tag ]
//! ```

pub mod marchive;
pub mod report;
pub mod tag;

pub use marchive::{archive_path, safe_basename, Marchive, ProgressFn};
pub use report::{EntryInfo, ExtractFailure, ExtractReport};
pub use tag::{append_tag, split_tag, TAG_SIZE};
