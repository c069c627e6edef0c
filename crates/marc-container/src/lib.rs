//! marc-container: the archive buffer layout and its codec
//!
//! ```text
//! +----------+---------------------------+------------------------------+
//! | HEADER   | CONTENT                   | METADATA                     |
//! | u64 LE   | entry 0 | entry 1 | ...   | record 0 | record 1 | ...    |
//! +----------+---------------------------+------------------------------+
//!   8 bytes    raw bytes, no separators     512 bytes each
//! ```
//!
//! - `layout`: sizes, and the 512-byte metadata record
//! - `encode`: entries → archive buffer (append then backpatch the header)
//! - `decode`: archive buffer → lazily decoded, zero-copy entries

pub mod decode;
pub mod encode;
pub mod layout;

pub use decode::{decode, ArchiveReader, ArchivedEntry, Entries};
pub use encode::{encode, encoded_len, validate_name};
pub use layout::{MetadataRecord, HEADER_SIZE, MAX_NAME_LEN, METADATA_RECORD_SIZE};
