//! Entries → archive buffer
//!
//! Single pass with a backpatched header: content is appended while metadata
//! records are staged, the staged records follow the content, and finally the
//! header is overwritten with the metadata offset.

use marc_core::{Entry, MarcError, MarcResult, NameEncoding};
use tracing::debug;

use crate::layout::{MetadataRecord, HEADER_SIZE, MAX_NAME_LEN, METADATA_RECORD_SIZE};

/// Exact size of the buffer [`encode`] would produce for `entries`.
pub fn encoded_len(entries: &[Entry]) -> usize {
    if entries.is_empty() {
        return 0;
    }
    let content: usize = entries.iter().map(|e| e.content.len()).sum();
    HEADER_SIZE + content + entries.len() * METADATA_RECORD_SIZE
}

/// Encode a name and check that it fits a metadata record.
///
/// Rejects empty names, names longer than [`MAX_NAME_LEN`] once encoded, and
/// names whose encoding contains a NUL byte (NUL terminates the name on disk).
pub fn validate_name(name: &str, encoding: NameEncoding) -> MarcResult<Vec<u8>> {
    if name.is_empty() {
        return Err(MarcError::invalid_name(name, "name is empty"));
    }

    let encoded = encoding.encode(name)?;

    if encoded.len() > MAX_NAME_LEN {
        return Err(MarcError::NameTooLong {
            name: name.to_string(),
            len: encoded.len(),
            max: MAX_NAME_LEN,
        });
    }
    if encoded.contains(&0) {
        return Err(MarcError::invalid_name(name, "name contains a NUL byte"));
    }

    Ok(encoded)
}

/// Encode entries into one archive buffer.
///
/// Every name is validated before anything is written, so a failure never
/// leaves a partial buffer behind. An empty slice encodes to an empty buffer
/// (no header).
pub fn encode(entries: &[Entry], encoding: NameEncoding) -> MarcResult<Vec<u8>> {
    if entries.is_empty() {
        return Ok(Vec::new());
    }

    let names = entries
        .iter()
        .map(|e| validate_name(&e.name, encoding))
        .collect::<MarcResult<Vec<_>>>()?;

    let mut archive = Vec::with_capacity(encoded_len(entries));
    let mut metadata = Vec::with_capacity(entries.len() * METADATA_RECORD_SIZE);

    archive.resize(HEADER_SIZE, 0);

    for (entry, name) in entries.iter().zip(&names) {
        let start = archive.len() as u64;
        archive.extend_from_slice(&entry.content);
        let end = archive.len() as u64;

        MetadataRecord {
            start,
            end,
            name,
        }
        .write_to(&mut metadata);
    }

    let metadata_offset = archive.len() as u64;
    archive.extend_from_slice(&metadata);
    archive[..HEADER_SIZE].copy_from_slice(&metadata_offset.to_le_bytes());

    debug!(
        entries = entries.len(),
        metadata_offset,
        total = archive.len(),
        "encoded archive"
    );
    Ok(archive)
}
