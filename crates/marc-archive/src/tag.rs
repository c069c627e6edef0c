//! Trailing algorithm tag

use marc_core::{Algorithm, MarcError, MarcResult};

/// Width of the trailing tag (u32 LE)
pub const TAG_SIZE: usize = 4;

pub fn append_tag(buf: &mut Vec<u8>, algorithm: Algorithm) {
    buf.extend_from_slice(&algorithm.tag().to_le_bytes());
}

/// Split a file into its payload and the algorithm named by its tag.
pub fn split_tag(file: &[u8]) -> MarcResult<(&[u8], Algorithm)> {
    if file.len() < TAG_SIZE {
        return Err(MarcError::malformed(format!(
            "file is {} bytes, too short for the {TAG_SIZE}-byte algorithm tag",
            file.len()
        )));
    }
    let (payload, tag) = file.split_at(file.len() - TAG_SIZE);
    let mut raw = [0u8; TAG_SIZE];
    raw.copy_from_slice(tag);
    let algorithm = Algorithm::from_tag(u32::from_le_bytes(raw))?;
    Ok((payload, algorithm))
}
