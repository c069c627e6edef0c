//! Fixed sizes of the archive layout and the metadata record codec
//!
//! Changing any of these makes existing archives unreadable.

use marc_core::{MarcError, MarcResult};

/// Header: absolute offset of the metadata region (u64 LE)
pub const HEADER_SIZE: usize = 8;

/// Start offset field of a metadata record
pub const START_FIELD_SIZE: usize = 8;

/// End offset field of a metadata record
pub const END_FIELD_SIZE: usize = 8;

/// Zero-padded name field of a metadata record
pub const MAX_NAME_LEN: usize = 496;

/// One metadata record per entry
pub const METADATA_RECORD_SIZE: usize = START_FIELD_SIZE + END_FIELD_SIZE + MAX_NAME_LEN;

const NAME_OFFSET: usize = START_FIELD_SIZE + END_FIELD_SIZE;

/// A decoded metadata record: where one entry's content lives and its raw name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataRecord<'a> {
    /// Absolute start offset of the content
    pub start: u64,
    /// Absolute end offset (exclusive)
    pub end: u64,
    /// Encoded name, without the zero padding
    pub name: &'a [u8],
}

impl<'a> MetadataRecord<'a> {
    /// Serialize into a fixed 512-byte block.
    ///
    /// The caller guarantees `name.len() <= MAX_NAME_LEN`; see
    /// [`crate::encode::validate_name`].
    pub fn write_to(&self, out: &mut Vec<u8>) {
        debug_assert!(self.name.len() <= MAX_NAME_LEN);
        out.extend_from_slice(&self.start.to_le_bytes());
        out.extend_from_slice(&self.end.to_le_bytes());
        out.extend_from_slice(self.name);
        out.resize(out.len() + (MAX_NAME_LEN - self.name.len()), 0);
    }

    /// Parse one 512-byte block. The name ends at the first zero byte.
    pub fn parse(block: &'a [u8]) -> MarcResult<Self> {
        if block.len() != METADATA_RECORD_SIZE {
            return Err(MarcError::malformed(format!(
                "metadata record is {} bytes (expected {METADATA_RECORD_SIZE})",
                block.len()
            )));
        }

        let start = read_u64(&block[..START_FIELD_SIZE]);
        let end = read_u64(&block[START_FIELD_SIZE..NAME_OFFSET]);
        let name_field = &block[NAME_OFFSET..];
        let name_len = name_field
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(MAX_NAME_LEN);

        Ok(Self {
            start,
            end,
            name: &name_field[..name_len],
        })
    }
}

/// Read a little-endian u64 from an 8-byte slice.
pub(crate) fn read_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_size_is_512() {
        assert_eq!(METADATA_RECORD_SIZE, 512);
    }

    #[test]
    fn record_roundtrip() {
        let record = MetadataRecord {
            start: 8,
            end: 13,
            name: b"a.txt",
        };
        let mut block = Vec::new();
        record.write_to(&mut block);

        assert_eq!(block.len(), METADATA_RECORD_SIZE);
        assert_eq!(&block[..8], &8u64.to_le_bytes());
        assert_eq!(&block[8..16], &13u64.to_le_bytes());
        assert_eq!(&block[16..21], b"a.txt");
        assert!(block[21..].iter().all(|&b| b == 0));

        assert_eq!(MetadataRecord::parse(&block).unwrap(), record);
    }

    #[test]
    fn full_width_name_has_no_terminator() {
        let name = vec![b'n'; MAX_NAME_LEN];
        let record = MetadataRecord {
            start: 8,
            end: 8,
            name: &name,
        };
        let mut block = Vec::new();
        record.write_to(&mut block);

        let parsed = MetadataRecord::parse(&block).unwrap();
        assert_eq!(parsed.name.len(), MAX_NAME_LEN);
    }

    #[test]
    fn short_block_is_malformed() {
        let err = MetadataRecord::parse(&[0u8; 100]).unwrap_err();
        assert!(matches!(err, MarcError::MalformedArchive(_)));
    }
}
