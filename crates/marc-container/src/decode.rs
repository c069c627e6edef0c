//! Archive buffer → entries
//!
//! The header and the overall metadata region are checked up front; each
//! record is then decoded on demand. Records are independent of each other,
//! so entries can be read in any order or by index.

use marc_core::{Entry, MarcError, MarcResult, NameEncoding};

use crate::layout::{read_u64, MetadataRecord, HEADER_SIZE, METADATA_RECORD_SIZE};

/// An entry decoded from an archive, borrowing its content from the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivedEntry<'a> {
    pub name: String,
    pub content: &'a [u8],
}

impl ArchivedEntry<'_> {
    pub fn to_entry(&self) -> Entry {
        Entry::new(self.name.clone(), self.content)
    }
}

impl From<ArchivedEntry<'_>> for Entry {
    fn from(entry: ArchivedEntry<'_>) -> Self {
        Entry::new(entry.name, entry.content)
    }
}

/// A validated view over an archive buffer.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveReader<'a> {
    archive: &'a [u8],
    metadata_offset: usize,
    count: usize,
    encoding: NameEncoding,
}

impl<'a> ArchiveReader<'a> {
    /// Check the header and the shape of the metadata region.
    pub fn new(archive: &'a [u8], encoding: NameEncoding) -> MarcResult<Self> {
        if archive.len() < HEADER_SIZE {
            return Err(MarcError::malformed(format!(
                "archive is {} bytes, shorter than the {HEADER_SIZE}-byte header",
                archive.len()
            )));
        }

        let raw_offset = read_u64(&archive[..HEADER_SIZE]);
        let metadata_offset = usize::try_from(raw_offset)
            .ok()
            .filter(|&o| (HEADER_SIZE..=archive.len()).contains(&o))
            .ok_or_else(|| {
                MarcError::malformed(format!(
                    "metadata offset {raw_offset} is outside the archive ({} bytes)",
                    archive.len()
                ))
            })?;

        let metadata_len = archive.len() - metadata_offset;
        if metadata_len % METADATA_RECORD_SIZE != 0 {
            return Err(MarcError::malformed(format!(
                "metadata region is {metadata_len} bytes, not a multiple of {METADATA_RECORD_SIZE}"
            )));
        }

        Ok(Self {
            archive,
            metadata_offset,
            count: metadata_len / METADATA_RECORD_SIZE,
            encoding,
        })
    }

    /// Number of entries in the archive
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Absolute offset of the metadata region (the value stored in the header)
    pub fn metadata_offset(&self) -> usize {
        self.metadata_offset
    }

    /// Decode the entry at `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<MarcResult<ArchivedEntry<'a>>> {
        (index < self.count).then(|| self.decode_at(index))
    }

    pub fn entries(&self) -> Entries<'a> {
        Entries {
            reader: *self,
            front: 0,
            back: self.count,
        }
    }

    fn decode_at(&self, index: usize) -> MarcResult<ArchivedEntry<'a>> {
        let archive: &'a [u8] = self.archive;
        let at = self.metadata_offset + index * METADATA_RECORD_SIZE;
        let record = MetadataRecord::parse(&archive[at..at + METADATA_RECORD_SIZE])?;

        if record.end < record.start {
            return Err(MarcError::malformed(format!(
                "entry {index}: end offset {} is before start offset {}",
                record.end, record.start
            )));
        }
        if record.start < HEADER_SIZE as u64 || record.end > self.metadata_offset as u64 {
            return Err(MarcError::malformed(format!(
                "entry {index}: content {}..{} lies outside the content region {HEADER_SIZE}..{}",
                record.start, record.end, self.metadata_offset
            )));
        }

        // Both bounds are now <= metadata_offset, which is a usize.
        let (start, end) = (record.start as usize, record.end as usize);
        let name = self
            .encoding
            .decode(record.name)
            .map_err(|e| MarcError::malformed(format!("entry {index}: {e}")))?;

        Ok(ArchivedEntry {
            name,
            content: &archive[start..end],
        })
    }
}

impl<'a> IntoIterator for ArchiveReader<'a> {
    type Item = MarcResult<ArchivedEntry<'a>>;
    type IntoIter = Entries<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries()
    }
}

/// Lazy iterator over the entries of an archive, in encode order.
#[derive(Debug, Clone)]
pub struct Entries<'a> {
    reader: ArchiveReader<'a>,
    front: usize,
    back: usize,
}

impl<'a> Iterator for Entries<'a> {
    type Item = MarcResult<ArchivedEntry<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let item = self.reader.decode_at(self.front);
        self.front += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl DoubleEndedIterator for Entries<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some(self.reader.decode_at(self.back))
    }
}

impl ExactSizeIterator for Entries<'_> {}

/// Decode an archive buffer into a lazy sequence of entries.
///
/// Header problems fail immediately; a bad individual record fails when that
/// entry is reached.
pub fn decode(archive: &[u8], encoding: NameEncoding) -> MarcResult<Entries<'_>> {
    Ok(ArchiveReader::new(archive, encoding)?.entries())
}
