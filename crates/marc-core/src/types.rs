use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{MarcError, MarcResult};

/// A named blob packed into (or unpacked from) an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub content: Vec<u8>,
}

impl Entry {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Encryption algorithm selector, persisted as the trailing 4-byte tag of
/// every archive file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Plain archive buffer
    None,
    /// AES-128-CBC envelope with HMAC-SHA256
    #[default]
    Aes,
}

impl Algorithm {
    pub fn tag(self) -> u32 {
        match self {
            Algorithm::None => 0,
            Algorithm::Aes => 1,
        }
    }

    pub fn from_tag(tag: u32) -> MarcResult<Self> {
        match tag {
            0 => Ok(Algorithm::None),
            1 => Ok(Algorithm::Aes),
            other => Err(MarcError::UnknownAlgorithm(other)),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::None => f.write_str("none"),
            Algorithm::Aes => f.write_str("aes"),
        }
    }
}

/// Byte encoding used for entry names inside metadata records.
///
/// Names are zero-terminated on disk, so only encodings that never emit a
/// NUL byte for a non-NUL character are offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NameEncoding {
    #[default]
    #[serde(rename = "utf-8", alias = "utf8")]
    Utf8,
    #[serde(rename = "ascii")]
    Ascii,
    #[serde(rename = "latin-1", alias = "latin1", alias = "iso-8859-1")]
    Latin1,
}

impl NameEncoding {
    /// Encode a name, failing if a character has no representation.
    pub fn encode(self, name: &str) -> MarcResult<Vec<u8>> {
        match self {
            NameEncoding::Utf8 => Ok(name.as_bytes().to_vec()),
            NameEncoding::Ascii => {
                if name.is_ascii() {
                    Ok(name.as_bytes().to_vec())
                } else {
                    Err(MarcError::invalid_name(name, "not representable in ASCII"))
                }
            }
            NameEncoding::Latin1 => name
                .chars()
                .map(|c| u8::try_from(u32::from(c)).ok())
                .collect::<Option<Vec<u8>>>()
                .ok_or_else(|| MarcError::invalid_name(name, "not representable in Latin-1")),
        }
    }

    pub fn decode(self, bytes: &[u8]) -> MarcResult<String> {
        match self {
            NameEncoding::Utf8 => String::from_utf8(bytes.to_vec())
                .map_err(|e| MarcError::malformed(format!("entry name is not valid UTF-8: {e}"))),
            NameEncoding::Ascii => {
                if bytes.is_ascii() {
                    Ok(bytes.iter().map(|&b| char::from(b)).collect())
                } else {
                    Err(MarcError::malformed("entry name is not valid ASCII"))
                }
            }
            NameEncoding::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
        }
    }
}

impl fmt::Display for NameEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameEncoding::Utf8 => f.write_str("utf-8"),
            NameEncoding::Ascii => f.write_str("ascii"),
            NameEncoding::Latin1 => f.write_str("latin-1"),
        }
    }
}
