use std::path::PathBuf;
use thiserror::Error;

pub type MarcResult<T> = Result<T, MarcError>;

#[derive(Debug, Error)]
pub enum MarcError {
    #[error("name '{name}' is too long: {len} bytes encoded (maximum {max})")]
    NameTooLong { name: String, len: usize, max: usize },

    #[error("invalid entry name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("no data to encrypt or decrypt")]
    EmptyData,

    #[error("empty password provided for encryption")]
    EmptyPassword,

    /// Wrong password, missing password, or a tampered envelope. The three are
    /// deliberately indistinguishable.
    #[error("invalid encryption key")]
    InvalidKey,

    #[error("malformed archive: {0}")]
    MalformedArchive(String),

    #[error("unknown encryption algorithm tag: {0}")]
    UnknownAlgorithm(u32),

    #[error("password was provided but encryption is not enabled")]
    EncryptionDisabled,

    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("crypto error: {0}")]
    Crypto(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MarcError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        MarcError::MalformedArchive(msg.into())
    }

    pub fn invalid_name(name: &str, reason: impl Into<String>) -> Self {
        MarcError::InvalidName {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
