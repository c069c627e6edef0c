//! marc-crypto: password-based encryption framing for marc archives
//!
//! Envelope format (binary):
//! ```text
//! [8 bytes: salt][16 bytes: IV][N bytes: AES-128-CBC ciphertext, PKCS#7][32 bytes: HMAC-SHA256]
//! ```
//!
//! Key = PBKDF2-HMAC-SHA512(password, salt, 50 000 rounds, 16 bytes). The HMAC
//! is keyed with the same derived key and covers `salt || iv || ciphertext`.

pub mod envelope;
pub mod kdf;

pub use envelope::{decrypt, decrypt_with, encrypt, encrypt_with};
pub use kdf::{derive_key, DerivedKey, KdfParams};

/// Size of the derived AES-128 key in bytes
pub const KEY_SIZE: usize = 16;

/// Size of the random PBKDF2 salt
pub const SALT_SIZE: usize = 8;

/// Size of the CBC initialization vector (one AES block)
pub const IV_SIZE: usize = 16;

/// Size of the HMAC-SHA256 integrity tag
pub const HMAC_SIZE: usize = 32;

/// AES block size; PKCS#7 always emits at least one block
pub const BLOCK_SIZE: usize = 16;

/// Smallest envelope that can possibly be valid
pub const MIN_ENVELOPE_SIZE: usize = SALT_SIZE + IV_SIZE + BLOCK_SIZE + HMAC_SIZE;
