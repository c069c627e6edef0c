//! Key derivation: PBKDF2-HMAC-SHA512 password → AES-128 key

use secrecy::{ExposeSecret, SecretString};
use sha2::Sha512;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{KEY_SIZE, SALT_SIZE};

/// A 128-bit key derived from a password via PBKDF2.
///
/// Keys both the AES cipher and the HMAC. Wiped when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey([u8; KEY_SIZE]);

impl DerivedKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// PBKDF2 parameters.
///
/// The iteration count is not stored in the envelope, so anything persisted
/// must use the default.
#[derive(Debug, Clone)]
pub struct KdfParams {
    /// PBKDF2 rounds (default: 50 000)
    pub iterations: u32,
}

impl KdfParams {
    pub const DEFAULT_ITERATIONS: u32 = 50_000;
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            iterations: Self::DEFAULT_ITERATIONS,
        }
    }
}

/// Derive the 128-bit archive key from a password and salt.
pub fn derive_key(
    password: &SecretString,
    salt: &[u8; SALT_SIZE],
    params: &KdfParams,
) -> DerivedKey {
    let mut key = DerivedKey([0u8; KEY_SIZE]);
    pbkdf2::pbkdf2_hmac::<Sha512>(
        password.expose_secret().as_bytes(),
        salt,
        params.iterations,
        &mut key.0,
    );
    key
}
