//! AES-128-CBC encryption with HMAC-SHA256 integrity (encrypt-then-MAC)

use aes::Aes128;
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use tracing::debug;

use marc_core::{MarcError, MarcResult};

use crate::kdf::{derive_key, DerivedKey, KdfParams};
use crate::{BLOCK_SIZE, HMAC_SIZE, IV_SIZE, MIN_ENVELOPE_SIZE, SALT_SIZE};

type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;
type HmacSha256 = Hmac<Sha256>;

/// Encrypt an archive buffer with the default KDF parameters.
///
/// Returns: `[8-byte salt][16-byte IV][ciphertext][32-byte HMAC]`
pub fn encrypt(data: &[u8], password: &SecretString) -> MarcResult<Vec<u8>> {
    encrypt_with(data, password, &KdfParams::default())
}

/// Authenticate and decrypt an envelope produced by [`encrypt`].
pub fn decrypt(envelope: &[u8], password: &SecretString) -> MarcResult<Vec<u8>> {
    decrypt_with(envelope, password, &KdfParams::default())
}

/// Encrypt with explicit KDF parameters.
///
/// A fresh salt and IV are drawn from the OS RNG on every call, so encrypting
/// the same data twice never yields the same envelope.
pub fn encrypt_with(
    data: &[u8],
    password: &SecretString,
    params: &KdfParams,
) -> MarcResult<Vec<u8>> {
    if data.is_empty() {
        return Err(MarcError::EmptyData);
    }
    if is_blank(password) {
        return Err(MarcError::EmptyPassword);
    }

    let mut salt = [0u8; SALT_SIZE];
    let mut iv = [0u8; IV_SIZE];
    OsRng.fill_bytes(&mut salt);
    OsRng.fill_bytes(&mut iv);

    let key = derive_key(password, &salt, params);

    let ciphertext =
        Aes128CbcEnc::new(key.as_bytes().into(), &iv.into()).encrypt_padded_vec_mut::<Pkcs7>(data);

    let mut envelope = Vec::with_capacity(SALT_SIZE + IV_SIZE + ciphertext.len() + HMAC_SIZE);
    envelope.extend_from_slice(&salt);
    envelope.extend_from_slice(&iv);
    envelope.extend_from_slice(&ciphertext);

    let tag = compute_hmac(&key, &envelope)?;
    envelope.extend_from_slice(&tag);

    debug!(
        plaintext = data.len(),
        envelope = envelope.len(),
        "encrypted archive buffer"
    );
    Ok(envelope)
}

/// Decrypt with explicit KDF parameters (must match those used to encrypt).
///
/// A wrong password and a corrupted envelope both surface as
/// [`MarcError::InvalidKey`].
pub fn decrypt_with(
    envelope: &[u8],
    password: &SecretString,
    params: &KdfParams,
) -> MarcResult<Vec<u8>> {
    if envelope.is_empty() {
        return Err(MarcError::EmptyData);
    }
    if is_blank(password) {
        return Err(MarcError::InvalidKey);
    }
    if envelope.len() < MIN_ENVELOPE_SIZE {
        debug!(
            len = envelope.len(),
            min = MIN_ENVELOPE_SIZE,
            "envelope too short"
        );
        return Err(MarcError::InvalidKey);
    }

    let (authenticated, tag) = envelope.split_at(envelope.len() - HMAC_SIZE);
    let (salt, rest) = authenticated.split_at(SALT_SIZE);
    let (iv, ciphertext) = rest.split_at(IV_SIZE);

    let mut salt_bytes = [0u8; SALT_SIZE];
    salt_bytes.copy_from_slice(salt);
    let key = derive_key(password, &salt_bytes, params);

    verify_hmac(&key, authenticated, tag)?;

    if ciphertext.len() % BLOCK_SIZE != 0 {
        // Unreachable for envelopes we produced: the HMAC already matched.
        return Err(MarcError::Crypto(format!(
            "authenticated ciphertext is not block aligned ({} bytes)",
            ciphertext.len()
        )));
    }

    let mut iv_bytes = [0u8; IV_SIZE];
    iv_bytes.copy_from_slice(iv);

    Aes128CbcDec::new(key.as_bytes().into(), &iv_bytes.into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| MarcError::Crypto("invalid padding after successful authentication".into()))
}

fn is_blank(password: &SecretString) -> bool {
    password.expose_secret().trim().is_empty()
}

fn new_mac(key: &DerivedKey) -> MarcResult<HmacSha256> {
    <HmacSha256 as Mac>::new_from_slice(key.as_bytes())
        .map_err(|e| MarcError::Crypto(format!("HMAC key setup failed: {e}")))
}

fn compute_hmac(key: &DerivedKey, data: &[u8]) -> MarcResult<[u8; HMAC_SIZE]> {
    let mut mac = new_mac(key)?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().into())
}

/// Constant-time tag check (`verify_slice` compares via `subtle`).
fn verify_hmac(key: &DerivedKey, data: &[u8], tag: &[u8]) -> MarcResult<()> {
    let mut mac = new_mac(key)?;
    mac.update(data);
    mac.verify_slice(tag).map_err(|_| MarcError::InvalidKey)
}
