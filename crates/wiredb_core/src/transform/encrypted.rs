//! At-rest encryption stage using AES-256-GCM.

use aes_gcm::{
    aead::{generic_array::GenericArray, Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::{TransformError, Transformer};

/// Size of the AES-256 key in bytes.
pub const KEY_SIZE: usize = 32;
/// Size of the GCM nonce in bytes.
pub const NONCE_SIZE: usize = 12;
/// Size of the GCM authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// 256-bit payload encryption key. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey {
    bytes: [u8; KEY_SIZE],
}

impl EncryptionKey {
    /// Generates a random key.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Wraps raw key bytes.
    ///
    /// # Errors
    ///
    /// Fails unless `bytes` is exactly [`KEY_SIZE`] long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransformError> {
        let bytes: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| {
            TransformError::new(format!(
                "invalid key size: expected {KEY_SIZE} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self { bytes })
    }

    /// Derives a key from a high-entropy passphrase with HKDF-SHA256.
    ///
    /// HKDF is not a password hash; low-entropy passwords should be
    /// stretched with Argon2id or PBKDF2 first.
    ///
    /// # Errors
    ///
    /// Fails only if HKDF rejects the output length.
    pub fn derive_from_password(password: &[u8], salt: &[u8]) -> Result<Self, TransformError> {
        use hkdf::Hkdf;
        use sha2::Sha256;

        let hk = Hkdf::<Sha256>::new(Some(salt), password);
        let mut bytes = [0u8; KEY_SIZE];
        hk.expand(b"wiredb-segment-key-v1", &mut bytes)
            .map_err(|_| TransformError::new("HKDF expand failed"))?;
        Ok(Self { bytes })
    }

    /// Raw key bytes. Do not log.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Encrypts payloads with AES-256-GCM.
///
/// Stored form: `nonce (12) || ciphertext || tag (16)`. A fresh random nonce
/// is drawn per payload, so identical values encrypt to different bytes.
pub struct AesGcmTransformer {
    cipher: Aes256Gcm,
}

impl AesGcmTransformer {
    /// Creates a transformer keyed with `key`.
    #[must_use]
    pub fn new(key: &EncryptionKey) -> Self {
        let cipher = Aes256Gcm::new(GenericArray::from_slice(key.as_bytes()));
        Self { cipher }
    }
}

impl std::fmt::Debug for AesGcmTransformer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AesGcmTransformer")
            .field("cipher", &"Aes256Gcm")
            .finish()
    }
}

impl Transformer for AesGcmTransformer {
    fn encode(&self, data: &[u8]) -> Result<Vec<u8>, TransformError> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), data)
            .map_err(|_| TransformError::new("encryption failed"))?;

        let mut out = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend(ciphertext);
        Ok(out)
    }

    fn decode(&self, data: &[u8]) -> Result<Vec<u8>, TransformError> {
        if data.len() < NONCE_SIZE + TAG_SIZE {
            return Err(TransformError::new("ciphertext too short"));
        }
        let (nonce, ciphertext) = data.split_at(NONCE_SIZE);
        self.cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| TransformError::new("decryption failed"))
    }

    fn name(&self) -> &'static str {
        "aes-256-gcm"
    }
}
