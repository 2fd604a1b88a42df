use rand::{CryptoRng, RngCore};
use tracing::instrument;

use crate::{
    aes_gcm::{decrypt_aes256_gcm, encrypt_aes256_gcm},
    Compression, CryptoError, Result, SharedSecret,
};

/// Length in bytes of the AES-GCM initialization vector.
pub const NONCE_SIZE: usize = crate::aes_gcm::NONCE_SIZE;

/// The output of [Cipher::encrypt]: a 12 byte IV and the ciphertext with the 16 byte
/// authentication tag appended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptedEnvelope {
    iv: [u8; NONCE_SIZE],
    cipher_text: Vec<u8>,
}

impl EncryptedEnvelope {
    #[allow(missing_docs)]
    pub fn new(iv: [u8; NONCE_SIZE], cipher_text: Vec<u8>) -> Self {
        Self { iv, cipher_text }
    }

    /// Build an envelope from an IV of unknown length, as received over the wire.
    pub fn from_parts(iv: &[u8], cipher_text: Vec<u8>) -> Result<Self> {
        let iv: [u8; NONCE_SIZE] = iv.try_into().map_err(|_| CryptoError::InvalidIvLength {
            expected: NONCE_SIZE,
            actual: iv.len(),
        })?;
        Ok(Self { iv, cipher_text })
    }

    #[allow(missing_docs)]
    pub fn iv(&self) -> &[u8; NONCE_SIZE] {
        &self.iv
    }

    #[allow(missing_docs)]
    pub fn cipher_text(&self) -> &[u8] {
        &self.cipher_text
    }

    #[allow(missing_docs)]
    pub fn into_parts(self) -> ([u8; NONCE_SIZE], Vec<u8>) {
        (self.iv, self.cipher_text)
    }
}

/// Symmetric payload cipher for an established session.
///
/// Plaintext is compressed according to [Compression] and then sealed with AES-256-GCM under the
/// shared secret. No associated data is authenticated.
#[derive(Copy, Clone, Debug, Default)]
pub struct Cipher {
    compression: Compression,
}

impl Cipher {
    #[allow(missing_docs)]
    pub fn new(compression: Compression) -> Self {
        Self { compression }
    }

    #[allow(missing_docs)]
    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Encrypt a UTF-8 payload with a fresh random IV.
    #[instrument(skip_all, err)]
    pub fn encrypt(&self, secret: &SharedSecret, plaintext: &str) -> Result<EncryptedEnvelope> {
        self.encrypt_internal(rand::thread_rng(), secret, plaintext)
    }

    pub(crate) fn encrypt_internal(
        &self,
        rng: impl RngCore + CryptoRng,
        secret: &SharedSecret,
        plaintext: &str,
    ) -> Result<EncryptedEnvelope> {
        let compressed = self.compression.compress(plaintext.as_bytes())?;
        let sealed = encrypt_aes256_gcm(rng, secret.key(), &compressed, &[])?;
        Ok(EncryptedEnvelope {
            iv: sealed.nonce(),
            cipher_text: sealed.into_encrypted_bytes(),
        })
    }

    /// Decrypt an envelope back into the original UTF-8 payload.
    #[instrument(skip_all, err)]
    pub fn decrypt(&self, secret: &SharedSecret, envelope: &EncryptedEnvelope) -> Result<String> {
        let compressed =
            decrypt_aes256_gcm(&envelope.iv, secret.key(), &envelope.cipher_text, &[])?;
        let plaintext = self.compression.decompress(&compressed)?;
        Ok(String::from_utf8(plaintext)?)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::{derive_shared_secret, generate_key_pair};

    fn secret() -> SharedSecret {
        let alice = generate_key_pair();
        let bob = generate_key_pair();
        derive_shared_secret(&alice.private_key, &bob.public_key)
    }

    #[test]
    fn test_envelope_rejects_short_iv() {
        let result = EncryptedEnvelope::from_parts(&[0u8; 8], vec![1, 2, 3]);
        assert!(matches!(
            result,
            Err(CryptoError::InvalidIvLength {
                expected: 12,
                actual: 8
            })
        ));
    }

    #[test]
    fn test_iv_is_fresh_per_message() {
        let secret = secret();
        let cipher = Cipher::default();
        let first = cipher.encrypt(&secret, "same").unwrap();
        let second = cipher.encrypt(&secret, "same").unwrap();
        assert_ne!(first.iv(), second.iv());
    }

    #[test]
    fn test_seeded_encrypt_is_deterministic() {
        let secret = secret();
        let cipher = Cipher::new(Compression::Disabled);
        let first = cipher
            .encrypt_internal(rand_chacha::ChaCha8Rng::from_seed([3u8; 32]), &secret, "x")
            .unwrap();
        let second = cipher
            .encrypt_internal(rand_chacha::ChaCha8Rng::from_seed([3u8; 32]), &secret, "x")
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_uncompressed_ciphertext_length() {
        let secret = secret();
        let envelope = Cipher::new(Compression::Disabled)
            .encrypt(&secret, "twelve bytes")
            .unwrap();
        assert_eq!(envelope.cipher_text().len(), 12 + 16);
    }

    #[test]
    fn test_decrypt_with_wrong_mode_fails() {
        let secret = secret();
        let envelope = Cipher::new(Compression::Disabled)
            .encrypt(&secret, "not compressed")
            .unwrap();
        let result = Cipher::new(Compression::Zlib).decrypt(&secret, &envelope);
        assert!(matches!(result, Err(CryptoError::MissingZlibHeader)));
    }
}
