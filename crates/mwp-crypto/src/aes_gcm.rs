//! # AES-256-GCM operations
//!
//! Contains low level AES-256-GCM operations used by the rest of the crate.
//!
//! In most cases you should use [Cipher][crate::Cipher] instead.
//!
//! Note:
//! AES-256-GCM encrypts data, and authenticates both the cipher text and associated
//! data. This does not provide key-commitment, and assumes there can only be one key.

use aes_gcm::{aead::AeadInPlace, AeadCore, Aes256Gcm, KeyInit};
use generic_array::{typenum::U32, GenericArray};
use rand::{CryptoRng, RngCore};
use typenum::Unsigned;

use crate::CryptoError;

pub(crate) const NONCE_SIZE: usize = <Aes256Gcm as AeadCore>::NonceSize::USIZE;

pub(crate) struct Aes256GcmCiphertext {
    nonce: GenericArray<u8, <Aes256Gcm as AeadCore>::NonceSize>,
    encrypted_bytes: Vec<u8>,
}

impl Aes256GcmCiphertext {
    pub(crate) fn nonce(&self) -> [u8; NONCE_SIZE] {
        self.nonce.into()
    }

    pub(crate) fn into_encrypted_bytes(self) -> Vec<u8> {
        self.encrypted_bytes
    }
}

pub(crate) fn encrypt_aes256_gcm(
    rng: impl RngCore + CryptoRng,
    key: &GenericArray<u8, U32>,
    plaintext_secret_data: &[u8],
    associated_data: &[u8],
) -> Result<Aes256GcmCiphertext, CryptoError> {
    let nonce = Aes256Gcm::generate_nonce(rng);
    let mut buffer = plaintext_secret_data.to_vec();
    Aes256Gcm::new(key)
        .encrypt_in_place(&nonce, associated_data, &mut buffer)
        .map_err(|_| CryptoError::EncryptionFailed)?;

    Ok(Aes256GcmCiphertext {
        nonce,
        encrypted_bytes: buffer,
    })
}

pub(crate) fn decrypt_aes256_gcm(
    nonce: &[u8; NONCE_SIZE],
    key: &GenericArray<u8, U32>,
    ciphertext: &[u8],
    associated_data: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let mut buffer = ciphertext.to_vec();
    Aes256Gcm::new(key)
        .decrypt_in_place(
            GenericArray::from_slice(nonce),
            associated_data,
            &mut buffer,
        )
        .map_err(|_| CryptoError::DecryptionFailed)?;
    Ok(buffer)
}
