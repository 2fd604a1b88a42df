#![doc = include_str!("../README.md")]

//! # Key material in memory
//!
//! Private keys and shared secrets are kept on the heap behind a `Pin<Box<>>` and zeroized on
//! drop. Neither type implements `Debug` in a way that prints key bytes.

mod aes_gcm;
mod compression;
pub use compression::Compression;
mod ecdh;
pub use ecdh::{derive_shared_secret, generate_key_pair};
mod envelope;
pub use envelope::{Cipher, EncryptedEnvelope, NONCE_SIZE};
mod error;
pub(crate) use error::Result;
pub use error::{CryptoError, EncodingError};
mod keys;
pub use keys::{
    KeyAlgorithm, KeyKind, KeyMaterial, KeyPair, KeyUsage, PrivateKey, PublicKey, SharedSecret,
};
