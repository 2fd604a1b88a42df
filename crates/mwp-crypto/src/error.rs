use thiserror::Error;

/// Errors that can occur while generating, importing or using keys.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The key bytes do not describe a valid key for the expected algorithm.
    #[error("The key is invalid")]
    InvalidKey,

    /// AES-GCM refused to encrypt the payload.
    #[error("Encryption failed")]
    EncryptionFailed,

    /// The authentication tag did not verify. The ciphertext, the IV or the key is wrong.
    #[error("Decryption failed, the authentication tag did not verify")]
    DecryptionFailed,

    #[allow(missing_docs)]
    #[error("Invalid IV length, expected {expected} bytes but got {actual}")]
    InvalidIvLength { expected: usize, actual: usize },

    #[allow(missing_docs)]
    #[error("Failed to compress the payload: {0}")]
    Compression(#[source] std::io::Error),

    #[allow(missing_docs)]
    #[error("Failed to decompress the payload: {0}")]
    Decompression(#[source] std::io::Error),

    /// The decrypted payload does not start with a zlib header.
    #[error("The compressed payload does not start with a zlib header")]
    MissingZlibHeader,

    #[allow(missing_docs)]
    #[error("The decrypted payload is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[allow(missing_docs)]
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

/// Errors related to the textual and binary encodings of keys.
#[derive(Debug, Error)]
pub enum EncodingError {
    #[allow(missing_docs)]
    #[error("Invalid hex encoding: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// The bytes are not a P-256 SubjectPublicKeyInfo structure.
    #[error("Invalid SubjectPublicKeyInfo structure")]
    InvalidSpki,
}

/// Alias for `Result<T, CryptoError>`.
pub(crate) type Result<T, E = CryptoError> = std::result::Result<T, E>;
