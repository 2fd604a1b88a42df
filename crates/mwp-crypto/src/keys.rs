use std::{fmt, pin::Pin};

use generic_array::{typenum::U32, GenericArray};
use p256::{
    elliptic_curve::sec1::ToEncodedPoint,
    pkcs8::{DecodePublicKey, EncodePublicKey},
    FieldBytes,
};
use subtle::{Choice, ConstantTimeEq};
use tracing::instrument;
use zeroize::{ZeroizeOnDrop, Zeroizing};

use crate::{CryptoError, EncodingError, Result};

/// Length of a P-256 private scalar and of the derived AES key.
const SCALAR_LEN: usize = 32;

/// The role a piece of key material plays in the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    #[allow(missing_docs)]
    Private,
    #[allow(missing_docs)]
    Public,
    #[allow(missing_docs)]
    Secret,
}

/// Algorithm a key is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAlgorithm {
    /// ECDH on the NIST P-256 curve.
    EcdhP256,
    /// AES in Galois/Counter mode with a 256-bit key.
    Aes256Gcm,
}

impl KeyAlgorithm {
    /// The algorithm name as used by WebCrypto.
    pub fn name(&self) -> &'static str {
        match self {
            KeyAlgorithm::EcdhP256 => "ECDH",
            KeyAlgorithm::Aes256Gcm => "AES-GCM",
        }
    }
}

/// Operations a key may be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyUsage {
    #[allow(missing_docs)]
    DeriveKey,
    #[allow(missing_docs)]
    Encrypt,
    #[allow(missing_docs)]
    Decrypt,
}

/// Static description of a key type.
pub trait KeyMaterial {
    /// Whether this is a private, public or secret key.
    const KIND: KeyKind;
    /// The algorithm the key belongs to.
    const ALGORITHM: KeyAlgorithm;
    /// Whether the raw key bytes can be exported.
    const EXTRACTABLE: bool;
    /// The operations the key is allowed to take part in.
    const USAGES: &'static [KeyUsage];
}

/// Private half of a P-256 ECDH key pair.
#[derive(Clone)]
pub struct PrivateKey {
    // Boxed and pinned to keep the scalar from being copied around the stack.
    inner: Pin<Box<p256::SecretKey>>,
}

// p256::SecretKey zeroizes itself on drop.
const _: fn() = || {
    fn assert_zeroize_on_drop<T: ZeroizeOnDrop>() {}
    assert_zeroize_on_drop::<p256::SecretKey>();
};
impl ZeroizeOnDrop for PrivateKey {}

impl KeyMaterial for PrivateKey {
    const KIND: KeyKind = KeyKind::Private;
    const ALGORITHM: KeyAlgorithm = KeyAlgorithm::EcdhP256;
    const EXTRACTABLE: bool = true;
    const USAGES: &'static [KeyUsage] = &[KeyUsage::DeriveKey];
}

impl PrivateKey {
    pub(crate) fn from_inner(inner: p256::SecretKey) -> Self {
        Self {
            inner: Box::pin(inner),
        }
    }

    pub(crate) fn inner(&self) -> &p256::SecretKey {
        &self.inner
    }

    /// Import a private key from its big-endian scalar.
    ///
    /// Encodings with stripped leading zeros, or with a single leading zero sign byte, are
    /// accepted. The scalar must lie in `[1, n-1]` where `n` is the curve order.
    #[instrument(skip_all, err)]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let significant = match bytes {
            [0, rest @ ..] if bytes.len() == SCALAR_LEN + 1 => rest,
            _ if bytes.len() > SCALAR_LEN => return Err(CryptoError::InvalidKey),
            _ => bytes,
        };

        let mut scalar = Zeroizing::new(FieldBytes::default());
        scalar[SCALAR_LEN - significant.len()..].copy_from_slice(significant);

        p256::SecretKey::from_bytes(&scalar)
            .map(Self::from_inner)
            .map_err(|_| CryptoError::InvalidKey)
    }

    /// The 32-byte big-endian scalar.
    pub fn to_bytes(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(self.inner.to_bytes().to_vec())
    }

    /// Import a private key from the lowercase or uppercase hex of its scalar.
    pub fn from_hex(hex_string: &str) -> Result<Self> {
        let bytes = Zeroizing::new(hex::decode(hex_string).map_err(EncodingError::from)?);
        Self::from_bytes(&bytes)
    }

    /// Lowercase hex of the 32-byte scalar.
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.to_bytes().as_slice()))
    }

    /// Derives the public key corresponding to this private key.
    pub fn to_public_key(&self) -> PublicKey {
        PublicKey {
            inner: self.inner.public_key(),
        }
    }
}

// We manually implement these to make sure we don't print any sensitive data
impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("algorithm", &Self::ALGORITHM.name())
            .finish_non_exhaustive()
    }
}

/// Public half of a P-256 ECDH key pair.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    inner: p256::PublicKey,
}

impl KeyMaterial for PublicKey {
    const KIND: KeyKind = KeyKind::Public;
    const ALGORITHM: KeyAlgorithm = KeyAlgorithm::EcdhP256;
    const EXTRACTABLE: bool = true;
    const USAGES: &'static [KeyUsage] = &[];
}

impl PublicKey {
    pub(crate) fn inner(&self) -> &p256::PublicKey {
        &self.inner
    }

    /// Build a public key from a SEC1 encoded point, compressed or not.
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            inner: p256::PublicKey::from_sec1_bytes(bytes).map_err(|_| CryptoError::InvalidKey)?,
        })
    }

    /// The uncompressed point `0x04 || x || y`.
    pub fn to_uncompressed_bytes(&self) -> Vec<u8> {
        self.inner.to_encoded_point(false).as_bytes().to_vec()
    }

    /// Build a public key from the SubjectPublicKeyInfo DER.
    #[instrument(skip_all, err)]
    pub fn from_spki_der(der: &[u8]) -> Result<Self> {
        Ok(Self {
            inner: p256::PublicKey::from_public_key_der(der)
                .map_err(|_| EncodingError::InvalidSpki)?,
        })
    }

    /// Makes a SubjectPublicKeyInfo DER serialized version of the public key.
    ///
    /// The algorithm identifier is `id-ecPublicKey` with the `secp256r1` named curve, followed by
    /// the uncompressed point as a BIT STRING.
    pub fn to_spki_der(&self) -> Result<Vec<u8>> {
        Ok(self
            .inner
            .to_public_key_der()
            .map_err(|_| EncodingError::InvalidSpki)?
            .as_bytes()
            .to_owned())
    }

    /// Import a public key from the hex of its SubjectPublicKeyInfo DER.
    pub fn from_hex(hex_string: &str) -> Result<Self> {
        let der = hex::decode(hex_string).map_err(EncodingError::from)?;
        Self::from_spki_der(&der)
    }

    /// Lowercase hex of the SubjectPublicKeyInfo DER. This is the form used for the `sender`
    /// field of protocol messages.
    pub fn to_hex(&self) -> Result<String> {
        Ok(hex::encode(self.to_spki_der()?))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PublicKey")
            .field(&hex::encode(self.to_uncompressed_bytes()))
            .finish()
    }
}

/// A P-256 key pair.
#[derive(Clone, Debug)]
pub struct KeyPair {
    #[allow(missing_docs)]
    pub private_key: PrivateKey,
    #[allow(missing_docs)]
    pub public_key: PublicKey,
}

/// The AES-256-GCM key shared by the two parties of a session. It is derived from an ECDH
/// agreement and cannot be exported.
#[derive(ZeroizeOnDrop, Clone)]
pub struct SharedSecret {
    /// Uses a pinned heap data structure, as noted in [Key material in
    /// memory][crate#key-material-in-memory]
    key: Pin<Box<GenericArray<u8, U32>>>,
}

impl KeyMaterial for SharedSecret {
    const KIND: KeyKind = KeyKind::Secret;
    const ALGORITHM: KeyAlgorithm = KeyAlgorithm::Aes256Gcm;
    const EXTRACTABLE: bool = false;
    const USAGES: &'static [KeyUsage] = &[KeyUsage::Encrypt, KeyUsage::Decrypt];
}

impl SharedSecret {
    pub(crate) fn from_raw(bytes: &GenericArray<u8, U32>) -> Self {
        let mut key = Box::pin(GenericArray::<u8, U32>::default());
        key.copy_from_slice(bytes);
        Self { key }
    }

    pub(crate) fn key(&self) -> &GenericArray<u8, U32> {
        &self.key
    }
}

impl ConstantTimeEq for SharedSecret {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.key.ct_eq(&other.key)
    }
}

impl PartialEq for SharedSecret {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSecret")
            .field("algorithm", &Self::ALGORITHM.name())
            .finish_non_exhaustive()
    }
}
