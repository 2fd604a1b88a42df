//! # ECDH on P-256
//!
//! Key generation and key agreement for the session. Both peers derive the same 32-byte
//! x-coordinate, which is then used as the AES-256-GCM key without further derivation.

use p256::ecdh::diffie_hellman;
use rand::{CryptoRng, RngCore};

use crate::{KeyPair, PrivateKey, SharedSecret};

/// Generate a fresh P-256 key pair using the thread-local CSPRNG.
pub fn generate_key_pair() -> KeyPair {
    generate_key_pair_internal(&mut rand::thread_rng())
}

pub(crate) fn generate_key_pair_internal(rng: &mut (impl RngCore + CryptoRng)) -> KeyPair {
    let private_key = PrivateKey::from_inner(p256::SecretKey::random(rng));
    let public_key = private_key.to_public_key();
    KeyPair {
        private_key,
        public_key,
    }
}

/// Derive the symmetric session key from our private key and the peer's public key.
pub fn derive_shared_secret(
    own_private_key: &PrivateKey,
    peer_public_key: &crate::PublicKey,
) -> SharedSecret {
    let shared = diffie_hellman(
        own_private_key.inner().to_nonzero_scalar(),
        peer_public_key.inner().as_affine(),
    );
    SharedSecret::from_raw(shared.raw_secret_bytes())
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn test_shared_secret_is_symmetric() {
        let alice = generate_key_pair();
        let bob = generate_key_pair();

        let alice_secret = derive_shared_secret(&alice.private_key, &bob.public_key);
        let bob_secret = derive_shared_secret(&bob.private_key, &alice.public_key);

        assert_eq!(alice_secret, bob_secret);
    }

    #[test]
    fn test_different_peers_give_different_secrets() {
        let alice = generate_key_pair();
        let bob = generate_key_pair();
        let carol = generate_key_pair();

        let with_bob = derive_shared_secret(&alice.private_key, &bob.public_key);
        let with_carol = derive_shared_secret(&alice.private_key, &carol.public_key);

        assert_ne!(with_bob, with_carol);
    }

    #[test]
    fn test_seeded_generation_is_deterministic() {
        let mut rng = rand_chacha::ChaCha8Rng::from_seed([7u8; 32]);
        let first = generate_key_pair_internal(&mut rng);
        let mut rng = rand_chacha::ChaCha8Rng::from_seed([7u8; 32]);
        let second = generate_key_pair_internal(&mut rng);

        assert_eq!(first.public_key, second.public_key);
        assert_eq!(first.private_key.to_bytes(), second.private_key.to_bytes());
    }
}
