//! Owns the dapp's identity key pair, the wallet's public key and the secret derived from them.

use mwp_crypto::{
    derive_shared_secret, generate_key_pair, CryptoError, KeyPair, PrivateKey, PublicKey,
    SharedSecret,
};
use mwp_state::{ScopedStore, StoreError};
use thiserror::Error;
use tracing::{debug, info, instrument};

const OWN_PRIVATE_KEY: &str = "ownPrivateKey";
const OWN_PUBLIC_KEY: &str = "ownPublicKey";
const PEER_PUBLIC_KEY: &str = "peerPublicKey";

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum KeyManagerError {
    #[error("Failed to access key storage: {0}")]
    Store(#[from] StoreError),

    #[error("Stored key {name} is invalid: {source}")]
    InvalidStoredKey {
        name: &'static str,
        #[source]
        source: CryptoError,
    },

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// Lazily loads, generates and persists session keys.
///
/// Keys are stored as hex strings: the private key as its raw scalar, public keys as
/// SubjectPublicKeyInfo DER. The shared secret is never stored, it is derived again from the
/// stored keys.
pub struct KeyManager {
    store: ScopedStore,
    own: Option<KeyPair>,
    peer_public_key: Option<PublicKey>,
    shared_secret: Option<SharedSecret>,
}

impl KeyManager {
    #[allow(missing_docs)]
    pub fn new(store: ScopedStore) -> Self {
        Self {
            store,
            own: None,
            peer_public_key: None,
            shared_secret: None,
        }
    }

    /// Our public key, generating a new identity if none is stored.
    pub async fn own_public_key(&mut self) -> Result<PublicKey, KeyManagerError> {
        self.load_keys_if_needed().await?;
        self.own
            .as_ref()
            .map(|own| own.public_key.clone())
            .ok_or(KeyManagerError::Crypto(CryptoError::InvalidKey))
    }

    /// The secret shared with the wallet, or `None` before the handshake.
    pub async fn shared_secret(&mut self) -> Result<Option<SharedSecret>, KeyManagerError> {
        self.load_keys_if_needed().await?;
        Ok(self.shared_secret.clone())
    }

    /// Store the wallet's public key and derive a new shared secret from it.
    #[instrument(skip_all, err)]
    pub async fn set_peer_public_key(&mut self, key: PublicKey) -> Result<(), KeyManagerError> {
        self.shared_secret = None;
        self.store.set_string(PEER_PUBLIC_KEY, key.to_hex()?).await?;
        self.peer_public_key = Some(key);
        self.load_keys_if_needed().await
    }

    /// Forget every key, in memory and in storage.
    pub async fn clear(&mut self) -> Result<(), KeyManagerError> {
        self.own = None;
        self.peer_public_key = None;
        self.shared_secret = None;

        self.store.delete(OWN_PUBLIC_KEY).await?;
        self.store.delete(OWN_PRIVATE_KEY).await?;
        self.store.delete(PEER_PUBLIC_KEY).await?;
        info!("Cleared session keys");
        Ok(())
    }

    async fn load_keys_if_needed(&mut self) -> Result<(), KeyManagerError> {
        if self.own.is_none() {
            self.own = match self.load_own_key_pair().await? {
                Some(own) => Some(own),
                None => Some(self.generate_and_store_key_pair().await?),
            };
        }

        if self.peer_public_key.is_none() {
            self.peer_public_key = match self.store.get_string(PEER_PUBLIC_KEY).await? {
                Some(hex) => Some(PublicKey::from_hex(&hex).map_err(|source| {
                    KeyManagerError::InvalidStoredKey {
                        name: PEER_PUBLIC_KEY,
                        source,
                    }
                })?),
                None => None,
            };
        }

        if self.shared_secret.is_none() {
            if let (Some(own), Some(peer)) = (&self.own, &self.peer_public_key) {
                self.shared_secret = Some(derive_shared_secret(&own.private_key, peer));
            }
        }

        Ok(())
    }

    async fn load_own_key_pair(&self) -> Result<Option<KeyPair>, KeyManagerError> {
        let private_hex = self.store.get_string(OWN_PRIVATE_KEY).await?;
        let public_hex = self.store.get_string(OWN_PUBLIC_KEY).await?;

        let (Some(private_hex), Some(public_hex)) = (private_hex, public_hex) else {
            return Ok(None);
        };

        let private_key =
            PrivateKey::from_hex(&private_hex).map_err(|source| KeyManagerError::InvalidStoredKey {
                name: OWN_PRIVATE_KEY,
                source,
            })?;
        let public_key =
            PublicKey::from_hex(&public_hex).map_err(|source| KeyManagerError::InvalidStoredKey {
                name: OWN_PUBLIC_KEY,
                source,
            })?;

        Ok(Some(KeyPair {
            private_key,
            public_key,
        }))
    }

    async fn generate_and_store_key_pair(&self) -> Result<KeyPair, KeyManagerError> {
        let key_pair = generate_key_pair();
        self.store
            .set_string(OWN_PRIVATE_KEY, key_pair.private_key.to_hex().to_string())
            .await?;
        self.store
            .set_string(OWN_PUBLIC_KEY, key_pair.public_key.to_hex()?)
            .await?;
        debug!("Generated a new identity key pair");
        Ok(key_pair)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mwp_state::{InMemoryKeyValueStore, KeyValueStore};

    use super::*;

    const PREFIX: &str = "Test_KeyManager_";

    fn manager(store: &Arc<InMemoryKeyValueStore>) -> KeyManager {
        KeyManager::new(ScopedStore::new(store.clone(), PREFIX))
    }

    #[tokio::test]
    async fn test_identity_is_generated_once_and_persisted() {
        let store = Arc::new(InMemoryKeyValueStore::new());

        let first = manager(&store).own_public_key().await.unwrap();
        let second = manager(&store).own_public_key().await.unwrap();
        assert_eq!(first, second);

        let stored = store
            .get("Test_KeyManager_ownPublicKey")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, first.to_hex().unwrap());
        assert!(store
            .get("Test_KeyManager_ownPrivateKey")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_half_stored_pair_is_regenerated() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let original = manager(&store).own_public_key().await.unwrap();
        store.delete("Test_KeyManager_ownPrivateKey").await.unwrap();

        let regenerated = manager(&store).own_public_key().await.unwrap();
        assert_ne!(original, regenerated);
    }

    #[tokio::test]
    async fn test_no_secret_before_peer_key() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        assert!(manager(&store).shared_secret().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_peer_key_yields_shared_secret() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let wallet = generate_key_pair();

        let mut keys = manager(&store);
        let own_public_key = keys.own_public_key().await.unwrap();
        keys.set_peer_public_key(wallet.public_key.clone())
            .await
            .unwrap();

        let secret = keys.shared_secret().await.unwrap().unwrap();
        assert_eq!(
            secret,
            derive_shared_secret(&wallet.private_key, &own_public_key)
        );

        // A fresh manager derives the same secret from storage.
        let restored = manager(&store).shared_secret().await.unwrap().unwrap();
        assert_eq!(restored, secret);
    }

    #[tokio::test]
    async fn test_new_peer_key_replaces_secret() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let mut keys = manager(&store);

        keys.set_peer_public_key(generate_key_pair().public_key)
            .await
            .unwrap();
        let first = keys.shared_secret().await.unwrap().unwrap();

        keys.set_peer_public_key(generate_key_pair().public_key)
            .await
            .unwrap();
        let second = keys.shared_secret().await.unwrap().unwrap();

        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_clear_removes_everything() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let mut keys = manager(&store);
        let before = keys.own_public_key().await.unwrap();
        keys.set_peer_public_key(generate_key_pair().public_key)
            .await
            .unwrap();

        keys.clear().await.unwrap();
        assert!(store.is_empty().await);
        assert!(keys.shared_secret().await.unwrap().is_none());
        assert_ne!(keys.own_public_key().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_corrupt_stored_key_is_reported() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        store
            .set("Test_KeyManager_peerPublicKey", "zz".to_owned())
            .await
            .unwrap();

        let result = manager(&store).shared_secret().await;
        assert!(matches!(
            result,
            Err(KeyManagerError::InvalidStoredKey {
                name: "peerPublicKey",
                ..
            })
        ));
    }
}
