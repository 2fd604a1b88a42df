use std::sync::Arc;

use mwp_state::{register_setting_key, JsonFileStore, KeyValueStore, ScopedStore};

register_setting_key!(const ACCOUNTS: Vec<String> = "accounts");

#[tokio::test]
async fn scoped_settings_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mwp.json");

    {
        let store: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::open(&path).await.unwrap());
        let session = ScopedStore::new(store.clone(), "Coinbase_MWPClient_");
        let keys = ScopedStore::new(store, "Coinbase_KeyManager_");

        session
            .setting(ACCOUNTS)
            .update(&vec!["0x1111".to_owned(), "0x2222".to_owned()])
            .await
            .unwrap();
        keys.set_string("ownPrivateKey", "00ff".to_owned())
            .await
            .unwrap();
    }

    let store: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::open(&path).await.unwrap());
    let session = ScopedStore::new(store.clone(), "Coinbase_MWPClient_");
    let keys = ScopedStore::new(store, "Coinbase_KeyManager_");

    assert_eq!(
        session.setting(ACCOUNTS).get().await.unwrap(),
        Some(vec!["0x1111".to_owned(), "0x2222".to_owned()])
    );
    assert_eq!(
        keys.get_string("ownPrivateKey").await.unwrap().as_deref(),
        Some("00ff")
    );
    assert_eq!(keys.get_string("accounts").await.unwrap(), None);
}
