//! Type-safe access to JSON encoded entries of a [ScopedStore](crate::ScopedStore).
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use mwp_state::{register_setting_key, InMemoryKeyValueStore, ScopedStore};
//!
//! register_setting_key!(const ACCOUNTS: Vec<String> = "accounts");
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let scope = ScopedStore::new(Arc::new(InMemoryKeyValueStore::new()), "Wallet_MWPClient_");
//! let accounts = scope.setting(ACCOUNTS);
//!
//! accounts.update(&vec!["0xabc".to_owned()]).await.unwrap();
//! assert_eq!(accounts.get().await.unwrap(), Some(vec!["0xabc".to_owned()]));
//!
//! accounts.delete().await.unwrap();
//! assert_eq!(accounts.get().await.unwrap(), None);
//! # });
//! ```

mod key;
mod setting;

pub use key::Key;
pub use setting::{Setting, SettingsError};
