#![doc = include_str!("../README.md")]

mod error;
pub use error::StoreError;

/// The key-value capability and its in-memory implementation.
pub mod store;
pub use store::{InMemoryKeyValueStore, KeyValueStore};

mod file;
pub use file::JsonFileStore;

mod scoped;
pub use scoped::ScopedStore;

/// Type-safe settings stored as JSON values.
pub mod settings;
pub use settings::{Key, Setting, SettingsError};
