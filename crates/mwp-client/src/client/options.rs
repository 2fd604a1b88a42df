use std::time::Duration;

use mwp_crypto::Compression;
use serde::{Deserialize, Serialize};

const MWP_RESPONSE_PATH: &str = "mobile-wallet-protocol";

/// Client settings. They cannot be changed once the client is created.
///
/// Defaults to
///
/// ```
/// # use mwp_client::{AppMetadata, MwpClientOptions, Wallet};
/// let options = MwpClientOptions {
///     metadata: AppMetadata::default(),
///     wallet: Wallet::coinbase_smart_wallet(),
///     request_timeout: None,
///     compression: Default::default(),
///     storage_prefix: None,
/// };
/// let default = MwpClientOptions::default();
/// ```
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default, rename_all = "camelCase")]
pub struct MwpClientOptions {
    /// How the dapp presents itself to the wallet.
    pub metadata: AppMetadata,
    /// The wallet to talk to. Defaults to the Coinbase Smart Wallet.
    pub wallet: Wallet,
    /// Upper bound for a single popup round-trip. `None` waits until the transport resolves.
    #[serde(with = "optional_millis")]
    pub request_timeout: Option<Duration>,
    /// Whether payloads are compressed before encryption. Both sides must agree.
    #[serde(skip)]
    pub compression: Compression,
    /// Overrides the `{wallet name}_` prefix of every storage key.
    pub storage_prefix: Option<String>,
}

impl Default for MwpClientOptions {
    fn default() -> Self {
        Self {
            metadata: AppMetadata::default(),
            wallet: Wallet::coinbase_smart_wallet(),
            request_timeout: None,
            compression: Compression::default(),
            storage_prefix: None,
        }
    }
}

/// Information about the dapp shown by the wallet.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct AppMetadata {
    /// Application name. Defaults to `Dapp`.
    pub name: String,
    /// Application logo image URL.
    pub logo_url: Option<String>,
    /// Chain ids the dapp supports. The first one is active until the wallet says otherwise.
    ///
    /// Use `0x` prefixed hex ids. An id without the prefix is read as decimal, so `"10"` is
    /// Optimism (`0xa`) and not chain `0x10`.
    pub chain_ids: Vec<String>,
    /// Custom URL scheme for returning to this app after wallet interaction, such as `myapp://`.
    pub custom_scheme: String,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            name: "Dapp".to_owned(),
            logo_url: None,
            chain_ids: Vec::new(),
            custom_scheme: String::new(),
        }
    }
}

impl AppMetadata {
    /// The URL the wallet redirects to: the custom scheme followed by the protocol response path.
    pub fn callback_url(&self) -> String {
        if self.custom_scheme.ends_with('/') {
            format!("{}{}", self.custom_scheme, MWP_RESPONSE_PATH)
        } else {
            format!("{}/{}", self.custom_scheme, MWP_RESPONSE_PATH)
        }
    }

    pub(crate) fn default_chain_id(&self) -> String {
        self.chain_ids
            .first()
            .cloned()
            .unwrap_or_else(|| "0x1".to_owned())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(missing_docs)]
pub enum WalletType {
    /// Opened in a browser or popup through a URL.
    #[default]
    Web,
    /// A native app reached through its own URL scheme.
    Native,
}

/// A wallet the client can connect to.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    #[serde(rename = "type", default)]
    #[allow(missing_docs)]
    pub wallet_type: WalletType,
    /// Display name, also used to namespace storage keys.
    pub name: String,
    /// The URL requests are sent to.
    pub scheme: String,
    #[allow(missing_docs)]
    #[serde(default)]
    pub icon_url: Option<String>,
}

impl Wallet {
    #[allow(missing_docs)]
    pub fn web(name: impl Into<String>, scheme: impl Into<String>, icon_url: Option<String>) -> Self {
        Self {
            wallet_type: WalletType::Web,
            name: name.into(),
            scheme: scheme.into(),
            icon_url,
        }
    }

    #[allow(missing_docs)]
    pub fn coinbase_smart_wallet() -> Self {
        Self::web(
            "Coinbase Smart Wallet",
            "https://keys.coinbase.com/connect",
            Some("https://wallet.coinbase.com/assets/images/favicon.ico".to_owned()),
        )
    }
}

mod optional_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => serializer.serialize_some(&(duration.as_millis() as u64)),
            None => serializer.serialize_none(),
        }
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_url() {
        let mut metadata = AppMetadata {
            custom_scheme: "mydapp://".to_owned(),
            ..Default::default()
        };
        assert_eq!(metadata.callback_url(), "mydapp://mobile-wallet-protocol");

        metadata.custom_scheme = "https://dapp.example/wallet".to_owned();
        assert_eq!(
            metadata.callback_url(),
            "https://dapp.example/wallet/mobile-wallet-protocol"
        );
    }

    #[test]
    fn test_default_chain() {
        assert_eq!(AppMetadata::default().default_chain_id(), "0x1");

        let metadata = AppMetadata {
            chain_ids: vec!["0x2105".to_owned(), "0x1".to_owned()],
            ..Default::default()
        };
        assert_eq!(metadata.default_chain_id(), "0x2105");
    }

    #[test]
    fn test_options_from_json() {
        let options: MwpClientOptions = serde_json::from_str(
            r#"{
                "metadata": { "customScheme": "mydapp://", "chainIds": ["0x14a34"] },
                "requestTimeout": 30000
            }"#,
        )
        .unwrap();

        assert_eq!(options.metadata.name, "Dapp");
        assert_eq!(options.metadata.chain_ids, vec!["0x14a34".to_owned()]);
        assert_eq!(options.wallet, Wallet::coinbase_smart_wallet());
        assert_eq!(options.request_timeout, Some(Duration::from_secs(30)));
        assert_eq!(options.compression, Compression::Zlib);
    }

    #[test]
    fn test_wallet_from_json() {
        let wallet: Wallet = serde_json::from_str(
            r#"{ "type": "Native", "name": "Rainbow", "scheme": "rainbow://" }"#,
        )
        .unwrap();
        assert_eq!(wallet.wallet_type, WalletType::Native);
        assert_eq!(wallet.icon_url, None);
    }
}
