use std::collections::HashMap;

use mwp_state::{register_setting_key, ScopedStore, SettingsError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{error::MwpError, rpc::Capability};

register_setting_key!(const ACCOUNTS: Vec<String> = "accounts");
register_setting_key!(const ACTIVE_CHAIN: Chain = "activeChain");
register_setting_key!(const AVAILABLE_CHAINS: Vec<Chain> = "availableChains");
register_setting_key!(const WALLET_CAPABILITIES: HashMap<String, Capability> = "walletCapabilities");

/// An EVM chain, identified by its hex chain id.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Chain {
    /// Hex chain id, such as `0x2105`.
    pub id: String,
    /// The RPC endpoint the wallet uses for this chain, when it shared one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,
}

impl Chain {
    pub(crate) fn new(id: &str) -> Self {
        Self {
            id: normalize_chain_id(id),
            rpc_url: None,
        }
    }
}

/// Parse a chain id. `0x` prefixed ids are hex, anything else is decimal.
pub(crate) fn parse_chain_id(id: &str) -> Result<u64, MwpError> {
    let parsed = match id.strip_prefix("0x").or_else(|| id.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => id.parse(),
    };
    parsed.map_err(|_| MwpError::InvalidChainId(id.to_owned()))
}

/// Lowercase `0x` hex form of a chain id. Ids that do not parse are kept as they are.
pub(crate) fn normalize_chain_id(id: &str) -> String {
    match parse_chain_id(id) {
        Ok(value) => format!("{value:#x}"),
        Err(_) => id.to_owned(),
    }
}

/// Accounts, chains and capabilities of the session, mirrored in storage.
pub(crate) struct Session {
    store: ScopedStore,
    accounts: Vec<String>,
    active_chain: Chain,
    capabilities: Option<HashMap<String, Capability>>,
}

impl Session {
    pub(crate) async fn load(store: ScopedStore, default_chain_id: &str) -> Result<Self, SettingsError> {
        let accounts = store.setting(ACCOUNTS).get().await?.unwrap_or_default();
        let active_chain = store
            .setting(ACTIVE_CHAIN)
            .get()
            .await?
            .unwrap_or_else(|| Chain::new(default_chain_id));
        let capabilities = store.setting(WALLET_CAPABILITIES).get().await?;

        debug!(
            authorized = !accounts.is_empty(),
            chain = %active_chain.id,
            "Loaded session"
        );

        Ok(Self {
            store,
            accounts,
            active_chain,
            capabilities,
        })
    }

    pub(crate) fn is_authorized(&self) -> bool {
        !self.accounts.is_empty()
    }

    pub(crate) fn accounts(&self) -> &[String] {
        &self.accounts
    }

    pub(crate) fn active_chain(&self) -> &Chain {
        &self.active_chain
    }

    pub(crate) fn capabilities(&self) -> Option<&HashMap<String, Capability>> {
        self.capabilities.as_ref()
    }

    pub(crate) async fn set_accounts(&mut self, accounts: Vec<String>) -> Result<(), SettingsError> {
        self.store.setting(ACCOUNTS).update(&accounts).await?;
        self.accounts = accounts;
        Ok(())
    }

    pub(crate) async fn set_available_chains(&mut self, chains: &[Chain]) -> Result<(), SettingsError> {
        self.store
            .setting(AVAILABLE_CHAINS)
            .update(&chains.to_vec())
            .await
    }

    pub(crate) async fn set_capabilities(
        &mut self,
        capabilities: HashMap<String, Capability>,
    ) -> Result<(), SettingsError> {
        self.store
            .setting(WALLET_CAPABILITIES)
            .update(&capabilities)
            .await?;
        self.capabilities = Some(capabilities);
        Ok(())
    }

    /// Make `chain_id` active if it is one of the available chains. Returns whether it was
    /// found. When `available` is `None` the stored list is used.
    pub(crate) async fn update_chain(
        &mut self,
        chain_id: &str,
        available: Option<&[Chain]>,
    ) -> Result<bool, SettingsError> {
        let stored;
        let chains = match available {
            Some(chains) => chains,
            None => {
                stored = self.store.setting(AVAILABLE_CHAINS).get().await?;
                match &stored {
                    Some(chains) => chains.as_slice(),
                    None => return Ok(false),
                }
            }
        };

        let chain_id = normalize_chain_id(chain_id);
        match chains.iter().find(|chain| chain.id == chain_id) {
            Some(chain) => {
                let chain = chain.clone();
                self.switch_to(chain).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub(crate) async fn switch_to(&mut self, chain: Chain) -> Result<(), SettingsError> {
        if self.active_chain != chain {
            self.store.setting(ACTIVE_CHAIN).update(&chain).await?;
            info!(chain = %chain.id, "Switched active chain");
            self.active_chain = chain;
        }
        Ok(())
    }

    /// Forget everything and go back to `default_chain_id`.
    pub(crate) async fn clear(&mut self, default_chain_id: &str) -> Result<(), SettingsError> {
        self.store.setting(ACCOUNTS).delete().await?;
        self.store.setting(ACTIVE_CHAIN).delete().await?;
        self.store.setting(AVAILABLE_CHAINS).delete().await?;
        self.store.setting(WALLET_CAPABILITIES).delete().await?;

        self.accounts.clear();
        self.active_chain = Chain::new(default_chain_id);
        self.capabilities = None;
        Ok(())
    }
}
