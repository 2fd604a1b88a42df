use serde::{Deserialize, Serialize};

/// Features a wallet advertises for one chain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capability {
    #[allow(missing_docs)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Permissions>,
    #[allow(missing_docs)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster_service: Option<PaymasterService>,
    #[allow(missing_docs)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atomic_batch: Option<AtomicBatch>,
}

/// Support for `wallet_grantPermissions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permissions {
    #[allow(missing_docs)]
    pub supported: bool,
    #[allow(missing_docs)]
    #[serde(default)]
    pub signer_types: Vec<String>,
    #[allow(missing_docs)]
    #[serde(default)]
    pub key_types: Vec<String>,
    #[allow(missing_docs)]
    #[serde(default)]
    pub permission_types: Vec<String>,
}

/// ERC-4337 paymaster support.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymasterService {
    #[allow(missing_docs)]
    pub supported: bool,
}

/// Support for atomic execution of `wallet_sendCalls` batches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtomicBatch {
    #[allow(missing_docs)]
    pub supported: bool,
}
