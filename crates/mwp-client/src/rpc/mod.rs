//! Payloads exchanged with the wallet inside the encrypted envelope, and the handshake that
//! precedes them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

mod capability;
mod params;

pub use capability::{AtomicBatch, Capability, PaymasterService, Permissions};
pub use params::*;

/// Methods the client knows how to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RpcMethod {
    #[allow(missing_docs)]
    #[serde(rename = "eth_requestAccounts")]
    EthRequestAccounts,
    #[allow(missing_docs)]
    #[serde(rename = "wallet_switchEthereumChain")]
    WalletSwitchEthereumChain,
    #[allow(missing_docs)]
    #[serde(rename = "personal_sign")]
    PersonalSign,
    #[allow(missing_docs)]
    #[serde(rename = "eth_signTransaction")]
    EthSignTransaction,
    #[allow(missing_docs)]
    #[serde(rename = "eth_sendTransaction")]
    EthSendTransaction,
    #[allow(missing_docs)]
    #[serde(rename = "eth_signTypedData_v4")]
    EthSignTypedDataV4,
    #[allow(missing_docs)]
    #[serde(rename = "wallet_addEthereumChain")]
    WalletAddEthereumChain,
    #[allow(missing_docs)]
    #[serde(rename = "wallet_watchAsset")]
    WalletWatchAsset,
    #[allow(missing_docs)]
    #[serde(rename = "wallet_sendCalls")]
    WalletSendCalls,
    #[allow(missing_docs)]
    #[serde(rename = "wallet_showCallsStatus")]
    WalletShowCallsStatus,
    #[allow(missing_docs)]
    #[serde(rename = "wallet_grantPermissions")]
    WalletGrantPermissions,
}

impl RpcMethod {
    /// The JSON-RPC method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            RpcMethod::EthRequestAccounts => "eth_requestAccounts",
            RpcMethod::WalletSwitchEthereumChain => "wallet_switchEthereumChain",
            RpcMethod::PersonalSign => "personal_sign",
            RpcMethod::EthSignTransaction => "eth_signTransaction",
            RpcMethod::EthSendTransaction => "eth_sendTransaction",
            RpcMethod::EthSignTypedDataV4 => "eth_signTypedData_v4",
            RpcMethod::WalletAddEthereumChain => "wallet_addEthereumChain",
            RpcMethod::WalletWatchAsset => "wallet_watchAsset",
            RpcMethod::WalletSendCalls => "wallet_sendCalls",
            RpcMethod::WalletShowCallsStatus => "wallet_showCallsStatus",
            RpcMethod::WalletGrantPermissions => "wallet_grantPermissions",
        }
    }
}

impl std::fmt::Display for RpcMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The method and positional parameters of an encrypted request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcAction {
    #[allow(missing_docs)]
    pub method: RpcMethod,
    #[allow(missing_docs)]
    #[serde(default)]
    pub params: Vec<Value>,
}

/// The plaintext of an encrypted request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcRequest {
    #[allow(missing_docs)]
    pub action: RpcAction,
    /// The active chain, as a number.
    pub chain_id: u64,
}

/// The plaintext of an encrypted response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse<T> {
    #[allow(missing_docs)]
    pub result: RpcResult<T>,
}

/// Either a value or an error reported by the wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResult<T> {
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<T>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcResultError>,
}

impl<T> RpcResult<T> {
    #[allow(missing_docs)]
    pub fn value(value: T) -> Self {
        Self {
            value: Some(value),
            error: None,
        }
    }

    #[allow(missing_docs)]
    pub fn error(error: RpcResultError) -> Self {
        Self {
            value: None,
            error: Some(error),
        }
    }
}

/// An error embedded in a result. Wallets do not always set a code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResultError {
    #[allow(missing_docs)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i32>,
    #[allow(missing_docs)]
    #[serde(default)]
    pub message: String,
}

/// The plaintext handshake that opens a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestAccounts {
    #[allow(missing_docs)]
    pub method: RpcMethod,
    #[allow(missing_docs)]
    pub params: RequestAccountsParams,
}

impl RequestAccounts {
    #[allow(missing_docs)]
    pub fn new(app_name: impl Into<String>, app_logo_url: Option<String>) -> Self {
        Self {
            method: RpcMethod::EthRequestAccounts,
            params: RequestAccountsParams {
                app_name: app_name.into(),
                app_logo_url,
            },
        }
    }
}

/// How the dapp introduces itself to the wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestAccountsParams {
    #[allow(missing_docs)]
    pub app_name: String,
    #[allow(missing_docs)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_logo_url: Option<String>,
}

/// The decrypted answer to the handshake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestAccountsResponse {
    #[allow(missing_docs)]
    pub result: RpcResult<Vec<String>>,
    #[allow(missing_docs)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<RequestAccountsData>,
}

/// Session data the wallet shares alongside the accounts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestAccountsData {
    /// Chain id to RPC URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chains: Option<HashMap<String, String>>,
    /// Chain id to the capabilities the wallet supports on that chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<HashMap<String, Capability>>,
}
