use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parameters of `wallet_switchEthereumChain`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchEthereumChainParams {
    /// Hex chain id, such as `0x2105`.
    pub chain_id: String,
}

/// Parameters of `personal_sign`. Sent positionally as `[challenge, address]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalSignParams {
    /// The message to sign, usually hex encoded.
    pub challenge: String,
    /// The account that signs.
    pub address: String,
}

/// Parameters of `eth_signTransaction`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct EthSignTransactionParams {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    pub from: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_priority_fee_per_gas: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_fee_per_gas: Option<String>,
    #[serde(default)]
    pub access_list: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<String>,
}

/// The signature produced by `eth_signTransaction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EthSignTransactionResult {
    /// ECDSA recovery id.
    pub v: String,
    /// ECDSA signature parameter R.
    pub r: String,
    /// ECDSA signature parameter S.
    pub s: String,
}

/// Parameters of `eth_sendTransaction`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct EthSendTransactionParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    pub from: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<String>,
}

/// EIP-712 typed data, sent as the second parameter of `eth_signTypedData_v4`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EthSignTypedDataV4Params {
    /// Struct name to its fields.
    pub types: HashMap<String, Vec<TypedDataField>>,
    #[allow(missing_docs)]
    pub primary_type: String,
    #[allow(missing_docs)]
    pub domain: Eip712Domain,
    /// The structured message, shaped according to `types`.
    pub message: Value,
}

/// A field of an EIP-712 struct type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct TypedDataField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
}

/// The EIP-712 domain separator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct Eip712Domain {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verifying_contract: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,
}

/// Parameters of `wallet_addEthereumChain` (EIP-3085).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct WalletAddEthereumChainParams {
    pub chain_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_name: Option<String>,
    #[serde(default)]
    pub rpc_urls: Vec<String>,
    #[serde(default)]
    pub icon_urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_currency: Option<NativeCurrency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_explorer_urls: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// What the wallet returns after adding a chain. Wallets usually answer `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddEthereumChainResult {}

/// Parameters of `wallet_watchAsset` (EIP-747).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct WalletWatchAssetParams {
    /// Token standard, such as `ERC20`.
    #[serde(rename = "type")]
    pub asset_type: String,
    pub options: WalletWatchAssetOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct WalletWatchAssetOptions {
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
}

/// Parameters of `wallet_sendCalls` (EIP-5792).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct WalletSendCallsParams {
    pub version: String,
    pub chain_id: String,
    pub from: String,
    pub calls: Vec<Call>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Value>,
}

/// One call of a `wallet_sendCalls` batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct Call {
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// Parameters of `wallet_grantPermissions` (ERC-7715).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct WalletGrantPermissionsParams {
    pub chain_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Unix timestamp, in seconds, after which the permissions lapse.
    pub expiry: i64,
    pub signer: Signer,
    pub permissions: Vec<Permission>,
}

/// The key or account that receives the permissions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct Signer {
    #[serde(rename = "type")]
    pub signer_type: String,
    #[serde(default)]
    pub data: HashMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct Permission {
    #[serde(rename = "type")]
    pub permission_type: String,
    #[serde(default)]
    pub data: HashMap<String, Value>,
}

/// The permissions the wallet granted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletGrantPermissionsResult {
    /// The request, as granted. The wallet may have narrowed it.
    #[serde(flatten)]
    pub granted: WalletGrantPermissionsParams,
    /// Opaque value to pass along when using the permissions.
    pub context: String,
    #[allow(missing_docs)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_meta: Option<AccountMeta>,
    #[allow(missing_docs)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signer_meta: Option<SignerMeta>,
}

/// Deployment data of a counterfactual account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct AccountMeta {
    pub factory: String,
    pub factory_data: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct SignerMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_op_builder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delegation_manager: Option<String>,
}
