#![doc = include_str!("../README.md")]

mod client;
pub mod error;
pub mod key_manager;
pub mod rpc;
pub mod transport;
pub mod wire;

pub use client::{AppMetadata, Chain, MwpClient, MwpClientOptions, Wallet, WalletType};
pub use error::{ClientFailure, MwpError, MwpResult};
pub use mwp_crypto::Compression;
pub use rpc::{
    EthSendTransactionParams, EthSignTransactionParams, EthSignTransactionResult,
    EthSignTypedDataV4Params, PersonalSignParams, WalletAddEthereumChainParams,
    WalletGrantPermissionsParams, WalletGrantPermissionsResult, WalletSendCallsParams,
    WalletWatchAssetParams,
};
pub use transport::{DeepLinkTransport, PopupResult, Transport, TransportError, UrlOpener};
pub use wire::SDK_VERSION;
