//! Errors of the client, and the Ethereum JSON-RPC error model shared with wallets.

use std::{fmt, time::Duration};

use mwp_crypto::CryptoError;
use mwp_state::SettingsError;
use thiserror::Error;
use uuid::Uuid;

use crate::{key_manager::KeyManagerError, transport::TransportError, wire::WireError};

pub mod codes;
mod rpc_error;
pub mod standard_errors;

pub use rpc_error::{ErrorOptions, EthereumRpcError, InvalidErrorArgument, SerializedRpcError};

/// Everything that can go wrong inside the client.
#[derive(Debug, Error)]
pub enum MwpError {
    /// A standard provider error raised locally, such as a rejected popup or a call made before
    /// the handshake.
    #[error(transparent)]
    Provider(#[from] EthereumRpcError),

    /// The wallet answered with an error.
    #[error("{message}")]
    Wallet {
        #[allow(missing_docs)]
        code: Option<i32>,
        #[allow(missing_docs)]
        message: String,
    },

    /// The callback URL could not be decoded.
    #[error("Malformed response: {0}")]
    MalformedResponse(#[from] WireError),

    #[allow(missing_docs)]
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[allow(missing_docs)]
    #[error(transparent)]
    KeyManager(#[from] KeyManagerError),

    #[allow(missing_docs)]
    #[error(transparent)]
    Storage(#[from] SettingsError),

    #[allow(missing_docs)]
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[allow(missing_docs)]
    #[error("Invalid chain id: {0}")]
    InvalidChainId(String),

    #[allow(missing_docs)]
    #[error("Invalid wallet URL: {0}")]
    InvalidWalletUrl(String),

    #[allow(missing_docs)]
    #[error("Native wallet not supported yet")]
    UnsupportedWallet,

    /// The handshake succeeded but the wallet did not share any account.
    #[error("The wallet did not return any account")]
    NoAccounts,

    /// The wallet answered without a value where one is required.
    #[error("The wallet returned no result for {0}")]
    MissingResult(&'static str),

    #[allow(missing_docs)]
    #[error("Failed to serialize the request: {0}")]
    Serialize(#[source] serde_json::Error),

    #[allow(missing_docs)]
    #[error("Failed to read the wallet response: {0}")]
    Deserialize(#[source] serde_json::Error),

    /// The callback answered a different request than the one in flight.
    #[error("The response belongs to request {actual}, expected {expected}")]
    RequestMismatch {
        #[allow(missing_docs)]
        expected: Uuid,
        #[allow(missing_docs)]
        actual: Uuid,
    },

    #[allow(missing_docs)]
    #[error("The request timed out after {0:?}")]
    Timeout(Duration),

    #[allow(missing_docs)]
    #[error("The request was cancelled")]
    Cancelled,
}

impl MwpError {
    /// The numeric provider or RPC code, when one is known.
    pub fn code(&self) -> Option<i32> {
        match self {
            MwpError::Provider(e) => Some(e.code()),
            MwpError::Wallet { code, .. } => *code,
            _ => None,
        }
    }
}

/// The error returned by every public operation of the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientFailure {
    message: String,
    code: Option<i32>,
}

impl ClientFailure {
    /// A human readable description of the failure.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The provider or RPC code, for failures that carry one.
    pub fn code(&self) -> Option<i32> {
        self.code
    }
}

impl fmt::Display for ClientFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} ({})", self.message, code),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ClientFailure {}

impl From<MwpError> for ClientFailure {
    fn from(error: MwpError) -> Self {
        Self {
            code: error.code(),
            message: error.to_string(),
        }
    }
}

/// Alias for `Result<T, ClientFailure>`.
pub type MwpResult<T> = Result<T, ClientFailure>;

pub(crate) type Result<T, E = MwpError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_keeps_provider_code() {
        let failure: ClientFailure =
            MwpError::from(standard_errors::provider::unauthorized(ErrorOptions::default())).into();
        assert_eq!(failure.code(), Some(4100));
        assert_eq!(
            failure.message(),
            "The requested account and/or method has not been authorized by the user."
        );
        assert_eq!(
            failure.to_string(),
            "The requested account and/or method has not been authorized by the user. (4100)"
        );
    }

    #[test]
    fn test_failure_without_code() {
        let failure: ClientFailure = MwpError::NoAccounts.into();
        assert_eq!(failure.code(), None);
        assert_eq!(failure.to_string(), "The wallet did not return any account");
    }
}
