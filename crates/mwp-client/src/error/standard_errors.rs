//! Constructors for the standard Ethereum errors.
//!
//! ```
//! use mwp_client::error::{standard_errors, ErrorOptions};
//!
//! let error = standard_errors::provider::user_rejected_request(ErrorOptions::default());
//! assert_eq!(error.code(), 4001);
//! assert_eq!(error.message(), "User rejected the request.");
//!
//! let error = standard_errors::rpc::invalid_params("Missing address");
//! assert_eq!(error.message(), "Missing address");
//! ```

use super::{EthereumRpcError, ErrorOptions, InvalidErrorArgument};

/// JSON-RPC 2.0 and EIP-1474 errors.
pub mod rpc {
    use super::*;
    use crate::error::codes::rpc::*;

    macro_rules! rpc_errors {
        ($($(#[$doc:meta])* $name:ident => $code:ident),* $(,)?) => {
            $(
                $(#[$doc])*
                pub fn $name(opts: impl Into<ErrorOptions>) -> EthereumRpcError {
                    EthereumRpcError::from_code($code, opts.into())
                }
            )*
        };
    }

    rpc_errors! {
        /// -32700
        parse => PARSE,
        /// -32600
        invalid_request => INVALID_REQUEST,
        /// -32602
        invalid_params => INVALID_PARAMS,
        /// -32601
        method_not_found => METHOD_NOT_FOUND,
        /// -32603
        internal => INTERNAL,
        /// -32000
        invalid_input => INVALID_INPUT,
        /// -32001
        resource_not_found => RESOURCE_NOT_FOUND,
        /// -32002
        resource_unavailable => RESOURCE_UNAVAILABLE,
        /// -32003
        transaction_rejected => TRANSACTION_REJECTED,
        /// -32004
        method_not_supported => METHOD_NOT_SUPPORTED,
        /// -32005
        limit_exceeded => LIMIT_EXCEEDED,
    }

    /// An implementation defined server error. The code must lie in `-32099..=-32005`.
    pub fn server(
        code: i32,
        opts: impl Into<ErrorOptions>,
    ) -> Result<EthereumRpcError, InvalidErrorArgument> {
        if !(-32099..=-32005).contains(&code) {
            return Err(InvalidErrorArgument::ServerCode(code));
        }
        Ok(EthereumRpcError::from_code(code, opts.into()))
    }
}

/// EIP-1193 and EIP-3085 provider errors.
pub mod provider {
    use super::*;
    use crate::error::codes::provider::*;

    macro_rules! provider_errors {
        ($($(#[$doc:meta])* $name:ident => $code:ident),* $(,)?) => {
            $(
                $(#[$doc])*
                pub fn $name(opts: impl Into<ErrorOptions>) -> EthereumRpcError {
                    EthereumRpcError::from_code($code, opts.into())
                }
            )*
        };
    }

    provider_errors! {
        /// 4001
        user_rejected_request => USER_REJECTED_REQUEST,
        /// 4100
        unauthorized => UNAUTHORIZED,
        /// 4200
        unsupported_method => UNSUPPORTED_METHOD,
        /// 4900
        disconnected => DISCONNECTED,
        /// 4901
        chain_disconnected => CHAIN_DISCONNECTED,
        /// 4902
        unsupported_chain => UNSUPPORTED_CHAIN,
    }

    /// A provider error with a custom code. The message is required.
    pub fn custom(
        code: i32,
        message: impl Into<String>,
        data: Option<serde_json::Value>,
    ) -> Result<EthereumRpcError, InvalidErrorArgument> {
        EthereumRpcError::provider(code, message, data)
    }
}
