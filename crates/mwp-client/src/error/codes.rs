//! Standard Ethereum JSON-RPC error codes and their default messages.

/// JSON-RPC 2.0 and EIP-1474 codes.
pub mod rpc {
    #![allow(missing_docs)]
    pub const INVALID_INPUT: i32 = -32000;
    pub const RESOURCE_NOT_FOUND: i32 = -32001;
    pub const RESOURCE_UNAVAILABLE: i32 = -32002;
    pub const TRANSACTION_REJECTED: i32 = -32003;
    pub const METHOD_NOT_SUPPORTED: i32 = -32004;
    pub const LIMIT_EXCEEDED: i32 = -32005;
    pub const PARSE: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL: i32 = -32603;
}

/// EIP-1193 and EIP-3085 provider codes.
pub mod provider {
    #![allow(missing_docs)]
    pub const USER_REJECTED_REQUEST: i32 = 4001;
    pub const UNAUTHORIZED: i32 = 4100;
    pub const UNSUPPORTED_METHOD: i32 = 4200;
    pub const DISCONNECTED: i32 = 4900;
    pub const CHAIN_DISCONNECTED: i32 = 4901;
    pub const UNSUPPORTED_CHAIN: i32 = 4902;
}

pub(crate) const FALLBACK_MESSAGE: &str = "Unspecified error message.";
pub(crate) const JSON_RPC_SERVER_ERROR_MESSAGE: &str = "Unspecified server error.";

/// The standard that defines a code, and the message it prescribes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorValue {
    #[allow(missing_docs)]
    pub standard: &'static str,
    #[allow(missing_docs)]
    pub message: &'static str,
}

/// Look up a code in the table of standard codes.
pub fn error_value(code: i32) -> Option<ErrorValue> {
    let (standard, message) = match code {
        rpc::PARSE => (
            "JSON RPC 2.0",
            "Invalid JSON was received by the server. An error occurred on the server while parsing the JSON text.",
        ),
        rpc::INVALID_REQUEST => ("JSON RPC 2.0", "The JSON sent is not a valid Request object."),
        rpc::METHOD_NOT_FOUND => ("JSON RPC 2.0", "The method does not exist / is not available."),
        rpc::INVALID_PARAMS => ("JSON RPC 2.0", "Invalid method parameter(s)."),
        rpc::INTERNAL => ("JSON RPC 2.0", "Internal JSON-RPC error."),
        rpc::INVALID_INPUT => ("EIP-1474", "Invalid input."),
        rpc::RESOURCE_NOT_FOUND => ("EIP-1474", "Resource not found."),
        rpc::RESOURCE_UNAVAILABLE => ("EIP-1474", "Resource unavailable."),
        rpc::TRANSACTION_REJECTED => ("EIP-1474", "Transaction rejected."),
        rpc::METHOD_NOT_SUPPORTED => ("EIP-1474", "Method not supported."),
        rpc::LIMIT_EXCEEDED => ("EIP-1474", "Request limit exceeded."),
        provider::USER_REJECTED_REQUEST => ("EIP-1193", "User rejected the request."),
        provider::UNAUTHORIZED => (
            "EIP-1193",
            "The requested account and/or method has not been authorized by the user.",
        ),
        provider::UNSUPPORTED_METHOD => (
            "EIP-1193",
            "The requested method is not supported by this Ethereum provider.",
        ),
        provider::DISCONNECTED => ("EIP-1193", "The provider is disconnected from all chains."),
        provider::CHAIN_DISCONNECTED => (
            "EIP-1193",
            "The provider is disconnected from the specified chain.",
        ),
        provider::UNSUPPORTED_CHAIN => ("EIP-3085", "Unrecognized chain ID."),
        _ => return None,
    };
    Some(ErrorValue { standard, message })
}

/// The default message for a code.
///
/// Unknown codes in the reserved server range get a generic server message, anything else gets
/// the generic fallback.
pub fn message_from_code(code: Option<i32>) -> &'static str {
    match code {
        Some(code) => match error_value(code) {
            Some(value) => value.message,
            None if is_json_rpc_server_error(code) => JSON_RPC_SERVER_ERROR_MESSAGE,
            None => FALLBACK_MESSAGE,
        },
        None => FALLBACK_MESSAGE,
    }
}

/// Whether the code is a standard code or lies in the reserved server range.
pub fn is_valid_code(code: i32) -> bool {
    error_value(code).is_some() || is_json_rpc_server_error(code)
}

pub(crate) fn is_json_rpc_server_error(code: i32) -> bool {
    (-32099..=-32000).contains(&code)
}

pub(crate) fn is_valid_provider_code(code: i32) -> bool {
    (1000..=4999).contains(&code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_have_messages() {
        assert_eq!(
            message_from_code(Some(provider::USER_REJECTED_REQUEST)),
            "User rejected the request."
        );
        assert_eq!(
            error_value(provider::UNSUPPORTED_CHAIN).map(|v| v.standard),
            Some("EIP-3085")
        );
        assert_eq!(
            message_from_code(Some(rpc::LIMIT_EXCEEDED)),
            "Request limit exceeded."
        );
    }

    #[test]
    fn test_fallback_messages() {
        assert_eq!(message_from_code(Some(-32050)), "Unspecified server error.");
        assert_eq!(message_from_code(Some(-32000)), "Invalid input.");
        assert_eq!(message_from_code(Some(12)), "Unspecified error message.");
        assert_eq!(message_from_code(None), "Unspecified error message.");
    }

    #[test]
    fn test_is_valid_code() {
        assert!(is_valid_code(4100));
        assert!(is_valid_code(-32099));
        assert!(!is_valid_code(-32100));
        assert!(!is_valid_code(4002));
    }
}
