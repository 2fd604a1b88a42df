use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use super::codes::{self, is_valid_code, message_from_code, FALLBACK_MESSAGE};

/// An Ethereum JSON-RPC error, as defined by JSON-RPC 2.0, EIP-1474 and EIP-1193.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct EthereumRpcError {
    code: i32,
    message: String,
    data: Option<Value>,
}

/// The arguments given to an error constructor were invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidErrorArgument {
    #[allow(missing_docs)]
    #[error("Message must be a nonempty string.")]
    EmptyMessage,
    #[allow(missing_docs)]
    #[error("Code must be an integer between 1000 and 4999.")]
    ProviderCode(i32),
    #[allow(missing_docs)]
    #[error("Code must be between -32099 and -32005")]
    ServerCode(i32),
}

impl EthereumRpcError {
    /// Create an error with any code. The message must not be empty.
    pub fn new(
        code: i32,
        message: impl Into<String>,
        data: Option<Value>,
    ) -> Result<Self, InvalidErrorArgument> {
        let message = message.into();
        if message.is_empty() {
            return Err(InvalidErrorArgument::EmptyMessage);
        }
        Ok(Self {
            code,
            message,
            data,
        })
    }

    /// Create an EIP-1193 provider error. The code must lie in `1000..=4999`.
    pub fn provider(
        code: i32,
        message: impl Into<String>,
        data: Option<Value>,
    ) -> Result<Self, InvalidErrorArgument> {
        if !codes::is_valid_provider_code(code) {
            return Err(InvalidErrorArgument::ProviderCode(code));
        }
        Self::new(code, message, data)
    }

    /// Built from a code whose default message is known to be non-empty.
    pub(crate) fn from_code(code: i32, opts: ErrorOptions) -> Self {
        Self {
            code,
            message: opts
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| message_from_code(Some(code)).to_owned()),
            data: opts.data,
        }
    }

    #[allow(missing_docs)]
    pub fn code(&self) -> i32 {
        self.code
    }

    #[allow(missing_docs)]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[allow(missing_docs)]
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Whether this is an EIP-1193 provider error.
    pub fn is_provider_error(&self) -> bool {
        codes::is_valid_provider_code(self.code)
    }
}

/// Optional message and data for the [standard error](super::standard_errors) constructors.
/// A missing message is replaced with the default message of the code.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorOptions {
    #[allow(missing_docs)]
    pub message: Option<String>,
    #[allow(missing_docs)]
    pub data: Option<Value>,
}

impl From<&str> for ErrorOptions {
    fn from(message: &str) -> Self {
        Self {
            message: Some(message.to_owned()),
            data: None,
        }
    }
}

impl From<String> for ErrorOptions {
    fn from(message: String) -> Self {
        Self {
            message: Some(message),
            data: None,
        }
    }
}

/// The wire representation of an error, as found in a `failure` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedRpcError {
    #[allow(missing_docs)]
    pub code: i32,
    #[allow(missing_docs)]
    #[serde(default)]
    pub message: String,
    #[allow(missing_docs)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[allow(missing_docs)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl SerializedRpcError {
    /// Normalize a received error.
    ///
    /// A standard code with an empty message gets the default message of the code and keeps the
    /// original error under `data.originalError`. Any non-standard code is turned into an
    /// internal error.
    pub fn normalize(self) -> Self {
        if !is_valid_code(self.code) {
            return Self {
                code: codes::rpc::INTERNAL,
                message: FALLBACK_MESSAGE.to_owned(),
                data: Some(json!({ "originalError": self.to_value() })),
                stack: None,
            };
        }

        if self.message.is_empty() {
            let original = self.to_value();
            return Self {
                code: self.code,
                message: message_from_code(Some(self.code)).to_owned(),
                data: Some(json!({ "originalError": original })),
                stack: self.stack,
            };
        }

        self
    }

    /// Serialize an arbitrary error as an internal error.
    pub fn from_error(error: &(dyn std::error::Error + 'static)) -> Self {
        let message = error.to_string();
        Self {
            code: codes::rpc::INTERNAL,
            data: Some(json!({ "originalError": { "message": message } })),
            message,
            stack: None,
        }
    }

    fn to_value(&self) -> Value {
        json!({
            "code": self.code,
            "message": self.message,
            "data": self.data,
        })
    }
}

impl From<&EthereumRpcError> for SerializedRpcError {
    fn from(error: &EthereumRpcError) -> Self {
        Self {
            code: error.code,
            message: error.message.clone(),
            data: error.data.clone(),
            stack: None,
        }
        .normalize()
    }
}

impl From<SerializedRpcError> for EthereumRpcError {
    fn from(error: SerializedRpcError) -> Self {
        let error = error.normalize();
        Self {
            code: error.code,
            message: error.message,
            data: error.data,
        }
    }
}
