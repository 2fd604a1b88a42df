use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use mwp_crypto::EncryptedEnvelope;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::WireError;
use crate::{error::SerializedRpcError, rpc::RequestAccounts};

/// The version of the protocol library reported in every request.
pub const SDK_VERSION: &str = "1.0.0";

/// A message sent to the wallet.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestMessage {
    #[allow(missing_docs)]
    pub id: Uuid,
    /// Hex encoded SubjectPublicKeyInfo of the dapp's public key.
    pub sender: String,
    #[allow(missing_docs)]
    pub content: RequestContent,
    #[allow(missing_docs)]
    pub sdk_version: String,
    /// Where the wallet redirects with its answer.
    pub callback_url: String,
    #[allow(missing_docs)]
    pub custom_scheme: Option<String>,
    #[allow(missing_docs)]
    pub timestamp: DateTime<Utc>,
}

/// A message received from the wallet.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseMessage {
    #[allow(missing_docs)]
    pub id: Uuid,
    /// Hex encoded SubjectPublicKeyInfo of the wallet's public key.
    pub sender: String,
    /// The id of the request this answers.
    pub request_id: Uuid,
    #[allow(missing_docs)]
    pub content: ResponseContent,
    #[allow(missing_docs)]
    pub timestamp: DateTime<Utc>,
}

/// The body of a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RequestContent {
    /// The plaintext handshake.
    Handshake(RequestAccounts),
    /// An encrypted [RpcRequest](crate::rpc::RpcRequest).
    Encrypted(EncryptedContent),
}

/// The body of a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResponseContent {
    /// An encrypted [RpcResponse](crate::rpc::RpcResponse).
    Encrypted(EncryptedContent),
    /// The wallet refused to process the request.
    Failure(SerializedRpcError),
}

/// An [EncryptedEnvelope] with both parts base64 encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedContent {
    #[allow(missing_docs)]
    pub iv: String,
    #[allow(missing_docs)]
    pub cipher_text: String,
}

impl From<&EncryptedEnvelope> for EncryptedContent {
    fn from(envelope: &EncryptedEnvelope) -> Self {
        Self {
            iv: STANDARD.encode(envelope.iv()),
            cipher_text: STANDARD.encode(envelope.cipher_text()),
        }
    }
}

impl TryFrom<&EncryptedContent> for EncryptedEnvelope {
    type Error = WireError;

    fn try_from(content: &EncryptedContent) -> Result<Self, Self::Error> {
        let iv = STANDARD.decode(&content.iv)?;
        let cipher_text = STANDARD.decode(&content.cipher_text)?;
        Ok(EncryptedEnvelope::from_parts(&iv, cipher_text)?)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_content_is_tagged_by_key() {
        let content = RequestContent::Encrypted(EncryptedContent {
            iv: "AAAA".to_owned(),
            cipher_text: "BBBB".to_owned(),
        });
        assert_eq!(
            serde_json::to_value(&content).unwrap(),
            json!({ "encrypted": { "iv": "AAAA", "cipherText": "BBBB" } })
        );

        let failure: ResponseContent =
            serde_json::from_str(r#"{"failure":{"code":4001,"message":"Rejected"}}"#).unwrap();
        assert!(matches!(failure, ResponseContent::Failure(e) if e.code == 4001));
    }

    #[test]
    fn test_envelope_base64_round_trip() {
        let envelope = EncryptedEnvelope::new([9u8; 12], vec![1, 2, 3, 4]);
        let content = EncryptedContent::from(&envelope);
        assert_eq!(content.iv, "CQkJCQkJCQkJCQkJ");

        let decoded = EncryptedEnvelope::try_from(&content).unwrap();
        assert_eq!(decoded, envelope);
    }

    #[test]
    fn test_envelope_rejects_bad_iv() {
        let content = EncryptedContent {
            iv: STANDARD.encode([0u8; 16]),
            cipher_text: String::new(),
        };
        assert!(matches!(
            EncryptedEnvelope::try_from(&content),
            Err(WireError::Crypto(_))
        ));

        let content = EncryptedContent {
            iv: "not base64!".to_owned(),
            cipher_text: String::new(),
        };
        assert!(matches!(
            EncryptedEnvelope::try_from(&content),
            Err(WireError::InvalidBase64(_))
        ));
    }
}
