//! Encoding of protocol messages into URL query parameters.
//!
//! Every field is serialized to JSON and then form encoded under its own key. `content` is a JSON
//! object whose single key tells which variant it holds. When decoding, values that are not
//! valid JSON are read as bare strings, since some wallets put unquoted ids and timestamps in the
//! query.

use std::collections::HashMap;

use mwp_crypto::CryptoError;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use url::Url;

mod message;

pub use message::{
    EncryptedContent, RequestContent, RequestMessage, ResponseContent, ResponseMessage,
    SDK_VERSION,
};

const ID: &str = "id";
const SENDER: &str = "sender";
const SDK_VERSION_KEY: &str = "sdkVersion";
const CALLBACK_URL: &str = "callbackUrl";
const CUSTOM_SCHEME: &str = "customScheme";
const TIMESTAMP: &str = "timestamp";
const CONTENT: &str = "content";
const REQUEST_ID: &str = "requestId";

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum WireError {
    #[error("Missing parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid parameter {name}: {source}")]
    InvalidParameter {
        name: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode parameter {name}: {source}")]
    Encode {
        name: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid query string: {0}")]
    InvalidQuery(#[from] serde_urlencoded::de::Error),

    #[error("Failed to build query string: {0}")]
    QueryEncoding(#[from] serde_urlencoded::ser::Error),

    #[error("Invalid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// Encode a request into a query string, without the leading `?`.
pub fn encode_request(message: &RequestMessage) -> Result<String, WireError> {
    let mut query = QueryBuilder::default();
    query.push(ID, &message.id)?;
    query.push(SENDER, &message.sender)?;
    query.push(SDK_VERSION_KEY, &message.sdk_version)?;
    query.push(CALLBACK_URL, &message.callback_url)?;
    if let Some(custom_scheme) = &message.custom_scheme {
        query.push(CUSTOM_SCHEME, custom_scheme)?;
    }
    query.push(TIMESTAMP, &message.timestamp)?;
    query.push(CONTENT, &message.content)?;
    query.finish()
}

/// Decode a request from a query string.
pub fn decode_request(query: &str) -> Result<RequestMessage, WireError> {
    let params = QueryParams::parse(query)?;
    Ok(RequestMessage {
        id: params.required(ID)?,
        sender: params.required(SENDER)?,
        content: params.required(CONTENT)?,
        sdk_version: params.required(SDK_VERSION_KEY)?,
        callback_url: params.required(CALLBACK_URL)?,
        custom_scheme: params.optional(CUSTOM_SCHEME)?,
        timestamp: params.required(TIMESTAMP)?,
    })
}

/// Encode a response into a query string, without the leading `?`.
pub fn encode_response(message: &ResponseMessage) -> Result<String, WireError> {
    let mut query = QueryBuilder::default();
    query.push(ID, &message.id)?;
    query.push(SENDER, &message.sender)?;
    query.push(REQUEST_ID, &message.request_id)?;
    query.push(TIMESTAMP, &message.timestamp)?;
    query.push(CONTENT, &message.content)?;
    query.finish()
}

/// Decode a response from a query string.
pub fn decode_response(query: &str) -> Result<ResponseMessage, WireError> {
    let params = QueryParams::parse(query)?;
    Ok(ResponseMessage {
        id: params.required(ID)?,
        sender: params.required(SENDER)?,
        request_id: params.required(REQUEST_ID)?,
        content: params.required(CONTENT)?,
        timestamp: params.required(TIMESTAMP)?,
    })
}

/// The wallet URL with its query replaced by the encoded request. Path and fragment are kept.
pub fn request_url(wallet_url: &str, message: &RequestMessage) -> Result<Url, WireError> {
    let mut url = Url::parse(wallet_url)?;
    url.set_query(Some(&encode_request(message)?));
    Ok(url)
}

/// Decode the request carried by a wallet URL.
pub fn request_from_url(url: &str) -> Result<RequestMessage, WireError> {
    decode_request(Url::parse(url)?.query().unwrap_or_default())
}

/// The callback URL with its query replaced by the encoded response.
pub fn response_url(callback_url: &str, message: &ResponseMessage) -> Result<Url, WireError> {
    let mut url = Url::parse(callback_url)?;
    url.set_query(Some(&encode_response(message)?));
    Ok(url)
}

/// Decode the response carried by a callback URL.
pub fn response_from_url(url: &str) -> Result<ResponseMessage, WireError> {
    decode_response(Url::parse(url)?.query().unwrap_or_default())
}

#[derive(Default)]
struct QueryBuilder {
    pairs: Vec<(&'static str, String)>,
}

impl QueryBuilder {
    fn push<T: Serialize + ?Sized>(&mut self, name: &'static str, value: &T) -> Result<(), WireError> {
        let json =
            serde_json::to_string(value).map_err(|source| WireError::Encode { name, source })?;
        self.pairs.push((name, json));
        Ok(())
    }

    fn finish(self) -> Result<String, WireError> {
        Ok(serde_urlencoded::to_string(self.pairs)?)
    }
}

struct QueryParams(HashMap<String, String>);

impl QueryParams {
    fn parse(query: &str) -> Result<Self, WireError> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)?;
        let mut params = HashMap::with_capacity(pairs.len());
        for (key, value) in pairs {
            params.entry(key).or_insert(value);
        }
        Ok(Self(params))
    }

    fn required<T: DeserializeOwned>(&self, name: &'static str) -> Result<T, WireError> {
        self.optional(name)?
            .ok_or(WireError::MissingParameter(name))
    }

    fn optional<T: DeserializeOwned>(&self, name: &'static str) -> Result<Option<T>, WireError> {
        match self.0.get(name).map(String::as_str) {
            None | Some("") => Ok(None),
            Some(raw) => parse_value(raw)
                .map(Some)
                .map_err(|source| WireError::InvalidParameter { name, source }),
        }
    }
}

fn parse_value<T: DeserializeOwned>(raw: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(raw).or_else(|error| {
        serde_json::from_value(serde_json::Value::String(raw.to_owned())).map_err(|_| error)
    })
}
