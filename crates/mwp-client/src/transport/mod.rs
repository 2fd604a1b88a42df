//! The platform mechanism that shows a request URL to the user and brings the wallet's answer
//! back.

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod deep_link;

pub use deep_link::{DeepLinkTransport, UrlOpener};

/// How a popup round-trip ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PopupResult {
    /// The wallet redirected to the callback URL.
    Success {
        /// The full callback URL, including the response in its query.
        url: String,
    },
    /// The user closed the popup.
    Cancel,
    /// The platform failed to show the popup or to capture the callback.
    Error {
        #[allow(missing_docs)]
        #[serde(default)]
        message: String,
    },
}

/// A failure of the transport itself, as opposed to a [PopupResult::Error] reported through it.
#[derive(Debug, Error)]
pub enum TransportError {
    #[allow(missing_docs)]
    #[error("Failed to open the wallet URL: {0}")]
    Open(String),

    /// The transport went away before delivering a result.
    #[error("The transport was closed before a result was delivered")]
    Closed,
}

/// This trait defines the interface used to open a request URL and wait for the wallet's
/// answer. It is up to the platform to implement this trait, typically with an in-app browser
/// session, a webview or an external browser plus a deep link handler.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Open `url` and resolve once the wallet redirects to a URL starting with
    /// `callback_scheme`, or once the user dismisses the popup.
    async fn open_popup(
        &self,
        url: &str,
        callback_scheme: &str,
    ) -> Result<PopupResult, TransportError>;
}
