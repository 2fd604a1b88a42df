use std::sync::Arc;

use tokio::sync::{oneshot, Mutex};
use tracing::{debug, warn};

use super::{PopupResult, Transport, TransportError};

/// Hands a URL to the operating system, usually to the default browser or to the wallet app.
pub trait UrlOpener: Send + Sync {
    #[allow(missing_docs)]
    fn open_url(&self, url: &str) -> Result<(), TransportError>;
}

struct PendingPopup {
    callback_scheme: String,
    sender: oneshot::Sender<PopupResult>,
}

/// A [Transport] for platforms where the wallet is opened externally and the answer comes back
/// as a deep link.
///
/// The application must forward every incoming deep link to [DeepLinkTransport::handle_callback],
/// and call [DeepLinkTransport::cancel] when the user returns without an answer.
pub struct DeepLinkTransport {
    opener: Arc<dyn UrlOpener>,
    pending: Mutex<Option<PendingPopup>>,
}

impl DeepLinkTransport {
    #[allow(missing_docs)]
    pub fn new(opener: Arc<dyn UrlOpener>) -> Self {
        Self {
            opener,
            pending: Mutex::new(None),
        }
    }

    /// Deliver a deep link. Returns `true` when it completed the pending popup.
    pub async fn handle_callback(&self, url: &str) -> bool {
        let mut pending = self.pending.lock().await;
        match pending.take() {
            Some(popup) if url.starts_with(&popup.callback_scheme) => {
                debug!("Received wallet callback");
                let _ = popup.sender.send(PopupResult::Success {
                    url: url.to_owned(),
                });
                true
            }
            other => {
                *pending = other;
                false
            }
        }
    }

    /// Resolve the pending popup as cancelled by the user.
    pub async fn cancel(&self) {
        if let Some(popup) = self.pending.lock().await.take() {
            let _ = popup.sender.send(PopupResult::Cancel);
        }
    }

    /// Resolve the pending popup with a platform error.
    pub async fn fail(&self, message: impl Into<String>) {
        if let Some(popup) = self.pending.lock().await.take() {
            let _ = popup.sender.send(PopupResult::Error {
                message: message.into(),
            });
        }
    }
}

#[async_trait::async_trait]
impl Transport for DeepLinkTransport {
    async fn open_popup(
        &self,
        url: &str,
        callback_scheme: &str,
    ) -> Result<PopupResult, TransportError> {
        let (sender, receiver) = oneshot::channel();
        {
            let mut pending = self.pending.lock().await;
            if let Some(previous) = pending.replace(PendingPopup {
                callback_scheme: callback_scheme.to_owned(),
                sender,
            }) {
                warn!("Replacing a popup that never completed");
                let _ = previous.sender.send(PopupResult::Cancel);
            }
        }

        if let Err(e) = self.opener.open_url(url) {
            self.pending.lock().await.take();
            return Err(e);
        }

        receiver.await.map_err(|_| TransportError::Closed)
    }
}
