//! A scripted wallet that answers requests the way a real wallet would: it decodes the request
//! URL, performs the key agreement with the dapp's key and redirects to the callback URL.

#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use chrono::Utc;
use mwp_client::{
    error::SerializedRpcError,
    rpc::{
        Capability, RequestAccountsData, RequestAccountsResponse, RpcRequest, RpcResponse,
        RpcResult, RpcResultError,
    },
    wire::{
        request_from_url, response_url, EncryptedContent, RequestContent, RequestMessage,
        ResponseContent, ResponseMessage,
    },
    AppMetadata, MwpClient, MwpClientOptions, PopupResult, Transport, TransportError, Wallet,
};
use mwp_crypto::{
    derive_shared_secret, generate_key_pair, Cipher, EncryptedEnvelope, KeyPair, PublicKey,
};
use mwp_state::{InMemoryKeyValueStore, KeyValueStore};
use serde_json::Value;
use tokio::sync::Mutex;
use uuid::Uuid;

pub const ACCOUNT: &str = "0x71C7656EC7ab88b098defB751B7401B5f6d8976F";
pub const CUSTOM_SCHEME: &str = "mydapp://";
pub const CALLBACK_URL: &str = "mydapp://mobile-wallet-protocol";

/// How the wallet handles the next request, instead of answering normally.
#[derive(Debug, Clone)]
pub enum Outcome {
    Cancel,
    PopupError(String),
    Failure(SerializedRpcError),
    ResultError(RpcResultError),
    /// Answer normally, but for some other request id.
    WrongRequestId,
    Hang,
}

pub struct MockWallet {
    pub keys: KeyPair,
    pub accounts: Vec<String>,
    pub chains: Option<HashMap<String, String>>,
    pub capabilities: Option<HashMap<String, Capability>>,
    pub results: Mutex<HashMap<String, Value>>,
    pub outcomes: Mutex<VecDeque<Outcome>>,
    pub requests: Mutex<Vec<RequestMessage>>,
    pub rpc_requests: Mutex<Vec<RpcRequest>>,
    pub round_trips: AtomicUsize,
}

impl Default for MockWallet {
    fn default() -> Self {
        Self {
            keys: generate_key_pair(),
            accounts: vec![ACCOUNT.to_owned()],
            chains: Some(HashMap::from([
                ("8453".to_owned(), "https://mainnet.base.org".to_owned()),
                ("84532".to_owned(), "https://sepolia.base.org".to_owned()),
            ])),
            capabilities: None,
            results: Mutex::new(HashMap::new()),
            outcomes: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            rpc_requests: Mutex::new(Vec::new()),
            round_trips: AtomicUsize::new(0),
        }
    }
}

impl MockWallet {
    pub fn public_key(&self) -> PublicKey {
        self.keys.public_key.clone()
    }

    /// Answer `method` with `value` from now on.
    pub async fn set_result(&self, method: &str, value: Value) {
        self.results.lock().await.insert(method.to_owned(), value);
    }

    /// Handle the next request with `outcome`.
    pub async fn push_outcome(&self, outcome: Outcome) {
        self.outcomes.lock().await.push_back(outcome);
    }

    pub fn round_trips(&self) -> usize {
        self.round_trips.load(Ordering::SeqCst)
    }

    pub async fn last_request(&self) -> Option<RequestMessage> {
        self.requests.lock().await.last().cloned()
    }

    pub async fn last_rpc_request(&self) -> Option<RpcRequest> {
        self.rpc_requests.lock().await.last().cloned()
    }

    async fn answer(&self, request: &RequestMessage) -> Result<ResponseContent, String> {
        let outcome = self.outcomes.lock().await.pop_front();
        if let Some(Outcome::Failure(failure)) = outcome {
            return Ok(ResponseContent::Failure(failure));
        }
        let result_error = match outcome {
            Some(Outcome::ResultError(e)) => Some(e),
            _ => None,
        };

        let dapp_key = PublicKey::from_hex(&request.sender).map_err(|e| e.to_string())?;
        let secret = derive_shared_secret(&self.keys.private_key, &dapp_key);
        let cipher = Cipher::default();

        let plaintext = match &request.content {
            RequestContent::Handshake(_) => {
                let result = match result_error {
                    Some(e) => RpcResult::error(e),
                    None => RpcResult::value(self.accounts.clone()),
                };
                serde_json::to_string(&RequestAccountsResponse {
                    result,
                    data: Some(RequestAccountsData {
                        chains: self.chains.clone(),
                        capabilities: self.capabilities.clone(),
                    }),
                })
                .map_err(|e| e.to_string())?
            }
            RequestContent::Encrypted(content) => {
                let envelope = EncryptedEnvelope::try_from(content).map_err(|e| e.to_string())?;
                let decrypted = cipher
                    .decrypt(&secret, &envelope)
                    .map_err(|e| e.to_string())?;
                let rpc: RpcRequest =
                    serde_json::from_str(&decrypted).map_err(|e| e.to_string())?;

                let value = self
                    .results
                    .lock()
                    .await
                    .get(rpc.action.method.as_str())
                    .cloned()
                    .unwrap_or(Value::Null);
                self.rpc_requests.lock().await.push(rpc);

                let result = match result_error {
                    Some(e) => RpcResult::error(e),
                    None => RpcResult::value(value),
                };
                serde_json::to_string(&RpcResponse { result }).map_err(|e| e.to_string())?
            }
        };

        let envelope = cipher
            .encrypt(&secret, &plaintext)
            .map_err(|e| e.to_string())?;
        Ok(ResponseContent::Encrypted(EncryptedContent::from(&envelope)))
    }
}

#[async_trait::async_trait]
impl Transport for MockWallet {
    async fn open_popup(
        &self,
        url: &str,
        callback_scheme: &str,
    ) -> Result<PopupResult, TransportError> {
        self.round_trips.fetch_add(1, Ordering::SeqCst);

        let request = request_from_url(url).map_err(|e| TransportError::Open(e.to_string()))?;
        self.requests.lock().await.push(request.clone());

        let (interrupted, wrong_request_id) = {
            let outcomes = self.outcomes.lock().await;
            (
                matches!(
                    outcomes.front(),
                    Some(Outcome::Cancel | Outcome::PopupError(_) | Outcome::Hang)
                ),
                matches!(outcomes.front(), Some(Outcome::WrongRequestId)),
            )
        };

        if !interrupted {
            let content = self.answer(&request).await.map_err(TransportError::Open)?;
            let response = ResponseMessage {
                id: Uuid::new_v4(),
                sender: self
                    .keys
                    .public_key
                    .to_hex()
                    .map_err(|e| TransportError::Open(e.to_string()))?,
                request_id: if wrong_request_id {
                    Uuid::new_v4()
                } else {
                    request.id
                },
                content,
                timestamp: Utc::now(),
            };
            let url = response_url(callback_scheme, &response)
                .map_err(|e| TransportError::Open(e.to_string()))?;
            return Ok(PopupResult::Success {
                url: url.to_string(),
            });
        }

        match self.outcomes.lock().await.pop_front() {
            Some(Outcome::Cancel) => Ok(PopupResult::Cancel),
            Some(Outcome::PopupError(message)) => Ok(PopupResult::Error { message }),
            _ => std::future::pending().await,
        }
    }
}

pub fn options() -> MwpClientOptions {
    MwpClientOptions {
        metadata: AppMetadata {
            name: "Test Dapp".to_owned(),
            logo_url: Some("https://dapp.example/logo.png".to_owned()),
            chain_ids: vec!["0x2105".to_owned()],
            custom_scheme: CUSTOM_SCHEME.to_owned(),
        },
        wallet: Wallet::coinbase_smart_wallet(),
        ..Default::default()
    }
}

pub struct TestContext {
    pub wallet: Arc<MockWallet>,
    pub store: Arc<InMemoryKeyValueStore>,
    pub client: Arc<MwpClient>,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with(MockWallet::default(), options()).await
    }

    pub async fn with(wallet: MockWallet, options: MwpClientOptions) -> Self {
        let wallet = Arc::new(wallet);
        let store = Arc::new(InMemoryKeyValueStore::new());
        let client = MwpClient::new(options, wallet.clone(), store.clone())
            .await
            .expect("client should be created");
        Self {
            wallet,
            store,
            client: Arc::new(client),
        }
    }

    /// A second client sharing this context's wallet and storage.
    pub async fn reopen(&self) -> MwpClient {
        let store: Arc<dyn KeyValueStore> = self.store.clone();
        MwpClient::new(options(), self.wallet.clone(), store)
            .await
            .expect("client should be created")
    }

    pub async fn connected() -> Self {
        let context = Self::new().await;
        context
            .client
            .eth_request_accounts()
            .await
            .expect("handshake should succeed");
        context
    }
}
