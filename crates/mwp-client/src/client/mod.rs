use std::{collections::HashMap, sync::Arc, time::Duration};

use chrono::Utc;
use mwp_crypto::{Cipher, EncryptedEnvelope, PublicKey};
use mwp_state::{KeyValueStore, ScopedStore};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use url::Url;
use uuid::Uuid;

use crate::{
    error::{
        codes, standard_errors, ErrorOptions, EthereumRpcError, MwpError, MwpResult, Result,
    },
    key_manager::KeyManager,
    rpc::{
        AddEthereumChainResult, Capability, EthSendTransactionParams, EthSignTransactionParams,
        EthSignTransactionResult, EthSignTypedDataV4Params, PersonalSignParams, RequestAccounts,
        RequestAccountsResponse, RpcAction, RpcMethod, RpcRequest, RpcResponse, RpcResultError,
        SwitchEthereumChainParams, WalletAddEthereumChainParams, WalletGrantPermissionsParams,
        WalletGrantPermissionsResult, WalletSendCallsParams, WalletWatchAssetParams,
    },
    transport::{PopupResult, Transport},
    wire::{
        self, EncryptedContent, RequestContent, RequestMessage, ResponseContent, ResponseMessage,
        SDK_VERSION,
    },
};

mod options;
mod session;

pub use options::{AppMetadata, MwpClientOptions, Wallet, WalletType};
pub use session::Chain;
use session::{normalize_chain_id, parse_chain_id, Session};

const CLIENT_SCOPE: &str = "MWPClient_";
const KEY_MANAGER_SCOPE: &str = "KeyManager_";

struct ClientState {
    keys: KeyManager,
    session: Session,
}

/// A dapp's connection to one wallet.
///
/// The client is a small state machine. It starts unauthorized, becomes authorized once
/// [MwpClient::eth_request_accounts] completes the handshake and goes back to unauthorized on
/// [MwpClient::reset]. Only one request is in flight at a time: concurrent calls wait for the
/// previous round-trip to finish.
pub struct MwpClient {
    metadata: AppMetadata,
    wallet: Wallet,
    callback_url: String,
    request_timeout: Option<Duration>,
    cipher: Cipher,
    transport: Arc<dyn Transport>,
    state: Mutex<ClientState>,
    pending: Mutex<Option<CancellationToken>>,
}

impl MwpClient {
    /// Create a client and restore any session persisted in `store`.
    pub async fn new(
        options: MwpClientOptions,
        transport: Arc<dyn Transport>,
        store: Arc<dyn KeyValueStore>,
    ) -> MwpResult<Self> {
        Self::new_internal(options, transport, store)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to create client");
                e.into()
            })
    }

    async fn new_internal(
        options: MwpClientOptions,
        transport: Arc<dyn Transport>,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self> {
        let MwpClientOptions {
            metadata,
            wallet,
            request_timeout,
            compression,
            storage_prefix,
        } = options;

        if wallet.wallet_type == WalletType::Native {
            return Err(MwpError::UnsupportedWallet);
        }
        Url::parse(&wallet.scheme)
            .map_err(|_| MwpError::InvalidWalletUrl(wallet.scheme.clone()))?;

        let prefix = storage_prefix.unwrap_or_else(|| format!("{}_", wallet.name));
        let keys = KeyManager::new(ScopedStore::new(
            store.clone(),
            format!("{prefix}{KEY_MANAGER_SCOPE}"),
        ));
        let session = Session::load(
            ScopedStore::new(store, format!("{prefix}{CLIENT_SCOPE}")),
            &metadata.default_chain_id(),
        )
        .await?;

        debug!(wallet = %wallet.name, "Created client");

        Ok(Self {
            callback_url: metadata.callback_url(),
            metadata,
            wallet,
            request_timeout,
            cipher: Cipher::new(compression),
            transport,
            state: Mutex::new(ClientState { keys, session }),
            pending: Mutex::new(None),
        })
    }

    /// The wallet this client talks to.
    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    /// Connect to the wallet and return the user's accounts.
    ///
    /// Returns the cached accounts without contacting the wallet when already authorized.
    pub async fn eth_request_accounts(&self) -> MwpResult<Vec<String>> {
        let mut state = self.state.lock().await;
        finish(
            RpcMethod::EthRequestAccounts,
            self.request_accounts(&mut state).await,
        )
    }

    /// The active chain id, in hex.
    pub async fn eth_chain_id(&self) -> MwpResult<String> {
        let state = self.state.lock().await;
        let result = require_authorized(&state).map(|_| state.session.active_chain().id.clone());
        finish_named("eth_chainId", result)
    }

    /// The capabilities the wallet reported during the handshake, keyed by chain id.
    pub async fn wallet_get_capabilities(&self) -> MwpResult<HashMap<String, Capability>> {
        let state = self.state.lock().await;
        let result = require_authorized(&state)
            .map(|_| state.session.capabilities().cloned().unwrap_or_default());
        finish_named("wallet_getCapabilities", result)
    }

    /// Make `chain_id` the active chain.
    ///
    /// Chains the wallet shared during the handshake are switched to locally. Any other chain
    /// is confirmed with the wallet first.
    pub async fn wallet_switch_ethereum_chain(&self, chain_id: &str) -> MwpResult<()> {
        let mut state = self.state.lock().await;
        finish(
            RpcMethod::WalletSwitchEthereumChain,
            self.switch_chain(&mut state, chain_id).await,
        )
    }

    /// Sign a message with `personal_sign`. Returns the signature.
    pub async fn personal_sign(&self, params: PersonalSignParams) -> MwpResult<String> {
        let method = RpcMethod::PersonalSign;
        let result = self
            .call(method, vec![Value::from(params.challenge), Value::from(params.address)])
            .await;
        finish(method, result.and_then(|value| required(method, value)))
    }

    #[allow(missing_docs)]
    pub async fn eth_sign_transaction(
        &self,
        params: EthSignTransactionParams,
    ) -> MwpResult<EthSignTransactionResult> {
        self.call_required(RpcMethod::EthSignTransaction, &params).await
    }

    /// Send a transaction. Returns the transaction hash.
    pub async fn eth_send_transaction(&self, params: EthSendTransactionParams) -> MwpResult<String> {
        self.call_required(RpcMethod::EthSendTransaction, &params).await
    }

    /// Sign EIP-712 typed data on behalf of `address`. Returns the signature.
    pub async fn eth_sign_typed_data_v4(
        &self,
        address: &str,
        params: EthSignTypedDataV4Params,
    ) -> MwpResult<String> {
        let method = RpcMethod::EthSignTypedDataV4;
        let result = match to_param(&params) {
            Ok(typed_data) => {
                self.call(method, vec![Value::from(address), typed_data])
                    .await
            }
            Err(e) => Err(e),
        };
        finish(method, result.and_then(|value| required(method, value)))
    }

    /// Suggest a chain to the wallet. Wallets answer with `null` on success.
    pub async fn wallet_add_ethereum_chain(
        &self,
        params: WalletAddEthereumChainParams,
    ) -> MwpResult<Option<AddEthereumChainResult>> {
        let method = RpcMethod::WalletAddEthereumChain;
        finish(method, self.call_with(method, &params).await)
    }

    /// Ask the wallet to track a token. Returns whether the user added it.
    pub async fn wallet_watch_asset(&self, params: WalletWatchAssetParams) -> MwpResult<bool> {
        self.call_required(RpcMethod::WalletWatchAsset, &params).await
    }

    /// Submit a batch of calls. Returns the bundle id.
    pub async fn wallet_send_calls(&self, params: WalletSendCallsParams) -> MwpResult<String> {
        self.call_required(RpcMethod::WalletSendCalls, &params).await
    }

    /// Ask the wallet to show the status of a bundle sent with [MwpClient::wallet_send_calls].
    pub async fn wallet_show_calls_status(&self, bundle_id: &str) -> MwpResult<()> {
        let method = RpcMethod::WalletShowCallsStatus;
        let result = self
            .call::<Value>(method, vec![Value::from(bundle_id)])
            .await;
        finish(method, result.map(|_| ()))
    }

    #[allow(missing_docs)]
    pub async fn wallet_grant_permissions(
        &self,
        params: WalletGrantPermissionsParams,
    ) -> MwpResult<WalletGrantPermissionsResult> {
        self.call_required(RpcMethod::WalletGrantPermissions, &params).await
    }

    /// The connected accounts. Empty when not authorized.
    pub async fn accounts(&self) -> Vec<String> {
        self.state.lock().await.session.accounts().to_vec()
    }

    /// Whether the handshake has completed.
    pub async fn is_authorized(&self) -> bool {
        self.state.lock().await.session.is_authorized()
    }

    /// Forget the session: accounts, chains, capabilities and every key.
    pub async fn reset(&self) -> MwpResult<()> {
        let mut state = self.state.lock().await;
        let result = self.reset_internal(&mut state).await;
        finish_named("reset", result)
    }

    /// Abort the request waiting for the wallet, if any. It fails with a cancellation error.
    pub async fn cancel_pending_request(&self) {
        if let Some(token) = self.pending.lock().await.take() {
            info!("Cancelling pending request");
            token.cancel();
        }
    }

    async fn reset_internal(&self, state: &mut ClientState) -> Result<()> {
        state
            .session
            .clear(&self.metadata.default_chain_id())
            .await?;
        state.keys.clear().await?;
        info!("Reset session");
        Ok(())
    }

    async fn request_accounts(&self, state: &mut ClientState) -> Result<Vec<String>> {
        if state.session.is_authorized() {
            debug!("Returning cached accounts");
            return Ok(state.session.accounts().to_vec());
        }

        let handshake = RequestAccounts::new(
            self.metadata.name.clone(),
            self.metadata.logo_url.clone(),
        );
        let response = self
            .round_trip(state, RequestContent::Handshake(handshake))
            .await?;

        let content = encrypted_content(response.content)?;
        let peer_public_key = PublicKey::from_hex(&response.sender)?;
        state.keys.set_peer_public_key(peer_public_key).await?;

        let plaintext = self.decrypt(state, &content).await?;
        let decrypted: RequestAccountsResponse =
            serde_json::from_str(&plaintext).map_err(MwpError::Deserialize)?;

        if let Some(data) = decrypted.data {
            if let Some(chains) = data.chains {
                let mut chains: Vec<Chain> = chains
                    .into_iter()
                    .map(|(id, rpc_url)| Chain {
                        id: normalize_chain_id(&id),
                        rpc_url: Some(rpc_url),
                    })
                    .collect();
                chains.sort_by(|a, b| a.id.cmp(&b.id));

                state.session.set_available_chains(&chains).await?;
                let active = state.session.active_chain().id.clone();
                state
                    .session
                    .update_chain(&active, Some(chains.as_slice()))
                    .await?;
            }
            if let Some(capabilities) = data.capabilities {
                state.session.set_capabilities(capabilities).await?;
            }
        }

        if let Some(e) = decrypted.result.error {
            return Err(wallet_error(e));
        }

        let accounts = decrypted.result.value.unwrap_or_default();
        if accounts.is_empty() {
            return Err(MwpError::NoAccounts);
        }
        state.session.set_accounts(accounts.clone()).await?;

        info!(accounts = accounts.len(), "Connected to wallet");
        Ok(accounts)
    }

    async fn switch_chain(&self, state: &mut ClientState, chain_id: &str) -> Result<()> {
        require_authorized(state)?;

        if state.session.update_chain(chain_id, None).await? {
            return Ok(());
        }

        let params = to_param(&SwitchEthereumChainParams {
            chain_id: chain_id.to_owned(),
        })?;
        self.send_request::<Value>(state, RpcMethod::WalletSwitchEthereumChain, vec![params])
            .await?;

        state.session.switch_to(Chain::new(chain_id)).await?;
        Ok(())
    }

    async fn call_required<P, T>(&self, method: RpcMethod, params: &P) -> MwpResult<T>
    where
        P: Serialize,
        T: DeserializeOwned,
    {
        let result = self.call_with(method, params).await;
        finish(method, result.and_then(|value| required(method, value)))
    }

    /// Send `params` as the single positional parameter of `method`.
    async fn call_with<P, T>(&self, method: RpcMethod, params: &P) -> Result<Option<T>>
    where
        P: Serialize,
        T: DeserializeOwned,
    {
        let params = to_param(params)?;
        self.call(method, vec![params]).await
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: RpcMethod,
        params: Vec<Value>,
    ) -> Result<Option<T>> {
        let mut state = self.state.lock().await;
        self.send_request(&mut state, method, params).await
    }

    async fn send_request<T: DeserializeOwned>(
        &self,
        state: &mut ClientState,
        method: RpcMethod,
        params: Vec<Value>,
    ) -> Result<Option<T>> {
        require_authorized(state)?;
        let secret = state
            .keys
            .shared_secret()
            .await?
            .ok_or_else(unauthorized)?;

        let request = RpcRequest {
            action: RpcAction { method, params },
            chain_id: parse_chain_id(&state.session.active_chain().id)?,
        };
        let plaintext = serde_json::to_string(&request).map_err(MwpError::Serialize)?;
        let envelope = self.cipher.encrypt(&secret, &plaintext)?;

        let response = self
            .round_trip(
                state,
                RequestContent::Encrypted(EncryptedContent::from(&envelope)),
            )
            .await?;

        let content = encrypted_content(response.content)?;
        let plaintext = self.decrypt(state, &content).await?;
        let response: RpcResponse<T> =
            serde_json::from_str(&plaintext).map_err(MwpError::Deserialize)?;

        match response.result.error {
            Some(e) => Err(wallet_error(e)),
            None => Ok(response.result.value),
        }
    }

    async fn decrypt(&self, state: &mut ClientState, content: &EncryptedContent) -> Result<String> {
        let secret = state
            .keys
            .shared_secret()
            .await?
            .ok_or_else(unauthorized)?;
        let envelope = EncryptedEnvelope::try_from(content)?;
        Ok(self.cipher.decrypt(&secret, &envelope)?)
    }

    /// Send `content` to the wallet and wait for its answer.
    async fn round_trip(
        &self,
        state: &mut ClientState,
        content: RequestContent,
    ) -> Result<ResponseMessage> {
        let request = RequestMessage {
            id: Uuid::new_v4(),
            sender: state.keys.own_public_key().await?.to_hex()?,
            content,
            sdk_version: SDK_VERSION.to_owned(),
            callback_url: self.callback_url.clone(),
            custom_scheme: Some(self.metadata.custom_scheme.clone())
                .filter(|scheme| !scheme.is_empty()),
            timestamp: Utc::now(),
        };
        let url = wire::request_url(&self.wallet.scheme, &request)?;

        debug!(request_id = %request.id, "Opening wallet");
        match self.open_popup(url.as_str()).await? {
            PopupResult::Success { url } => {
                let response = wire::response_from_url(&url)?;
                if response.request_id != request.id {
                    warn!(
                        request_id = %request.id,
                        response_request_id = %response.request_id,
                        "Response does not match the request"
                    );
                    return Err(MwpError::RequestMismatch {
                        expected: request.id,
                        actual: response.request_id,
                    });
                }
                debug!(request_id = %request.id, "Received wallet response");
                Ok(response)
            }
            PopupResult::Cancel => {
                warn!(request_id = %request.id, "User closed the wallet");
                Err(
                    standard_errors::provider::user_rejected_request(ErrorOptions::default())
                        .into(),
                )
            }
            PopupResult::Error { message } => {
                warn!(request_id = %request.id, %message, "Wallet popup failed");
                Err(unauthorized().into())
            }
        }
    }

    async fn open_popup(&self, url: &str) -> Result<PopupResult> {
        let token = CancellationToken::new();
        *self.pending.lock().await = Some(token.clone());

        let popup = async {
            let popup = self.transport.open_popup(url, &self.callback_url);
            match self.request_timeout {
                Some(timeout) => match tokio::time::timeout(timeout, popup).await {
                    Ok(result) => result.map_err(MwpError::from),
                    Err(_) => Err(MwpError::Timeout(timeout)),
                },
                None => popup.await.map_err(MwpError::from),
            }
        };

        let result = tokio::select! {
            _ = token.cancelled() => Err(MwpError::Cancelled),
            result = popup => result,
        };

        self.pending.lock().await.take();
        result
    }
}

fn require_authorized(state: &ClientState) -> Result<()> {
    if state.session.is_authorized() {
        Ok(())
    } else {
        Err(unauthorized().into())
    }
}

fn unauthorized() -> EthereumRpcError {
    standard_errors::provider::unauthorized(ErrorOptions::default())
}

fn encrypted_content(content: ResponseContent) -> Result<EncryptedContent> {
    match content {
        ResponseContent::Encrypted(content) => Ok(content),
        ResponseContent::Failure(failure) => {
            warn!(code = failure.code, "Wallet reported a failure");
            let message = if failure.message.is_empty() {
                codes::message_from_code(Some(failure.code)).to_owned()
            } else {
                failure.message
            };
            Err(MwpError::Wallet {
                code: Some(failure.code),
                message,
            })
        }
    }
}

fn wallet_error(e: RpcResultError) -> MwpError {
    warn!(code = ?e.code, "Wallet returned an error");
    let message = if e.message.is_empty() {
        codes::message_from_code(e.code).to_owned()
    } else {
        e.message
    };
    MwpError::Wallet {
        code: e.code,
        message,
    }
}

fn to_param<P: Serialize>(params: &P) -> Result<Value> {
    serde_json::to_value(params).map_err(MwpError::Serialize)
}

fn required<T>(method: RpcMethod, value: Option<T>) -> Result<T> {
    value.ok_or(MwpError::MissingResult(method.as_str()))
}

fn finish<T>(method: RpcMethod, result: Result<T>) -> MwpResult<T> {
    finish_named(method.as_str(), result)
}

fn finish_named<T>(operation: &str, result: Result<T>) -> MwpResult<T> {
    result.map_err(|e| {
        error!(operation, error = %e, "Request failed");
        e.into()
    })
}
