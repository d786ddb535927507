//! Full node REST client.
//!
//! # Responsibilities
//! - Read account state (sequence number, resources, balances)
//! - Build, sign, and submit transactions
//! - Poll for transaction completion
//!
//! Every transaction re-reads the sender's sequence number. Two processes
//! sending from the same account at once will collide.

use reqwest::StatusCode;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use url::Url;

use crate::account::{Account, AccountAddress};
use crate::config::{DeployConfig, NodeConfig, PollingConfig};
use crate::ledger::types::{
    AccountInfo, LedgerError, LedgerResult, ModuleId, Resource, SignatureBlock, SigningMessage,
    SubmittedTransaction, Transaction, TransactionPayload, TransactionRequest, TransactionStatus,
    TxHash, decode_hex,
};
use crate::observability::metrics;

/// HTTP client for a single full node.
#[derive(Clone)]
pub struct LedgerClient {
    http: reqwest::Client,
    base_url: Url,
    node: NodeConfig,
    polling: PollingConfig,
}

impl LedgerClient {
    /// Create a client for the node at `node.url`.
    pub fn new(node: NodeConfig, polling: PollingConfig) -> LedgerResult<Self> {
        let base_url = parse_base_url(&node.url)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(node.request_timeout_secs))
            .build()?;

        tracing::debug!(node_url = %base_url, "Ledger client initialized");

        Ok(Self {
            http,
            base_url,
            node,
            polling,
        })
    }

    pub fn from_config(config: &DeployConfig) -> LedgerResult<Self> {
        Self::new(config.node.clone(), config.polling.clone())
    }

    pub fn node_config(&self) -> &NodeConfig {
        &self.node
    }

    pub fn polling_config(&self) -> &PollingConfig {
        &self.polling
    }

    fn endpoint(&self, path: &str) -> LedgerResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| LedgerError::InvalidUrl(format!("{}{}: {}", self.base_url, path, e)))
    }

    /// Sequence number and authentication key for an account.
    pub async fn get_account(&self, address: AccountAddress) -> LedgerResult<AccountInfo> {
        let url = self.endpoint(&format!("accounts/{}", address.to_hex()))?;
        let response = self.http.get(url).send().await?;

        if !response.status().is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(LedgerError::AccountNotFound { address, detail });
        }
        decode_json(response).await
    }

    /// All resources stored under an account.
    pub async fn get_resources(&self, address: AccountAddress) -> LedgerResult<Vec<Resource>> {
        let url = self.endpoint(&format!("accounts/{}/resources", address.to_hex()))?;
        let response = self.http.get(url).send().await?;

        if !response.status().is_success() {
            return Err(remote_error(response).await);
        }
        decode_json(response).await
    }

    /// First resource whose type tag matches exactly, if any.
    pub async fn get_entry_resource(
        &self,
        address: AccountAddress,
        type_tag: &str,
    ) -> LedgerResult<Option<Resource>> {
        let resources = self.get_resources(address).await?;
        Ok(resources.into_iter().find(|r| r.type_tag == type_tag))
    }

    /// Coin balance held in `<module>::Balance`, or `None` if the account has
    /// never held the coin.
    pub async fn get_balance(
        &self,
        address: AccountAddress,
        module: &ModuleId,
    ) -> LedgerResult<Option<u64>> {
        let type_tag = module.resource("Balance");
        match self.get_entry_resource(address, &type_tag).await? {
            Some(resource) => resource.coin_value().map(Some),
            None => Ok(None),
        }
    }

    /// Balance of the built-in test coin.
    pub async fn test_coin_balance(&self, address: AccountAddress) -> LedgerResult<Option<u64>> {
        self.get_balance(address, &ModuleId::test_coin()).await
    }

    /// Build an unsigned transaction for `sender`.
    ///
    /// The request expires `expiration_secs` after construction; the node
    /// rejects it if it is not confirmed by then.
    pub async fn build_transaction(
        &self,
        sender: AccountAddress,
        payload: TransactionPayload,
    ) -> LedgerResult<TransactionRequest> {
        let account = self.get_account(sender).await?;

        let request = TransactionRequest {
            sender,
            sequence_number: account.sequence_number,
            max_gas_amount: self.node.max_gas_amount,
            gas_unit_price: self.node.gas_unit_price,
            gas_currency_code: self.node.gas_currency_code.clone(),
            expiration_timestamp_secs: unix_now() + self.node.expiration_secs,
            payload,
            signature: None,
        };

        tracing::debug!(
            sender = %sender,
            sequence_number = request.sequence_number,
            payload = request.payload.kind(),
            "Transaction built"
        );
        Ok(request)
    }

    /// Sign a request over the node's canonical signing payload.
    pub async fn sign_transaction(
        &self,
        account: &Account,
        mut request: TransactionRequest,
    ) -> LedgerResult<TransactionRequest> {
        request.signature = None;

        let url = self.endpoint("transactions/signing_message")?;
        let response = self.http.post(url).json(&request).send().await?;
        if !response.status().is_success() {
            return Err(remote_error(response).await);
        }

        let signing_message: SigningMessage = decode_json(response).await?;
        let to_sign = decode_hex(&signing_message.message).map_err(|e| {
            LedgerError::SigningFailure(format!("signing message is not hex: {}", e))
        })?;

        let signature = account.sign(&to_sign);
        request.signature = Some(SignatureBlock::ed25519(&account.verifying_key(), &signature));
        Ok(request)
    }

    /// Submit a signed request. The node must answer `202 Accepted`.
    pub async fn submit_transaction(&self, request: &TransactionRequest) -> LedgerResult<TxHash> {
        if request.signature.is_none() {
            return Err(LedgerError::SigningFailure(
                "transaction has no signature".to_string(),
            ));
        }

        let url = self.endpoint("transactions")?;
        let response = self.http.post(url).json(request).send().await?;
        if response.status() != StatusCode::ACCEPTED {
            return Err(remote_error(response).await);
        }

        let submitted: SubmittedTransaction = decode_json(response).await?;
        metrics::record_transaction_submitted(request.payload.kind());
        tracing::info!(
            hash = %submitted.hash,
            sender = %request.sender,
            sequence_number = request.sequence_number,
            "Transaction submitted"
        );
        Ok(submitted.hash)
    }

    /// Build, sign, and submit a payload from `account`.
    pub async fn submit_payload(
        &self,
        account: &Account,
        payload: TransactionPayload,
    ) -> LedgerResult<TxHash> {
        let request = self.build_transaction(account.address(), payload).await?;
        let signed = self.sign_transaction(account, request).await?;
        self.submit_transaction(&signed).await
    }

    /// Look up a transaction. `None` means the node has not indexed it yet.
    pub async fn get_transaction(&self, hash: &TxHash) -> LedgerResult<Option<Transaction>> {
        let url = self.endpoint(&format!("transactions/{}", hash))?;
        let response = self.http.get(url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(remote_error(response).await);
        }
        decode_json(response).await.map(Some)
    }

    /// Whether a transaction is still waiting to be executed.
    pub async fn transaction_pending(&self, hash: &TxHash) -> LedgerResult<bool> {
        Ok(match self.get_transaction(hash).await? {
            Some(txn) => txn.is_pending(),
            None => true,
        })
    }

    /// Poll until the transaction leaves the pending state.
    ///
    /// Polls at most `max_attempts` times, `interval_ms` apart. A transaction
    /// the node has not indexed yet counts as pending.
    pub async fn wait_for_transaction(&self, hash: &TxHash) -> LedgerResult<Transaction> {
        let attempts = self.polling.max_attempts;

        for attempt in 1..=attempts {
            match self.get_transaction(hash).await? {
                Some(txn) if !txn.is_pending() => {
                    let outcome = match txn.status() {
                        TransactionStatus::Failed { .. } => "failed",
                        _ => "completed",
                    };
                    metrics::record_confirmation(outcome);
                    tracing::debug!(hash = %hash, attempt, outcome, "Transaction completed");
                    return Ok(txn);
                }
                Some(_) => tracing::debug!(hash = %hash, attempt, "Transaction pending"),
                None => tracing::debug!(hash = %hash, attempt, "Transaction not yet indexed"),
            }

            if attempt < attempts {
                tokio::time::sleep(self.polling.interval()).await;
            }
        }

        metrics::record_confirmation("timeout");
        tracing::warn!(hash = %hash, attempts, "Transaction confirmation timed out");
        Err(LedgerError::TransactionTimeout {
            hash: hash.clone(),
            attempts,
        })
    }

    /// Wait for the transaction and require that it executed successfully.
    pub async fn wait_for_success(&self, hash: &TxHash) -> LedgerResult<Transaction> {
        let txn = self.wait_for_transaction(hash).await?;
        match txn.status() {
            TransactionStatus::Failed { vm_status } => Err(LedgerError::TransactionFailed {
                hash: hash.clone(),
                vm_status,
            }),
            _ => Ok(txn),
        }
    }
}

impl std::fmt::Debug for LedgerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerClient")
            .field("node_url", &self.base_url.as_str())
            .field("poll_interval_ms", &self.polling.interval_ms)
            .field("poll_attempts", &self.polling.max_attempts)
            .finish()
    }
}

/// Parse a base URL so that relative joins append to its path.
pub(crate) fn parse_base_url(raw: &str) -> LedgerResult<Url> {
    let mut url =
        Url::parse(raw).map_err(|e| LedgerError::InvalidUrl(format!("'{}': {}", raw, e)))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

pub(crate) async fn remote_error(response: reqwest::Response) -> LedgerError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    LedgerError::Remote { status, body }
}

pub(crate) async fn decode_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> LedgerResult<T> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| LedgerError::Decode(format!("{}: {}", e, body)))
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
