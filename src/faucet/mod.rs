//! Test network faucet client.
//!
//! The faucet creates the account if needed and mints test coins into it. It
//! may run several internal transfers; funds are only usable once every
//! returned transaction has completed.

use url::Url;

use crate::account::AccountAddress;
use crate::config::FaucetConfig;
use crate::ledger::client::{decode_json, parse_base_url, remote_error};
use crate::ledger::{LedgerClient, LedgerError, LedgerResult, TxHash};
use crate::observability::metrics;

/// HTTP client for the faucet service.
#[derive(Debug, Clone)]
pub struct FaucetClient {
    http: reqwest::Client,
    base_url: Url,
    ledger: LedgerClient,
}

impl FaucetClient {
    pub fn new(config: &FaucetConfig, ledger: LedgerClient) -> LedgerResult<Self> {
        let timeout = std::time::Duration::from_secs(ledger.node_config().request_timeout_secs);
        Ok(Self {
            http: reqwest::Client::builder().timeout(timeout).build()?,
            base_url: parse_base_url(&config.url)?,
            ledger,
        })
    }

    /// Mint `amount` into `address` and wait for every faucet transaction.
    ///
    /// # Errors
    /// `Remote` if the faucet rejects the request, `TransactionTimeout` if any
    /// of its transactions does not complete in time.
    pub async fn fund_account(
        &self,
        address: AccountAddress,
        amount: u64,
    ) -> LedgerResult<Vec<TxHash>> {
        let mut url = self
            .base_url
            .join("mint")
            .map_err(|e| LedgerError::InvalidUrl(format!("{}mint: {}", self.base_url, e)))?;
        url.query_pairs_mut()
            .append_pair("amount", &amount.to_string())
            .append_pair("address", &address.to_hex());

        let response = self.http.post(url).send().await?;
        if !response.status().is_success() {
            metrics::record_faucet_request(false);
            return Err(remote_error(response).await);
        }

        let hashes: Vec<TxHash> = decode_json(response).await?;
        metrics::record_faucet_request(true);
        tracing::info!(
            address = %address,
            amount,
            transactions = hashes.len(),
            "Faucet accepted funding request"
        );

        for hash in &hashes {
            self.ledger.wait_for_transaction(hash).await?;
        }
        Ok(hashes)
    }
}
