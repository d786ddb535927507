//! Entry points of the bridge token module and the test coin.
//!
//! Each call is one build → sign → submit round trip and returns the
//! transaction hash without waiting. The signer is implicit; arguments are the
//! remaining parameters, addresses as `0x`-hex and integers in decimal.

use crate::account::{Account, AccountAddress};
use crate::ledger::client::LedgerClient;
use crate::ledger::types::{LedgerResult, ModuleId, TransactionPayload, TxHash};

pub const INITIALIZE: &str = "initialize";
pub const REGISTER: &str = "register";
pub const MINT: &str = "mint";
pub const TRANSFER: &str = "transfer";
pub const BURN: &str = "burn";

impl LedgerClient {
    /// Publish compiled module bytecode under `owner`'s account.
    pub async fn publish_module(&self, owner: &Account, bytecode: &[u8]) -> LedgerResult<TxHash> {
        tracing::info!(owner = %owner.address(), size = bytecode.len(), "Publishing module");
        self.submit_payload(owner, TransactionPayload::module_publish(bytecode))
            .await
    }

    /// Set up the token with its decimal scaling factor. Signed by the owner.
    pub async fn initialize(
        &self,
        owner: &Account,
        module: &ModuleId,
        scaling_factor: u8,
    ) -> LedgerResult<TxHash> {
        let payload = TransactionPayload::entry_function(
            module.function(INITIALIZE),
            vec![scaling_factor.to_string()],
        );
        self.submit_payload(owner, payload).await
    }

    /// Register `registered` as a bridge destination. Signed by the owner.
    pub async fn register(
        &self,
        owner: &Account,
        module: &ModuleId,
        registered: AccountAddress,
    ) -> LedgerResult<TxHash> {
        let payload = TransactionPayload::entry_function(
            module.function(REGISTER),
            vec![registered.to_string()],
        );
        self.submit_payload(owner, payload).await
    }

    /// Mint `amount` to a registered `recipient`. Signed by the owner.
    pub async fn mint(
        &self,
        owner: &Account,
        module: &ModuleId,
        recipient: AccountAddress,
        amount: u64,
    ) -> LedgerResult<TxHash> {
        let payload = TransactionPayload::entry_function(
            module.function(MINT),
            vec![recipient.to_string(), amount.to_string()],
        );
        self.submit_payload(owner, payload).await
    }

    /// Move `amount` of the bridge token from `from` to `to`.
    pub async fn transfer_asset(
        &self,
        from: &Account,
        module: &ModuleId,
        to: AccountAddress,
        amount: u64,
    ) -> LedgerResult<TxHash> {
        let payload = TransactionPayload::entry_function(
            module.function(TRANSFER),
            vec![to.to_string(), amount.to_string()],
        );
        self.submit_payload(from, payload).await
    }

    /// Destroy `amount` of the holder's bridge token.
    pub async fn burn(
        &self,
        holder: &Account,
        module: &ModuleId,
        amount: u64,
    ) -> LedgerResult<TxHash> {
        let payload =
            TransactionPayload::entry_function(module.function(BURN), vec![amount.to_string()]);
        self.submit_payload(holder, payload).await
    }

    /// Transfer the built-in test coin.
    pub async fn transfer_test_coin(
        &self,
        from: &Account,
        recipient: AccountAddress,
        amount: u64,
    ) -> LedgerResult<TxHash> {
        let payload = TransactionPayload::entry_function(
            ModuleId::test_coin().function(TRANSFER),
            vec![recipient.to_string(), amount.to_string()],
        );
        self.submit_payload(from, payload).await
    }
}
