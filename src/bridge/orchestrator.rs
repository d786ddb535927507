//! Composite bridge operations.
//!
//! Each operation is two independent transactions, confirmed one after the
//! other. They are not atomic: if the second step fails the first stays
//! committed, and the returned `BridgeError` lists it.

use crate::account::{Account, AccountAddress};
use crate::bridge::types::{
    BridgeDirection, BridgeError, BridgeReceipt, BridgeResult, BridgeStep, CommittedStep,
};
use crate::ledger::{LedgerClient, LedgerError, LedgerResult, ModuleId, TxHash};
use crate::observability::metrics;

/// Drives the bridge module's composite operations.
#[derive(Debug, Clone)]
pub struct BridgeOrchestrator {
    ledger: LedgerClient,
    module: ModuleId,
}

impl BridgeOrchestrator {
    pub fn new(ledger: LedgerClient, module: ModuleId) -> Self {
        Self { ledger, module }
    }

    pub fn module(&self) -> &ModuleId {
        &self.module
    }

    /// Register `recipient` and mint `amount` to it, signed by the module owner.
    pub async fn bridge_to_destination(
        &self,
        owner: &Account,
        recipient: AccountAddress,
        amount: u64,
    ) -> BridgeResult<BridgeReceipt> {
        let mut progress = Progress::new(BridgeDirection::ToDestination);
        tracing::info!(recipient = %recipient, amount, module = %self.module, "Bridging to destination");

        let submitted = self.ledger.register(owner, &self.module, recipient).await;
        match self.confirm(submitted).await {
            Ok(hash) => progress.record(BridgeStep::Register, hash),
            Err(e) => return Err(progress.fail(BridgeStep::Register, e)),
        }

        let submitted = self.ledger.mint(owner, &self.module, recipient, amount).await;
        match self.confirm(submitted).await {
            Ok(hash) => progress.record(BridgeStep::Mint, hash),
            Err(e) => return Err(progress.fail(BridgeStep::Mint, e)),
        }

        Ok(progress.finish())
    }

    /// Move `amount` from `holder` to `custodian`, then burn it from the
    /// custodian's balance.
    pub async fn bridge_to_source(
        &self,
        holder: &Account,
        custodian: &Account,
        amount: u64,
    ) -> BridgeResult<BridgeReceipt> {
        let mut progress = Progress::new(BridgeDirection::ToSource);
        tracing::info!(
            holder = %holder.address(),
            custodian = %custodian.address(),
            amount,
            module = %self.module,
            "Bridging to source"
        );

        let submitted = self
            .ledger
            .transfer_asset(holder, &self.module, custodian.address(), amount)
            .await;
        match self.confirm(submitted).await {
            Ok(hash) => progress.record(BridgeStep::Transfer, hash),
            Err(e) => return Err(progress.fail(BridgeStep::Transfer, e)),
        }

        let submitted = self.ledger.burn(custodian, &self.module, amount).await;
        match self.confirm(submitted).await {
            Ok(hash) => progress.record(BridgeStep::Burn, hash),
            Err(e) => return Err(progress.fail(BridgeStep::Burn, e)),
        }

        Ok(progress.finish())
    }

    async fn confirm(&self, submitted: LedgerResult<TxHash>) -> LedgerResult<TxHash> {
        let hash = submitted?;
        self.ledger.wait_for_success(&hash).await?;
        Ok(hash)
    }
}

struct Progress {
    direction: BridgeDirection,
    committed: Vec<CommittedStep>,
}

impl Progress {
    fn new(direction: BridgeDirection) -> Self {
        Self {
            direction,
            committed: Vec::new(),
        }
    }

    fn record(&mut self, step: BridgeStep, hash: TxHash) {
        tracing::info!(direction = %self.direction, step = %step, hash = %hash, "Bridge step committed");
        self.committed.push(CommittedStep { step, hash });
    }

    fn fail(self, step: BridgeStep, source: LedgerError) -> BridgeError {
        metrics::record_bridge_operation(self.direction.as_str(), false);
        tracing::error!(
            direction = %self.direction,
            step = %step,
            committed = self.committed.len(),
            error = %source,
            "Bridge step failed"
        );
        BridgeError {
            direction: self.direction,
            failed_step: step,
            committed: self.committed,
            source,
        }
    }

    fn finish(self) -> BridgeReceipt {
        metrics::record_bridge_operation(self.direction.as_str(), true);
        BridgeReceipt {
            direction: self.direction,
            steps: self.committed,
        }
    }
}
