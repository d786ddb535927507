//! End-to-end deploy run.
//!
//! # Sequence
//! ```text
//! create owner + holder accounts
//!     → faucet funds both
//!     → report initial balances
//!     → operator rebuilds the module with the owner address (OperatorPrompt)
//!     → publish module, initialize
//!     → bridge to destination (register + mint for the holder)
//!     → report final balances
//! ```

use std::path::{Path, PathBuf};

use crate::account::{Account, AccountAddress};
use crate::bridge::orchestrator::BridgeOrchestrator;
use crate::bridge::prompt::OperatorPrompt;
use crate::bridge::types::{BridgeError, BridgeReceipt, DeployError};
use crate::config::{ContractConfig, DemoConfig, DeployConfig};
use crate::faucet::FaucetClient;
use crate::ledger::{LedgerClient, LedgerResult, ModuleId, TxHash};

/// One balance line of the report. `amount` is `None` when the account holds
/// no balance resource for the coin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceLine {
    pub label: &'static str,
    pub address: AccountAddress,
    pub coin: String,
    pub amount: Option<u64>,
}

/// Everything the deploy run produced.
#[derive(Debug)]
pub struct DeployReport {
    pub owner: AccountAddress,
    pub holder: AccountAddress,
    pub initial_balances: Vec<BalanceLine>,
    pub publish_hash: TxHash,
    pub initialize_hash: TxHash,
    /// The bridge failure is reported rather than aborting the run.
    pub bridge: Result<BridgeReceipt, BridgeError>,
    pub final_balances: Vec<BalanceLine>,
}

/// The scripted deploy run.
#[derive(Debug)]
pub struct DeployScript {
    ledger: LedgerClient,
    faucet: FaucetClient,
    contract: ContractConfig,
    demo: DemoConfig,
    module_path: PathBuf,
}

impl DeployScript {
    pub fn new(config: &DeployConfig, module_path: impl Into<PathBuf>) -> LedgerResult<Self> {
        let ledger = LedgerClient::from_config(config)?;
        let faucet = FaucetClient::new(&config.faucet, ledger.clone())?;
        Ok(Self {
            ledger,
            faucet,
            contract: config.contract.clone(),
            demo: config.demo.clone(),
            module_path: module_path.into(),
        })
    }

    pub fn module_path(&self) -> &Path {
        &self.module_path
    }

    /// Run with two freshly generated accounts.
    pub async fn run<P: OperatorPrompt>(&self, prompt: &mut P) -> Result<DeployReport, DeployError> {
        self.run_with(Account::generate(), Account::generate(), prompt)
            .await
    }

    /// Run with caller-supplied owner and holder accounts.
    pub async fn run_with<P: OperatorPrompt>(
        &self,
        owner: Account,
        holder: Account,
        prompt: &mut P,
    ) -> Result<DeployReport, DeployError> {
        tracing::info!(owner = %owner.address(), holder = %holder.address(), "Accounts created");

        self.faucet
            .fund_account(owner.address(), self.demo.owner_funding)
            .await?;
        self.faucet
            .fund_account(holder.address(), self.demo.holder_funding)
            .await?;

        let published = ModuleId::at(owner.address(), self.contract.module_name.clone());
        let configured = match &self.contract.address {
            Some(address) => ModuleId::new(address, self.contract.module_name.clone()),
            None => published.clone(),
        };

        let test_coin = ModuleId::test_coin();
        let initial_balances = self
            .balances(&owner, &holder, &[&test_coin, &configured])
            .await?;
        for line in &initial_balances {
            tracing::info!(
                account = line.label,
                coin = %line.coin,
                amount = ?line.amount,
                "Initial balance"
            );
        }

        let message = format!(
            "Update the module with the owner's address ({}), build, copy it to {}, and press enter.",
            owner.address(),
            self.module_path.display()
        );
        prompt.confirm(&message).await.map_err(DeployError::Prompt)?;

        let bytecode = tokio::fs::read(&self.module_path)
            .await
            .map_err(|source| DeployError::ModuleRead {
                path: self.module_path.clone(),
                source,
            })?;

        let publish_hash = self.ledger.publish_module(&owner, &bytecode).await?;
        self.ledger.wait_for_success(&publish_hash).await?;

        let initialize_hash = self
            .ledger
            .initialize(&owner, &published, self.demo.scaling_factor)
            .await?;
        self.ledger.wait_for_success(&initialize_hash).await?;

        let orchestrator = BridgeOrchestrator::new(self.ledger.clone(), published.clone());
        let bridge = orchestrator
            .bridge_to_destination(&owner, holder.address(), self.demo.bridge_amount)
            .await;

        let final_balances = self.balances(&owner, &holder, &[&published]).await?;

        Ok(DeployReport {
            owner: owner.address(),
            holder: holder.address(),
            initial_balances,
            publish_hash,
            initialize_hash,
            bridge,
            final_balances,
        })
    }

    async fn balances(
        &self,
        owner: &Account,
        holder: &Account,
        coins: &[&ModuleId],
    ) -> LedgerResult<Vec<BalanceLine>> {
        let mut lines = Vec::new();
        for coin in coins {
            for (label, address) in [("owner", owner.address()), ("holder", holder.address())] {
                let amount = self.ledger.get_balance(address, coin).await?;
                lines.push(BalanceLine {
                    label,
                    address,
                    coin: coin.to_string(),
                    amount,
                });
            }
        }
        Ok(lines)
    }
}
