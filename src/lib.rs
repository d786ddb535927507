//! Test token bridge deployment against an Aptos-style devnet.

pub mod account;
pub mod bridge;
pub mod config;
pub mod faucet;
pub mod ledger;
pub mod observability;

pub use account::{Account, AccountAddress};
pub use bridge::{BridgeOrchestrator, DeployScript};
pub use config::DeployConfig;
pub use faucet::FaucetClient;
pub use ledger::LedgerClient;
