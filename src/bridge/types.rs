//! Bridge step bookkeeping and error definitions.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::ledger::{LedgerError, TxHash};

/// Which way value moves across the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BridgeDirection {
    /// Source ledger → destination: register then mint.
    ToDestination,
    /// Destination → source ledger: transfer then burn.
    ToSource,
}

impl BridgeDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ToDestination => "to_destination",
            Self::ToSource => "to_source",
        }
    }
}

impl fmt::Display for BridgeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single on-chain step of a composite bridge operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BridgeStep {
    Register,
    Mint,
    Transfer,
    Burn,
}

impl fmt::Display for BridgeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Register => "register",
            Self::Mint => "mint",
            Self::Transfer => "transfer",
            Self::Burn => "burn",
        })
    }
}

/// A step whose transaction executed successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedStep {
    pub step: BridgeStep,
    pub hash: TxHash,
}

/// Outcome of a composite operation whose steps all committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeReceipt {
    pub direction: BridgeDirection,
    pub steps: Vec<CommittedStep>,
}

/// A composite operation stopped part way.
///
/// Steps in `committed` stay on-chain; nothing is rolled back. Callers decide
/// whether to compensate.
#[derive(Debug, Error)]
#[error(
    "bridge {direction} failed at {failed_step} with {n} step(s) already committed: {source}",
    n = .committed.len()
)]
pub struct BridgeError {
    pub direction: BridgeDirection,
    pub failed_step: BridgeStep,
    pub committed: Vec<CommittedStep>,
    pub source: LedgerError,
}

impl BridgeError {
    /// True when earlier steps changed on-chain state before the failure.
    pub fn is_partial(&self) -> bool {
        !self.committed.is_empty()
    }
}

/// Result type for composite bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Errors that end the deploy script.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Failed to read module {}: {source}", .path.display())]
    ModuleRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Operator confirmation failed: {0}")]
    Prompt(std::io::Error),
}
