//! Bridge orchestration subsystem.
//!
//! # Data Flow
//! ```text
//! deploy.rs (scripted end-to-end run)
//!     → prompt.rs (operator confirmation)
//!     → orchestrator.rs (register+mint / transfer+burn)
//!     → ledger client entry points
//! ```

pub mod deploy;
pub mod orchestrator;
pub mod prompt;
pub mod types;

pub use deploy::{BalanceLine, DeployReport, DeployScript};
pub use orchestrator::BridgeOrchestrator;
pub use prompt::{AutoConfirm, OperatorPrompt, StdinPrompt};
pub use types::{
    BridgeDirection, BridgeError, BridgeReceipt, BridgeResult, BridgeStep, CommittedStep,
    DeployError,
};
