//! Full node integration subsystem.
//!
//! # Data Flow
//! ```text
//! payload (module publish or entry function call)
//!     → client.rs build_transaction (sequence number lookup, gas, expiry)
//!     → client.rs sign_transaction (node signing message, Ed25519)
//!     → client.rs submit_transaction (202 Accepted → hash)
//!     → client.rs wait_for_transaction (poll until not pending)
//! ```
//!
//! entry.rs layers the bridge module's entry points on top of that pipeline.

pub mod client;
pub mod entry;
pub mod types;

pub use client::LedgerClient;
pub use types::{
    AccountInfo, LedgerError, LedgerResult, ModuleId, Resource, SignatureBlock, Transaction,
    TransactionPayload, TransactionRequest, TransactionStatus, TxHash,
};
