//! Test account key handling.
//!
//! # Data Flow
//! ```text
//! OS RNG or 32-byte seed
//!     → keypair.rs (Ed25519 signing key)
//!     → address.rs (SHA3-256(public key || 0x00))
//!     → ledger client (sender address, signature block)
//! ```
//!
//! # Security Constraints
//! - Keys live only for the lifetime of the process
//! - Private key bytes never reach `Debug` output or logs

pub mod address;
pub mod keypair;

pub use address::AccountAddress;
pub use keypair::Account;

use thiserror::Error;

/// Errors raised while constructing account key material.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccountError {
    /// Seed or address bytes have the wrong length or encoding.
    #[error("Invalid key material: {0}")]
    InvalidKeyMaterial(String),
}

/// Result type for account operations.
pub type AccountResult<T> = Result<T, AccountError>;
