//! Ed25519 key pairs for test accounts.
//!
//! # Security
//! - Keys are generated from the OS RNG or an explicit seed
//! - Keys are never logged or serialized

use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey, SECRET_KEY_LENGTH};
use rand::rngs::OsRng;

use crate::account::{AccountAddress, AccountError, AccountResult};

/// A test account: an Ed25519 key pair plus its derived address.
pub struct Account {
    signing_key: SigningKey,
    address: AccountAddress,
}

impl Account {
    /// Create an account with a fresh random key pair.
    pub fn generate() -> Self {
        Self::from_signing_key(SigningKey::generate(&mut OsRng))
    }

    /// Reconstruct an account from a 32-byte seed.
    ///
    /// # Errors
    /// `InvalidKeyMaterial` if the seed is not exactly 32 bytes.
    pub fn from_seed(seed: &[u8]) -> AccountResult<Self> {
        let seed: [u8; SECRET_KEY_LENGTH] = seed.try_into().map_err(|_| {
            AccountError::InvalidKeyMaterial(format!(
                "seed must be {} bytes, got {}",
                SECRET_KEY_LENGTH,
                seed.len()
            ))
        })?;
        Ok(Self::from_signing_key(SigningKey::from_bytes(&seed)))
    }

    /// Reconstruct an account from a hex seed (with or without 0x prefix).
    pub fn from_seed_hex(seed_hex: &str) -> AccountResult<Self> {
        let digits = seed_hex.strip_prefix("0x").unwrap_or(seed_hex);
        let seed = hex::decode(digits)
            .map_err(|e| AccountError::InvalidKeyMaterial(format!("seed is not hex: {}", e)))?;
        Self::from_seed(&seed)
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let address =
            AccountAddress::from_ed25519_public_key(signing_key.verifying_key().as_bytes());
        Self {
            signing_key,
            address,
        }
    }

    /// The account address.
    pub fn address(&self) -> AccountAddress {
        self.address
    }

    /// The authentication key. For single-key accounts this equals the address.
    pub fn auth_key(&self) -> String {
        self.address.to_hex()
    }

    /// Hex-encoded public key, without prefix.
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.signing_key.verifying_key().as_bytes())
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Sign raw message bytes. Returns the detached 64-byte signature.
    pub fn sign(&self, message: &[u8]) -> Signature {
        self.signing_key.sign(message)
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.address)
            .field("public_key", &self.public_key_hex())
            .finish()
    }
}
