//! Account address derivation and formatting.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Sha3_256};
use std::fmt;
use std::str::FromStr;

use crate::account::{AccountError, AccountResult};

/// Length of an account address in bytes.
pub const ADDRESS_LENGTH: usize = 32;

/// Scheme byte appended to the public key before hashing (single Ed25519).
pub const ED25519_SCHEME: u8 = 0x00;

/// A 32-byte account address.
///
/// Displays as `0x`-prefixed lowercase hex. Parses with or without the prefix.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountAddress([u8; ADDRESS_LENGTH]);

impl AccountAddress {
    /// Wrap raw address bytes.
    pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Derive the authentication key for an Ed25519 public key.
    pub fn from_ed25519_public_key(public_key: &[u8; 32]) -> Self {
        let mut hasher = Sha3_256::new();
        hasher.update(public_key);
        hasher.update([ED25519_SCHEME]);
        Self(hasher.finalize().into())
    }

    /// Hex without the `0x` prefix, as used in REST paths.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl fmt::Debug for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountAddress({})", self)
    }
}

impl FromStr for AccountAddress {
    type Err = AccountError;

    fn from_str(s: &str) -> AccountResult<Self> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        if digits.len() > ADDRESS_LENGTH * 2 {
            return Err(AccountError::InvalidKeyMaterial(format!(
                "address '{}' is longer than {} bytes",
                s, ADDRESS_LENGTH
            )));
        }

        // Short addresses such as 0x1 are left-padded with zeros.
        let padded = format!("{:0>width$}", digits, width = ADDRESS_LENGTH * 2);
        let mut bytes = [0u8; ADDRESS_LENGTH];
        hex::decode_to_slice(&padded, &mut bytes).map_err(|e| {
            AccountError::InvalidKeyMaterial(format!("address '{}' is not hex: {}", s, e))
        })?;
        Ok(Self(bytes))
    }
}

impl Serialize for AccountAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AccountAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
