//! REST wire types and error definitions.

use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::account::{AccountAddress, AccountError};

/// Signature scheme tag for single Ed25519 signatures.
pub const ED25519_SIGNATURE_TYPE: &str = "ed25519_signature";

/// `type` of a transaction the node has accepted but not yet executed.
pub const PENDING_TRANSACTION_TYPE: &str = "pending_transaction";

/// Errors that can occur while talking to the full node or faucet.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The node or faucet answered with an unexpected status.
    #[error("Remote error (status {status}): {body}")]
    Remote { status: u16, body: String },

    /// Account lookup returned a non-success status.
    #[error("Account {address} not found: {detail}")]
    AccountNotFound {
        address: AccountAddress,
        detail: String,
    },

    /// Transaction still pending after the poll budget.
    #[error("Waiting for transaction {hash} timed out after {attempts} polls")]
    TransactionTimeout { hash: TxHash, attempts: u32 },

    /// Transaction was committed but aborted on-chain.
    #[error("Transaction {hash} failed: {vm_status}")]
    TransactionFailed { hash: TxHash, vm_status: String },

    /// Signing payload could not be produced or signed.
    #[error("Signing failed: {0}")]
    SigningFailure(String),

    #[error(transparent)]
    InvalidKeyMaterial(#[from] AccountError),

    /// Transport-level failure (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not have the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Node-assigned transaction hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(pub String);

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TxHash {
    fn from(hash: &str) -> Self {
        Self(hash.to_string())
    }
}

/// Integers travel as decimal strings; numbers are accepted on input too.
pub(crate) mod u64_string {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Number(u64),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Text(s) => s.parse().map_err(de::Error::custom),
            Repr::Number(n) => Ok(n),
        }
    }
}

/// Response of `GET /accounts/{address}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    #[serde(with = "u64_string")]
    pub sequence_number: u64,
    #[serde(default)]
    pub authentication_key: String,
}

/// A typed piece of on-chain state stored under an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "type")]
    pub type_tag: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Resource {
    /// Read `data.coin.value` of a coin balance resource.
    pub fn coin_value(&self) -> LedgerResult<u64> {
        let value = &self.data["coin"]["value"];
        let parsed = match value {
            serde_json::Value::String(s) => s.parse().ok(),
            serde_json::Value::Number(n) => n.as_u64(),
            _ => None,
        };
        parsed.ok_or_else(|| {
            LedgerError::Decode(format!(
                "resource {} has no numeric coin value: {}",
                self.type_tag, value
            ))
        })
    }
}

/// A published module, addressed as `<address>::<name>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleId {
    address: String,
    name: String,
}

impl ModuleId {
    /// `address` may be given with or without the `0x` prefix.
    pub fn new(address: &str, name: impl Into<String>) -> Self {
        let digits = address.strip_prefix("0x").unwrap_or(address);
        Self {
            address: format!("0x{}", digits.to_ascii_lowercase()),
            name: name.into(),
        }
    }

    /// Module published under an account.
    pub fn at(address: AccountAddress, name: impl Into<String>) -> Self {
        Self {
            address: address.to_string(),
            name: name.into(),
        }
    }

    /// The built-in test coin module, `0x1::TestCoin`.
    pub fn test_coin() -> Self {
        Self::new("0x1", "TestCoin")
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fully qualified entry function identifier.
    pub fn function(&self, function: &str) -> String {
        format!("{}::{}", self, function)
    }

    /// Fully qualified resource type tag.
    pub fn resource(&self, struct_name: &str) -> String {
        format!("{}::{}", self, struct_name)
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.address, self.name)
    }
}

/// One compiled module inside a publish payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleBytecode {
    /// `0x`-prefixed hex bytecode.
    pub bytecode: String,
}

/// Transaction payload kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TransactionPayload {
    /// Publish compiled modules under the sender's account.
    #[serde(rename = "module_bundle_payload")]
    ModulePublish { modules: Vec<ModuleBytecode> },

    /// Call an on-chain entry function.
    #[serde(rename = "script_function_payload")]
    EntryFunctionCall {
        #[serde(rename = "function")]
        function_id: String,
        #[serde(rename = "type_arguments", default)]
        type_args: Vec<String>,
        #[serde(rename = "arguments", default)]
        args: Vec<String>,
    },
}

impl TransactionPayload {
    pub fn module_publish(bytecode: &[u8]) -> Self {
        Self::ModulePublish {
            modules: vec![ModuleBytecode {
                bytecode: format!("0x{}", hex::encode(bytecode)),
            }],
        }
    }

    pub fn entry_function(function_id: impl Into<String>, args: Vec<String>) -> Self {
        Self::EntryFunctionCall {
            function_id: function_id.into(),
            type_args: Vec::new(),
            args,
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ModulePublish { .. } => "module_publish",
            Self::EntryFunctionCall { .. } => "entry_function",
        }
    }
}

/// Signature attached to a transaction before submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureBlock {
    #[serde(rename = "type")]
    pub scheme: String,
    /// `0x`-prefixed hex public key.
    pub public_key: String,
    /// `0x`-prefixed hex signature.
    pub signature: String,
}

impl SignatureBlock {
    pub fn ed25519(public_key: &VerifyingKey, signature: &Signature) -> Self {
        Self {
            scheme: ED25519_SIGNATURE_TYPE.to_string(),
            public_key: format!("0x{}", hex::encode(public_key.as_bytes())),
            signature: format!("0x{}", hex::encode(signature.to_bytes())),
        }
    }

    /// Check the signature over `message` against the embedded public key.
    pub fn verify(&self, message: &[u8]) -> LedgerResult<()> {
        if self.scheme != ED25519_SIGNATURE_TYPE {
            return Err(LedgerError::SigningFailure(format!(
                "unsupported signature scheme '{}'",
                self.scheme
            )));
        }

        let public_key: [u8; 32] = decode_fixed(&self.public_key, "public key")?;
        let signature: [u8; 64] = decode_fixed(&self.signature, "signature")?;

        let public_key = VerifyingKey::from_bytes(&public_key)
            .map_err(|e| LedgerError::SigningFailure(format!("bad public key: {}", e)))?;
        public_key
            .verify(message, &Signature::from_bytes(&signature))
            .map_err(|e| LedgerError::SigningFailure(format!("signature does not verify: {}", e)))
    }
}

fn decode_fixed<const N: usize>(value: &str, what: &str) -> LedgerResult<[u8; N]> {
    let bytes = decode_hex(value)
        .map_err(|e| LedgerError::SigningFailure(format!("{} is not hex: {}", what, e)))?;
    bytes.try_into().map_err(|b: Vec<u8>| {
        LedgerError::SigningFailure(format!("{} must be {} bytes, got {}", what, N, b.len()))
    })
}

/// Decode hex with an optional `0x` prefix.
pub fn decode_hex(value: &str) -> Result<Vec<u8>, hex::FromHexError> {
    hex::decode(value.strip_prefix("0x").unwrap_or(value))
}

/// A transaction envelope, unsigned until `signature` is attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub sender: AccountAddress,
    #[serde(with = "u64_string")]
    pub sequence_number: u64,
    #[serde(with = "u64_string")]
    pub max_gas_amount: u64,
    #[serde(with = "u64_string")]
    pub gas_unit_price: u64,
    pub gas_currency_code: String,
    #[serde(with = "u64_string")]
    pub expiration_timestamp_secs: u64,
    pub payload: TransactionPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<SignatureBlock>,
}

/// Response of `POST /signing_message`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SigningMessage {
    /// `0x`-prefixed hex bytes to sign.
    pub message: String,
}

/// Response of `POST /transactions`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubmittedTransaction {
    pub hash: TxHash,
}

/// Transaction as reported by `GET /transactions/{hash}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Transaction {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub hash: Option<TxHash>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub vm_status: Option<String>,
}

/// Coarse transaction state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Committed,
    Failed { vm_status: String },
}

impl Transaction {
    pub fn is_pending(&self) -> bool {
        self.kind == PENDING_TRANSACTION_TYPE
    }

    pub fn status(&self) -> TransactionStatus {
        if self.is_pending() {
            return TransactionStatus::Pending;
        }
        match self.success {
            Some(false) => TransactionStatus::Failed {
                vm_status: self
                    .vm_status
                    .clone()
                    .unwrap_or_else(|| "unknown".to_string()),
            },
            _ => TransactionStatus::Committed,
        }
    }
}
