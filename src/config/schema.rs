//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the deploy tool.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default full node REST endpoint.
pub const DEVNET_NODE_URL: &str = "https://fullnode.devnet.aptoslabs.com";

/// Default faucet endpoint.
pub const DEVNET_FAUCET_URL: &str = "https://faucet.devnet.aptoslabs.com";

/// Root configuration for the bridge deploy tool.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DeployConfig {
    /// Full node connection and transaction defaults.
    pub node: NodeConfig,

    /// Confirmation polling.
    pub polling: PollingConfig,

    /// Faucet connection.
    pub faucet: FaucetConfig,

    /// Bridge module location.
    pub contract: ContractConfig,

    /// Amounts used by the end-to-end deploy run.
    pub demo: DemoConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Full node configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NodeConfig {
    /// REST API base URL.
    pub url: String,

    /// Per-request HTTP timeout in seconds.
    pub request_timeout_secs: u64,

    /// Gas budget attached to every transaction.
    pub max_gas_amount: u64,

    /// Gas unit price attached to every transaction.
    pub gas_unit_price: u64,

    /// Currency the gas is paid in.
    pub gas_currency_code: String,

    /// Seconds from construction until a transaction expires.
    pub expiration_secs: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            url: DEVNET_NODE_URL.to_string(),
            request_timeout_secs: 30,
            max_gas_amount: 2000,
            gas_unit_price: 1,
            gas_currency_code: "XUS".to_string(),
            expiration_secs: 600,
        }
    }
}

/// Transaction confirmation polling.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Delay between status queries in milliseconds.
    pub interval_ms: u64,

    /// Number of status queries before giving up.
    pub max_attempts: u32,
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            max_attempts: 10,
        }
    }
}

/// Faucet configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FaucetConfig {
    /// Faucet base URL.
    pub url: String,
}

impl Default for FaucetConfig {
    fn default() -> Self {
        Self {
            url: DEVNET_FAUCET_URL.to_string(),
        }
    }
}

/// Location of the bridge token module.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Address the module is published under. When unset the deploy run
    /// uses the freshly created owner account.
    pub address: Option<String>,

    /// Module name, e.g. `apt_eth`.
    pub module_name: String,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            address: None,
            module_name: "apt_eth".to_string(),
        }
    }
}

/// Amounts for the end-to-end deploy run.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Faucet funding for the module owner.
    pub owner_funding: u64,

    /// Faucet funding for the token holder.
    pub holder_funding: u64,

    /// Amount bridged to the holder.
    pub bridge_amount: u64,

    /// Decimal scaling factor passed to `initialize`.
    pub scaling_factor: u8,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            owner_funding: 1_000_000,
            holder_funding: 1_000_000_000,
            bridge_amount: 10_000_000_000,
            scaling_factor: 18,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
