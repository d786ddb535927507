//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults
//!     → optional TOML file (loader.rs)
//!     → process environment, optionally seeded from .env (loader.rs)
//!     → validation.rs (semantic checks)
//!     → DeployConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults so the tool runs with no config file
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load, load_env_file, load_with_env, read_config, ConfigError};
pub use schema::{
    ContractConfig, DemoConfig, DeployConfig, FaucetConfig, NodeConfig, ObservabilityConfig,
    PollingConfig,
};
