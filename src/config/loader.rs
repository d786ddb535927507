//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use crate::config::schema::DeployConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Bridge contract address.
pub const CONTRACT_ADDRESS_ENV_VAR: &str = "APT_ETH_ADDRESS";
/// Bridge module name.
pub const CONTRACT_NAME_ENV_VAR: &str = "APT_ETH_NAME";
/// Full node URL override.
pub const NODE_URL_ENV_VAR: &str = "BRIDGE_NODE_URL";
/// Faucet URL override.
pub const FAUCET_URL_ENV_VAR: &str = "BRIDGE_FAUCET_URL";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    EnvFile(dotenvy::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::EnvFile(e) => write!(f, "Env file error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Populate the process environment from a `.env` file.
///
/// With no path, `.env` is searched for from the current directory upwards.
/// Returns `false` when there is no such file; a file that exists but does
/// not parse is an error.
pub fn load_env_file(path: Option<&Path>) -> Result<bool, ConfigError> {
    let result = match path {
        Some(path) => dotenvy::from_path(path),
        None => dotenvy::dotenv().map(|_| ()),
    };
    match result {
        Ok(()) => Ok(true),
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(ConfigError::EnvFile(e)),
    }
}

/// Read and parse a TOML file. Not validated.
pub fn read_config(path: &Path) -> Result<DeployConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Build the effective configuration from the process environment.
///
/// See [`load_with_env`].
pub fn load<O>(path: Option<&Path>, overrides: O) -> Result<DeployConfig, ConfigError>
where
    O: FnOnce(&mut DeployConfig),
{
    load_with_env(path, |key| std::env::var(key).ok(), overrides)
}

/// Build the effective configuration: defaults or the file at `path`, then
/// environment values from `lookup`, then `overrides` (command line flags).
/// Validation runs once, on the result.
pub fn load_with_env<L, O>(
    path: Option<&Path>,
    lookup: L,
    overrides: O,
) -> Result<DeployConfig, ConfigError>
where
    L: Fn(&str) -> Option<String>,
    O: FnOnce(&mut DeployConfig),
{
    let config = match path {
        Some(path) => read_config(path)?,
        None => DeployConfig::default(),
    };

    let mut config = apply_env_overrides(config, lookup);
    overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    tracing::debug!(
        node_url = %config.node.url,
        faucet_url = %config.faucet.url,
        module = %config.contract.module_name,
        "Configuration loaded"
    );

    Ok(config)
}

/// Overlay environment values onto a configuration.
pub fn apply_env_overrides<F>(mut config: DeployConfig, lookup: F) -> DeployConfig
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(address) = non_empty(CONTRACT_ADDRESS_ENV_VAR) {
        config.contract.address = Some(address);
    }
    if let Some(name) = non_empty(CONTRACT_NAME_ENV_VAR) {
        config.contract.module_name = name;
    }
    if let Some(url) = non_empty(NODE_URL_ENV_VAR) {
        config.node.url = url;
    }
    if let Some(url) = non_empty(FAUCET_URL_ENV_VAR) {
        config.faucet.url = url;
    }
    config
}
