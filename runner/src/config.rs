use crate::engine::EngineConfig;
use ethers::{
    types::{Address, U256},
    utils::to_checksum,
};
use serde::Deserialize;
use sha1bench_client::ArtifactStore;
use sha1bench_types::IMPLEMENTATIONS;
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};
use thiserror::Error;
use tracing::Level;
use url::Url;

/// Account unlocked by a deterministic development node.
pub const DEFAULT_SENDER: &str = "0x90F8bf6A479f320ead074411a4B0e7944Ea8c9C1";
pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";
pub const DEFAULT_GAS_LIMIT: u64 = 4_000_000;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid rpc_url {url}: {reason}")]
    InvalidRpcUrl { url: String, reason: String },
    #[error("invalid sender address {0}")]
    InvalidSender(String),
    #[error("sender {given} fails checksum (expected {expected})")]
    SenderChecksum { given: String, expected: String },
    #[error("gas_limit must be > 0")]
    ZeroGasLimit,
    #[error("confirmations must be > 0")]
    ZeroConfirmations,
    #[error("no implementations configured")]
    NoImplementations,
    #[error("invalid log level {0}")]
    InvalidLogLevel(String),
}

/// Harness configuration, as read from a YAML file and overridden from the
/// command line or environment.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub rpc_url: String,
    pub sender: String,
    pub gas_limit: u64,
    pub artifacts_dir: PathBuf,
    pub implementations: Vec<String>,
    pub abi_path: Option<PathBuf>,
    pub confirmations: usize,
    pub poll_interval_ms: u64,
    pub log_level: String,
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            sender: DEFAULT_SENDER.to_string(),
            gas_limit: DEFAULT_GAS_LIMIT,
            artifacts_dir: PathBuf::from("."),
            implementations: IMPLEMENTATIONS.iter().map(|name| name.to_string()).collect(),
            abi_path: None,
            confirmations: 1,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let yaml = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&yaml)
    }

    /// Parse the sender, rejecting mixed-case addresses with a bad EIP-55 checksum.
    pub fn sender_address(&self) -> Result<Address, ConfigError> {
        let sender = self.sender.trim();
        let address = Address::from_str(sender)
            .map_err(|_| ConfigError::InvalidSender(sender.to_string()))?;
        let digits = sender.trim_start_matches("0x");
        let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
        if has_lower && has_upper {
            let expected = to_checksum(&address, None);
            if expected != sender {
                return Err(ConfigError::SenderChecksum {
                    given: sender.to_string(),
                    expected,
                });
            }
        }
        Ok(address)
    }

    /// Parse the endpoint, accepting only http and https.
    pub fn rpc_url(&self) -> Result<Url, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidRpcUrl {
            url: self.rpc_url.clone(),
            reason,
        };
        let url = Url::parse(&self.rpc_url).map_err(|err| invalid(err.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(invalid(format!("unsupported scheme {scheme}"))),
        }
    }

    pub fn level(&self) -> Result<Level, ConfigError> {
        Level::from_str(&self.log_level)
            .map_err(|_| ConfigError::InvalidLogLevel(self.log_level.clone()))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Validate the configuration and build what the engine needs to run.
    pub fn engine_config(&self) -> Result<EngineConfig, ConfigError> {
        self.rpc_url()?;
        let sender = self.sender_address()?;
        if self.gas_limit == 0 {
            return Err(ConfigError::ZeroGasLimit);
        }
        if self.confirmations == 0 {
            return Err(ConfigError::ZeroConfirmations);
        }
        if self.implementations.is_empty() {
            return Err(ConfigError::NoImplementations);
        }
        Ok(EngineConfig {
            sender,
            gas_limit: U256::from(self.gas_limit),
            implementations: self.implementations.clone(),
            artifacts: ArtifactStore::new(&self.artifacts_dir),
        })
    }
}
