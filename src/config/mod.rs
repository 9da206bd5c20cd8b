//! Configuration for the finance agent

pub mod endpoints;

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

pub use endpoints::{api_key_from_env, private_key_from_env, Endpoints};

/// Supported Aptos networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Devnet,
    Testnet,
    Local,
}

impl Network {
    pub fn name(&self) -> &'static str {
        match self {
            Network::Devnet => "devnet",
            Network::Testnet => "testnet",
            Network::Local => "local",
        }
    }

    /// Network selected by APTOS_NETWORK, falling back to devnet
    pub fn from_env() -> Self {
        Self::from_setting(std::env::var(endpoints::env_vars::NETWORK).ok().as_deref())
    }

    /// Parse an optional network setting; an unrecognised value falls back
    /// to devnet with a warning
    pub fn from_setting(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return Self::default();
        };
        value.parse().unwrap_or_else(|e| {
            tracing::warn!(
                var = endpoints::env_vars::NETWORK,
                value,
                error = %e,
                fallback = Self::default().name(),
                "Ignoring invalid network setting"
            );
            Self::default()
        })
    }
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "devnet" => Ok(Network::Devnet),
            "testnet" => Ok(Network::Testnet),
            "local" | "localnet" => Ok(Network::Local),
            _ => Err(Error::Config(format!(
                "Unknown network: {}. Supported: devnet, testnet, local",
                s
            ))),
        }
    }
}

/// How long to wait for a submitted transaction to be committed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SettlementConfig {
    /// Give up waiting after this many seconds
    pub timeout_secs: u64,
    /// Delay between `by_hash` polls
    pub poll_interval_ms: u64,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            poll_interval_ms: 500,
        }
    }
}

/// Gas parameters for submitted transactions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GasConfig {
    pub max_gas_amount: u64,
    /// Fixed unit price; when unset the node's estimate is used
    #[serde(default)]
    pub gas_unit_price: Option<u64>,
    /// Seconds from now until the transaction expires
    pub expiration_secs: u64,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            max_gas_amount: 200_000,
            gas_unit_price: None,
            expiration_secs: 60,
        }
    }
}

/// Indexer query limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Transactions returned when the caller gives no limit
    pub default_limit: u32,
    /// Page size of the balance snapshot
    pub balance_limit: u32,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            balance_limit: 100,
        }
    }
}

/// Windows and thresholds used by the analysis tools (base units)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Recent transactions inspected by transaction monitoring
    pub monitoring_window: u32,
    /// Amounts strictly above this are reported as unusual
    pub unusual_amount: u64,
    /// Recent transactions inspected by risk assessment
    pub risk_window: u32,
    /// Amounts strictly above this count as high value
    pub high_value_amount: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            monitoring_window: 5,
            unusual_amount: 1_000_000,
            risk_window: 20,
            high_value_amount: 500_000,
        }
    }
}

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Network to connect to
    #[serde(default = "Network::from_env")]
    pub network: Network,
    /// Explicit endpoints; resolved from the network and environment when absent
    #[serde(default)]
    pub endpoints: Option<Endpoints>,
    #[serde(default)]
    pub settlement: SettlementConfig,
    #[serde(default)]
    pub gas: GasConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// Path to the tool-call audit log; `null` disables auditing
    #[serde(default = "default_audit_log_path")]
    pub audit_log_path: Option<String>,
}

impl Config {
    /// Load a JSON config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Endpoints to use, validated
    pub fn endpoints(&self) -> Result<Endpoints> {
        let endpoints = self
            .endpoints
            .clone()
            .unwrap_or_else(|| Endpoints::from_env(self.network));
        endpoints.validate()?;
        Ok(endpoints)
    }
}

fn default_audit_log_path() -> Option<String> {
    Some("audit.jsonl".to_string())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: Network::from_env(),
            endpoints: None,
            settlement: SettlementConfig::default(),
            gas: GasConfig::default(),
            query: QueryConfig::default(),
            analysis: AnalysisConfig::default(),
            audit_log_path: default_audit_log_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_deserialize_defaults() {
        let value = serde_json::json!({
            "network": "testnet",
            "audit_log_path": null
        });
        let parsed: Config = serde_json::from_value(value).expect("parse config");

        assert_eq!(parsed.network, Network::Testnet);
        assert!(parsed.endpoints.is_none());
        assert_eq!(parsed.query.default_limit, 10);
        assert_eq!(parsed.analysis.monitoring_window, 5);
        assert_eq!(parsed.analysis.unusual_amount, 1_000_000);
        assert_eq!(parsed.analysis.risk_window, 20);
        assert_eq!(parsed.analysis.high_value_amount, 500_000);
        assert!(parsed.gas.gas_unit_price.is_none());
    }

    #[test]
    fn config_explicit_endpoints_are_used() {
        let value = serde_json::json!({
            "network": "local",
            "endpoints": {
                "node_url": "http://node.test/v1",
                "indexer_url": "http://node.test/v1/graphql",
                "faucet_url": "http://faucet.test"
            },
            "settlement": { "timeout_secs": 5, "poll_interval_ms": 50 },
            "audit_log_path": "audit.jsonl"
        });
        let parsed: Config = serde_json::from_value(value).expect("parse config");
        let endpoints = parsed.endpoints().expect("valid endpoints");

        assert_eq!(endpoints.node_url, "http://node.test/v1");
        assert_eq!(parsed.settlement.timeout_secs, 5);
    }

    #[test]
    fn network_from_str() {
        assert_eq!("devnet".parse::<Network>().unwrap(), Network::Devnet);
        assert_eq!("LocalNet".parse::<Network>().unwrap(), Network::Local);
        assert!("mainnet".parse::<Network>().is_err());
    }

    #[test]
    fn network_setting_falls_back_to_devnet() {
        assert_eq!(Network::from_setting(None), Network::Devnet);
        assert_eq!(Network::from_setting(Some("testnet")), Network::Testnet);
        assert_eq!(Network::from_setting(Some("tesnet")), Network::Devnet);
        assert_eq!(Network::from_setting(Some("")), Network::Devnet);
    }
}
