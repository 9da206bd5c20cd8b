//! Node, indexer and faucet endpoint configuration
//!
//! Resolution follows the usual Aptos tooling conventions:
//! 1. Per-endpoint env vars (APTOS_NODE_URL, APTOS_INDEXER_URL, APTOS_FAUCET_URL),
//!    highest priority
//! 2. Built-in public endpoints for the selected network (APTOS_NETWORK, default devnet)
//!
//! # Examples
//!
//! ```bash
//! # Option 1: point at a local testnet started with `aptos node run-localnet`
//! export APTOS_NETWORK=local
//!
//! # Option 2: override a single endpoint
//! export APTOS_INDEXER_URL="https://my-indexer.example.com/v1/graphql"
//! ```

use super::Network;
use crate::{Error, Result};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Environment variable names
pub(crate) mod env_vars {
    pub const NETWORK: &str = "APTOS_NETWORK";
    pub const NODE_URL: &str = "APTOS_NODE_URL";
    pub const INDEXER_URL: &str = "APTOS_INDEXER_URL";
    pub const FAUCET_URL: &str = "APTOS_FAUCET_URL";
    pub const API_KEY: &str = "APTOS_API_KEY";
    pub const PRIVATE_KEY: &str = "APTOS_PRIVATE_KEY";
}

/// Public endpoints per network
mod public_endpoints {
    pub const DEVNET_NODE: &str = "https://api.devnet.aptoslabs.com/v1";
    pub const DEVNET_INDEXER: &str = "https://api.devnet.aptoslabs.com/v1/graphql";
    pub const DEVNET_FAUCET: &str = "https://faucet.devnet.aptoslabs.com";

    pub const TESTNET_NODE: &str = "https://api.testnet.aptoslabs.com/v1";
    pub const TESTNET_INDEXER: &str = "https://api.testnet.aptoslabs.com/v1/graphql";
    pub const TESTNET_FAUCET: &str = "https://faucet.testnet.aptoslabs.com";

    pub const LOCAL_NODE: &str = "http://127.0.0.1:8080/v1";
    pub const LOCAL_INDEXER: &str = "http://127.0.0.1:8090/v1/graphql";
    pub const LOCAL_FAUCET: &str = "http://127.0.0.1:8081";
}

/// The three remote services the agent talks to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    /// REST API base, including the `/v1` prefix
    pub node_url: String,
    /// GraphQL endpoint of the indexer
    pub indexer_url: String,
    /// Faucet base URL
    pub faucet_url: String,
}

impl Endpoints {
    /// Built-in endpoints for a network
    pub fn for_network(network: Network) -> Self {
        use public_endpoints::*;

        let (node, indexer, faucet) = match network {
            Network::Devnet => (DEVNET_NODE, DEVNET_INDEXER, DEVNET_FAUCET),
            Network::Testnet => (TESTNET_NODE, TESTNET_INDEXER, TESTNET_FAUCET),
            Network::Local => (LOCAL_NODE, LOCAL_INDEXER, LOCAL_FAUCET),
        };

        Self {
            node_url: node.to_string(),
            indexer_url: indexer.to_string(),
            faucet_url: faucet.to_string(),
        }
    }

    /// Resolve endpoints for `network`, letting `lookup` override each one
    ///
    /// `lookup` is `std::env::var` in production; tests pass a map.
    pub fn resolve<F>(network: Network, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut endpoints = Self::for_network(network);

        if let Some(url) = lookup(env_vars::NODE_URL) {
            tracing::debug!("Using APTOS_NODE_URL for node endpoint");
            endpoints.node_url = url;
        }
        if let Some(url) = lookup(env_vars::INDEXER_URL) {
            tracing::debug!("Using APTOS_INDEXER_URL for indexer endpoint");
            endpoints.indexer_url = url;
        }
        if let Some(url) = lookup(env_vars::FAUCET_URL) {
            tracing::debug!("Using APTOS_FAUCET_URL for faucet endpoint");
            endpoints.faucet_url = url;
        }

        endpoints
    }

    /// Resolve endpoints from the process environment
    pub fn from_env(network: Network) -> Self {
        Self::resolve(network, |name| std::env::var(name).ok())
    }

    /// Check every endpoint parses as an absolute URL
    pub fn validate(&self) -> Result<()> {
        for (label, value) in [
            ("node_url", &self.node_url),
            ("indexer_url", &self.indexer_url),
            ("faucet_url", &self.faucet_url),
        ] {
            url::Url::parse(value)
                .map_err(|e| Error::Config(format!("Invalid {}: {} ({})", label, value, e)))?;
        }
        Ok(())
    }
}

/// Read the optional API key used for rate-limit exemption on Aptos Labs endpoints
pub fn api_key_from_env() -> Option<SecretString> {
    std::env::var(env_vars::API_KEY)
        .ok()
        .filter(|key| !key.is_empty())
        .map(SecretString::from)
}

/// Hex ed25519 private key of the account that signs token operations
pub fn private_key_from_env() -> Option<SecretString> {
    std::env::var(env_vars::PRIVATE_KEY)
        .ok()
        .filter(|key| !key.is_empty())
        .map(SecretString::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(map: HashMap<&'static str, &'static str>) -> impl Fn(&str) -> Option<String> {
        move |name| map.get(name).map(|v| v.to_string())
    }

    #[test]
    fn test_public_fallbacks() {
        let endpoints = Endpoints::resolve(Network::Devnet, |_| None);

        assert_eq!(endpoints.node_url, public_endpoints::DEVNET_NODE);
        assert_eq!(endpoints.indexer_url, public_endpoints::DEVNET_INDEXER);
        assert_eq!(endpoints.faucet_url, public_endpoints::DEVNET_FAUCET);
    }

    #[test]
    fn test_env_override_wins_per_endpoint() {
        let mut map = HashMap::new();
        map.insert(env_vars::INDEXER_URL, "http://indexer.local/v1/graphql");
        let endpoints = Endpoints::resolve(Network::Testnet, lookup_from(map));

        assert_eq!(endpoints.indexer_url, "http://indexer.local/v1/graphql");
        // untouched endpoints keep the network default
        assert_eq!(endpoints.node_url, public_endpoints::TESTNET_NODE);
    }

    #[test]
    fn test_local_network() {
        let endpoints = Endpoints::for_network(Network::Local);
        assert!(endpoints.node_url.starts_with("http://127.0.0.1"));
        assert!(endpoints.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_relative_url() {
        let mut endpoints = Endpoints::for_network(Network::Devnet);
        endpoints.faucet_url = "faucet.devnet".to_string();

        let err = endpoints.validate().unwrap_err();
        assert!(err.to_string().contains("faucet_url"));
    }
}
