//! Live transport backed by a node, an indexer and a faucet

use super::{
    AssetActivity, BalanceEntry, EntryFunctionPayload, FaucetClient, IndexerClient, NodeClient,
    TransactionHash, TransactionRecord, Transport,
};
use crate::account::{Address, LocalAccount};
use crate::config::{Config, GasConfig, SettlementConfig};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct AptosTransport {
    node: NodeClient,
    indexer: IndexerClient,
    faucet: FaucetClient,
    settlement: SettlementConfig,
    gas: GasConfig,
}

impl AptosTransport {
    /// Build the transport from config, optionally authenticating with an API key
    pub fn from_config(config: &Config, api_key: Option<&SecretString>) -> Result<Self> {
        let endpoints = config.endpoints()?;
        let client = build_client(api_key)?;

        tracing::info!(
            network = config.network.name(),
            node = %endpoints.node_url,
            indexer = %endpoints.indexer_url,
            faucet = %endpoints.faucet_url,
            authenticated = api_key.is_some(),
            "Configured Aptos transport"
        );

        Ok(Self {
            node: NodeClient::new(client.clone(), endpoints.node_url),
            indexer: IndexerClient::new(
                client.clone(),
                endpoints.indexer_url,
                config.query.balance_limit,
            ),
            faucet: FaucetClient::new(client, endpoints.faucet_url),
            settlement: config.settlement.clone(),
            gas: config.gas.clone(),
        })
    }

    pub fn node(&self) -> &NodeClient {
        &self.node
    }
}

/// One HTTP client shared by all three services; the API key is a default header
fn build_client(api_key: Option<&SecretString>) -> Result<Client> {
    let mut headers = HeaderMap::new();
    if let Some(key) = api_key {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", key.expose_secret()))
            .map_err(|_| Error::Config("API key contains invalid header characters".to_string()))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    Client::builder()
        .default_headers(headers)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))
}

#[async_trait]
impl Transport for AptosTransport {
    async fn submit_transfer(
        &self,
        sender: &LocalAccount,
        recipient: &Address,
        amount: u64,
    ) -> Result<TransactionHash> {
        let payload = EntryFunctionPayload::coin_transfer(recipient, amount);
        self.submit_entry_function(sender, payload).await
    }

    async fn submit_entry_function(
        &self,
        sender: &LocalAccount,
        payload: EntryFunctionPayload,
    ) -> Result<TransactionHash> {
        let hash = self
            .node
            .submit_entry_function(sender, payload, &self.gas)
            .await?;

        self.node.wait_for_transaction(&hash, &self.settlement).await?;
        Ok(hash)
    }

    async fn query_transactions(
        &self,
        address: &Address,
        limit: u32,
    ) -> Result<Vec<TransactionRecord>> {
        self.indexer.account_transactions(address, limit).await
    }

    async fn query_balances(&self, address: &Address) -> Result<Vec<BalanceEntry>> {
        self.indexer.current_balances(address).await
    }

    async fn fund_account(&self, address: &Address, amount: u64) -> Result<()> {
        let hashes = self.faucet.mint(address, amount).await?;

        for hash in &hashes {
            self.node
                .wait_for_transaction(hash, &self.settlement)
                .await
                .map_err(|e| Error::Funding(e.to_string()))?;
        }
        Ok(())
    }

    async fn account_balance(&self, address: &Address) -> Result<u64> {
        self.node.coin_balance(address).await
    }

    async fn asset_activities(&self, version: u64) -> Result<Vec<AssetActivity>> {
        self.indexer.fungible_asset_activities(version).await
    }

    fn name(&self) -> &'static str {
        "aptos"
    }
}
