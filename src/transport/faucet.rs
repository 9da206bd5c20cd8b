//! Faucet client
//!
//! Only meaningful on devnet, testnet and local networks.

use super::node::read_json;
use super::TransactionHash;
use crate::account::Address;
use crate::{Error, Result};
use reqwest::Client;
use serde::Deserialize;

/// Faucets answer `mint` with either a bare list of hashes or an object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MintResponse {
    Hashes(Vec<String>),
    Wrapped { txn_hashes: Vec<String> },
}

impl MintResponse {
    fn into_hashes(self) -> Vec<TransactionHash> {
        let hashes = match self {
            MintResponse::Hashes(h) => h,
            MintResponse::Wrapped { txn_hashes } => txn_hashes,
        };
        hashes.into_iter().map(TransactionHash).collect()
    }
}

#[derive(Clone)]
pub struct FaucetClient {
    client: Client,
    base_url: String,
}

impl FaucetClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Request `amount` base units for `address`
    ///
    /// Returns the faucet's transaction hashes; the caller decides whether to
    /// wait for them. Idempotency is whatever the faucet provides.
    pub async fn mint(&self, address: &Address, amount: u64) -> Result<Vec<TransactionHash>> {
        let url = format!("{}/mint", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .query(&[
                ("amount", amount.to_string()),
                ("address", address.to_string()),
            ])
            .send()
            .await
            .map_err(|e| Error::Funding(format!("Faucet request failed: {}", e)))?;

        let minted: MintResponse = read_json(response).await.map_err(Error::Funding)?;
        let hashes = minted.into_hashes();

        if hashes.is_empty() {
            return Err(Error::Funding(format!(
                "Faucet returned no transactions for {}",
                address
            )));
        }

        Ok(hashes)
    }
}
