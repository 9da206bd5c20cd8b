//! REST node client
//!
//! Transactions are submitted in JSON form. The node's `encode_submission`
//! endpoint returns the exact signing message, so no BCS encoding happens here.

use super::TransactionHash;
use crate::account::{Address, LocalAccount};
use crate::config::{GasConfig, SettlementConfig};
use crate::{Error, Result};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::{Duration, Instant};

const COIN_TRANSFER_FUNCTION: &str = "0x1::aptos_account::transfer";
const COIN_BALANCE_FUNCTION: &str = "0x1::coin::balance";
const APTOS_COIN_TYPE: &str = "0x1::aptos_coin::AptosCoin";
const MANAGED_COIN_MODULE: &str = "0x1::managed_coin";
const SWAP_FUNCTION: &str = "swap::swap_tokens";

/// An entry function call as accepted by the JSON submission API
#[derive(Debug, Clone, Serialize)]
pub struct EntryFunctionPayload {
    #[serde(rename = "type")]
    payload_type: &'static str,
    pub function: String,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<Value>,
}

impl EntryFunctionPayload {
    pub fn new(
        function: impl Into<String>,
        type_arguments: Vec<String>,
        arguments: Vec<Value>,
    ) -> Self {
        Self {
            payload_type: "entry_function_payload",
            function: function.into(),
            type_arguments,
            arguments,
        }
    }

    /// `0x1::aptos_account::transfer(recipient, amount)`
    ///
    /// u64 arguments travel as decimal strings.
    pub fn coin_transfer(recipient: &Address, amount: u64) -> Self {
        Self::new(
            COIN_TRANSFER_FUNCTION,
            vec![],
            vec![json!(recipient.to_string()), json!(amount.to_string())],
        )
    }

    /// `0x1::managed_coin::initialize<CoinType>(name, symbol, decimals, monitor_supply)`
    ///
    /// `vector<u8>` arguments travel hex encoded.
    pub fn managed_coin_initialize(
        coin_type: &str,
        name: &str,
        symbol: &str,
        decimals: u8,
        monitor_supply: bool,
    ) -> Self {
        Self::new(
            format!("{}::initialize", MANAGED_COIN_MODULE),
            vec![coin_type.to_string()],
            vec![
                json!(format!("0x{}", hex::encode(name))),
                json!(format!("0x{}", hex::encode(symbol))),
                json!(decimals),
                json!(monitor_supply),
            ],
        )
    }

    /// `0x1::managed_coin::register<CoinType>()`, opening a coin store for the signer
    pub fn managed_coin_register(coin_type: &str) -> Self {
        Self::new(
            format!("{}::register", MANAGED_COIN_MODULE),
            vec![coin_type.to_string()],
            vec![],
        )
    }

    /// `0x1::managed_coin::mint<CoinType>(recipient, amount)`
    pub fn managed_coin_mint(coin_type: &str, recipient: &Address, amount: u64) -> Self {
        Self::new(
            format!("{}::mint", MANAGED_COIN_MODULE),
            vec![coin_type.to_string()],
            vec![json!(recipient.to_string()), json!(amount.to_string())],
        )
    }

    /// `<contract>::swap::swap_tokens(token_in, token_out, amount)`
    pub fn swap_tokens(contract: &Address, token_in: &str, token_out: &str, amount: u64) -> Self {
        Self::new(
            format!("{}::{}", contract, SWAP_FUNCTION),
            vec![],
            vec![json!(token_in), json!(token_out), json!(amount.to_string())],
        )
    }
}

#[derive(Debug, Clone, Serialize)]
struct UnsignedTransaction {
    sender: String,
    sequence_number: String,
    max_gas_amount: String,
    gas_unit_price: String,
    expiration_timestamp_secs: String,
    payload: EntryFunctionPayload,
}

#[derive(Debug, Serialize)]
struct SignedTransaction<'a> {
    #[serde(flatten)]
    raw: &'a UnsignedTransaction,
    signature: TransactionSignature,
}

#[derive(Debug, Serialize)]
struct TransactionSignature {
    #[serde(rename = "type")]
    signature_type: &'static str,
    public_key: String,
    signature: String,
}

#[derive(Debug, Deserialize)]
struct AccountResource {
    sequence_number: String,
}

#[derive(Debug, Deserialize)]
struct GasEstimate {
    gas_estimate: u64,
}

#[derive(Debug, Deserialize)]
struct PendingTransaction {
    hash: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Where a submitted transaction currently stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    /// Unknown to the node yet, or still in the mempool
    Pending,
    /// Committed; `success` is false when execution aborted
    Committed { success: bool, vm_status: String },
}

/// Client for the node REST API
#[derive(Clone)]
pub struct NodeClient {
    client: Client,
    base_url: String,
}

impl NodeClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Current sequence number of an on-chain account
    pub async fn sequence_number(&self, address: &Address) -> std::result::Result<u64, String> {
        let response = self
            .client
            .get(self.url(&format!("accounts/{}", address)))
            .send()
            .await
            .map_err(|e| format!("Account request failed: {}", e))?;

        let account: AccountResource = read_json(response).await?;
        account
            .sequence_number
            .parse()
            .map_err(|e| format!("Invalid sequence number: {}", e))
    }

    /// Gas unit price suggested by the node
    pub async fn estimate_gas_price(&self) -> std::result::Result<u64, String> {
        let response = self
            .client
            .get(self.url("estimate_gas_price"))
            .send()
            .await
            .map_err(|e| format!("Gas estimate request failed: {}", e))?;

        let estimate: GasEstimate = read_json(response).await?;
        Ok(estimate.gas_estimate)
    }

    /// Native coin balance via the `0x1::coin::balance` view function
    pub async fn coin_balance(&self, address: &Address) -> Result<u64> {
        let body = json!({
            "function": COIN_BALANCE_FUNCTION,
            "type_arguments": [APTOS_COIN_TYPE],
            "arguments": [address.to_string()]
        });

        let response = self
            .client
            .post(self.url("view"))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Query(format!("View request failed: {}", e)))?;

        let values: Vec<Value> = read_json(response).await.map_err(Error::Query)?;
        values
            .first()
            .and_then(|v| match v {
                Value::String(s) => s.parse().ok(),
                Value::Number(n) => n.as_u64(),
                _ => None,
            })
            .ok_or_else(|| Error::Query(format!("Unexpected view result: {:?}", values)))
    }

    /// Build, sign and submit an entry function call from `sender`
    ///
    /// Returns as soon as the node accepts the transaction; see
    /// [`NodeClient::wait_for_transaction`] for settlement.
    pub async fn submit_entry_function(
        &self,
        sender: &LocalAccount,
        payload: EntryFunctionPayload,
        gas: &GasConfig,
    ) -> Result<TransactionHash> {
        let sender_address = sender.address();

        let sequence_number = self
            .sequence_number(&sender_address)
            .await
            .map_err(Error::Submission)?;

        let gas_unit_price = match gas.gas_unit_price {
            Some(price) => price,
            None => self.estimate_gas_price().await.map_err(Error::Submission)?,
        };

        let expiration = chrono::Utc::now().timestamp() as u64 + gas.expiration_secs;

        let raw = UnsignedTransaction {
            sender: sender_address.to_string(),
            sequence_number: sequence_number.to_string(),
            max_gas_amount: gas.max_gas_amount.to_string(),
            gas_unit_price: gas_unit_price.to_string(),
            expiration_timestamp_secs: expiration.to_string(),
            payload,
        };

        let signing_message = self.encode_submission(&raw).await.map_err(Error::Submission)?;
        let signature = sender.sign(&signing_message);

        let signed = SignedTransaction {
            raw: &raw,
            signature: TransactionSignature {
                signature_type: "ed25519_signature",
                public_key: sender.public_key_hex(),
                signature: format!("0x{}", hex::encode(signature.to_bytes())),
            },
        };

        let response = self
            .client
            .post(self.url("transactions"))
            .json(&signed)
            .send()
            .await
            .map_err(|e| Error::Submission(format!("Submit request failed: {}", e)))?;

        let pending: PendingTransaction = read_json(response).await.map_err(Error::Submission)?;

        tracing::debug!(
            sender = %sender_address,
            sequence_number,
            hash = %pending.hash,
            "Transaction accepted by node"
        );

        Ok(TransactionHash(pending.hash))
    }

    /// Ask the node for the BCS signing message of a transaction
    async fn encode_submission(
        &self,
        raw: &UnsignedTransaction,
    ) -> std::result::Result<Vec<u8>, String> {
        let response = self
            .client
            .post(self.url("transactions/encode_submission"))
            .json(raw)
            .send()
            .await
            .map_err(|e| format!("Encode request failed: {}", e))?;

        let encoded: String = read_json(response).await?;
        let digits = encoded.strip_prefix("0x").unwrap_or(&encoded);
        hex::decode(digits).map_err(|e| format!("Invalid signing message: {}", e))
    }

    /// Look up a transaction by hash
    pub async fn transaction_status(
        &self,
        hash: &TransactionHash,
    ) -> std::result::Result<TransactionStatus, String> {
        let response = self
            .client
            .get(self.url(&format!("transactions/by_hash/{}", hash)))
            .send()
            .await
            .map_err(|e| format!("Transaction lookup failed: {}", e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(TransactionStatus::Pending);
        }

        let txn: Value = read_json(response).await?;
        if txn.get("type").and_then(|t| t.as_str()) == Some("pending_transaction") {
            return Ok(TransactionStatus::Pending);
        }

        Ok(TransactionStatus::Committed {
            success: txn.get("success").and_then(|s| s.as_bool()).unwrap_or(false),
            vm_status: txn
                .get("vm_status")
                .and_then(|s| s.as_str())
                .unwrap_or("unknown")
                .to_string(),
        })
    }

    /// Poll until the transaction is committed or the settlement bound passes
    pub async fn wait_for_transaction(
        &self,
        hash: &TransactionHash,
        settlement: &SettlementConfig,
    ) -> Result<()> {
        let timeout = Duration::from_secs(settlement.timeout_secs);
        let poll_interval = Duration::from_millis(settlement.poll_interval_ms);
        let start = Instant::now();

        loop {
            match self.transaction_status(hash).await {
                Ok(TransactionStatus::Committed { success: true, .. }) => {
                    tracing::debug!(
                        hash = %hash,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "Transaction committed"
                    );
                    return Ok(());
                }
                Ok(TransactionStatus::Committed { vm_status, .. }) => {
                    return Err(Error::Submission(format!(
                        "Transaction {} failed: {}",
                        hash, vm_status
                    )));
                }
                Ok(TransactionStatus::Pending) => {}
                Err(e) => {
                    tracing::warn!(hash = %hash, error = %e, "Settlement poll failed");
                }
            }

            if start.elapsed() >= timeout {
                return Err(Error::Timeout {
                    hash: hash.to_string(),
                    waited_secs: settlement.timeout_secs,
                });
            }
            tokio::time::sleep(poll_interval).await;
        }
    }
}

/// Decode a successful JSON body or turn the node's error body into a message
pub(super) async fn read_json<T: DeserializeOwned>(
    response: Response,
) -> std::result::Result<T, String> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiError>(&body)
            .map(|e| e.message)
            .unwrap_or(body);
        return Err(format!("HTTP {}: {}", status, message));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| format!("Failed to parse response: {}", e))
}
