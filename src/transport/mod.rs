//! Remote chain access
//!
//! `Transport` is the single seam between the agent and the outside world.
//! `AptosTransport` talks to a real node, indexer and faucet; `PaperLedger`
//! keeps an in-memory ledger for offline runs and tests.

mod aptos;
mod faucet;
mod indexer;
mod node;
mod paper;

pub use aptos::AptosTransport;
pub use faucet::FaucetClient;
pub use indexer::IndexerClient;
pub use node::{EntryFunctionPayload, NodeClient, TransactionStatus};
pub use paper::{PaperLedger, NATIVE_COIN};

use crate::account::{Address, LocalAccount};
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hash of a submitted transaction, as returned by the node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionHash(pub String);

impl TransactionHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One fungible asset movement inside a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetActivity {
    #[serde(deserialize_with = "de::u64_any")]
    pub transaction_version: u64,
    #[serde(default)]
    pub asset_type: Option<String>,
    #[serde(default, deserialize_with = "de::opt_u64_any")]
    pub amount: Option<u64>,
    /// e.g. `0x1::coin::WithdrawEvent`, `0x1::fungible_asset::Deposit`
    #[serde(rename = "type")]
    pub activity_type: String,
    #[serde(default)]
    pub owner_address: Option<String>,
    #[serde(default)]
    pub entry_function_id_str: Option<String>,
    #[serde(default)]
    pub is_gas_fee: bool,
}

/// A transaction touching an account, summarised from its asset activities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub version: u64,
    /// Largest non-gas amount moved, in base units
    pub amount: u64,
    pub asset_type: Option<String>,
    pub participants: Vec<Address>,
    pub entry_function: Option<String>,
    /// Known when the source records it; the indexer history query does not
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<TransactionHash>,
}

impl TransactionRecord {
    /// Summarise the activities of one transaction
    ///
    /// A plain transfer shows up as a withdraw and a deposit of the same
    /// amount, so the largest activity is taken rather than the sum. Gas fee
    /// activities are ignored.
    pub fn from_activities(version: u64, activities: &[AssetActivity]) -> Self {
        let principal = activities
            .iter()
            .filter(|a| !a.is_gas_fee)
            .max_by_key(|a| a.amount.unwrap_or(0));

        let mut participants: Vec<Address> = Vec::new();
        for activity in activities {
            let owner = activity
                .owner_address
                .as_deref()
                .and_then(|s| s.parse::<Address>().ok());
            if let Some(owner) = owner {
                if !participants.contains(&owner) {
                    participants.push(owner);
                }
            }
        }

        Self {
            version,
            amount: principal.and_then(|a| a.amount).unwrap_or(0),
            asset_type: principal.and_then(|a| a.asset_type.clone()),
            participants,
            entry_function: activities
                .iter()
                .find_map(|a| a.entry_function_id_str.clone()),
            hash: None,
        }
    }
}

/// Current balance of one asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceEntry {
    pub asset_type: String,
    #[serde(deserialize_with = "de::u64_any")]
    pub amount: u64,
}

/// Everything the agent needs from a chain
///
/// Every call performs I/O against the remote source; nothing is cached.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sign and submit a coin transfer, then wait until it is committed
    ///
    /// Fails with `Error::Submission` when the node rejects the transaction or
    /// it executes unsuccessfully, and with `Error::Timeout` when it is not
    /// committed within the settlement bound.
    async fn submit_transfer(
        &self,
        sender: &LocalAccount,
        recipient: &Address,
        amount: u64,
    ) -> Result<TransactionHash>;

    /// Sign and submit an arbitrary entry function call, then wait until it
    /// is committed
    ///
    /// Same failure modes as `submit_transfer`.
    async fn submit_entry_function(
        &self,
        sender: &LocalAccount,
        payload: EntryFunctionPayload,
    ) -> Result<TransactionHash>;

    /// Most recent transactions first, at most `limit`. Empty when there is no history.
    async fn query_transactions(
        &self,
        address: &Address,
        limit: u32,
    ) -> Result<Vec<TransactionRecord>>;

    /// Current fungible asset balances
    async fn query_balances(&self, address: &Address) -> Result<Vec<BalanceEntry>>;

    /// Ask the faucet to credit `address`; waits for the faucet transactions
    async fn fund_account(&self, address: &Address, amount: u64) -> Result<()>;

    /// Native coin balance read from the node
    async fn account_balance(&self, address: &Address) -> Result<u64>;

    /// All asset activities recorded at one ledger version
    async fn asset_activities(&self, version: u64) -> Result<Vec<AssetActivity>>;

    /// Name for logging
    fn name(&self) -> &'static str;
}

/// Indexer numeric columns arrive as JSON numbers or strings depending on type
pub(crate) mod de {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u64),
        String(String),
    }

    impl NumberOrString {
        fn into_u64<E: serde::de::Error>(self) -> Result<u64, E> {
            match self {
                NumberOrString::Number(n) => Ok(n),
                NumberOrString::String(s) => s.parse().map_err(E::custom),
            }
        }
    }

    pub fn u64_any<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        NumberOrString::deserialize(deserializer)?.into_u64()
    }

    pub fn opt_u64_any<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<NumberOrString>::deserialize(deserializer)?
            .map(NumberOrString::into_u64)
            .transpose()
    }
}
