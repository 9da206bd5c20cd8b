//! Paper ledger
//!
//! An in-memory stand-in for the chain that:
//! - Credits faucet requests instantly
//! - Settles transfers immediately, with no gas fees
//! - Rejects transfers the sender cannot cover, as the real ledger would
//! - Serves history and balances in the same shapes as the indexer
//!
//! Nothing is signed and nothing leaves the process.

use super::{
    AssetActivity, BalanceEntry, EntryFunctionPayload, TransactionHash, TransactionRecord,
    Transport,
};
use crate::account::{Address, LocalAccount};
use crate::{Error, Result};
use async_trait::async_trait;
use sha3::{Digest, Sha3_256};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// The single asset tracked by the paper ledger
pub const NATIVE_COIN: &str = "0x1::aptos_coin::AptosCoin";

const FAUCET_FUNCTION: &str = "0x1::aptos_coin::mint";
const TRANSFER_FUNCTION: &str = "0x1::aptos_account::transfer";

#[derive(Debug, Default)]
struct LedgerState {
    balances: HashMap<Address, u64>,
    /// Versions touching each address, oldest first
    history: HashMap<Address, Vec<u64>>,
    activities: BTreeMap<u64, Vec<AssetActivity>>,
    /// Hashes of user transactions; faucet credits have none
    hashes: HashMap<u64, TransactionHash>,
    next_version: u64,
}

impl LedgerState {
    fn record(&mut self, activities: Vec<AssetActivity>, touched: &[Address]) -> u64 {
        let version = self.next_version;
        self.next_version += 1;

        for address in touched {
            let versions = self.history.entry(*address).or_default();
            if versions.last() != Some(&version) {
                versions.push(version);
            }
        }
        self.activities.insert(version, activities);
        version
    }
}

fn activity(
    version: u64,
    activity_type: &str,
    owner: &Address,
    amount: u64,
    function: &str,
) -> AssetActivity {
    AssetActivity {
        transaction_version: version,
        asset_type: Some(NATIVE_COIN.to_string()),
        amount: Some(amount),
        activity_type: activity_type.to_string(),
        owner_address: Some(owner.to_string()),
        entry_function_id_str: Some(function.to_string()),
        is_gas_fee: false,
    }
}

/// Thread-safe in-memory ledger
#[derive(Clone, Default)]
pub struct PaperLedger {
    state: Arc<RwLock<LedgerState>>,
}

impl PaperLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn hash_for(version: u64, parts: &[&[u8]]) -> TransactionHash {
        let mut hasher = Sha3_256::new();
        hasher.update(version.to_be_bytes());
        for part in parts {
            hasher.update(part);
        }
        TransactionHash(format!("0x{}", hex::encode(hasher.finalize())))
    }
}

#[async_trait]
impl Transport for PaperLedger {
    async fn submit_transfer(
        &self,
        sender: &LocalAccount,
        recipient: &Address,
        amount: u64,
    ) -> Result<TransactionHash> {
        let from = sender.address();
        let mut state = self.state.write().await;

        let available = state.balances.get(&from).copied().unwrap_or(0);
        if available < amount {
            return Err(Error::Submission(format!(
                "Move abort in 0x1::coin: EINSUFFICIENT_BALANCE ({} has {}, needs {})",
                from, available, amount
            )));
        }

        if from != *recipient {
            let recipient_balance = state.balances.get(recipient).copied().unwrap_or(0);
            let credited = recipient_balance.checked_add(amount).ok_or_else(|| {
                Error::Submission(format!("Balance overflow crediting {}", recipient))
            })?;

            state.balances.insert(from, available - amount);
            state.balances.insert(*recipient, credited);
        }

        let version = state.next_version;
        let activities = vec![
            activity(version, "0x1::coin::WithdrawEvent", &from, amount, TRANSFER_FUNCTION),
            activity(version, "0x1::coin::DepositEvent", recipient, amount, TRANSFER_FUNCTION),
        ];
        state.record(activities, &[from, *recipient]);

        let hash = Self::hash_for(
            version,
            &[from.as_bytes(), recipient.as_bytes(), &amount.to_be_bytes()],
        );
        state.hashes.insert(version, hash.clone());
        tracing::debug!(%from, to = %recipient, amount, version, %hash, "Paper transfer settled");
        Ok(hash)
    }

    async fn submit_entry_function(
        &self,
        sender: &LocalAccount,
        payload: EntryFunctionPayload,
    ) -> Result<TransactionHash> {
        tracing::warn!(
            sender = %sender.address(),
            function = %payload.function,
            "Paper ledger only executes coin transfers"
        );
        Err(Error::Submission(format!("Paper ledger cannot execute {}", payload.function)))
    }

    async fn query_transactions(
        &self,
        address: &Address,
        limit: u32,
    ) -> Result<Vec<TransactionRecord>> {
        let state = self.state.read().await;
        let Some(versions) = state.history.get(address) else {
            return Ok(Vec::new());
        };

        Ok(versions
            .iter()
            .rev()
            .take(limit as usize)
            .map(|version| {
                let activities = state
                    .activities
                    .get(version)
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                TransactionRecord {
                    hash: state.hashes.get(version).cloned(),
                    ..TransactionRecord::from_activities(*version, activities)
                }
            })
            .collect())
    }

    async fn query_balances(&self, address: &Address) -> Result<Vec<BalanceEntry>> {
        let state = self.state.read().await;
        Ok(state
            .balances
            .get(address)
            .map(|amount| BalanceEntry {
                asset_type: NATIVE_COIN.to_string(),
                amount: *amount,
            })
            .into_iter()
            .collect())
    }

    async fn fund_account(&self, address: &Address, amount: u64) -> Result<()> {
        let mut state = self.state.write().await;

        let current = state.balances.get(address).copied().unwrap_or(0);
        let funded = current
            .checked_add(amount)
            .ok_or_else(|| Error::Funding(format!("Balance overflow funding {}", address)))?;
        state.balances.insert(*address, funded);

        let version = state.next_version;
        let activities = vec![activity(
            version,
            "0x1::coin::DepositEvent",
            address,
            amount,
            FAUCET_FUNCTION,
        )];
        state.record(activities, &[*address]);

        tracing::debug!(%address, amount, version, "Paper faucet credited account");
        Ok(())
    }

    async fn account_balance(&self, address: &Address) -> Result<u64> {
        Ok(self
            .state
            .read()
            .await
            .balances
            .get(address)
            .copied()
            .unwrap_or(0))
    }

    async fn asset_activities(&self, version: u64) -> Result<Vec<AssetActivity>> {
        Ok(self
            .state
            .read()
            .await
            .activities
            .get(&version)
            .cloned()
            .unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "paper"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_address_has_empty_history_and_balances() {
        let ledger = PaperLedger::new();
        let address = LocalAccount::generate().address();

        assert!(ledger.query_transactions(&address, 10).await.unwrap().is_empty());
        assert!(ledger.query_balances(&address).await.unwrap().is_empty());
        assert_eq!(ledger.account_balance(&address).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_transfer_moves_funds_and_appears_in_both_histories() {
        let ledger = PaperLedger::new();
        let alice = LocalAccount::generate();
        let bob = LocalAccount::generate();

        ledger.fund_account(&alice.address(), 1_000).await.unwrap();
        let hash = ledger
            .submit_transfer(&alice, &bob.address(), 400)
            .await
            .unwrap();
        assert!(hash.as_str().starts_with("0x"));

        assert_eq!(ledger.account_balance(&alice.address()).await.unwrap(), 600);
        assert_eq!(ledger.account_balance(&bob.address()).await.unwrap(), 400);

        let bob_history = ledger.query_transactions(&bob.address(), 10).await.unwrap();
        assert_eq!(bob_history.len(), 1);
        assert_eq!(bob_history[0].amount, 400);
        assert_eq!(bob_history[0].hash.as_ref(), Some(&hash));
        assert!(bob_history[0].participants.contains(&alice.address()));

        // newest first: transfer, then the faucet credit
        let alice_history = ledger.query_transactions(&alice.address(), 10).await.unwrap();
        assert_eq!(alice_history.len(), 2);
        assert!(alice_history[0].version > alice_history[1].version);
        assert_eq!(alice_history[0].hash.as_ref(), Some(&hash));
        assert_eq!(alice_history[1].amount, 1_000);
        assert!(alice_history[1].hash.is_none());
    }

    #[tokio::test]
    async fn test_underfunded_transfer_is_rejected() {
        let ledger = PaperLedger::new();
        let alice = LocalAccount::generate();
        let bob = LocalAccount::generate();

        ledger.fund_account(&alice.address(), 10).await.unwrap();
        let err = ledger
            .submit_transfer(&alice, &bob.address(), 11)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Submission(_)));
        assert_eq!(ledger.account_balance(&alice.address()).await.unwrap(), 10);
        assert!(ledger.query_transactions(&bob.address(), 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_entry_functions_other_than_transfer_are_rejected() {
        let ledger = PaperLedger::new();
        let alice = LocalAccount::generate();
        ledger.fund_account(&alice.address(), 1_000).await.unwrap();

        let payload = EntryFunctionPayload::managed_coin_initialize(
            &format!("{}::gold::Gold", alice.address()),
            "Gold",
            "GLD",
            8,
            true,
        );
        let err = ledger.submit_entry_function(&alice, payload).await.unwrap_err();

        assert!(matches!(err, Error::Submission(_)));
        assert_eq!(ledger.query_transactions(&alice.address(), 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_history_respects_limit() {
        let ledger = PaperLedger::new();
        let address = LocalAccount::generate().address();
        for amount in 1..=7 {
            ledger.fund_account(&address, amount).await.unwrap();
        }

        let records = ledger.query_transactions(&address, 3).await.unwrap();
        let amounts: Vec<u64> = records.iter().map(|r| r.amount).collect();
        assert_eq!(amounts, vec![7, 6, 5]);
    }

    #[tokio::test]
    async fn test_activities_by_version() {
        let ledger = PaperLedger::new();
        let alice = LocalAccount::generate();
        let bob = LocalAccount::generate();
        ledger.fund_account(&alice.address(), 50).await.unwrap();
        ledger.submit_transfer(&alice, &bob.address(), 20).await.unwrap();

        let version = ledger.query_transactions(&bob.address(), 1).await.unwrap()[0].version;
        let activities = ledger.asset_activities(version).await.unwrap();
        assert_eq!(activities.len(), 2);
        assert!(ledger.asset_activities(999).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_balances_are_stable_between_queries() {
        let ledger = PaperLedger::new();
        let address = LocalAccount::generate().address();
        ledger.fund_account(&address, 123).await.unwrap();

        let first = ledger.query_balances(&address).await.unwrap();
        let second = ledger.query_balances(&address).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first[0].asset_type, NATIVE_COIN);
    }
}
