//! Bootstrap flow: create accounts, fund them, then run a chain of transfers

use super::AccountOrchestrator;
use crate::account::LocalAccount;
use crate::transport::TransactionHash;
use crate::{Error, Result};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// An account to create and how much to ask the faucet for
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedAccount {
    pub label: String,
    pub funding: u64,
}

/// A transfer between two planned accounts, by label
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedTransfer {
    pub from: String,
    pub to: String,
    pub amount: u64,
}

/// Accounts to fund and the ordered transfers to run afterwards
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapPlan {
    pub accounts: Vec<PlannedAccount>,
    pub transfers: Vec<PlannedTransfer>,
}

impl BootstrapPlan {
    /// Three accounts passing coins around in a ring
    pub fn demo() -> Self {
        let account = |label: &str, funding| PlannedAccount {
            label: label.to_string(),
            funding,
        };
        let transfer = |from: &str, to: &str, amount| PlannedTransfer {
            from: from.to_string(),
            to: to.to_string(),
            amount,
        };

        Self {
            accounts: vec![
                account("alice", 100_000_000),
                account("bob", 50_000_000),
                account("charles", 10_000_000),
            ],
            transfers: vec![
                transfer("alice", "bob", 5_000_000),
                transfer("bob", "charles", 1_000_000),
                transfer("charles", "alice", 500_000),
            ],
        }
    }

    fn validate(&self) -> Result<()> {
        let mut labels = HashSet::new();
        for account in &self.accounts {
            if !labels.insert(account.label.as_str()) {
                return Err(Error::InvalidArgument(format!(
                    "Duplicate account label: {}",
                    account.label
                )));
            }
        }

        for transfer in &self.transfers {
            for label in [&transfer.from, &transfer.to] {
                if !labels.contains(label.as_str()) {
                    return Err(Error::InvalidArgument(format!(
                        "Transfer refers to unknown account: {}",
                        label
                    )));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct BootstrappedAccount {
    pub label: String,
    pub account: LocalAccount,
    /// Whether the faucet request settled
    pub funded: bool,
}

/// What happened to one planned transfer
#[derive(Debug, Clone, Serialize)]
pub struct TransferOutcome {
    pub from: String,
    pub to: String,
    pub amount: u64,
    /// Hash of the settled transaction, or why it failed
    pub result: std::result::Result<TransactionHash, String>,
}

impl TransferOutcome {
    pub fn hash(&self) -> Option<&TransactionHash> {
        self.result.as_ref().ok()
    }
}

#[derive(Debug)]
pub struct BootstrapReport {
    pub accounts: Vec<BootstrappedAccount>,
    pub transfers: Vec<TransferOutcome>,
}

impl BootstrapReport {
    pub fn account(&self, label: &str) -> Option<&LocalAccount> {
        self.accounts
            .iter()
            .find(|a| a.label == label)
            .map(|a| &a.account)
    }

    /// Transfers that did not settle
    pub fn failed_transfers(&self) -> impl Iterator<Item = &TransferOutcome> {
        self.transfers.iter().filter(|t| t.result.is_err())
    }
}

impl AccountOrchestrator {
    /// Run a bootstrap plan
    ///
    /// Funding requests for distinct accounts are independent and issued
    /// together. Transfers run strictly in plan order, each awaited before the
    /// next, since a later transfer may spend what an earlier one delivered.
    /// A failed funding request or transfer is recorded in the report and the
    /// rest of the plan still runs; only an invalid plan is an error.
    pub async fn bootstrap(&self, plan: &BootstrapPlan) -> Result<BootstrapReport> {
        plan.validate()?;

        let created: Vec<LocalAccount> = plan
            .accounts
            .iter()
            .map(|_| self.create_account())
            .collect();
        for (account, planned) in created.iter().zip(&plan.accounts) {
            tracing::info!(
                label = %planned.label,
                address = %account.address(),
                "Bootstrap account"
            );
        }

        let funding = join_all(
            created
                .iter()
                .zip(&plan.accounts)
                .map(|(account, planned)| self.fund(account, planned.funding)),
        )
        .await;

        let accounts = created
            .into_iter()
            .zip(&plan.accounts)
            .zip(funding)
            .map(|((account, planned), funded)| BootstrappedAccount {
                label: planned.label.clone(),
                account,
                funded: funded.is_ok(),
            })
            .collect();

        let mut report = BootstrapReport {
            accounts,
            transfers: Vec::with_capacity(plan.transfers.len()),
        };

        for planned in &plan.transfers {
            let unknown =
                |label: &str| Error::InvalidArgument(format!("Unknown account: {}", label));
            let sender = report
                .account(&planned.from)
                .ok_or_else(|| unknown(&planned.from))?;
            let recipient = report
                .account(&planned.to)
                .ok_or_else(|| unknown(&planned.to))?
                .address();

            let result = self
                .transfer(sender, &recipient, planned.amount)
                .await
                .map_err(|e| e.to_string());
            report.transfers.push(TransferOutcome {
                from: planned.from.clone(),
                to: planned.to.clone(),
                amount: planned.amount,
                result,
            });
        }

        let failed = report.failed_transfers().count();
        if failed > 0 {
            tracing::warn!(
                failed,
                total = report.transfers.len(),
                "Bootstrap finished with failed transfers"
            );
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::testing::ScriptedTransport;
    use crate::transport::{PaperLedger, Transport};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_demo_plan_final_balances() {
        let ledger = PaperLedger::new();
        let orchestrator = AccountOrchestrator::new(Arc::new(ledger.clone()));

        let report = orchestrator.bootstrap(&BootstrapPlan::demo()).await.unwrap();
        assert_eq!(report.transfers.len(), 3);
        assert_eq!(report.failed_transfers().count(), 0);
        assert!(report.accounts.iter().all(|a| a.funded));

        let balance = |label: &str| {
            let address = report.account(label).unwrap().address();
            let ledger = ledger.clone();
            async move { ledger.account_balance(&address).await.unwrap() }
        };

        assert_eq!(balance("alice").await, 95_500_000);
        assert_eq!(balance("bob").await, 54_000_000);
        assert_eq!(balance("charles").await, 10_500_000);
    }

    #[tokio::test]
    async fn test_transfer_hashes_appear_in_recipient_history() {
        let ledger = PaperLedger::new();
        let orchestrator = AccountOrchestrator::new(Arc::new(ledger.clone()));
        let report = orchestrator.bootstrap(&BootstrapPlan::demo()).await.unwrap();

        let alice_to_bob = report.transfers[0].hash().unwrap();
        let bob = report.account("bob").unwrap().address();
        let history = ledger.query_transactions(&bob, 10).await.unwrap();

        // faucet credit, alice -> bob, bob -> charles
        assert_eq!(history.len(), 3);
        assert_eq!(history[1].amount, 5_000_000);
        assert_eq!(history[1].hash.as_ref(), Some(alice_to_bob));
        assert!(history
            .iter()
            .any(|record| record.hash.as_ref() == report.transfers[1].hash()));
    }

    #[tokio::test]
    async fn test_failed_transfer_does_not_stop_independent_ones() {
        let plan = BootstrapPlan {
            accounts: vec![
                PlannedAccount { label: "a".into(), funding: 10 },
                PlannedAccount { label: "b".into(), funding: 0 },
                PlannedAccount { label: "c".into(), funding: 0 },
            ],
            transfers: vec![
                PlannedTransfer { from: "b".into(), to: "c".into(), amount: 5 },
                PlannedTransfer { from: "a".into(), to: "c".into(), amount: 5 },
            ],
        };

        let ledger = PaperLedger::new();
        let orchestrator = AccountOrchestrator::new(Arc::new(ledger.clone()));
        let report = orchestrator.bootstrap(&plan).await.unwrap();

        assert_eq!(report.transfers.len(), 2);
        assert!(report.transfers[0].result.is_err());
        assert!(report.transfers[1].hash().is_some());
        assert_eq!(report.failed_transfers().count(), 1);

        let c = report.account("c").unwrap().address();
        assert_eq!(ledger.account_balance(&c).await.unwrap(), 5);
        let a = report.account("a").unwrap().address();
        assert_eq!(ledger.account_balance(&a).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_failed_funding_is_recorded() {
        let orchestrator = AccountOrchestrator::new(Arc::new(ScriptedTransport::default()));
        let report = orchestrator.bootstrap(&BootstrapPlan::demo()).await.unwrap();

        assert_eq!(report.accounts.len(), 3);
        assert!(report.accounts.iter().all(|a| !a.funded));
        assert_eq!(report.failed_transfers().count(), 3);
    }

    #[tokio::test]
    async fn test_plan_with_unknown_label_is_rejected() {
        let mut plan = BootstrapPlan::demo();
        plan.transfers.push(PlannedTransfer {
            from: "alice".into(),
            to: "mallory".into(),
            amount: 1,
        });

        let orchestrator = AccountOrchestrator::new(Arc::new(PaperLedger::new()));
        let err = orchestrator.bootstrap(&plan).await.unwrap_err();
        assert!(err.to_string().contains("mallory"));
    }
}
