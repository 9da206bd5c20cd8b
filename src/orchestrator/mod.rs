//! Account orchestration
//!
//! Creates local accounts, asks the faucet for funds, moves coins between
//! accounts and runs token issuance and swaps. Balances are never checked
//! locally: the ledger is authoritative and rejects transfers the sender
//! cannot cover.

mod bootstrap;
mod tokens;

pub use bootstrap::{
    BootstrapPlan, BootstrapReport, BootstrappedAccount, PlannedAccount, PlannedTransfer,
    TransferOutcome,
};
pub use tokens::{IssuedToken, TokenSpec};

use crate::account::{Address, LocalAccount};
use crate::transport::{TransactionHash, Transport};
use crate::Result;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AccountOrchestrator {
    transport: Arc<dyn Transport>,
}

impl AccountOrchestrator {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Generate a fresh keypair. No network call.
    pub fn create_account(&self) -> LocalAccount {
        let account = LocalAccount::generate();
        info!(address = %account.address(), "Created account");
        account
    }

    /// Request faucet credit for `account`. Not retried.
    pub async fn fund(&self, account: &LocalAccount, amount: u64) -> Result<()> {
        let address = account.address();
        match self.transport.fund_account(&address, amount).await {
            Ok(()) => {
                info!(%address, amount, "Funded account");
                Ok(())
            }
            Err(e) => {
                warn!(%address, amount, error = %e, "Funding failed");
                Err(e)
            }
        }
    }

    /// Transfer coins and wait for settlement
    ///
    /// Callers issuing a transfer that depends on an earlier one (same
    /// account) must await the earlier call first.
    pub async fn transfer(
        &self,
        sender: &LocalAccount,
        recipient: &Address,
        amount: u64,
    ) -> Result<TransactionHash> {
        let hash = self
            .transport
            .submit_transfer(sender, recipient, amount)
            .await
            .inspect_err(|e| {
                warn!(
                    from = %sender.address(),
                    to = %recipient,
                    amount,
                    error = %e,
                    "Transfer failed"
                )
            })?;

        info!(
            from = %sender.address(),
            to = %recipient,
            amount,
            hash = %hash,
            "Transfer settled"
        );
        Ok(hash)
    }

    /// Native coin balance
    pub async fn balance(&self, address: &Address) -> Result<u64> {
        self.transport.account_balance(address).await
    }
}
