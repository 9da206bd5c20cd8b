//! Token issuance and swaps
//!
//! Both run as plain entry function calls signed by a local account and are
//! awaited until committed, like transfers.

use super::AccountOrchestrator;
use crate::account::{Address, LocalAccount};
use crate::transport::{EntryFunctionPayload, TransactionHash};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// A managed coin to issue
///
/// `coin_type` names a struct declared by a module the issuer has already
/// published, e.g. `0xcafe::gold::Gold` issued by `0xcafe`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSpec {
    pub coin_type: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    /// Minted to the issuer after initialization; zero mints nothing
    pub initial_supply: u64,
}

impl TokenSpec {
    fn validate(&self, issuer: &Address) -> Result<()> {
        if self.name.is_empty() || self.symbol.is_empty() {
            return Err(Error::InvalidArgument(
                "Token name and symbol must not be empty".to_string(),
            ));
        }

        let mut parts = self.coin_type.split("::");
        let (Some(owner), Some(module), Some(name), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(Error::InvalidArgument(format!(
                "Coin type must look like <address>::<module>::<struct>, got {}",
                self.coin_type
            )));
        };
        if module.is_empty() || name.is_empty() {
            return Err(Error::InvalidArgument(format!("Incomplete coin type: {}", self.coin_type)));
        }

        let owner: Address = owner.parse()?;
        if owner != *issuer {
            return Err(Error::InvalidArgument(format!(
                "Coin type {} is declared by {}, not by the issuer {}",
                self.coin_type, owner, issuer
            )));
        }
        Ok(())
    }
}

/// Hashes of the transactions that issued a token
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub coin_type: String,
    pub initialize: TransactionHash,
    /// Present when an initial supply was minted
    pub register: Option<TransactionHash>,
    pub mint: Option<TransactionHash>,
}

impl AccountOrchestrator {
    /// Initialize a managed coin and mint its initial supply to the issuer
    ///
    /// Runs `initialize`, then `register` and `mint` when `initial_supply` is
    /// non-zero. Stops at the first step that fails.
    pub async fn create_token(
        &self,
        issuer: &LocalAccount,
        spec: &TokenSpec,
    ) -> Result<IssuedToken> {
        let address = issuer.address();
        spec.validate(&address)?;

        let initialize = self
            .submit(
                issuer,
                EntryFunctionPayload::managed_coin_initialize(
                    &spec.coin_type,
                    &spec.name,
                    &spec.symbol,
                    spec.decimals,
                    true,
                ),
            )
            .await?;

        let (register, mint) = if spec.initial_supply > 0 {
            let register = self
                .submit(issuer, EntryFunctionPayload::managed_coin_register(&spec.coin_type))
                .await?;
            let mint = self
                .submit(
                    issuer,
                    EntryFunctionPayload::managed_coin_mint(
                        &spec.coin_type,
                        &address,
                        spec.initial_supply,
                    ),
                )
                .await?;
            (Some(register), Some(mint))
        } else {
            (None, None)
        };

        info!(
            issuer = %address,
            coin_type = %spec.coin_type,
            supply = spec.initial_supply,
            "Token created"
        );
        Ok(IssuedToken {
            coin_type: spec.coin_type.clone(),
            initialize,
            register,
            mint,
        })
    }

    /// Swap `amount` of `token_in` for `token_out` through the swap module
    /// published at `contract`
    pub async fn swap_tokens(
        &self,
        trader: &LocalAccount,
        contract: &Address,
        token_in: &str,
        token_out: &str,
        amount: u64,
    ) -> Result<TransactionHash> {
        if amount == 0 {
            return Err(Error::InvalidArgument("Swap amount must be positive".to_string()));
        }
        if token_in == token_out {
            return Err(Error::InvalidArgument(format!("Cannot swap {} for itself", token_in)));
        }

        let hash = self
            .submit(
                trader,
                EntryFunctionPayload::swap_tokens(contract, token_in, token_out, amount),
            )
            .await?;
        info!(
            trader = %trader.address(),
            %contract,
            token_in,
            token_out,
            amount,
            hash = %hash,
            "Swap settled"
        );
        Ok(hash)
    }

    async fn submit(
        &self,
        sender: &LocalAccount,
        payload: EntryFunctionPayload,
    ) -> Result<TransactionHash> {
        let function = payload.function.clone();
        self.transport
            .submit_entry_function(sender, payload)
            .await
            .inspect(|hash| {
                tracing::debug!(sender = %sender.address(), %function, hash = %hash, "Committed")
            })
            .inspect_err(|e| {
                warn!(sender = %sender.address(), %function, error = %e, "Entry function failed")
            })
    }
}
