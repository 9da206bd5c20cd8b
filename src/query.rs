//! Read path over the transport
//!
//! Applies default limits and logs failures before handing the typed error
//! back, so callers can tell "no data" (empty) from "query failed" (error).

use crate::account::Address;
use crate::config::QueryConfig;
use crate::transport::{AssetActivity, BalanceEntry, TransactionRecord, Transport};
use crate::Result;
use std::sync::Arc;

#[derive(Clone)]
pub struct QueryService {
    transport: Arc<dyn Transport>,
    default_limit: u32,
}

impl QueryService {
    pub fn new(transport: Arc<dyn Transport>, config: &QueryConfig) -> Self {
        Self {
            transport,
            default_limit: config.default_limit,
        }
    }

    /// Most recent transactions first; `limit` defaults to the configured value (10)
    pub async fn transactions(
        &self,
        address: &Address,
        limit: Option<u32>,
    ) -> Result<Vec<TransactionRecord>> {
        let limit = limit.unwrap_or(self.default_limit);
        self.transport
            .query_transactions(address, limit)
            .await
            .inspect(|records| {
                tracing::debug!(%address, limit, count = records.len(), "Fetched transactions")
            })
            .inspect_err(|e| {
                tracing::warn!(
                    %address,
                    limit,
                    transport = self.transport.name(),
                    error = %e,
                    "Transaction query failed"
                )
            })
    }

    /// Current balances
    pub async fn balances(&self, address: &Address) -> Result<Vec<BalanceEntry>> {
        self.transport
            .query_balances(address)
            .await
            .inspect(|balances| {
                for balance in balances {
                    tracing::debug!(
                        %address,
                        asset_type = %balance.asset_type,
                        amount = balance.amount,
                        "Balance"
                    );
                }
            })
            .inspect_err(|e| {
                tracing::warn!(
                    %address,
                    transport = self.transport.name(),
                    error = %e,
                    "Balance query failed"
                )
            })
    }

    /// Asset activities of one transaction version
    pub async fn asset_activities(&self, version: u64) -> Result<Vec<AssetActivity>> {
        self.transport
            .asset_activities(version)
            .await
            .inspect_err(|e| {
                tracing::warn!(
                    version,
                    transport = self.transport.name(),
                    error = %e,
                    "Asset activity query failed"
                )
            })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! A scripted transport for read-path tests

    use super::*;
    use crate::account::LocalAccount;
    use crate::transport::{EntryFunctionPayload, TransactionHash};
    use crate::Error;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Serves fixed records and balances, or fails every read
    #[derive(Default)]
    pub struct ScriptedTransport {
        pub records: Vec<TransactionRecord>,
        pub balances: Vec<BalanceEntry>,
        pub fail: bool,
        pub seen_limits: Mutex<Vec<u32>>,
    }

    impl ScriptedTransport {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub fn with_amounts(amounts: &[u64], balances: &[u64]) -> Self {
            Self {
                records: amounts
                    .iter()
                    .enumerate()
                    .map(|(i, amount)| TransactionRecord {
                        version: 1_000 - i as u64,
                        amount: *amount,
                        asset_type: Some("0x1::aptos_coin::AptosCoin".to_string()),
                        participants: vec![],
                        entry_function: None,
                        hash: None,
                    })
                    .collect(),
                balances: balances
                    .iter()
                    .enumerate()
                    .map(|(i, amount)| BalanceEntry {
                        asset_type: format!("0xcafe::asset_{}::Coin", i),
                        amount: *amount,
                    })
                    .collect(),
                ..Self::default()
            }
        }

        fn check(&self) -> Result<()> {
            if self.fail {
                Err(Error::Query("indexer unreachable".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn submit_transfer(
            &self,
            _sender: &LocalAccount,
            _recipient: &Address,
            _amount: u64,
        ) -> Result<TransactionHash> {
            Err(Error::Submission("read-only transport".to_string()))
        }

        async fn submit_entry_function(
            &self,
            _sender: &LocalAccount,
            _payload: EntryFunctionPayload,
        ) -> Result<TransactionHash> {
            Err(Error::Submission("read-only transport".to_string()))
        }

        async fn query_transactions(
            &self,
            _address: &Address,
            limit: u32,
        ) -> Result<Vec<TransactionRecord>> {
            self.check()?;
            self.seen_limits.lock().unwrap().push(limit);
            Ok(self.records.iter().take(limit as usize).cloned().collect())
        }

        async fn query_balances(&self, _address: &Address) -> Result<Vec<BalanceEntry>> {
            self.check()?;
            Ok(self.balances.clone())
        }

        async fn fund_account(&self, _address: &Address, _amount: u64) -> Result<()> {
            Err(Error::Funding("read-only transport".to_string()))
        }

        async fn account_balance(&self, _address: &Address) -> Result<u64> {
            self.check()?;
            Ok(self.balances.iter().map(|b| b.amount).sum())
        }

        async fn asset_activities(&self, _version: u64) -> Result<Vec<AssetActivity>> {
            self.check()?;
            Ok(vec![])
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedTransport;
    use super::*;
    use crate::Error;

    fn address() -> Address {
        "0xa11ce".parse().unwrap()
    }

    #[tokio::test]
    async fn test_default_limit_applied() {
        let transport = Arc::new(ScriptedTransport::with_amounts(&[1; 15], &[]));
        let service = QueryService::new(transport.clone(), &QueryConfig::default());

        let records = service.transactions(&address(), None).await.unwrap();
        assert_eq!(records.len(), 10);

        service.transactions(&address(), Some(3)).await.unwrap();
        assert_eq!(*transport.seen_limits.lock().unwrap(), vec![10, 3]);
    }

    #[tokio::test]
    async fn test_failures_propagate_typed() {
        let service = QueryService::new(
            Arc::new(ScriptedTransport::failing()),
            &QueryConfig::default(),
        );

        let err = service.transactions(&address(), None).await.unwrap_err();
        assert!(matches!(err, Error::Query(_)));

        let err = service.balances(&address()).await.unwrap_err();
        assert!(matches!(err, Error::Query(_)));
    }

    #[tokio::test]
    async fn test_empty_history_is_ok() {
        let service = QueryService::new(
            Arc::new(ScriptedTransport::default()),
            &QueryConfig::default(),
        );
        assert!(service.transactions(&address(), None).await.unwrap().is_empty());
    }
}
