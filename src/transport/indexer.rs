//! GraphQL indexer client
//!
//! Reads transaction history and balance snapshots from the indexer.

use super::node::read_json;
use super::{AssetActivity, BalanceEntry, TransactionRecord};
use crate::account::Address;
use crate::{Error, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

const ACCOUNT_TRANSACTIONS_QUERY: &str = r#"
    query AccountTransactions($account: String, $limit: Int) {
        account_transactions(
            where: { account_address: { _eq: $account } }
            order_by: { transaction_version: desc }
            limit: $limit
        ) {
            transaction_version
            fungible_asset_activities {
                transaction_version
                asset_type
                amount
                type
                owner_address
                entry_function_id_str
                is_gas_fee
            }
        }
    }
"#;

const ASSET_ACTIVITIES_QUERY: &str = r#"
    query FungibleAssetActivities($version: bigint!) {
        fungible_asset_activities(where: { transaction_version: { _eq: $version } }) {
            transaction_version
            asset_type
            amount
            type
            owner_address
            entry_function_id_str
            is_gas_fee
        }
    }
"#;

const BALANCES_QUERY: &str = r#"
    query FungibleAssetBalances($account: String, $limit: Int) {
        current_fungible_asset_balances(
            where: { owner_address: { _eq: $account } }
            limit: $limit
            order_by: { amount: desc }
        ) {
            asset_type
            amount
        }
    }
"#;

#[derive(Debug, Deserialize)]
struct AccountTransactionRow {
    #[serde(deserialize_with = "super::de::u64_any")]
    transaction_version: u64,
    #[serde(default)]
    fungible_asset_activities: Vec<AssetActivity>,
}

/// GraphQL response structure
#[derive(Debug, Deserialize)]
struct GraphQLResponse {
    data: Option<Value>,
    errors: Option<Vec<GraphQLError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQLError {
    message: String,
}

/// Client for the indexer's GraphQL endpoint
#[derive(Clone)]
pub struct IndexerClient {
    client: Client,
    endpoint: String,
    balance_limit: u32,
}

impl IndexerClient {
    pub fn new(client: Client, endpoint: impl Into<String>, balance_limit: u32) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            balance_limit,
        }
    }

    /// Execute a raw GraphQL query and return its `data` object
    async fn query(&self, query: &str, variables: Value) -> Result<Value> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({
                "query": query,
                "variables": variables
            }))
            .send()
            .await
            .map_err(|e| Error::Query(format!("GraphQL request failed: {}", e)))?;

        let result: GraphQLResponse = read_json(response).await.map_err(Error::Query)?;

        if let Some(errors) = result.errors {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(Error::Query(format!("GraphQL errors: {}", messages.join(", "))));
        }

        result
            .data
            .ok_or_else(|| Error::Query("No data in GraphQL response".to_string()))
    }

    /// Pull a list field out of `data`, treating a missing or null field as empty
    fn rows<T: for<'de> Deserialize<'de>>(data: &Value, field: &str) -> Result<Vec<T>> {
        match data.get(field) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(rows) => serde_json::from_value(rows.clone())
                .map_err(|e| Error::Query(format!("Unexpected {} shape: {}", field, e))),
        }
    }

    /// Newest-first transactions touching `address`
    pub async fn account_transactions(
        &self,
        address: &Address,
        limit: u32,
    ) -> Result<Vec<TransactionRecord>> {
        let variables = json!({ "account": address.to_string(), "limit": limit });
        let data = self.query(ACCOUNT_TRANSACTIONS_QUERY, variables).await?;

        let rows: Vec<AccountTransactionRow> = Self::rows(&data, "account_transactions")?;
        Ok(rows
            .iter()
            .map(|row| {
                TransactionRecord::from_activities(
                    row.transaction_version,
                    &row.fungible_asset_activities,
                )
            })
            .collect())
    }

    /// Asset activities recorded at one version
    pub async fn fungible_asset_activities(&self, version: u64) -> Result<Vec<AssetActivity>> {
        let data = self
            .query(ASSET_ACTIVITIES_QUERY, json!({ "version": version }))
            .await?;
        Self::rows(&data, "fungible_asset_activities")
    }

    /// Current balances, largest first
    pub async fn current_balances(&self, address: &Address) -> Result<Vec<BalanceEntry>> {
        let variables = json!({ "account": address.to_string(), "limit": self.balance_limit });
        let data = self.query(BALANCES_QUERY, variables).await?;
        Self::rows(&data, "current_fungible_asset_balances")
    }
}
