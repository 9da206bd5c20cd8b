//! Flags recent transactions moving unusually large amounts

use super::types::{input_schema, parse_input, AccountAddressInput};
use super::{AgentTool, TOOL_TRANSACTION_MONITORING};
use crate::analysis::monitor_transactions;
use crate::config::AnalysisConfig;
use crate::query::QueryService;
use crate::Result;
use async_trait::async_trait;
use serde_json::Value;

pub struct TransactionMonitoringTool {
    queries: QueryService,
    config: AnalysisConfig,
}

impl TransactionMonitoringTool {
    pub fn new(queries: QueryService, config: AnalysisConfig) -> Self {
        Self { queries, config }
    }
}

#[async_trait]
impl AgentTool for TransactionMonitoringTool {
    fn name(&self) -> &'static str {
        TOOL_TRANSACTION_MONITORING
    }

    fn description(&self) -> &'static str {
        "Scan the most recent transactions of an account and report any that \
         move an unusually large amount."
    }

    fn input_schema(&self) -> Value {
        input_schema::<AccountAddressInput>()
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let input: AccountAddressInput = parse_input(args)?;
        let address = input.address()?;

        let report = monitor_transactions(&self.queries, &self.config, &address).await?;
        Ok(Value::String(report.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QueryConfig;
    use crate::query::testing::ScriptedTransport;
    use serde_json::json;
    use std::sync::Arc;

    fn tool(transport: ScriptedTransport) -> TransactionMonitoringTool {
        TransactionMonitoringTool::new(
            QueryService::new(Arc::new(transport), &QueryConfig::default()),
            AnalysisConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_reports_sentinel_string() {
        let output = tool(ScriptedTransport::with_amounts(&[100], &[]))
            .execute(json!({ "account_address": "0xa11ce" }))
            .await
            .unwrap();
        assert_eq!(output, json!("No unusual activity detected."));
    }

    #[tokio::test]
    async fn test_reports_flagged_transactions() {
        let output = tool(ScriptedTransport::with_amounts(&[3_000_000], &[]))
            .execute(json!({ "account_address": "0xa11ce" }))
            .await
            .unwrap();
        let text = output.as_str().unwrap();
        assert!(text.starts_with("Unusual activity detected: "));
        assert!(text.contains("3000000"));
    }
}
