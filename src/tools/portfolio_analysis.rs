//! Lists the current asset balances of an account

use super::types::{input_schema, parse_input, AccountAddressInput};
use super::{AgentTool, TOOL_PORTFOLIO_ANALYSIS};
use crate::analysis::analyze_portfolio;
use crate::query::QueryService;
use crate::Result;
use async_trait::async_trait;
use serde_json::Value;

pub struct PortfolioAnalysisTool {
    queries: QueryService,
}

impl PortfolioAnalysisTool {
    pub fn new(queries: QueryService) -> Self {
        Self { queries }
    }
}

#[async_trait]
impl AgentTool for PortfolioAnalysisTool {
    fn name(&self) -> &'static str {
        TOOL_PORTFOLIO_ANALYSIS
    }

    fn description(&self) -> &'static str {
        "List the current token balances of an account, one entry per asset \
         type, amounts in base units."
    }

    fn input_schema(&self) -> Value {
        input_schema::<AccountAddressInput>()
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let input: AccountAddressInput = parse_input(args)?;
        let balances = analyze_portfolio(&self.queries, &input.address()?).await?;
        Ok(serde_json::to_value(balances)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QueryConfig;
    use crate::query::testing::ScriptedTransport;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_returns_balance_list() {
        let queries = QueryService::new(
            Arc::new(ScriptedTransport::with_amounts(&[], &[250])),
            &QueryConfig::default(),
        );
        let output = PortfolioAnalysisTool::new(queries)
            .execute(json!({ "account_address": "0xa11ce" }))
            .await
            .unwrap();

        assert_eq!(
            output,
            json!([{ "asset_type": "0xcafe::asset_0::Coin", "amount": 250 }])
        );
    }
}
