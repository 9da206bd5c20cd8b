//! Scores an account from its transaction pattern and holdings

use super::types::{input_schema, parse_input, AccountAddressInput};
use super::{AgentTool, TOOL_RISK_ASSESSMENT};
use crate::analysis::assess_risk;
use crate::config::AnalysisConfig;
use crate::query::QueryService;
use crate::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

pub struct RiskAssessmentTool {
    queries: QueryService,
    config: AnalysisConfig,
}

impl RiskAssessmentTool {
    pub fn new(queries: QueryService, config: AnalysisConfig) -> Self {
        Self { queries, config }
    }
}

#[async_trait]
impl AgentTool for RiskAssessmentTool {
    fn name(&self) -> &'static str {
        TOOL_RISK_ASSESSMENT
    }

    fn description(&self) -> &'static str {
        "Assess an account's risk from its recent transactions and portfolio \
         composition. Returns total tokens held, the number of high-value \
         transactions and a score between 0 and 1."
    }

    fn input_schema(&self) -> Value {
        input_schema::<AccountAddressInput>()
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let input: AccountAddressInput = parse_input(args)?;
        let assessment = assess_risk(&self.queries, &self.config, &input.address()?).await?;

        // u128 totals exceed what JSON numbers carry safely
        Ok(json!({
            "total_tokens": assessment.total_tokens.to_string(),
            "high_value_transactions": assessment.high_value_transactions,
            "risk_score": assessment.risk_score,
        }))
    }
}
