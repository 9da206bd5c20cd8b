//! Agent-callable tools
//!
//! Each tool wraps one analysis function behind a JSON interface: a name, a
//! description, a JSON schema for its input and an `execute` entry point.
//! Tools are dispatched through the `ToolRegistry`, which runs the
//! interceptor pipeline around every call.

mod portfolio_analysis;
mod registry;
mod risk_assessment;
mod transaction_monitoring;
mod types;

pub use portfolio_analysis::PortfolioAnalysisTool;
pub use registry::ToolRegistry;
pub use risk_assessment::RiskAssessmentTool;
pub use transaction_monitoring::TransactionMonitoringTool;
pub use types::{AccountAddressInput, FunctionDefinition, ToolDefinition};

use crate::Result;
use async_trait::async_trait;
use serde_json::Value;

pub const TOOL_TRANSACTION_MONITORING: &str = "transaction_monitoring";
pub const TOOL_PORTFOLIO_ANALYSIS: &str = "portfolio_analysis";
pub const TOOL_RISK_ASSESSMENT: &str = "risk_assessment";

#[async_trait]
pub trait AgentTool: Send + Sync {
    /// Unique name the agent calls the tool by
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// JSON schema of the arguments `execute` accepts
    fn input_schema(&self) -> Value;

    async fn execute(&self, args: Value) -> Result<Value>;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            kind: "function".to_string(),
            function: FunctionDefinition {
                name: self.name().to_string(),
                description: self.description().to_string(),
                parameters: self.input_schema(),
            },
        }
    }
}
