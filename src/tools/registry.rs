//! Tool registration and dispatch

use super::{
    AgentTool, PortfolioAnalysisTool, RiskAssessmentTool, ToolDefinition,
    TransactionMonitoringTool,
};
use crate::config::AnalysisConfig;
use crate::interceptors::{InterceptorDecision, ToolCallContext, ToolInterceptor};
use crate::query::QueryService;
use crate::{Error, Result};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

#[derive(Default)]
pub struct ToolRegistry {
    /// Registration order is kept for `definitions`
    tools: Vec<Arc<dyn AgentTool>>,
    interceptors: Vec<Arc<dyn ToolInterceptor>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the three analysis tools
    pub fn with_analysis_tools(queries: QueryService, config: AnalysisConfig) -> Result<Self> {
        let mut registry = Self::new();
        registry.register(TransactionMonitoringTool::new(queries.clone(), config.clone()))?;
        registry.register(PortfolioAnalysisTool::new(queries.clone()))?;
        registry.register(RiskAssessmentTool::new(queries, config))?;
        Ok(registry)
    }

    pub fn register<T: AgentTool + 'static>(&mut self, tool: T) -> Result<()> {
        if self.get(tool.name()).is_some() {
            return Err(Error::InvalidArgument(format!(
                "Tool already registered: {}",
                tool.name()
            )));
        }
        info!(tool = tool.name(), "Registered tool");
        self.tools.push(Arc::new(tool));
        Ok(())
    }

    /// Interceptors run in the order they are added
    pub fn add_interceptor<I: ToolInterceptor + 'static>(&mut self, interceptor: I) {
        self.interceptors.push(Arc::new(interceptor));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn AgentTool>> {
        self.tools.iter().find(|tool| tool.name() == name)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|tool| tool.name()).collect()
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|tool| tool.definition()).collect()
    }

    /// Run a tool by name through the interceptor pipeline
    ///
    /// Unknown tools fail before any interceptor sees the call. A blocked
    /// call never reaches the tool, but completion callbacks still fire with
    /// the `Error::Blocked` outcome.
    pub async fn invoke(&self, name: &str, args: Value) -> Result<Value> {
        let tool = self
            .get(name)
            .cloned()
            .ok_or_else(|| Error::InvalidArgument(format!("Unknown tool: {}", name)))?;

        let context = ToolCallContext::new(name, args);
        let started = Instant::now();

        let result = match self.check(&context).await {
            Ok(()) => tool.execute(context.args.clone()).await,
            Err(e) => Err(e),
        };

        let duration_ms = started.elapsed().as_millis() as u64;
        for interceptor in &self.interceptors {
            interceptor
                .on_tool_call_complete(&context, &result, duration_ms)
                .await;
        }

        match &result {
            Ok(_) => info!(tool = name, call_id = %context.call_id, duration_ms, "Tool call complete"),
            Err(e) => warn!(tool = name, call_id = %context.call_id, duration_ms, error = %e, "Tool call failed"),
        }
        result
    }

    async fn check(&self, context: &ToolCallContext) -> Result<()> {
        for interceptor in &self.interceptors {
            if let InterceptorDecision::Block(reason) =
                interceptor.intercept_tool_call(context).await?
            {
                warn!(tool = %context.tool_name, %reason, "Tool call blocked");
                return Err(Error::Blocked(reason));
            }
        }
        Ok(())
    }
}
