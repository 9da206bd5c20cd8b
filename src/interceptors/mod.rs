//! Tool call interceptors
//!
//! Every tool call passes through the registered interceptors, in order,
//! before it runs. Any interceptor may block it. After the call, every
//! interceptor is told how it went, whether it succeeded or not.

mod audit_log;

pub use audit_log::AuditLogInterceptor;

use crate::Result;
use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

/// Whether a tool call may proceed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterceptorDecision {
    Allow,
    /// Refuse the call, with a reason shown to the caller
    Block(String),
}

/// What an interceptor sees of a tool call
#[derive(Debug, Clone)]
pub struct ToolCallContext {
    pub tool_name: String,
    pub args: Value,
    /// Shared by the start and completion callbacks of one call
    pub call_id: Uuid,
}

impl ToolCallContext {
    pub fn new(tool_name: impl Into<String>, args: Value) -> Self {
        Self {
            tool_name: tool_name.into(),
            args,
            call_id: Uuid::new_v4(),
        }
    }
}

#[async_trait]
pub trait ToolInterceptor: Send + Sync {
    async fn intercept_tool_call(&self, context: &ToolCallContext) -> Result<InterceptorDecision>;

    async fn on_tool_call_complete(
        &self,
        context: &ToolCallContext,
        result: &Result<Value>,
        duration_ms: u64,
    );
}
