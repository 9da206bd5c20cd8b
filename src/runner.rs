//! Agent runner module
//!
//! Wires the analysis tools to a transport, wraps them in the interceptor
//! pipeline and drives them from a line-oriented shell. Any external
//! model loop can use the same registry through `AgentRunner::registry`.

use crate::config::Config;
use crate::interceptors::AuditLogInterceptor;
use crate::query::QueryService;
use crate::tools::ToolRegistry;
use crate::transport::Transport;
use crate::{Error, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info};

const HELP: &str = "\
Commands:
  <tool> <address>                       e.g. risk_assessment 0x1
  {\"name\": <tool>, \"arguments\": {..}}    JSON tool call
  tools                                  list tool definitions
  help                                   show this message
  quit                                   leave the shell";

/// A tool call as an agent would issue it
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ToolRequest {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

impl ToolRequest {
    /// Accepts a JSON call object or `name address`
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        if line.starts_with('{') {
            return serde_json::from_str(line)
                .map_err(|e| Error::InvalidArgument(format!("Malformed tool call: {}", e)));
        }

        let mut parts = line.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(name), Some(address), None) => Ok(Self {
                name: name.to_string(),
                arguments: json!({ "account_address": address }),
            }),
            _ => Err(Error::InvalidArgument(format!(
                "Expected `<tool> <address>`, got: {}",
                line
            ))),
        }
    }
}

/// Render a tool outcome for a human
///
/// A failed analysis reads differently from a clean result, so "nothing
/// found" and "could not look" are never confused.
pub fn render_outcome(outcome: &Result<Value>) -> String {
    match outcome {
        Ok(Value::String(text)) => text.clone(),
        Ok(value) => serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()),
        Err(e @ (Error::InvalidArgument(_) | Error::Blocked(_))) => format!("error: {}", e),
        Err(e) => format!("analysis unavailable: {}", e),
    }
}

/// Agent runner that owns the tool registry
pub struct AgentRunner {
    registry: ToolRegistry,
}

impl AgentRunner {
    /// Build the analysis tools over `transport`, audited when configured
    pub fn new(transport: Arc<dyn Transport>, config: &Config) -> Result<Self> {
        let queries = QueryService::new(transport.clone(), &config.query);
        let mut registry = ToolRegistry::with_analysis_tools(queries, config.analysis.clone())?;

        if let Some(audit_path) = &config.audit_log_path {
            registry.add_interceptor(AuditLogInterceptor::new(audit_path));
            info!(audit_path = %audit_path, "Added audit log interceptor");
        }

        info!(
            transport = transport.name(),
            tools = ?registry.names(),
            "Agent runner ready"
        );
        Ok(Self { registry })
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Tool definitions as pretty JSON
    pub fn definitions_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.registry.definitions())?)
    }

    /// Run one tool call and render its outcome
    pub async fn call(&self, request: ToolRequest) -> String {
        let outcome = self.registry.invoke(&request.name, request.arguments).await;
        render_outcome(&outcome)
    }

    /// Interactive shell on stdin/stdout
    pub async fn run(&self) -> Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.run_shell(stdin, stdout).await
    }

    /// Shell loop over arbitrary streams; ends at EOF or `quit`
    pub async fn run_shell<R, W>(&self, input: R, mut output: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        write_out(&mut output, &format!("{}\n> ", HELP)).await?;

        while let Some(line) = lines.next_line().await.map_err(io_error)? {
            let line = line.trim();
            let reply = match line {
                "" => None,
                "quit" | "exit" => break,
                "help" => Some(HELP.to_string()),
                "tools" => Some(self.definitions_json()?),
                _ => {
                    debug!(line, "Shell input");
                    Some(match ToolRequest::parse(line) {
                        Ok(request) => self.call(request).await,
                        Err(e) => format!("error: {}", e),
                    })
                }
            };

            if let Some(reply) = reply {
                write_out(&mut output, &format!("{}\n", reply)).await?;
            }
            write_out(&mut output, "> ").await?;
        }

        write_out(&mut output, "\n").await?;
        info!("Shell closed");
        Ok(())
    }
}

async fn write_out<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<()> {
    output.write_all(text.as_bytes()).await.map_err(io_error)?;
    output.flush().await.map_err(io_error)
}

fn io_error(e: std::io::Error) -> Error {
    Error::Config(format!("Shell I/O failed: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::LocalAccount;
    use crate::query::testing::ScriptedTransport;
    use crate::transport::PaperLedger;

    fn config() -> Config {
        Config {
            audit_log_path: None,
            ..Config::default()
        }
    }

    async fn shell(runner: &AgentRunner, input: &str) -> String {
        let mut output = Vec::new();
        runner.run_shell(input.as_bytes(), &mut output).await.unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_parse_plain_and_json_requests() {
        let plain = ToolRequest::parse("risk_assessment 0x1").unwrap();
        assert_eq!(plain.name, "risk_assessment");
        assert_eq!(plain.arguments, json!({ "account_address": "0x1" }));

        let call = ToolRequest::parse(
            r#"{"name": "portfolio_analysis", "arguments": {"account_address": "0x2"}}"#,
        )
        .unwrap();
        assert_eq!(call.name, "portfolio_analysis");
        assert_eq!(call.arguments["account_address"], "0x2");

        assert!(ToolRequest::parse("risk_assessment").is_err());
        assert!(ToolRequest::parse("risk_assessment 0x1 0x2").is_err());
        assert!(ToolRequest::parse("{not json").is_err());
    }

    #[test]
    fn test_render_distinguishes_failures() {
        assert_eq!(
            render_outcome(&Ok(json!("No unusual activity detected."))),
            "No unusual activity detected."
        );
        assert!(render_outcome(&Err(Error::Query("down".into())))
            .starts_with("analysis unavailable: "));
        assert!(render_outcome(&Err(Error::InvalidArgument("bad".into()))).starts_with("error: "));
    }

    #[tokio::test]
    async fn test_shell_runs_tools_against_paper_ledger() {
        let ledger = PaperLedger::new();
        let account = LocalAccount::generate();
        ledger.fund_account(&account.address(), 2_000_000).await.unwrap();

        let runner = AgentRunner::new(Arc::new(ledger), &config()).unwrap();
        let transcript = shell(
            &runner,
            &format!(
                "transaction_monitoring {}\nportfolio_analysis {}\nquit\nrisk_assessment 0x1\n",
                account.address(),
                account.address()
            ),
        )
        .await;

        assert!(transcript.contains("Unusual activity detected: "));
        assert!(transcript.contains("2000000"));
        // nothing after quit runs
        assert!(!transcript.contains("risk_score"));
    }

    #[tokio::test]
    async fn test_shell_reports_unavailable_analysis() {
        let runner = AgentRunner::new(Arc::new(ScriptedTransport::failing()), &config()).unwrap();
        let transcript = shell(&runner, "transaction_monitoring 0x1\n").await;

        assert!(transcript.contains("analysis unavailable: "));
        assert!(!transcript.contains("No unusual activity detected."));
    }

    #[tokio::test]
    async fn test_shell_lists_tools_and_rejects_unknown() {
        let runner = AgentRunner::new(Arc::new(PaperLedger::new()), &config()).unwrap();
        let transcript = shell(&runner, "tools\nprice_oracle 0x1\n").await;

        assert!(transcript.contains("\"risk_assessment\""));
        assert!(transcript.contains("error: Invalid argument: Unknown tool: price_oracle"));
    }
}
