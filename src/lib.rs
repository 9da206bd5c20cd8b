//! Aptos Finance Agent
//!
//! A thin harness between a conversational agent and an Aptos network:
//! - Creates and funds test accounts, and moves coins between them
//! - Reads transaction history and balances from the indexer
//! - Exposes transaction monitoring, portfolio analysis and risk scoring
//!   as agent-callable tools
//!
//! # Layout
//!
//! - `transport`: the single seam to the outside world (`AptosTransport`
//!   live, `PaperLedger` in memory)
//! - `orchestrator`: account lifecycle, the bootstrap flow, token issuance
//!   and swaps
//! - `query` and `analysis`: the read path and the functions built on it
//! - `tools`, `interceptors`, `runner`: the agent-facing surface, with every
//!   tool call audited

pub mod account;
pub mod analysis;
pub mod config;
pub mod interceptors;
pub mod orchestrator;
pub mod query;
pub mod runner;
pub mod tools;
pub mod transport;

mod error;

// Re-export commonly used types
pub use account::{Address, LocalAccount};
pub use config::{Config, Network};
pub use error::{Error, Result};
pub use orchestrator::AccountOrchestrator;
pub use query::QueryService;
pub use runner::AgentRunner;
pub use transport::{AptosTransport, PaperLedger, Transport};
