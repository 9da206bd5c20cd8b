//! Error types for the finance agent

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Transaction submission failed: {0}")]
    Submission(String),

    #[error("Transaction {hash} not settled after {waited_secs}s")]
    Timeout { hash: String, waited_secs: u64 },

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Faucet funding failed: {0}")]
    Funding(String),

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Interceptor blocked: {0}")]
    Blocked(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
