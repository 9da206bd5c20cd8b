//! Account analysis: anomaly flagging, portfolio and risk scoring
//!
//! Every function fetches fresh data through the query service and keeps no
//! state between calls.

use crate::account::Address;
use crate::config::AnalysisConfig;
use crate::query::QueryService;
use crate::transport::{BalanceEntry, TransactionRecord};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of scanning recent transactions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitoringReport {
    NoUnusualActivity,
    /// Transactions above the threshold, newest first
    Unusual(Vec<TransactionRecord>),
}

impl MonitoringReport {
    pub fn flagged(&self) -> &[TransactionRecord] {
        match self {
            Self::NoUnusualActivity => &[],
            Self::Unusual(records) => records,
        }
    }
}

impl fmt::Display for MonitoringReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoUnusualActivity => f.write_str("No unusual activity detected."),
            Self::Unusual(records) => {
                let rendered = serde_json::to_string(records).map_err(|_| fmt::Error)?;
                write!(f, "Unusual activity detected: {}", rendered)
            }
        }
    }
}

/// Flag recent transactions moving more than the configured amount
///
/// A failed fetch is an error, never a clean report.
pub async fn monitor_transactions(
    queries: &QueryService,
    config: &AnalysisConfig,
    address: &Address,
) -> Result<MonitoringReport> {
    let transactions = queries
        .transactions(address, Some(config.monitoring_window))
        .await?;

    let flagged: Vec<TransactionRecord> = transactions
        .into_iter()
        .filter(|tx| tx.amount > config.unusual_amount)
        .collect();

    tracing::info!(%address, flagged = flagged.len(), "Transaction monitoring complete");

    if flagged.is_empty() {
        Ok(MonitoringReport::NoUnusualActivity)
    } else {
        Ok(MonitoringReport::Unusual(flagged))
    }
}

/// Current holdings, as reported by the indexer
pub async fn analyze_portfolio(
    queries: &QueryService,
    address: &Address,
) -> Result<Vec<BalanceEntry>> {
    queries.balances(address).await
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub total_tokens: u128,
    pub high_value_transactions: usize,
    /// In [0, 1], two decimals
    pub risk_score: f64,
}

/// Score an account from its recent transactions and holdings
///
/// The score averages the share of high-value transactions in the window and
/// the share of the largest holding in the total.
pub async fn assess_risk(
    queries: &QueryService,
    config: &AnalysisConfig,
    address: &Address,
) -> Result<RiskAssessment> {
    let (transactions, balances) = futures::try_join!(
        queries.transactions(address, Some(config.risk_window)),
        queries.balances(address),
    )?;

    let assessment = score(&transactions, &balances, config.high_value_amount);
    tracing::info!(
        %address,
        total_tokens = %assessment.total_tokens,
        high_value = assessment.high_value_transactions,
        risk_score = assessment.risk_score,
        "Risk assessment complete"
    );
    Ok(assessment)
}

fn score(
    transactions: &[TransactionRecord],
    balances: &[BalanceEntry],
    high_value_amount: u64,
) -> RiskAssessment {
    let total_tokens: u128 = balances.iter().map(|b| u128::from(b.amount)).sum();
    let high_value_transactions = transactions
        .iter()
        .filter(|tx| tx.amount > high_value_amount)
        .count();

    let high_value_ratio = if transactions.is_empty() {
        0.0
    } else {
        high_value_transactions as f64 / transactions.len() as f64
    };

    let largest = balances.iter().map(|b| b.amount).max().unwrap_or(0);
    let concentration = if total_tokens == 0 {
        0.0
    } else {
        largest as f64 / total_tokens as f64
    };

    let raw = 0.5 * high_value_ratio + 0.5 * concentration;
    RiskAssessment {
        total_tokens,
        high_value_transactions,
        risk_score: (raw.clamp(0.0, 1.0) * 100.0).round() / 100.0,
    }
}
