//! Aptos Finance Agent CLI
//!
//! Command-line interface for bootstrapping test accounts, querying an
//! account and running the analysis tools.

use aptos_finance_agent::config::{api_key_from_env, private_key_from_env};
use aptos_finance_agent::orchestrator::{BootstrapPlan, TokenSpec};
use aptos_finance_agent::runner::ToolRequest;
use aptos_finance_agent::{
    AccountOrchestrator, Address, AgentRunner, AptosTransport, Config, Error, LocalAccount,
    PaperLedger, QueryService, Result, Transport,
};
use clap::{Parser, Subcommand};
use secrecy::ExposeSecret;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "finance-agent")]
#[command(about = "Account monitoring and risk analysis agent for Aptos")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Use an in-memory ledger instead of the network
    #[arg(long, global = true)]
    paper: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create, fund and exercise three demo accounts
    Bootstrap,

    /// Bootstrap, then start the interactive tool shell
    Run {
        /// Go straight to the shell
        #[arg(long)]
        skip_bootstrap: bool,
    },

    /// Run one analysis tool
    Tool {
        /// Tool name (transaction_monitoring, portfolio_analysis, risk_assessment)
        name: String,

        /// Account address
        #[arg(short, long)]
        address: String,
    },

    /// Print tool definitions
    Tools,

    /// Recent transactions of an account
    Transactions {
        #[arg(short, long)]
        address: Address,

        /// Maximum number of transactions (defaults to the configured limit)
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Current balances of an account
    Balances {
        #[arg(short, long)]
        address: Address,
    },

    /// Native coin balance of an account
    Balance {
        #[arg(short, long)]
        address: Address,
    },

    /// Asset activities of one transaction
    Activities {
        /// Transaction version
        #[arg(long)]
        version: u64,
    },

    /// Initialize a managed coin and mint its supply (signs with APTOS_PRIVATE_KEY)
    CreateToken {
        /// Fully qualified coin type published by the signer, e.g. 0xcafe::gold::Gold
        #[arg(long)]
        coin_type: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        symbol: String,

        #[arg(long, default_value_t = 8)]
        decimals: u8,

        /// Amount minted to the signer (base units)
        #[arg(long, default_value_t = 0)]
        supply: u64,
    },

    /// Swap tokens through a deployed swap module (signs with APTOS_PRIVATE_KEY)
    Swap {
        /// Address that published the `swap` module
        #[arg(long)]
        contract: Address,

        #[arg(long)]
        token_in: String,

        #[arg(long)]
        token_out: String,

        /// Amount of `token_in` (base units)
        #[arg(long)]
        amount: u64,
    },

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore if not found)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose, cli.json_logs);

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let paper = cli.paper;
    let transport = || build_transport(&config, paper);

    match cli.command {
        Commands::Bootstrap => {
            run_bootstrap(transport()?).await?;
        }
        Commands::Run { skip_bootstrap } => {
            let transport = transport()?;
            if !skip_bootstrap {
                // the shell is still useful against existing accounts
                if let Err(e) = run_bootstrap(transport.clone()).await {
                    tracing::error!(error = %e, "Bootstrap failed, starting shell anyway");
                }
            }
            AgentRunner::new(transport, &config)?.run().await?;
        }
        Commands::Tool { name, address } => {
            let runner = AgentRunner::new(transport()?, &config)?;
            let request = ToolRequest {
                name,
                arguments: json!({ "account_address": address }),
            };
            println!("{}", runner.call(request).await);
        }
        Commands::Tools => {
            let runner = AgentRunner::new(transport()?, &config)?;
            println!("{}", runner.definitions_json()?);
        }
        Commands::Transactions { address, limit } => {
            let queries = QueryService::new(transport()?, &config.query);
            let records = queries.transactions(&address, limit).await?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Commands::Balances { address } => {
            let queries = QueryService::new(transport()?, &config.query);
            let balances = queries.balances(&address).await?;
            println!("{}", serde_json::to_string_pretty(&balances)?);
        }
        Commands::Balance { address } => {
            let balance = AccountOrchestrator::new(transport()?)
                .balance(&address)
                .await?;
            println!("{}", balance);
        }
        Commands::Activities { version } => {
            let queries = QueryService::new(transport()?, &config.query);
            let activities = queries.asset_activities(version).await?;
            println!("{}", serde_json::to_string_pretty(&activities)?);
        }
        Commands::CreateToken {
            coin_type,
            name,
            symbol,
            decimals,
            supply,
        } => {
            let spec = TokenSpec {
                coin_type,
                name,
                symbol,
                decimals,
                initial_supply: supply,
            };
            let issued = AccountOrchestrator::new(transport()?)
                .create_token(&signer_from_env()?, &spec)
                .await?;
            println!("{}", serde_json::to_string_pretty(&issued)?);
        }
        Commands::Swap {
            contract,
            token_in,
            token_out,
            amount,
        } => {
            let hash = AccountOrchestrator::new(transport()?)
                .swap_tokens(&signer_from_env()?, &contract, &token_in, &token_out, amount)
                .await?;
            println!("Swap transaction: {}", hash);
        }
        Commands::Config => show_config(&config)?,
    }

    Ok(())
}

fn init_logging(verbose: bool, json_logs: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // stdout belongs to command output and the shell
    tracing_subscriber::registry()
        .with(filter)
        .with((!json_logs).then(|| fmt::layer().with_writer(std::io::stderr)))
        .with(json_logs.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .init();
}

fn build_transport(config: &Config, paper: bool) -> Result<Arc<dyn Transport>> {
    if paper {
        tracing::info!("Using in-memory paper ledger");
        return Ok(Arc::new(PaperLedger::new()));
    }

    let api_key = api_key_from_env();
    Ok(Arc::new(AptosTransport::from_config(
        config,
        api_key.as_ref(),
    )?))
}

fn signer_from_env() -> Result<LocalAccount> {
    let key = private_key_from_env()
        .ok_or_else(|| Error::Config("APTOS_PRIVATE_KEY is not set".to_string()))?;
    LocalAccount::from_hex(key.expose_secret())
}

fn show_config(config: &Config) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    match config.endpoints() {
        Ok(endpoints) => println!(
            "Resolved endpoints:\n{}",
            serde_json::to_string_pretty(&endpoints)?
        ),
        Err(e) => println!("Endpoints unresolved: {}", e),
    }
    println!(
        "API key: {}",
        if api_key_from_env().is_some() {
            "set"
        } else {
            "not set"
        }
    );
    Ok(())
}

/// Run the demo plan and print addresses, hashes and final balances
async fn run_bootstrap(transport: Arc<dyn Transport>) -> Result<()> {
    let orchestrator = AccountOrchestrator::new(transport);
    let report = orchestrator.bootstrap(&BootstrapPlan::demo()).await?;

    for created in &report.accounts {
        println!("{}'s address: {}", created.label, created.account.address());
    }
    for created in report.accounts.iter().filter(|a| !a.funded) {
        println!("{} was not funded", created.label);
    }
    for transfer in &report.transfers {
        match &transfer.result {
            Ok(hash) => println!(
                "Transfer {} -> {} ({}): {}",
                transfer.from, transfer.to, transfer.amount, hash
            ),
            Err(e) => println!(
                "Transfer {} -> {} ({}) failed: {}",
                transfer.from, transfer.to, transfer.amount, e
            ),
        }
    }
    for created in &report.accounts {
        match orchestrator.balance(&created.account.address()).await {
            Ok(balance) => println!("{}'s final balance: {}", created.label, balance),
            Err(e) => println!("{}'s final balance unavailable: {}", created.label, e),
        }
    }

    let failed = report.failed_transfers().count();
    if failed > 0 {
        return Err(Error::Submission(format!(
            "{} of {} bootstrap transfers failed",
            failed,
            report.transfers.len()
        )));
    }
    Ok(())
}
