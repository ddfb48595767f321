use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use wal_airdrop_explorer::api::{self, AppState};
use wal_airdrop_explorer::distribution::latest_distribution;
use wal_airdrop_explorer::{Explorer, ExplorerConfig, ExplorerError, RequestTracker, SearchReport};

#[derive(Parser, Debug)]
#[command(name = "wal-airdrop-explorer", version, about = "Find WAL airdrops owned by a Sui address or SuiNS name")]
struct Cli {
    /// TOML config file; EXPLORER_* variables override it
    #[arg(long, global = true, env = "EXPLORER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Look up airdrops for one address or .sui name
    Search {
        identifier: String,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Read queries from stdin; a new line supersedes the search in flight
    Interactive,

    /// Show the newest distribution transaction of the airdrop package
    Distribution {
        #[arg(long)]
        json: bool,
    },

    /// Serve the HTTP API
    Serve {
        /// Bind address, overrides config
        #[arg(long)]
        listen: Option<String>,
    },
}

fn print_report(report: &SearchReport) {
    if report.via_domain {
        println!("{} ({})", report.query, report.address.short());
    } else {
        println!("{}", report.address.short());
    }
    println!("{}", report.summary());

    for record in &report.records {
        println!();
        println!("  {}", record.name);
        println!("    {}", record.description);
        println!("    amount:    {} WAL", record.display_amount);
        println!("    object id: {}", record.object_id);
        println!("    image:     {}", record.image_url);
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("Failed to serialize JSON")?);
    Ok(())
}

async fn run_search(explorer: &Explorer, identifier: &str, json: bool) -> Result<()> {
    match explorer.search_once(identifier).await {
        Ok(report) if json => print_json(&report),
        Ok(report) => {
            print_report(&report);
            Ok(())
        }
        Err(e) => Err(anyhow!(e.user_message())),
    }
}

async fn run_interactive(explorer: Arc<Explorer>) -> Result<()> {
    let tracker = RequestTracker::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    eprintln!("Enter a wallet address or SuiNS domain (Ctrl-D to quit)");
    let mut last = None;
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let ctx = tracker.begin(&line);
        let explorer = Arc::clone(&explorer);
        last = Some(tokio::spawn(async move {
            let outcome = explorer.search(&ctx).await;
            // A newer line may have arrived while this one finished
            if !ctx.is_current() {
                return;
            }
            match outcome {
                Ok(report) => print_report(&report),
                Err(ExplorerError::Superseded { .. }) => {}
                Err(e) => eprintln!("Error: {}", e.user_message()),
            }
        }));
    }

    if let Some(handle) = last {
        let _ = handle.await;
    }
    Ok(())
}

async fn run_distribution(explorer: &Explorer, json: bool) -> Result<()> {
    let tx = latest_distribution(explorer.rpc(), explorer.airdrop_type())
        .await
        .map_err(|e| anyhow!(ExplorerError::from(e).user_message()))?;

    match tx {
        Some(tx) if json => print_json(&tx)?,
        Some(tx) => {
            println!("digest:         {}", tx.digest);
            println!("executed at:    {}", tx.executed_at.as_deref().unwrap_or("unknown"));
            println!("sender:         {}", tx.sender.as_deref().unwrap_or("unknown"));
            println!("status:         {}", tx.status.as_deref().unwrap_or("unknown"));
            println!("object changes: {}", tx.object_changes);
        }
        None => println!("No distribution transactions found"),
    }
    Ok(())
}

async fn run_server(explorer: Arc<Explorer>, listen: &str) -> Result<()> {
    let addr: SocketAddr = listen
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", listen))?;
    let app = api::router(AppState { explorer });

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(%addr, "HTTP API listening");
    axum::serve(listener, app).await.context("HTTP server failed")?;
    Ok(())
}

// Single-threaded: each search is one linear chain of awaits.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // init tracing from env EXPLORER_LOG or RUST_LOG
    let filter = std::env::var("EXPLORER_LOG")
        .unwrap_or_else(|_| std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()));
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = ExplorerConfig::load(cli.config.as_deref()).map_err(|e| anyhow!(e))?;
    info!(
        rpc_url = %config.rpc_url,
        fallback = %config.name_fallback_url,
        airdrop_type = %config.airdrop_type,
        timeout_ms = config.timeout_ms,
        "WAL airdrop explorer starting"
    );

    let explorer = Arc::new(Explorer::from_config(&config).context("Failed to build HTTP client")?);

    match cli.command {
        Commands::Search { identifier, json } => run_search(&explorer, &identifier, json).await?,
        Commands::Interactive => run_interactive(explorer).await?,
        Commands::Distribution { json } => run_distribution(&explorer, json).await?,
        Commands::Serve { listen } => {
            let listen = listen.unwrap_or_else(|| config.listen_addr.clone());
            run_server(explorer, &listen).await?
        }
    }

    Ok(())
}
