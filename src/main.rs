// src/main.rs
use anyhow::Result;
use clap::{Parser, Subcommand};
use job_scanner::core::{AppConfig, Browser, CdpBrowser, LlmClient, OpenRouterClient, Store};
use job_scanner::scan::{ScanOutcome, ScanService};
use job_scanner::scheduler::spawn_scan_scheduler;
use job_scanner::web::start_web_server;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

#[derive(Parser)]
#[command(name = "jobscout", version, about = "Career-page job scanner")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the API server and the scan scheduler
    Serve,
    /// Run one scan pass in the foreground
    Scan,
    /// Check credential, model reachability and the store
    Verify,
}

#[tokio::main]
async fn main() -> Result<()> {
    Registry::default()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let config = AppConfig::load()?;
    config.environment.ensure_directories().await?;

    let store = Store::connect(&config.environment.database_path).await?;
    let browser: Arc<dyn Browser> = Arc::new(CdpBrowser::new(
        config.environment.chrome_executable.clone(),
    ));
    let llm: Arc<dyn LlmClient> = Arc::new(OpenRouterClient::new(&config.llm)?);
    let service = Arc::new(ScanService::new(
        store.clone(),
        browser,
        llm,
        &config.environment,
    ));

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            info!(
                "Database: {}",
                config.environment.database_path.display()
            );
            info!(
                "Scan interval: {}h",
                config.environment.scan_interval_hours
            );
            spawn_scan_scheduler(service.clone(), config.environment.scan_interval());
            start_web_server(&config.environment, store, service).await
        }
        Command::Scan => {
            match service.run_scan().await {
                ScanOutcome::Completed(summary) => println!(
                    "Scanned {} companies ({} failed), {} new jobs",
                    summary.companies_scanned, summary.companies_failed, summary.jobs_added
                ),
                ScanOutcome::AlreadyRunning => println!("A scan is already running"),
            }
            Ok(())
        }
        Command::Verify => {
            let report = service.verify().await;
            println!("credential_configured: {}", report.credential_configured);
            println!("llm_reachable:         {}", report.llm_reachable);
            println!("store_reachable:       {}", report.store_reachable);
            if !report.healthy() {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
