//! Meeting intelligence sync.
//!
//! One batch run: read the capture cache, analyse every new meeting with the configured LLM,
//! write the notes into the vault and update the processed queue. Meant to be triggered
//! periodically by the OS scheduler.

use anyhow::Context;
use clap::Parser;
use mintel_core::logging::{init_logging, Console};
use mintel_core::{
    LlmGateway, MeetingSync, PillarTaxonomy, ProcessingState, SyncConfig, SyncOptions, SyncPhase,
    UserProfile,
};
use std::path::PathBuf;

const LOG_FILE_NAME: &str = "meeting-intel.log";

#[derive(Debug, Parser)]
#[command(name = "mintel-sync", version, about = "Turn captured meetings into vault notes")]
struct Cli {
    /// Reprocess meetings created today even if already in the ledger.
    #[arg(long)]
    force: bool,

    /// List candidate meetings without calling the LLM or writing anything.
    #[arg(long)]
    dry_run: bool,

    /// Config file (defaults to $MINTEL_CONFIG or config/mintel.toml).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before any env::var calls)
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[mintel-sync] .env not loaded: {} (using system environment)", e);
    }

    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => SyncConfig::load_from(path),
        None => SyncConfig::load(),
    };
    let (config, config_error) = match loaded {
        Ok(config) => (config, None),
        Err(e) => (SyncConfig::default(), Some(e)),
    };

    let log_guard = init_logging(&config.log_path(), LOG_FILE_NAME, Console::Stdout);

    SyncPhase::LoadingConfig.enter();
    if let Some(e) = config_error {
        tracing::warn!(target: "mintel::config", error = %e, "Config unreadable; using defaults");
    }
    tracing::info!(
        target: "mintel::config",
        vault_root = %config.vault_root.display(),
        cache = %config.cache_path().display(),
        "Configuration loaded"
    );

    SyncPhase::LoadingState.enter();
    let profile = UserProfile::load(&config.profile_path());
    let pillars = PillarTaxonomy::load(&config.pillars_path());
    let state = ProcessingState::load(&config.state_path());
    tracing::info!(
        target: "mintel::sync",
        processed = state.len(),
        pillars = pillars.names().len(),
        "State loaded"
    );

    let gateway = LlmGateway::from_env(config.llm_timeout());
    match gateway.active_provider() {
        Some(kind) => tracing::info!(target: "mintel::llm", provider = %kind, "LLM provider selected"),
        None if !cli.dry_run => tracing::warn!(
            target: "mintel::llm",
            "No LLM API key configured; every meeting will fail analysis"
        ),
        None => {}
    }

    let options = SyncOptions {
        force: cli.force,
        dry_run: cli.dry_run,
    };
    let mut sync = MeetingSync::new(&config, &profile, &pillars, state, &gateway);
    match sync.run(options).await {
        Ok(summary) => {
            if !summary.failed.is_empty() {
                tracing::warn!(
                    target: "mintel::sync",
                    failed = summary.failed.len(),
                    "Some meetings were not processed; they will be retried next run"
                );
            }
            Ok(())
        }
        Err(e) if e.is_cache_unavailable() => {
            tracing::error!(target: "mintel::sync", error = %e, "Capture cache unavailable");
            drop(log_guard);
            std::process::exit(1);
        }
        Err(e) => Err(e).context("meeting sync failed"),
    }
}
