//! PreToolUse hooks for assistant file reads.
//!
//! Reads the hook payload from stdin and, when the file being read references people or
//! companies that have vault pages, prints a hook response carrying a short context block.
//! Every failure path is silent: no stdout, exit status 0.

use clap::{Parser, Subcommand};
use mintel_context::{inject, vault_root_from_env, HookInput, HookOutput, InjectorKind, VaultLayout};
use mintel_core::logging::{init_logging, Console};
use mintel_core::SyncConfig;
use std::io::Read;

const LOG_FILE_NAME: &str = "context-hooks.log";

#[derive(Debug, Parser)]
#[command(name = "mintel-hooks", version, about = "Inject vault context into file reads")]
struct Cli {
    #[command(subcommand)]
    injector: Injector,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum Injector {
    /// Person pages under the people directory.
    Person,
    /// Company pages (and legacy account pages).
    Company,
}

impl From<Injector> for InjectorKind {
    fn from(value: Injector) -> Self {
        match value {
            Injector::Person => InjectorKind::Person,
            Injector::Company => InjectorKind::Company,
        }
    }
}

fn layout_for(config: &SyncConfig) -> VaultLayout {
    VaultLayout {
        root: config.vault_root.clone(),
        people_dir: config.people_path(),
        companies_dir: config.companies_path(),
        accounts_dir: config.accounts_path(),
    }
}

fn run(kind: InjectorKind, layout: &VaultLayout) -> anyhow::Result<Option<String>> {
    let mut raw = String::new();
    std::io::stdin().read_to_string(&mut raw)?;
    let input = HookInput::from_json(&raw)?;

    let Some(target) = input.target_path() else {
        tracing::debug!(target: "mintel::context", "No file path in hook input");
        return Ok(None);
    };
    let Some(block) = inject(kind, layout, target) else {
        tracing::debug!(target: "mintel::context", file = target, "Nothing to inject");
        return Ok(None);
    };
    tracing::info!(
        target: "mintel::context",
        injector = ?kind,
        file = target,
        "Injected context"
    );
    Ok(Some(HookOutput::with_context(&block).to_json()?))
}

fn main() {
    let _ = dotenvy::dotenv();

    let Ok(cli) = Cli::try_parse() else {
        return;
    };

    let mut config = SyncConfig::load().unwrap_or_default();
    config.vault_root = vault_root_from_env();
    let _log_guard = init_logging(&config.log_path(), LOG_FILE_NAME, Console::Stderr);

    match run(cli.injector.into(), &layout_for(&config)) {
        Ok(Some(payload)) => println!("{}", payload),
        Ok(None) => {}
        Err(e) => tracing::warn!(target: "mintel::context", error = %e, "Hook failed; continuing silently"),
    }
}
