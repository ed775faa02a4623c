//! Launchpad CLI entry point
//!
//! Parses arguments, loads configuration and dispatches to subcommands.

use clap::Parser;
use console::style;
use launchpad::cli::args::{ConfigAction, ConfigArgs};
use launchpad::cli::{commands, Cli, Commands};
use launchpad::config::{Config, ConfigManager};
use launchpad::error::LaunchpadResult;
use launchpad::preferences::load_theme;
use launchpad::storage::FileStorage;
use launchpad::ui::{self, UiContext};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// sysexits `EX_TEMPFAIL`: the same command may succeed if run again
const EXIT_TEMPFAIL: u8 = 75;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            if e.is_retryable() {
                ExitCode::from(EXIT_TEMPFAIL)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

async fn run() -> LaunchpadResult<()> {
    let cli = Cli::parse();

    // Completions need neither config nor storage
    if let Commands::Completions { shell } = cli.command {
        return commands::completions(shell);
    }

    let manager = ConfigManager::locate(cli.config.clone());

    // `config init` must work even when the existing file is broken
    let initializing = matches!(
        cli.command,
        Commands::Config(ConfigArgs {
            action: Some(ConfigAction::Init { .. })
        })
    );
    let config = if initializing {
        Config::default()
    } else {
        manager.load(cli.api_url.as_deref()).await?
    };

    init_logging(cli.verbose, &config.general.log_format);
    debug!("Config: {}", manager.path().display());

    if UiContext::detect().is_interactive() {
        apply_theme().await?;
    }

    match cli.command {
        Commands::Completions { .. } => unreachable!("Completions handled above"),
        Commands::Login(args) => commands::login(args, &config).await,
        Commands::Logout => commands::logout(&config).await,
        Commands::Whoami(args) => commands::whoami(args, &config).await,
        Commands::Plans(args) => commands::plans(args, &config).await,
        Commands::Services(args) => commands::services(args, &config).await,
        Commands::Networks(args) => commands::networks(args, &config).await,
        Commands::Deploys(args) => commands::deploys(args, &config).await,
        Commands::Watch(args) => commands::watch(args, &config).await,
        Commands::Config(args) => commands::config(args, &config, &manager).await,
        Commands::Theme(args) => commands::theme(args).await,
    }
}

/// 0 = warn, 1 = info, 2+ = debug; `json` switches to structured lines
fn init_logging(verbose: u8, format: &str) {
    let filter = match verbose {
        0 => EnvFilter::new("launchpad=warn"),
        1 => EnvFilter::new("launchpad=info"),
        _ => EnvFilter::new("launchpad=debug"),
    };

    if format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .init();
    }
}

async fn apply_theme() -> LaunchpadResult<()> {
    let storage = FileStorage::open_default().await?;
    ui::init_theme(load_theme(&storage).await?);
    Ok(())
}
