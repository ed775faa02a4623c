//! CLI argument definitions using clap derive

use crate::preferences::Theme;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// Launchpad - deploy and manage services from the terminal
#[derive(Parser, Debug)]
#[command(name = "launchpad")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "LAUNCHPAD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long, global = true, env = "LAUNCHPAD_API_URL")]
    pub api_url: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and store an API token
    Login(LoginArgs),

    /// Forget stored credentials
    Logout,

    /// Show the logged-in account
    Whoami(FormatArgs),

    /// List or select pricing plans
    Plans(PlansArgs),

    /// Manage services
    Services(ServicesArgs),

    /// Manage networks and their attachments
    Networks(NetworksArgs),

    /// Upload and control deploys
    Deploys(DeploysArgs),

    /// Follow a service and its deploys until interrupted
    Watch(WatchArgs),

    /// Show or edit configuration
    Config(ConfigArgs),

    /// Show or change the color theme
    Theme(ThemeArgs),

    /// Print shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Output format for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

#[derive(Parser, Debug, Default)]
pub struct FormatArgs {
    /// Output format (defaults to output.format from config)
    #[arg(short, long)]
    pub format: Option<OutputFormat>,
}

#[derive(Parser, Debug)]
pub struct LoginArgs {
    /// Account username (prompted when omitted)
    #[arg(short, long)]
    pub username: Option<String>,

    /// Account password (prompted when omitted)
    #[arg(long, env = "LAUNCHPAD_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Parser, Debug)]
pub struct PlansArgs {
    #[command(subcommand)]
    pub action: Option<PlansAction>,
}

#[derive(Subcommand, Debug)]
pub enum PlansAction {
    /// List available plans
    List(FormatArgs),

    /// Switch the account to a plan
    Select { id: u64 },
}

#[derive(Parser, Debug)]
pub struct ServicesArgs {
    #[command(subcommand)]
    pub action: Option<ServicesAction>,
}

#[derive(Subcommand, Debug)]
pub enum ServicesAction {
    /// List services
    List {
        /// Page number
        #[arg(long)]
        page: Option<u32>,

        #[command(flatten)]
        format: FormatArgs,
    },

    /// Show a single service
    Show {
        id: u64,

        #[command(flatten)]
        format: FormatArgs,
    },

    /// Create a service
    Create {
        name: String,

        /// Plan to attach
        #[arg(long)]
        plan: Option<u64>,
    },

    /// Rename a service or move it to another plan
    Update {
        id: u64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        plan: Option<u64>,
    },

    /// Delete a service
    Delete {
        id: u64,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Parser, Debug)]
pub struct NetworksArgs {
    #[command(subcommand)]
    pub action: Option<NetworksAction>,
}

#[derive(Subcommand, Debug)]
pub enum NetworksAction {
    /// List networks
    List(FormatArgs),

    /// Create a network
    Create { name: String },

    /// Attach a network to a service
    Attach { service: u64, network: u64 },

    /// Detach a network from a service
    Detach { service: u64, network: u64 },
}

#[derive(Parser, Debug)]
pub struct DeploysArgs {
    #[command(subcommand)]
    pub action: DeploysAction,
}

#[derive(Subcommand, Debug)]
pub enum DeploysAction {
    /// List deploys of a service
    List {
        service: u64,

        /// Page number
        #[arg(long)]
        page: Option<u32>,

        #[command(flatten)]
        format: FormatArgs,
    },

    /// Upload a zip archive as a new deploy
    Upload {
        service: u64,

        /// Path to the .zip artifact
        artifact: PathBuf,

        /// Free-form note stored with the deploy
        #[arg(short = 'm', long)]
        comment: Option<String>,

        /// Start the deploy once uploaded
        #[arg(long)]
        start: bool,
    },

    /// Start a deploy
    Start { id: u64 },

    /// Stop a deploy
    Stop { id: u64 },
}

#[derive(Parser, Debug)]
pub struct WatchArgs {
    pub service: u64,

    /// Seconds between refreshes (defaults to poll.interval_secs)
    #[arg(short, long)]
    pub interval: Option<u64>,
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., api.base_url)
        key: String,
        value: String,
    },
}

#[derive(Parser, Debug)]
pub struct ThemeArgs {
    #[command(subcommand)]
    pub action: Option<ThemeAction>,
}

#[derive(Subcommand, Debug)]
pub enum ThemeAction {
    /// Print the stored theme
    Show,

    /// Store a theme
    Set {
        #[arg(value_enum)]
        theme: Theme,
    },
}
