//! CLI definition using clap derive.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "wifinotify", about = "Available Wi-Fi network notifier")]
pub struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/wifinotify/config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Blocklist database path (overrides the config file)
    #[arg(long, global = true, env = "WIFINOTIFY_STORE")]
    pub store_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the notifiers against a JSON-lines event feed
    Run(RunOpts),
    /// Inspect or edit the persisted blocklists
    Blocklist {
        #[command(subcommand)]
        action: BlocklistAction,
    },
    /// Print the effective configuration as TOML
    Config,
}

#[derive(clap::Args)]
pub struct RunOpts {
    /// Read events from this file instead of stdin
    #[arg(long)]
    pub events: Option<PathBuf>,

    /// Keep running this long after the feed ends so pending timers can fire
    #[arg(long, default_value = "0")]
    pub linger_ms: u64,
}

#[derive(Subcommand)]
pub enum BlocklistAction {
    /// List blocklisted SSIDs, for one key or all of them
    List {
        #[arg(long)]
        key: Option<String>,
    },
    /// Remove one SSID from a blocklist
    Remove {
        #[arg(long)]
        key: String,
        ssid: String,
    },
    /// Remove every SSID from a blocklist
    Clear {
        #[arg(long)]
        key: String,
    },
}
