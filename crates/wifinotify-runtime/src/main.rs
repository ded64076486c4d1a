//! wifinotify: available Wi-Fi network notifier runtime binary.
//! Runs the notifier state machines against a JSON-lines event feed and
//! manages the persisted blocklists.

use anyhow::Context;
use clap::Parser;

use wifinotify_store::SqliteSetStore;

mod cli;
mod config;
mod event_loop;
mod feed;
mod hosts;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    let filter = std::env::var("WIFINOTIFY_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let config = config::RuntimeConfig::load(args.config.as_deref())?;
    let store_path = config.resolve_store_path(args.store_path);

    match args.command {
        cli::Command::Run(opts) => {
            tracing::info!("wifinotify starting");
            event_loop::run(config, store_path, opts).await?;
        }
        cli::Command::Blocklist { action } => {
            let mut store = SqliteSetStore::open(&store_path)
                .with_context(|| format!("failed to open {}", store_path.display()))?;
            cmd_blocklist(&mut store, action)?;
        }
        cli::Command::Config => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

fn cmd_blocklist(store: &mut SqliteSetStore, action: cli::BlocklistAction) -> anyhow::Result<()> {
    match action {
        cli::BlocklistAction::List { key } => {
            let keys = match key {
                Some(key) => vec![key],
                None => store.keys()?,
            };
            for key in keys {
                for ssid in store.load_set(&key)? {
                    println!("{key}\t{ssid}");
                }
            }
        }
        cli::BlocklistAction::Remove { key, ssid } => {
            if store.remove_member(&key, &ssid)? {
                println!("removed {ssid:?} from {key}");
            } else {
                println!("{ssid:?} is not in {key}");
            }
        }
        cli::BlocklistAction::Clear { key } => {
            let removed = store.clear_set(&key)?;
            println!("cleared {removed} entries from {key}");
        }
    }
    Ok(())
}
