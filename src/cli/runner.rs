//! CLI dispatch
//!
//! Routes parsed arguments to about, discover or sync mode. All protocol
//! output goes to stdout; logs go to stderr.

use super::commands::Cli;
use crate::catalog::{Catalog, CatalogEntry};
use crate::config::TapConfig;
use crate::engine::SyncRunner;
use crate::error::{Error, Result};
use crate::singer::MessageWriter;
use crate::state::StateManager;
use crate::streams::all_streams;
use serde_json::json;
use tracing::info;

/// Capabilities advertised by `--about`
const CAPABILITIES: &[&str] = &["catalog", "discover", "state", "about"];

/// Run the tap with the given arguments
pub async fn run(cli: Cli) -> Result<()> {
    if cli.about {
        print_about();
        return Ok(());
    }

    let config_path = cli
        .config
        .as_ref()
        .ok_or_else(|| Error::config("--config is required"))?;
    let config = TapConfig::from_file(config_path)?;

    if cli.discover {
        print_catalog();
        return Ok(());
    }

    let catalog = match cli.catalog {
        Some(ref path) => Some(Catalog::from_file(path)?),
        None => None,
    };
    let state = match cli.state {
        Some(ref path) => StateManager::from_file(path)?,
        None => StateManager::in_memory(),
    };

    let runner = SyncRunner::new(config, catalog, state)?;
    let mut writer = MessageWriter::stdout();
    let stats = runner.run(&mut writer).await?;
    info!(
        records = stats.records_emitted,
        streams = stats.streams_synced,
        "Run finished"
    );
    Ok(())
}

/// Build the discovery catalog for all known streams
pub fn discovery_catalog() -> Catalog {
    let streams = all_streams();
    Catalog {
        streams: streams
            .iter()
            .map(|s| {
                CatalogEntry::for_stream(
                    s.name(),
                    s.schema(),
                    s.key_properties(),
                    s.replication_key().map(ToString::to_string),
                    s.replication_method(),
                )
            })
            .collect(),
    }
}

fn print_catalog() {
    let catalog = discovery_catalog();
    println!(
        "{}",
        serde_json::to_string_pretty(&catalog).expect("catalog serializes")
    );
}

fn print_about() {
    let about = json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "description": env!("CARGO_PKG_DESCRIPTION"),
        "capabilities": CAPABILITIES,
        "settings": TapConfig::json_schema(),
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&about).expect("about serializes")
    );
}
