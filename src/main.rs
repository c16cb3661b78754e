//! tap-awin binary
//!
//! Protocol messages go to stdout, logs go to stderr.

use clap::Parser;
use tap_awin::cli::{self, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // stderr only: stdout is reserved for Singer messages
    let default_level = match cli.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(default_level.into()),
        )
        .init();

    if let Err(e) = cli::run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
