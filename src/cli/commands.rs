//! CLI arguments
//!
//! Singer taps use flags rather than subcommands: `--discover` and `--about`
//! switch modes, everything else is a sync run.

use clap::Parser;
use std::path::PathBuf;

/// Singer tap for the Awin affiliate-marketing API
#[derive(Parser, Debug)]
#[command(name = "tap-awin")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Catalog file with stream selection (JSON)
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// State file to resume from (JSON)
    #[arg(short, long)]
    pub state: Option<PathBuf>,

    /// Emit the stream catalog and exit
    #[arg(short, long)]
    pub discover: bool,

    /// Emit tap metadata and config schema, then exit
    #[arg(long)]
    pub about: bool,

    /// Verbose logging (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sync_args() {
        let cli = Cli::parse_from([
            "tap-awin",
            "--config",
            "config.json",
            "--state",
            "state.json",
        ]);
        assert_eq!(cli.config.unwrap().to_str().unwrap(), "config.json");
        assert_eq!(cli.state.unwrap().to_str().unwrap(), "state.json");
        assert!(!cli.discover);
        assert!(!cli.about);
    }

    #[test]
    fn test_parse_discover() {
        let cli = Cli::parse_from(["tap-awin", "--config", "config.json", "--discover"]);
        assert!(cli.discover);
    }

    #[test]
    fn test_parse_about_needs_no_config() {
        let cli = Cli::parse_from(["tap-awin", "--about"]);
        assert!(cli.about);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_verbose_counts() {
        let cli = Cli::parse_from(["tap-awin", "-vv", "--about"]);
        assert_eq!(cli.verbose, 2);
    }
}
