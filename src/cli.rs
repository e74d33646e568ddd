//! Command-line interface argument parsing.

use clap::Parser;
use std::path::PathBuf;

/// Startup funding dashboard
///
/// Serves an interactive analysis of Indian startup funding rounds
/// (2015-2020) read from a CSV file.
///
/// Examples:
///   funding_dashboard --data data/startup_funding.csv
///   funding_dashboard --config dashboard.toml --port 9000
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, looks for dashboard.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Funding dataset CSV
    #[arg(short, long, value_name = "FILE", env = "DASHBOARD_DATA")]
    pub data: Option<PathBuf>,

    /// Address to bind the web server to
    #[arg(long, env = "DASHBOARD_HOST")]
    pub host: Option<String>,

    /// Port to bind the web server to
    #[arg(short, long, env = "DASHBOARD_PORT")]
    pub port: Option<u16>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Default log filter when RUST_LOG is unset
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags() {
        let args = Args::parse_from(["funding_dashboard"]);
        assert!(args.config.is_none());
        assert!(!args.verbose);
        assert_eq!(args.log_filter(), "info");
    }

    #[test]
    fn test_flags() {
        let args = Args::parse_from(["funding_dashboard", "-v", "--host", "0.0.0.0", "-p", "3000"]);
        assert_eq!(args.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(args.port, Some(3000));
        assert_eq!(args.log_filter(), "debug");
    }
}
