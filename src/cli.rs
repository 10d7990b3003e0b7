//! Command-line surface.
//!
//! Every `run` flag is optional: whatever is missing (or fails to
//! validate) is prompted for interactively instead.

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "ga4-reporter", version)]
#[command(about = "Run predefined GA4 reports with a local result cache")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path (default: ~/.ga4-reporter/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a report; prompts for anything not supplied via flags
    Run(RunArgs),
    /// List the available reports
    Reports,
    /// List the GA4 properties this token can access
    Properties,
    /// Inspect or clear the local result cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Numeric GA4 property id
    #[arg(short, long)]
    pub property_id: Option<String>,

    /// Report key or name, e.g. "top_cities" (see `reports`)
    #[arg(short, long)]
    pub report: Option<String>,

    /// Named range: last-7d, last-28d, last-90d or last-month
    #[arg(long)]
    pub range: Option<String>,

    /// Custom range start, YYYY-MM-DD (use with --end-date)
    #[arg(long)]
    pub start_date: Option<String>,

    /// Custom range end, YYYY-MM-DD
    #[arg(long)]
    pub end_date: Option<String>,

    /// Output: console, csv, html or files (csv + html)
    #[arg(short, long)]
    pub output: Option<String>,
}

impl RunArgs {
    /// All parameters supplied up front. If they also validate, the session
    /// runs exactly one iteration without prompting.
    pub fn is_complete(&self) -> bool {
        let has_range =
            self.range.is_some() || (self.start_date.is_some() && self.end_date.is_some());
        self.property_id.is_some() && self.report.is_some() && has_range && self.output.is_some()
    }
}

#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Remove every cached entry, fresh or stale
    Clear,
    /// Show entry count, location and TTL
    Stats,
}
