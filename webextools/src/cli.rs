use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// WebexTools - Command-line tools for Cisco Webex
#[derive(Parser, Debug)]
#[command(name = "webextools", version, about)]
pub struct Cli {
    /// Configuration file (yaml/toml/json); the extension may be omitted.
    /// Defaults to an optional `webextools.*` in the working directory.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Webex API access token, overriding the configuration file and
    /// the WEBEX_TEAMS_ACCESS_TOKEN environment variable.
    #[arg(long, global = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Disable Webex users based on CSV file
    DisableUsers(DisableUsersArgs),
    /// Generate recording audit report
    RecordingReport(RecordingReportArgs),
}

impl Command {
    pub fn verbosity(&self) -> u8 {
        match self {
            Self::DisableUsers(args) => args.verbose,
            Self::RecordingReport(args) => args.verbose,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct DisableUsersArgs {
    /// CSV file with users data
    #[arg(short, long)]
    pub file: PathBuf,

    /// Column name to use for user email
    #[arg(short, long, default_value = "email")]
    pub column: String,

    /// Write the report to a timestamped JSON file
    #[arg(short, long)]
    pub report: bool,

    /// Look users up but do not disable them
    #[arg(short, long)]
    pub dry_run: bool,

    /// Verbose output (can be specified multiple times)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Args, Debug, Clone)]
pub struct RecordingReportArgs {
    /// Recording report period in days (default 90 days, max 365 days)
    #[arg(short, long, default_value_t = 90)]
    pub period: u32,

    /// Recording report span in days (default 7 days, max 90 days)
    #[arg(short, long, default_value_t = 7)]
    pub span: u32,

    /// Specify the file name to write the report
    #[arg(short, long, value_name = "FILENAME")]
    pub write: Option<PathBuf>,

    /// List every view and download of each recording instead of one row per recording
    #[arg(long)]
    pub detailed: bool,

    /// Verbose output (can be specified multiple times)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
