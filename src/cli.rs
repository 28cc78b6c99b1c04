use std::path::PathBuf;

use clap::{value_parser, Args, Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "seek",
    version,
    about = "Settings and panel layout for the seek file search shell.",
    after_help = "Examples:\n  seek settings\n  seek set-limit 50\n  seek panels SearchResult ParseError\n  seek reset --log debug"
)]
pub struct Cli {
    /// Settings database to use (defaults to $SEEK_SETTINGS, then the platform config dir)
    #[arg(long = "settings", value_name = "FILE", global = true)]
    pub settings_path: Option<PathBuf>,

    /// Tracing filter (e.g. "info", "seek_core=debug"); takes precedence over RUST_LOG
    #[arg(long = "log", value_name = "DIRECTIVE", global = true)]
    pub log_filter: Option<String>,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CliCommand {
    /// Print the current user settings as JSON (default command)
    Settings,
    /// Change the maximum number of results to show
    SetLimit(SetLimitArgs),
    /// Restore the default user settings
    Reset,
    /// Mount panels by kind and print the resulting layout
    Panels(PanelsArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SetLimitArgs {
    #[arg(value_name = "COUNT", value_parser = value_parser!(u32))]
    pub limit: u32,
}

#[derive(Args, Debug, Clone)]
pub struct PanelsArgs {
    /// Panel kinds to mount, in order (e.g. SearchResult ParseError)
    #[arg(value_name = "KIND")]
    pub kinds: Vec<String>,
}
