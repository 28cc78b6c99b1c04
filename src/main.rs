use anyhow::{Context, Result};
use clap::Parser;

fn main() -> Result<()> {
    let cli = seek::cli::Cli::parse();
    seek::init_tracing(cli.log_filter.as_deref())?;

    let config = seek::AppConfig::discover(cli.settings_path.clone())
        .context("failed to locate settings")?;
    let context = seek::AppContext::bootstrap(&config).context("failed to start session")?;
    tracing::debug!(settings = %config.settings_path().display(), "session started");

    let command = cli.command.unwrap_or(seek::cli::CliCommand::Settings);
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    seek::commands::execute(&context, command, &mut handle)
}
