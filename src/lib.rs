pub mod cli;
pub mod commands;

use std::io;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

pub use seek_core as core;
pub use seek_core::config;
pub use seek_core::panels;
pub use seek_core::settings;
pub use seek_core::{AppConfig, AppContext};

/// Install the stderr log subscriber. Stdout is reserved for command output.
pub fn init_tracing(directives: Option<&str>) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(directives)?)
        .with_writer(io::stderr)
        .without_time()
        .try_init()
        .map_err(|err| anyhow!("failed to install log subscriber: {err}"))
}

/// An explicit `--log` value replaces `RUST_LOG` entirely; without one,
/// `RUST_LOG` applies on top of a `warn` default.
fn log_filter(directives: Option<&str>) -> Result<EnvFilter> {
    match directives {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid log filter '{directives}'")),
        None => Ok(EnvFilter::builder()
            .with_default_directive(LevelFilter::WARN.into())
            .from_env_lossy()),
    }
}
