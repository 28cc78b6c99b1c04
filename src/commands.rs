use std::io::Write;

use anyhow::{anyhow, Result};

use crate::cli::{CliCommand, PanelsArgs, SetLimitArgs};
use crate::core::{AppContext, PanelKind};

pub fn execute<W: Write>(context: &AppContext, command: CliCommand, mut writer: W) -> Result<()> {
    match command {
        CliCommand::Settings => print_settings(context, &mut writer),
        CliCommand::SetLimit(args) => handle_set_limit(context, &args, &mut writer),
        CliCommand::Reset => {
            context.settings().reset();
            print_settings(context, &mut writer)
        }
        CliCommand::Panels(args) => handle_panels(context, &args, &mut writer),
    }
}

fn print_settings<W: Write>(context: &AppContext, mut writer: W) -> Result<()> {
    let json = context
        .settings()
        .with(|settings| serde_json::to_string_pretty(settings))?;
    writeln!(writer, "{json}")?;
    Ok(())
}

fn handle_set_limit<W: Write>(
    context: &AppContext,
    args: &SetLimitArgs,
    mut writer: W,
) -> Result<()> {
    context
        .settings()
        .update(|settings| settings.result_limit = i64::from(args.limit));
    writeln!(writer, "Showing up to {} results", args.limit)?;
    Ok(())
}

fn handle_panels<W: Write>(context: &AppContext, args: &PanelsArgs, mut writer: W) -> Result<()> {
    let registry = context.panels();
    let mut unknown = Vec::new();
    for raw in &args.kinds {
        match raw.parse::<PanelKind>() {
            Ok(kind) => registry.add_kind(kind),
            Err(err) => {
                tracing::debug!(error = %err, "skipping panel");
                unknown.push(raw.clone());
            }
        }
    }

    if registry.is_empty() {
        writeln!(writer, "No panels mounted")?;
    }
    for (position, (_, panel)) in registry.list().iter().enumerate() {
        writeln!(
            writer,
            "{}. {} ({})",
            position + 1,
            panel.kind().title(),
            panel.kind()
        )?;
    }

    if unknown.is_empty() {
        Ok(())
    } else {
        let known: Vec<&str> = registry.catalog().kinds().collect();
        Err(anyhow!(
            "unknown panel kind: {} (expected one of: {})",
            unknown.join(", "),
            known.join(", ")
        ))
    }
}
