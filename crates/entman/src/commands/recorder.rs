//! Recorder maintenance handlers.

use entman_core::{Command as CoreCommand, CommandResult, Panel, RecorderHealth};

use crate::cli::{GlobalOpts, RecorderArgs, RecorderCommand};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(panel: &Panel, args: RecorderArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cmd = match args.command {
        RecorderCommand::Check => return check(panel, global).await,
        RecorderCommand::UpdateConfig { no_backup } => CoreCommand::UpdateRecorderConfig {
            backup: !no_backup,
        },
        RecorderCommand::PurgeAll { force } => CoreCommand::PurgeAllExcluded { force },
        RecorderCommand::Reload => CoreCommand::ReloadConfig,
    };

    let confirmed = if cmd.is_destructive() {
        let excluded = panel.state().excluded_count();
        let prompt = format!("{} ({excluded} excluded entities)?", cmd.describe());
        let Some(confirmed) = util::confirmation(&cmd.describe(), &prompt, global.yes)? else {
            output::notice("Aborted", global.quiet);
            return Ok(());
        };
        Some(confirmed)
    } else {
        None
    };

    let result = panel.execute(cmd, confirmed).await?;
    match result {
        CommandResult::RecorderConfig(outcome) => {
            let out = output::render_single(
                &global.output,
                &outcome,
                |o| {
                    format!(
                        "{}\nExcluded entities: {}\nExcluded domains:  {}",
                        o.message,
                        o.excluded_entities.len(),
                        o.excluded_domains.join(", ")
                    )
                },
                |o| o.excluded_entities.join("\n"),
            )?;
            output::print_output(&out, global.quiet);
        }
        CommandResult::Purged(outcome) => {
            let out = output::render_single(
                &global.output,
                &outcome,
                |o| format!("{}\nPurged entities: {}", o.message, o.purged_entities.len()),
                |o| o.purged_entities.join("\n"),
            )?;
            output::print_output(&out, global.quiet);
        }
        other => output::notice(&util::describe_result(&other, "Done"), global.quiet),
    }
    Ok(())
}

fn numbered(steps: &[&str]) -> String {
    steps
        .iter()
        .enumerate()
        .map(|(i, step)| format!("{}. {step}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

async fn check(panel: &Panel, global: &GlobalOpts) -> Result<(), CliError> {
    let health = panel.check_recorder().await?;
    match health {
        RecorderHealth::Healthy { rows } => {
            let out = output::render_single(
                &global.output,
                &health,
                |h| {
                    format!(
                        "Recorder is answering ({rows} history rows for sun.sun)\n\nIf the report still fails:\n{}",
                        numbered(h.guidance())
                    )
                },
                |_| format!("healthy {rows}"),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
        RecorderHealth::Unavailable { ref reason } => Err(CliError::RecorderUnavailable {
            reason: reason.clone(),
            guidance: numbered(health.guidance()),
        }),
    }
}
