//! Entity command handlers.

use tabled::Tabled;

use entman_core::view::EntityRow;
use entman_core::{Command as CoreCommand, Panel, ViewBody};

use crate::cli::{EntitiesArgs, EntitiesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub(super) struct EntityTableRow {
    #[tabled(rename = "Entity ID")]
    entity_id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Integration")]
    integration: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
    #[tabled(rename = "Recorder")]
    recorder: String,
}

impl EntityTableRow {
    pub(super) fn new(row: &EntityRow, color: bool) -> Self {
        let recorder = if row.recorder_exclude {
            output::dim("excluded", color)
        } else {
            format!("{} days", row.recorder_days)
        };
        Self {
            entity_id: row.entity_id.clone(),
            name: row.name.clone(),
            state: row.state.clone(),
            integration: row.integration.clone(),
            enabled: output::yes_no(row.enabled, color),
            recorder,
        }
    }
}

/// Rows of the entity view; empty when the panel shows anything else.
pub(super) fn visible_rows(panel: &Panel) -> Vec<EntityRow> {
    match panel.view().body {
        ViewBody::Entities { rows, .. } => rows,
        _ => Vec::new(),
    }
}

pub(super) fn render_rows(rows: &[EntityRow], global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        rows,
        |r| EntityTableRow::new(r, color),
        |r| r.entity_id.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(panel: &Panel, args: EntitiesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        EntitiesCommand::List(filter) => {
            panel.set_filter(util::entity_filter(&filter));
            render_rows(&visible_rows(panel), global)
        }

        EntitiesCommand::Enable { ids } => {
            apply_each(panel, &ids, global, "Enabled", |entity_id| {
                CoreCommand::SetEnabled {
                    entity_id,
                    enabled: true,
                }
            })
            .await
        }

        EntitiesCommand::Disable { ids } => {
            apply_each(panel, &ids, global, "Disabled", |entity_id| {
                CoreCommand::SetEnabled {
                    entity_id,
                    enabled: false,
                }
            })
            .await
        }

        EntitiesCommand::Exclude { ids } => {
            apply_each(panel, &ids, global, "Excluded from recorder", |entity_id| {
                CoreCommand::SetRecorderExclude {
                    entity_id,
                    exclude: true,
                }
            })
            .await
        }

        EntitiesCommand::Include { ids } => {
            apply_each(panel, &ids, global, "Included in recorder", |entity_id| {
                CoreCommand::SetRecorderExclude {
                    entity_id,
                    exclude: false,
                }
            })
            .await
        }

        EntitiesCommand::SetDays { days, ids } => {
            let label = format!("Set {days} days of retention on");
            apply_each(panel, &ids, global, &label, |entity_id| {
                CoreCommand::SetRecorderDays { entity_id, days }
            })
            .await
        }

        EntitiesCommand::Delete { ids } => {
            util::require_entities(panel, &ids)?;
            let prompt = format!(
                "PERMANENTLY delete {} entities? This cannot be undone!",
                ids.len()
            );
            let Some(confirmed) = util::confirmation("delete", &prompt, global.yes)? else {
                output::notice("Aborted", global.quiet);
                return Ok(());
            };
            for entity_id in ids {
                let result = panel
                    .execute(
                        CoreCommand::DeleteEntity {
                            entity_id: entity_id.clone(),
                        },
                        Some(confirmed),
                    )
                    .await?;
                output::notice(
                    &util::describe_result(&result, &format!("Deleted {entity_id}")),
                    global.quiet,
                );
            }
            Ok(())
        }

        EntitiesCommand::Purge { ids, force } => {
            util::require_entities(panel, &ids)?;
            let prompt = format!("Purge the recorded history of {} entities?", ids.len());
            let Some(confirmed) = util::confirmation("purge", &prompt, global.yes)? else {
                output::notice("Aborted", global.quiet);
                return Ok(());
            };
            for entity_id in ids {
                let result = panel
                    .execute(
                        CoreCommand::PurgeEntity {
                            entity_id: entity_id.clone(),
                            force,
                        },
                        Some(confirmed),
                    )
                    .await?;
                output::notice(
                    &util::describe_result(&result, &format!("Purged {entity_id}")),
                    global.quiet,
                );
            }
            Ok(())
        }
    }
}

/// Run one non-destructive command per id, stopping at the first error.
async fn apply_each(
    panel: &Panel,
    ids: &[String],
    global: &GlobalOpts,
    done: &str,
    make: impl Fn(String) -> CoreCommand,
) -> Result<(), CliError> {
    util::require_entities(panel, ids)?;
    for entity_id in ids {
        let result = panel.execute(make(entity_id.clone()), None).await?;
        output::notice(
            &util::describe_result(&result, &format!("{done} {entity_id}")),
            global.quiet,
        );
    }
    Ok(())
}
