//! Bulk command handler: batched actions with a progress bar.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tabled::Tabled;

use entman_core::{BATCH_SIZE, BatchOutcome, BulkAction, BulkReport, Panel};

use crate::cli::{BulkArgs, BulkVerb, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Report rows ─────────────────────────────────────────────────────

#[derive(Serialize)]
struct BatchLine {
    batch: usize,
    entities: usize,
    ok: bool,
    error: Option<String>,
}

#[derive(Tabled)]
struct BatchRow {
    #[tabled(rename = "Batch")]
    batch: usize,
    #[tabled(rename = "Entities")]
    entities: usize,
    #[tabled(rename = "Result")]
    result: String,
}

fn batch_lines(report: &BulkReport) -> Vec<BatchLine> {
    report
        .batches
        .iter()
        .enumerate()
        .map(|(i, b)| BatchLine {
            batch: i + 1,
            entities: b.ids.len(),
            ok: b.outcome.is_ok(),
            error: match &b.outcome {
                BatchOutcome::Ok => None,
                BatchOutcome::Failed(reason) => Some(reason.clone()),
            },
        })
        .collect()
}

fn verb(action: BulkVerb) -> &'static str {
    match action {
        BulkVerb::Enable => "enable",
        BulkVerb::Disable => "disable",
        BulkVerb::SetRecorderDays => "set-recorder-days",
        BulkVerb::ExcludeRecorder => "exclude-recorder",
        BulkVerb::IncludeRecorder => "include-recorder",
        BulkVerb::Delete => "delete",
    }
}

/// One tick per batch.
fn progress_bar(batches: usize, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(u64::try_from(batches).unwrap_or(u64::MAX));
    if let Ok(style) =
        ProgressStyle::with_template("{spinner} {msg} [{bar:30}] {pos}/{len} ({percent}%)")
    {
        bar.set_style(style.progress_chars("=> "));
    }
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(panel: &Panel, args: BulkArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let action = BulkAction::from_verb(verb(args.action), args.days.as_deref())?;

    // Selection: explicit ids, or everything the filters match.
    if args.ids.is_empty() {
        panel.set_filter(util::entity_filter(&args.filter));
        panel.select_all_visible(true);
    } else {
        util::require_entities(panel, &args.ids)?;
        for id in &args.ids {
            panel.toggle(id, true);
        }
    }

    let count = panel.state().selected_ids().len();
    if count == 0 {
        output::notice("No entities match the given filters", global.quiet);
        return Ok(());
    }

    let Some(confirmed) =
        util::confirmation(action.verb(), &action.confirm_prompt(count), global.yes)?
    else {
        output::notice("Aborted", global.quiet);
        return Ok(());
    };

    let bar = progress_bar(count.div_ceil(BATCH_SIZE), global.quiet);
    bar.set_message(action.title());
    let report = panel
        .run_bulk(action, Some(confirmed), |progress| {
            bar.set_position(u64::try_from(progress.completed).unwrap_or(u64::MAX));
            bar.set_message(progress.label());
            if let BatchOutcome::Failed(reason) = &progress.outcome {
                bar.println(format!("batch failed: {reason}"));
            }
        })
        .await?;
    bar.finish_and_clear();

    let lines = batch_lines(&report);
    let out = output::render_list(
        &global.output,
        &lines,
        |l| BatchRow {
            batch: l.batch,
            entities: l.entities,
            result: l.error.clone().unwrap_or_else(|| "ok".into()),
        },
        |l| format!("{} {}", l.batch, if l.ok { "ok" } else { "failed" }),
    )?;
    output::print_output(&out, global.quiet);

    let failed = report.failed_ids();
    if failed.is_empty() {
        output::notice(
            &format!("{}: {} entities done", action.title(), report.total_ids()),
            global.quiet,
        );
        Ok(())
    } else {
        Err(CliError::PartialFailure {
            action: action.verb().into(),
            failed: failed.len(),
            total: report.total_ids(),
            failed_ids: failed.join(", "),
        })
    }
}
