//! Recorder report command handler.

use std::fmt::Write as _;

use tabled::{Table, Tabled, settings::Style};

use entman_core::{Panel, RecorderReport, ReportEntry};

use crate::cli::{GlobalOpts, ReportArgs};
use crate::error::CliError;
use crate::output;

use super::entities;

#[derive(Tabled)]
struct ReportRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "Entity ID")]
    entity_id: String,
    #[tabled(rename = "Records")]
    records: u64,
}

fn detail(report: &RecorderReport, top: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Entities analyzed: {}", report.entities_analyzed);
    let _ = writeln!(out, "Total records:     {}", report.total_records);
    if let Some(ref url) = report.download_url {
        let _ = writeln!(out, "Full report:       {url}");
    }

    let rows: Vec<ReportRow> = report
        .top(top)
        .iter()
        .enumerate()
        .map(|(i, e): (usize, &ReportEntry)| ReportRow {
            rank: i + 1,
            entity_id: e.entity_id.clone(),
            records: e.record_count,
        })
        .collect();
    if !rows.is_empty() {
        let _ = writeln!(out);
        let _ = write!(out, "{}", Table::new(rows).with(Style::rounded()));
    }
    out
}

pub async fn handle(panel: &Panel, args: &ReportArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let report = panel.recorder_report(args.limit).await?;

    if args.entities {
        panel.filter_to_report(&report);
        return entities::render_rows(&entities::visible_rows(panel), global);
    }

    let out = output::render_single(
        &global.output,
        &report,
        |r| detail(r, args.top),
        |r| {
            r.top(args.top)
                .iter()
                .map(|e| format!("{} {}", e.entity_id, e.record_count))
                .collect::<Vec<_>>()
                .join("\n")
        },
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
