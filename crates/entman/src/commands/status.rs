//! Status command handler.

use std::fmt::Write as _;

use serde::Serialize;

use entman_core::Panel;
use entman_core::view::PanelStats;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct StatusOutput {
    url: String,
    title: String,
    domains: usize,
    last_loaded: Option<String>,
    #[serde(flatten)]
    stats: PanelStats,
}

fn detail(s: &StatusOutput) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} @ {}", s.title, s.url);
    if let Some(ref at) = s.last_loaded {
        let _ = writeln!(out, "Loaded:   {at}");
    }
    let _ = writeln!(out, "Entities: {}", s.stats.total);
    let _ = writeln!(out, "Enabled:  {}", s.stats.enabled);
    let _ = writeln!(out, "Disabled: {}", s.stats.disabled);
    let _ = writeln!(out, "Excluded: {}", s.stats.excluded);
    let _ = write!(out, "Domains:  {}", s.domains);
    out
}

/// A connected panel proves the integration answers; report its counts.
pub fn handle(panel: &Panel, global: &GlobalOpts) -> Result<(), CliError> {
    let state = panel.state();
    let view = panel.view();
    let status = StatusOutput {
        url: panel.config().url.to_string(),
        title: view.title,
        domains: state.domains.len(),
        last_loaded: state.last_loaded.map(|t| t.to_rfc3339()),
        stats: view.stats,
    };

    let out = output::render_single(&global.output, &status, detail, |s| {
        s.stats.total.to_string()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
