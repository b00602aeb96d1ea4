//! Export command handler.

use entman_core::Panel;

use crate::cli::{ExportArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

pub fn handle(panel: &Panel, args: &ExportArgs, global: &GlobalOpts) -> Result<(), CliError> {
    panel.set_filter(util::entity_filter(&args.filter));
    let export = panel.export()?;

    if args.stdout {
        // The export document is the output; --output does not apply.
        print!("{}", export.content);
        return Ok(());
    }

    std::fs::create_dir_all(&args.out)?;
    let path = args.out.join(&export.filename);
    std::fs::write(&path, &export.content)?;
    tracing::info!(path = %path.display(), count = export.count, "export written");

    output::notice(
        &format!("Exported {} entities to {}", export.count, path.display()),
        global.quiet,
    );
    Ok(())
}
