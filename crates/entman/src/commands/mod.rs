//! Command dispatch: bridges CLI args -> panel operations -> output formatting.

pub mod bulk;
pub mod config_cmd;
pub mod domains;
pub mod entities;
pub mod export;
pub mod recorder;
pub mod report;
pub mod status;
pub mod util;

use entman_core::Panel;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a session-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, panel: &Panel, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Entities(args) => entities::handle(panel, args, global).await,
        Command::Bulk(args) => bulk::handle(panel, args, global).await,
        Command::Domains(args) => domains::handle(panel, args, global).await,
        Command::Export(args) => export::handle(panel, &args, global),
        Command::Report(args) => report::handle(panel, &args, global).await,
        Command::Recorder(args) => recorder::handle(panel, args, global).await,
        Command::Status => status::handle(panel, global),
        // Config and Completions are handled before a session is opened
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "command does not need a Home Assistant session".into(),
        )),
    }
}
