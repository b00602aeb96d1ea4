//! Shared helpers for command handlers.

use std::io::IsTerminal;

use entman_core::{
    CommandResult, Confirmed, EnabledCategory, EntityFilter, Panel, RecorderCategory,
    StateCategory,
};

use crate::cli::{EnabledFilter, FilterArgs, RecorderFilter, StateFilter};
use crate::error::CliError;

/// Translate filter flags into the panel's filter.
pub fn entity_filter(args: &FilterArgs) -> EntityFilter {
    EntityFilter {
        search: args.search.clone().unwrap_or_default(),
        state: args.state.map(|s| match s {
            StateFilter::Normal => StateCategory::Normal,
            StateFilter::Unavailable => StateCategory::Unavailable,
            StateFilter::Unknown => StateCategory::Unknown,
            StateFilter::Disabled => StateCategory::Disabled,
            StateFilter::NotProvided => StateCategory::NotProvided,
        }),
        integration: args.integration.clone(),
        domain: args.domain.clone(),
        enabled: args.status.map(|s| match s {
            EnabledFilter::Enabled => EnabledCategory::Enabled,
            EnabledFilter::Disabled => EnabledCategory::Disabled,
        }),
        recorder: args.recorder.map(|r| match r {
            RecorderFilter::Excluded => RecorderCategory::Excluded,
            RecorderFilter::Included => RecorderCategory::Included,
        }),
        only_ids: None,
    }
}

/// Fail with `NotFound` unless every id is in the loaded collection.
pub fn require_entities(panel: &Panel, ids: &[String]) -> Result<(), CliError> {
    let state = panel.state();
    match ids.iter().find(|id| state.entity(id).is_none()) {
        Some(missing) => Err(CliError::NotFound {
            resource_type: "entity".into(),
            identifier: missing.clone(),
            list_command: "entities list".into(),
        }),
        None => Ok(()),
    }
}

/// Fail with `NotFound` unless `domain` has a summary.
pub fn require_domain(panel: &Panel, domain: &str) -> Result<(), CliError> {
    if panel.state().domains.iter().any(|d| d.domain == domain) {
        Ok(())
    } else {
        Err(CliError::NotFound {
            resource_type: "domain".into(),
            identifier: domain.into(),
            list_command: "domains list".into(),
        })
    }
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Obtain a [`Confirmed`] token for `action`.
///
/// Returns `None` when the user declined. Without a terminal the
/// prompt cannot be shown, so `--yes` is required.
pub fn confirmation(action: &str, prompt: &str, yes_flag: bool) -> Result<Option<Confirmed>, CliError> {
    if !yes_flag && !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    Ok(confirm(prompt, yes_flag)?.then(Confirmed::by_user))
}

/// Human-readable outcome of a single command.
pub fn describe_result(result: &CommandResult, fallback: &str) -> String {
    match result {
        CommandResult::Ok => fallback.into(),
        CommandResult::Message(message) => message.clone(),
        CommandResult::RecorderConfig(outcome) => outcome.message.clone(),
        CommandResult::Purged(outcome) => outcome.message.clone(),
    }
}
