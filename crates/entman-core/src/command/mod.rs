// ── Command API ──
//
// Single-item writes flow through a unified `Command` enum. The panel
// routes each variant to one backend call; bulk runs go through
// `Panel::run_bulk` instead.

use entman_api::EntityManagerClient;
use entman_api::types::StatusResponse;

use crate::error::CoreError;
use crate::model::{PurgeOutcome, RecorderConfigOutcome};
use crate::state::PanelState;

/// A command envelope sent through the command channel.
/// Contains the command and a oneshot response channel.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: tokio::sync::oneshot::Sender<Result<CommandResult, CoreError>>,
}

/// All single-item write operations against the integration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // ── Entity operations ────────────────────────────────────────────
    SetEnabled {
        entity_id: String,
        enabled: bool,
    },
    SetRecorderDays {
        entity_id: String,
        days: u32,
    },
    SetRecorderExclude {
        entity_id: String,
        exclude: bool,
    },
    DeleteEntity {
        entity_id: String,
    },
    /// Drop recorded history of one entity.
    PurgeEntity {
        entity_id: String,
        force: bool,
    },

    // ── Domain operations ────────────────────────────────────────────
    ExcludeDomain {
        domain: String,
    },
    IncludeDomain {
        domain: String,
    },
    SetDomainRecorderDays {
        domain: String,
        days: u32,
    },

    // ── Recorder maintenance ─────────────────────────────────────────
    /// Rewrite the recorder exclusion config from current exclusions.
    UpdateRecorderConfig {
        backup: bool,
    },
    /// Purge history of every excluded entity.
    PurgeAllExcluded {
        force: bool,
    },
    ReloadConfig,
}

/// Result of a command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    Ok,
    /// Backend acknowledgement text.
    Message(String),
    RecorderConfig(RecorderConfigOutcome),
    Purged(PurgeOutcome),
}

impl Command {
    /// Irreversible commands need a [`Confirmed`](crate::Confirmed) token.
    pub fn is_destructive(&self) -> bool {
        matches!(
            self,
            Self::DeleteEntity { .. }
                | Self::PurgeEntity { .. }
                | Self::ExcludeDomain { .. }
                | Self::UpdateRecorderConfig { .. }
                | Self::PurgeAllExcluded { .. }
        )
    }

    /// Short description used in confirmations and logs.
    pub fn describe(&self) -> String {
        match self {
            Self::SetEnabled { entity_id, enabled } => {
                let verb = if *enabled { "Enable" } else { "Disable" };
                format!("{verb} {entity_id}")
            }
            Self::SetRecorderDays { entity_id, days } => {
                format!("Keep {days} days of history for {entity_id}")
            }
            Self::SetRecorderExclude { entity_id, exclude } => {
                let verb = if *exclude { "Exclude" } else { "Include" };
                format!("{verb} {entity_id} in the recorder")
            }
            Self::DeleteEntity { entity_id } => format!("Delete {entity_id}"),
            Self::PurgeEntity { entity_id, .. } => format!("Purge recorded history of {entity_id}"),
            Self::ExcludeDomain { domain } => format!("Exclude domain {domain} from the recorder"),
            Self::IncludeDomain { domain } => format!("Include domain {domain} in the recorder"),
            Self::SetDomainRecorderDays { domain, days } => {
                format!("Keep {days} days of history for domain {domain}")
            }
            Self::UpdateRecorderConfig { .. } => "Update the recorder exclusion config".into(),
            Self::PurgeAllExcluded { .. } => "Purge history of all excluded entities".into(),
            Self::ReloadConfig => "Reload the entity manager config".into(),
        }
    }

    /// Whether a successful run changes what a reload would return.
    pub(crate) fn refreshes(&self) -> bool {
        !matches!(self, Self::PurgeEntity { .. } | Self::PurgeAllExcluded { .. })
    }

    /// Local checks made before anything is sent.
    pub(crate) fn validate(&self, state: &PanelState) -> Result<(), CoreError> {
        match self {
            Self::SetDomainRecorderDays { days: 0, .. } => Err(CoreError::validation(
                "domain retention must be at least 1 day",
            )),
            Self::UpdateRecorderConfig { .. } | Self::PurgeAllExcluded { .. }
                if state.excluded_count() == 0 =>
            {
                Err(CoreError::validation(
                    "No entities are excluded from the recorder",
                ))
            }
            _ => Ok(()),
        }
    }
}

fn ack<T: StatusResponse>(resp: &T) -> Result<CommandResult, CoreError> {
    if let Some(message) = resp.rejection() {
        return Err(CoreError::Rejected { message });
    }
    Ok(resp
        .message()
        .map_or(CommandResult::Ok, |m| CommandResult::Message(m.to_owned())))
}

/// Route a command to the matching backend call.
pub(crate) async fn route_command(
    client: &EntityManagerClient,
    cmd: Command,
) -> Result<CommandResult, CoreError> {
    match cmd {
        // ── Entity operations ────────────────────────────────────────
        Command::SetEnabled { entity_id, enabled } => {
            client.update_entity_state(&entity_id, enabled).await?;
            Ok(CommandResult::Ok)
        }
        Command::SetRecorderDays { entity_id, days } => {
            client.update_recorder_days(&entity_id, days).await?;
            Ok(CommandResult::Ok)
        }
        Command::SetRecorderExclude { entity_id, exclude } => {
            client.update_recorder_exclude(&entity_id, exclude).await?;
            Ok(CommandResult::Ok)
        }
        Command::DeleteEntity { entity_id } => {
            client.delete_entity(&entity_id).await?;
            Ok(CommandResult::Ok)
        }
        Command::PurgeEntity { entity_id, force } => {
            client
                .purge_recorder(std::slice::from_ref(&entity_id), force)
                .await?;
            Ok(CommandResult::Ok)
        }

        // ── Domain operations ────────────────────────────────────────
        Command::ExcludeDomain { domain } => ack(&client.exclude_domain(&domain).await?),
        Command::IncludeDomain { domain } => ack(&client.include_domain(&domain).await?),
        Command::SetDomainRecorderDays { domain, days } => {
            ack(&client.update_domain_recorder_days(&domain, days).await?)
        }

        // ── Recorder maintenance ─────────────────────────────────────
        Command::UpdateRecorderConfig { backup } => {
            let resp = client.update_recorder_config(backup).await?;
            Ok(CommandResult::RecorderConfig(resp.try_into()?))
        }
        Command::PurgeAllExcluded { force } => {
            let resp = client.purge_all_entities(force).await?;
            Ok(CommandResult::Purged(resp.try_into()?))
        }
        Command::ReloadConfig => {
            client.reload_config().await?;
            Ok(CommandResult::Ok)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn destructive_commands() {
        assert!(Command::DeleteEntity { entity_id: "light.a".into() }.is_destructive());
        assert!(Command::PurgeAllExcluded { force: false }.is_destructive());
        assert!(
            !Command::SetEnabled {
                entity_id: "light.a".into(),
                enabled: false
            }
            .is_destructive()
        );
        assert!(!Command::ReloadConfig.is_destructive());
    }

    #[test]
    fn maintenance_needs_excluded_entities() {
        let state = PanelState::default();
        let err = Command::UpdateRecorderConfig { backup: true }
            .validate(&state)
            .unwrap_err();
        assert!(err.is_validation());
        assert!(Command::ReloadConfig.validate(&state).is_ok());
    }

    #[test]
    fn zero_domain_retention_rejected_locally() {
        let cmd = Command::SetDomainRecorderDays {
            domain: "sensor".into(),
            days: 0,
        };
        assert!(cmd.validate(&PanelState::default()).is_err());
    }
}
