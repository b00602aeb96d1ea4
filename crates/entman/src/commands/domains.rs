//! Domain command handlers.

use tabled::Tabled;

use entman_core::view::DomainRow;
use entman_core::{Command as CoreCommand, DomainAction, Panel, ViewBody, ViewMode};

use crate::cli::{DomainVerb, DomainsArgs, DomainsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DomainTableRow {
    #[tabled(rename = "Domain")]
    domain: String,
    #[tabled(rename = "Entities")]
    total: u32,
    #[tabled(rename = "Enabled")]
    enabled: u32,
    #[tabled(rename = "Excluded")]
    excluded: String,
    #[tabled(rename = "Retention")]
    retention: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&DomainRow> for DomainTableRow {
    fn from(r: &DomainRow) -> Self {
        Self {
            domain: r.domain.clone(),
            total: r.total,
            enabled: r.enabled,
            excluded: format!("{} ({}%)", r.excluded, r.exclusion_percentage),
            retention: r.retention.clone(),
            status: r.status.to_string(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(panel: &Panel, args: DomainsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        DomainsCommand::List => {
            panel.set_view(ViewMode::Domains);
            let rows = match panel.view().body {
                ViewBody::Domains { rows, .. } => rows,
                _ => Vec::new(),
            };
            let out = output::render_list(
                &global.output,
                &rows,
                |r| DomainTableRow::from(r),
                |r| r.domain.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DomainsCommand::Exclude { domain } => {
            util::require_domain(panel, &domain)?;
            let cmd = CoreCommand::ExcludeDomain {
                domain: domain.clone(),
            };
            let prompt = format!("Exclude every entity of domain '{domain}' from the recorder?");
            let Some(confirmed) = util::confirmation("exclude-domain", &prompt, global.yes)? else {
                output::notice("Aborted", global.quiet);
                return Ok(());
            };
            let result = panel.execute(cmd, Some(confirmed)).await?;
            output::notice(
                &util::describe_result(&result, &format!("Excluded domain {domain}")),
                global.quiet,
            );
            Ok(())
        }

        DomainsCommand::Include { domain } => {
            util::require_domain(panel, &domain)?;
            let result = panel
                .execute(
                    CoreCommand::IncludeDomain {
                        domain: domain.clone(),
                    },
                    None,
                )
                .await?;
            output::notice(
                &util::describe_result(&result, &format!("Included domain {domain}")),
                global.quiet,
            );
            Ok(())
        }

        DomainsCommand::SetDays { days, domain } => {
            util::require_domain(panel, &domain)?;
            let result = panel
                .execute(
                    CoreCommand::SetDomainRecorderDays {
                        domain: domain.clone(),
                        days,
                    },
                    None,
                )
                .await?;
            output::notice(
                &util::describe_result(
                    &result,
                    &format!("Domain {domain} keeps {days} days of history"),
                ),
                global.quiet,
            );
            Ok(())
        }

        DomainsCommand::Bulk {
            action,
            days,
            domains,
        } => {
            let action = match action {
                DomainVerb::Exclude => DomainAction::Exclude,
                DomainVerb::Include => DomainAction::Include,
                DomainVerb::SetRecorderDays => {
                    let raw = days.ok_or_else(|| CliError::Validation {
                        field: "days".into(),
                        reason: "set-recorder-days needs --days".into(),
                    })?;
                    DomainAction::SetRecorderDays(DomainAction::parse_recorder_days(&raw)?)
                }
            };

            for domain in &domains {
                util::require_domain(panel, domain)?;
                panel.toggle_domain(domain, true);
            }

            let prompt = action.confirm_prompt(domains.len());
            let confirmed = if action.is_destructive() {
                let Some(confirmed) = util::confirmation("domain bulk", &prompt, global.yes)?
                else {
                    output::notice("Aborted", global.quiet);
                    return Ok(());
                };
                Some(confirmed)
            } else {
                None
            };

            let result = panel.run_domain_bulk(action, confirmed).await?;
            output::notice(
                &util::describe_result(&result, &format!("{}: done", action.title())),
                global.quiet,
            );
            Ok(())
        }
    }
}
