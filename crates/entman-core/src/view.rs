// ── View composition ──
//
// Turns a `PanelState` snapshot into a frontend-agnostic description of
// what to draw. Composing is pure: the same state and options always
// yield the same view, and the current filter values are always echoed
// back so a redraw never resets the inputs.

use serde::Serialize;

use crate::bulk::BulkProgress;
use crate::config::PanelOptions;
use crate::filter::{EntityFilter, distinct_domains, distinct_integrations};
use crate::model::{DomainStatus, DomainSummary, Entity};
use crate::selection::CheckState;
use crate::state::{PanelState, ViewMode};

/// Shown with every load failure.
pub const LOAD_GUIDANCE: &[&str] = &[
    "Make sure the Entity Manager integration is installed in custom_components/entity_manager",
    "Add it under Settings > Devices & Services > Integrations",
    "Restart Home Assistant after installing or updating it",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PanelStats {
    pub total: usize,
    pub enabled: usize,
    pub disabled: usize,
    pub excluded: usize,
    pub shown: usize,
    pub selected: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityRow {
    pub entity_id: String,
    pub name: String,
    pub domain: String,
    pub integration: String,
    pub state: String,
    pub enabled: bool,
    pub recorder_days: u32,
    pub recorder_exclude: bool,
    pub selected: bool,
}

impl EntityRow {
    fn new(entity: &Entity, selected: bool) -> Self {
        Self {
            entity_id: entity.entity_id.clone(),
            name: entity.name.clone(),
            domain: entity.domain.clone(),
            integration: entity
                .integration_domain
                .clone()
                .unwrap_or_else(|| "unknown".into()),
            state: entity.state_label().to_owned(),
            enabled: entity.enabled,
            recorder_days: entity.recorder_days,
            recorder_exclude: entity.recorder_exclude,
            selected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainRow {
    pub domain: String,
    pub total: u32,
    pub excluded: u32,
    pub enabled: u32,
    /// "30 days" or "default".
    pub retention: String,
    pub status: DomainStatus,
    pub exclusion_percentage: u8,
    pub selected: bool,
}

impl DomainRow {
    fn new(summary: &DomainSummary, selected: bool) -> Self {
        let retention = match (summary.has_domain_config, summary.recorder_days) {
            (true, Some(days)) => format!("{days} days"),
            _ => "default".into(),
        };
        Self {
            domain: summary.domain.clone(),
            total: summary.total_entities,
            excluded: summary.excluded_entities,
            enabled: summary.enabled_entities,
            retention,
            status: summary.status,
            exclusion_percentage: summary.exclusion_percentage,
            selected,
        }
    }
}

/// Main area of the panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewBody {
    Loading,
    Error {
        message: String,
        guidance: Vec<String>,
    },
    Entities {
        rows: Vec<EntityRow>,
        select_all: CheckState,
    },
    Domains {
        rows: Vec<DomainRow>,
        select_all: CheckState,
    },
}

/// Choices offered by the integration and domain dropdowns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub domains: Vec<String>,
    pub integrations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelView {
    pub title: String,
    pub stats: PanelStats,
    pub body: ViewBody,
    pub show_filters: bool,
    pub show_bulk_actions: bool,
    /// The filter currently applied, for re-populating the inputs.
    pub filter: EntityFilter,
    pub filter_options: FilterOptions,
    pub progress: Option<BulkProgress>,
}

/// Build the view for `state`.
pub fn compose(state: &PanelState, options: &PanelOptions) -> PanelView {
    let stats = PanelStats {
        total: state.entities.len(),
        enabled: state.enabled_count(),
        disabled: state.entities.len() - state.enabled_count(),
        excluded: state.excluded_count(),
        shown: state.filtered.len(),
        selected: state.selection.len(),
    };

    PanelView {
        title: options.title.clone(),
        stats,
        body: body(state),
        show_filters: options.show_filters,
        show_bulk_actions: options.show_bulk_actions && !state.selection.is_empty(),
        filter: state.filter.clone(),
        filter_options: FilterOptions {
            domains: distinct_domains(&state.entities),
            integrations: distinct_integrations(&state.entities),
        },
        progress: state.progress.clone(),
    }
}

fn body(state: &PanelState) -> ViewBody {
    if let Some(failure) = &state.load_error {
        return ViewBody::Error {
            message: failure.message.clone(),
            guidance: LOAD_GUIDANCE.iter().map(|s| (*s).to_owned()).collect(),
        };
    }
    if state.loading && state.entities.is_empty() {
        return ViewBody::Loading;
    }

    match state.view {
        ViewMode::Entities => ViewBody::Entities {
            rows: state
                .filtered
                .iter()
                .map(|e| EntityRow::new(e, state.selection.contains(&e.entity_id)))
                .collect(),
            select_all: state.selection.check_state(state.visible_ids()),
        },
        ViewMode::Domains => ViewBody::Domains {
            rows: state
                .domains
                .iter()
                .map(|d| DomainRow::new(d, state.domain_selection.contains(&d.domain)))
                .collect(),
            select_all: state
                .domain_selection
                .check_state(state.domains.iter().map(|d| d.domain.as_str())),
        },
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use serde_json::Map;

    use super::*;
    use crate::error::CoreError;
    use crate::filter::StateCategory;
    use crate::selection::PrunePolicy;

    fn entity(id: &str, state: Option<&str>, enabled: bool, excluded: bool) -> Entity {
        Entity {
            entity_id: id.into(),
            name: id.into(),
            domain: Entity::domain_of(id).into(),
            integration_domain: Some("demo".into()),
            state: state.map(Into::into),
            enabled,
            recorder_days: 10,
            recorder_exclude: excluded,
            attributes: Map::new(),
        }
    }

    fn state() -> PanelState {
        let mut state = PanelState::new(PrunePolicy::OnFilter);
        state.finish_load(
            vec![
                entity("light.a", Some("on"), true, false),
                entity("sensor.b", Some("unavailable"), true, true),
                entity("switch.c", None, false, false),
            ],
            vec![DomainSummary {
                domain: "light".into(),
                total_entities: 1,
                excluded_entities: 0,
                enabled_entities: 1,
                recorder_days: Some(30),
                has_domain_config: true,
                status: DomainStatus::Included,
                exclusion_percentage: 0,
            }],
            &PanelOptions::default(),
            Utc::now(),
        );
        state
    }

    #[test]
    fn stats_count_loaded_and_visible() {
        let mut state = state();
        state.update_filter(|f| f.state = Some(StateCategory::Unavailable));
        state.toggle("sensor.b", true);

        let view = compose(&state, &PanelOptions::default());
        assert_eq!(
            view.stats,
            PanelStats {
                total: 3,
                enabled: 2,
                disabled: 1,
                excluded: 1,
                shown: 1,
                selected: 1,
            }
        );
        assert_eq!(view.title, "Entity Manager");
        assert!(view.show_bulk_actions);
    }

    #[test]
    fn filter_values_echoed_back() {
        let mut state = state();
        state.update_filter(|f| f.search = "sens".into());
        let view = compose(&state, &PanelOptions::default());
        assert_eq!(view.filter.search, "sens");
        assert_eq!(view.filter_options.domains, vec!["light", "sensor", "switch"]);
        assert_eq!(view.filter_options.integrations, vec!["demo"]);
    }

    #[test]
    fn rows_show_missing_state_as_not_provided() {
        let view = compose(&state(), &PanelOptions::default());
        let ViewBody::Entities { rows, select_all } = view.body else {
            panic!("expected entity rows");
        };
        assert_eq!(rows[2].state, "not_provided");
        assert_eq!(select_all, CheckState::Unchecked);
    }

    #[test]
    fn select_all_is_indeterminate_on_partial_selection() {
        let mut state = state();
        state.toggle("light.a", true);
        let view = compose(&state, &PanelOptions::default());
        assert!(matches!(
            view.body,
            ViewBody::Entities { select_all: CheckState::Indeterminate, .. }
        ));
    }

    #[test]
    fn bulk_bar_hidden_without_selection_or_when_disabled() {
        let mut state = state();
        assert!(!compose(&state, &PanelOptions::default()).show_bulk_actions);

        state.toggle("light.a", true);
        let options = PanelOptions {
            show_bulk_actions: false,
            ..PanelOptions::default()
        };
        assert!(!compose(&state, &options).show_bulk_actions);
    }

    #[test]
    fn error_replaces_body_with_guidance() {
        let mut state = state();
        state.fail_load(&CoreError::NotConnected);
        let view = compose(&state, &PanelOptions::default());
        match view.body {
            ViewBody::Error { message, guidance } => {
                assert_eq!(message, "Not connected to Home Assistant");
                assert_eq!(guidance.len(), LOAD_GUIDANCE.len());
            }
            other => panic!("expected error body, got {other:?}"),
        }
    }

    #[test]
    fn domain_view_lists_domains() {
        let mut state = state();
        state.view = ViewMode::Domains;
        let view = compose(&state, &PanelOptions::default());
        let ViewBody::Domains { rows, .. } = view.body else {
            panic!("expected domain rows");
        };
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].retention, "30 days");
    }

    #[test]
    fn first_load_shows_loading() {
        let mut state = PanelState::default();
        state.begin_load();
        assert_eq!(compose(&state, &PanelOptions::default()).body, ViewBody::Loading);
    }
}
