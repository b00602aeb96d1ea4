// ── Panel state container ──
//
// Single source of truth for everything the panel shows. Every method
// here is a synchronous, side-effect-free transition; `Panel` performs
// the I/O and applies the results through these.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bulk::BulkProgress;
use crate::config::PanelOptions;
use crate::error::{CoreError, ErrorKind};
use crate::filter::{EntityFilter, apply_filters};
use crate::model::{DomainSummary, Entity};
use crate::selection::{PrunePolicy, Selection};

/// Which list the panel is showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Entities,
    Domains,
}

impl ViewMode {
    pub fn toggle(self) -> Self {
        match self {
            Self::Entities => Self::Domains,
            Self::Domains => Self::Entities,
        }
    }
}

/// Why the last load failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    pub kind: ErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct PanelState {
    pub loading: bool,
    pub entities: Vec<Entity>,
    pub domains: Vec<DomainSummary>,
    pub filter: EntityFilter,
    /// `apply_filters(entities, filter)`, kept in sync by every transition.
    pub filtered: Vec<Entity>,
    pub selection: Selection,
    pub domain_selection: Selection,
    pub view: ViewMode,
    /// Set when the last load failed; replaces the whole view.
    pub load_error: Option<LoadFailure>,
    /// Latest batch progress of a running bulk action.
    pub progress: Option<BulkProgress>,
    pub last_loaded: Option<DateTime<Utc>>,
    pub prune_policy: PrunePolicy,
}

impl PanelState {
    pub fn new(prune_policy: PrunePolicy) -> Self {
        Self {
            prune_policy,
            ..Self::default()
        }
    }

    // ── Loading ──────────────────────────────────────────────────────

    pub fn begin_load(&mut self) {
        self.loading = true;
    }

    /// Replace both collections wholesale and re-derive the view.
    pub fn finish_load(
        &mut self,
        entities: Vec<Entity>,
        domains: Vec<DomainSummary>,
        options: &PanelOptions,
        at: DateTime<Utc>,
    ) {
        self.entities = restrict(entities, options);
        self.domains = restrict_domains(domains, options);
        self.loading = false;
        self.load_error = None;
        self.last_loaded = Some(at);

        let known: HashSet<&str> = self.entities.iter().map(|e| e.entity_id.as_str()).collect();
        self.selection.prune(&known);
        let known_domains: HashSet<&str> = self.domains.iter().map(|d| d.domain.as_str()).collect();
        self.domain_selection.prune(&known_domains);

        self.recompute();
    }

    pub fn fail_load(&mut self, err: &CoreError) {
        self.loading = false;
        self.load_error = Some(LoadFailure {
            kind: err.kind(),
            message: err.to_string(),
        });
    }

    // ── Filtering ────────────────────────────────────────────────────

    pub fn set_filter(&mut self, filter: EntityFilter) {
        self.filter = filter;
        self.recompute();
    }

    /// Edit the filter in place, then recompute.
    pub fn update_filter(&mut self, edit: impl FnOnce(&mut EntityFilter)) {
        edit(&mut self.filter);
        self.recompute();
    }

    fn recompute(&mut self) {
        self.filtered = apply_filters(&self.entities, &self.filter);
        if self.prune_policy == PrunePolicy::OnFilter {
            let visible: HashSet<&str> =
                self.filtered.iter().map(|e| e.entity_id.as_str()).collect();
            self.selection.prune(&visible);
        }
    }

    pub fn visible_ids(&self) -> impl Iterator<Item = &str> {
        self.filtered.iter().map(|e| e.entity_id.as_str())
    }

    // ── Entity selection ─────────────────────────────────────────────

    /// Select or deselect one entity. Unknown ids are ignored.
    pub fn toggle(&mut self, entity_id: &str, selected: bool) -> bool {
        if selected && !self.entities.iter().any(|e| e.entity_id == entity_id) {
            return false;
        }
        self.selection.toggle(entity_id, selected);
        true
    }

    /// Select or deselect every visible entity.
    pub fn select_all_visible(&mut self, selected: bool) {
        let visible: Vec<String> = self.visible_ids().map(str::to_owned).collect();
        self.selection
            .select_all(visible.iter().map(String::as_str), selected);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn selected_ids(&self) -> Vec<String> {
        self.selection.to_vec()
    }

    // ── Domain selection ─────────────────────────────────────────────

    pub fn toggle_domain(&mut self, domain: &str, selected: bool) -> bool {
        if selected && !self.domains.iter().any(|d| d.domain == domain) {
            return false;
        }
        self.domain_selection.toggle(domain, selected);
        true
    }

    pub fn select_all_domains(&mut self, selected: bool) {
        let all: Vec<String> = self.domains.iter().map(|d| d.domain.clone()).collect();
        self.domain_selection
            .select_all(all.iter().map(String::as_str), selected);
    }

    pub fn selected_domains(&self) -> Vec<String> {
        self.domain_selection.to_vec()
    }

    // ── Derived counts ───────────────────────────────────────────────

    pub fn enabled_count(&self) -> usize {
        self.entities.iter().filter(|e| e.enabled).count()
    }

    pub fn excluded_count(&self) -> usize {
        self.entities.iter().filter(|e| e.recorder_exclude).count()
    }

    pub fn entity(&self, entity_id: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.entity_id == entity_id)
    }
}

/// Apply the `domains` allow-list, then the `max_entities` cap.
fn restrict(entities: Vec<Entity>, options: &PanelOptions) -> Vec<Entity> {
    let mut entities: Vec<Entity> = if options.domains.is_empty() {
        entities
    } else {
        entities
            .into_iter()
            .filter(|e| options.domains.iter().any(|d| d == &e.domain))
            .collect()
    };
    if options.max_entities > 0 {
        entities.truncate(options.max_entities);
    }
    entities
}

/// The `domains` allow-list also limits the domain aggregates.
fn restrict_domains(domains: Vec<DomainSummary>, options: &PanelOptions) -> Vec<DomainSummary> {
    if options.domains.is_empty() {
        return domains;
    }
    domains
        .into_iter()
        .filter(|d| options.domains.iter().any(|allowed| allowed == &d.domain))
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::Map;

    use super::*;
    use crate::filter::EnabledCategory;
    use crate::model::DomainStatus;

    fn entity(id: &str, enabled: bool) -> Entity {
        Entity {
            entity_id: id.into(),
            name: id.into(),
            domain: Entity::domain_of(id).into(),
            integration_domain: None,
            state: Some("on".into()),
            enabled,
            recorder_days: 10,
            recorder_exclude: false,
            attributes: Map::new(),
        }
    }

    fn domain(name: &str) -> DomainSummary {
        DomainSummary {
            domain: name.into(),
            total_entities: 1,
            excluded_entities: 0,
            enabled_entities: 1,
            recorder_days: None,
            has_domain_config: false,
            status: DomainStatus::Included,
            exclusion_percentage: 0,
        }
    }

    fn loaded(policy: PrunePolicy) -> PanelState {
        let mut state = PanelState::new(policy);
        state.begin_load();
        state.finish_load(
            vec![
                entity("light.a", true),
                entity("sensor.b", false),
                entity("switch.c", true),
            ],
            vec![domain("light"), domain("sensor")],
            &PanelOptions::default(),
            Utc::now(),
        );
        state
    }

    fn enabled_only() -> EntityFilter {
        EntityFilter {
            enabled: Some(EnabledCategory::Enabled),
            ..EntityFilter::default()
        }
    }

    #[test]
    fn load_replaces_and_clears_flags() {
        let mut state = loaded(PrunePolicy::OnFilter);
        assert!(!state.loading);
        assert_eq!(state.filtered.len(), 3);

        state.begin_load();
        assert!(state.loading);
        state.finish_load(
            vec![entity("fan.d", true)],
            vec![],
            &PanelOptions::default(),
            Utc::now(),
        );
        assert_eq!(state.entities.len(), 1);
        assert!(state.domains.is_empty());
        assert!(state.last_loaded.is_some());
    }

    #[test]
    fn failed_load_keeps_message() {
        let mut state = loaded(PrunePolicy::OnFilter);
        state.begin_load();
        state.fail_load(&CoreError::ConnectionFailed {
            url: "http://ha".into(),
            reason: "refused".into(),
        });
        assert!(!state.loading);
        let failure = state.load_error.as_ref().map(|f| f.kind);
        assert_eq!(failure, Some(ErrorKind::Network));
    }

    #[test]
    fn filter_survives_reload() {
        let mut state = loaded(PrunePolicy::OnFilter);
        state.set_filter(enabled_only());
        state.finish_load(
            vec![entity("light.a", true), entity("sensor.b", false)],
            vec![],
            &PanelOptions::default(),
            Utc::now(),
        );
        assert_eq!(state.filter, enabled_only());
        assert_eq!(state.visible_ids().collect::<Vec<_>>(), vec!["light.a"]);
    }

    #[test]
    fn prune_on_filter_drops_hidden_selection() {
        let mut state = loaded(PrunePolicy::OnFilter);
        state.select_all_visible(true);
        state.set_filter(enabled_only());
        assert_eq!(state.selected_ids(), vec!["light.a", "switch.c"]);
    }

    #[test]
    fn prune_on_reload_keeps_hidden_selection_until_reload() {
        let mut state = loaded(PrunePolicy::OnReload);
        state.select_all_visible(true);
        state.set_filter(enabled_only());
        assert_eq!(state.selection.len(), 3);

        state.finish_load(
            vec![entity("light.a", true), entity("sensor.b", false)],
            vec![],
            &PanelOptions::default(),
            Utc::now(),
        );
        assert_eq!(state.selected_ids(), vec!["light.a", "sensor.b"]);
    }

    #[test]
    fn unknown_ids_cannot_be_selected() {
        let mut state = loaded(PrunePolicy::OnFilter);
        assert!(!state.toggle("light.ghost", true));
        assert!(state.selection.is_empty());
        assert!(state.toggle("light.a", true));
        assert!(!state.toggle_domain("weather", true));
        assert!(state.toggle_domain("light", true));
    }

    #[test]
    fn domain_selection_pruned_on_reload() {
        let mut state = loaded(PrunePolicy::OnFilter);
        state.select_all_domains(true);
        state.finish_load(vec![], vec![domain("sensor")], &PanelOptions::default(), Utc::now());
        assert_eq!(state.selected_domains(), vec!["sensor"]);
    }

    #[test]
    fn options_restrict_loaded_entities() {
        let options = PanelOptions {
            domains: vec!["light".into(), "switch".into()],
            max_entities: 1,
            ..PanelOptions::default()
        };
        let mut state = PanelState::default();
        state.finish_load(
            vec![
                entity("sensor.b", true),
                entity("switch.c", true),
                entity("light.a", true),
            ],
            vec![],
            &options,
            Utc::now(),
        );
        let ids: Vec<&str> = state.visible_ids().collect();
        assert_eq!(ids, vec!["switch.c"]);
    }

    #[test]
    fn allow_list_limits_domain_rows_and_selection() {
        let options = PanelOptions {
            domains: vec!["light".into()],
            ..PanelOptions::default()
        };
        let mut state = PanelState::default();
        state.finish_load(
            vec![entity("light.a", true), entity("sensor.b", true)],
            vec![domain("light"), domain("sensor")],
            &options,
            Utc::now(),
        );
        let names: Vec<&str> = state.domains.iter().map(|d| d.domain.as_str()).collect();
        assert_eq!(names, vec!["light"]);

        state.select_all_domains(true);
        assert_eq!(state.selected_domains(), vec!["light"]);
        assert!(!state.toggle_domain("sensor", true));
    }
}
