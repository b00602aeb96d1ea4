// ── Filter engine ──
//
// Pure derivation of the displayed subset from the loaded collection.
// Filtering never mutates or reorders its input.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::model::Entity;

/// Lifecycle bucket of an entity's runtime state.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StateCategory {
    /// Any literal value other than the ones below.
    Normal,
    Unavailable,
    Unknown,
    /// The literal state string `"disabled"`.
    Disabled,
    /// Null or empty state.
    NotProvided,
}

impl StateCategory {
    pub fn of(state: Option<&str>) -> Self {
        match state {
            None | Some("") => Self::NotProvided,
            Some("unavailable") => Self::Unavailable,
            Some("unknown") => Self::Unknown,
            Some("disabled") => Self::Disabled,
            Some(_) => Self::Normal,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EnabledCategory {
    Enabled,
    Disabled,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RecorderCategory {
    Excluded,
    Included,
}

/// Independent predicates combined with logical AND.
///
/// Every field left at its default matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityFilter {
    /// Case-insensitive substring of `entity_id` or `name`.
    pub search: String,
    pub state: Option<StateCategory>,
    /// Exact `integration_domain`.
    pub integration: Option<String>,
    /// Exact `domain`.
    pub domain: Option<String>,
    pub enabled: Option<EnabledCategory>,
    pub recorder: Option<RecorderCategory>,
    /// Fixed id set (entities from a recorder report). Overrides every
    /// other predicate while set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub only_ids: Option<HashSet<String>>,
}

impl EntityFilter {
    /// Restrict the view to a fixed set of ids.
    pub fn only_ids(ids: HashSet<String>) -> Self {
        Self {
            only_ids: Some(ids),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.normalized() == Self::default()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Blank pickers collapse to "no filter". The search text is kept as
    /// typed; only an empty one matches everything.
    fn normalized(&self) -> Self {
        let blank = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());
        Self {
            integration: blank(&self.integration),
            domain: blank(&self.domain),
            ..self.clone()
        }
    }

    pub fn matches(&self, entity: &Entity) -> bool {
        Matcher::new(self).matches(entity)
    }
}

/// A filter with its search needle lowered once.
struct Matcher<'a> {
    filter: &'a EntityFilter,
    needle: String,
}

impl<'a> Matcher<'a> {
    fn new(filter: &'a EntityFilter) -> Self {
        Self {
            filter,
            needle: filter.search.to_lowercase(),
        }
    }

    fn matches(&self, entity: &Entity) -> bool {
        let f = self.filter;

        if let Some(ids) = &f.only_ids {
            return ids.contains(&entity.entity_id);
        }

        if let Some(cat) = f.state {
            if StateCategory::of(entity.state.as_deref()) != cat {
                return false;
            }
        }
        match f.enabled {
            Some(EnabledCategory::Enabled) if !entity.enabled => return false,
            Some(EnabledCategory::Disabled) if entity.enabled => return false,
            _ => {}
        }
        match f.recorder {
            Some(RecorderCategory::Excluded) if !entity.recorder_exclude => return false,
            Some(RecorderCategory::Included) if entity.recorder_exclude => return false,
            _ => {}
        }
        if let Some(integration) = non_blank(f.integration.as_deref()) {
            if entity.integration_domain.as_deref() != Some(integration) {
                return false;
            }
        }
        if let Some(domain) = non_blank(f.domain.as_deref()) {
            if entity.domain != domain {
                return false;
            }
        }
        if !self.needle.is_empty()
            && !entity.entity_id.to_lowercase().contains(&self.needle)
            && !entity.name.to_lowercase().contains(&self.needle)
        {
            return false;
        }
        true
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

/// Entities matching `filter`, in their original order.
pub fn apply_filters(entities: &[Entity], filter: &EntityFilter) -> Vec<Entity> {
    let matcher = Matcher::new(filter);
    entities
        .iter()
        .filter(|e| matcher.matches(e))
        .cloned()
        .collect()
}

/// Sorted, de-duplicated domains for the domain picker.
pub fn distinct_domains(entities: &[Entity]) -> Vec<String> {
    entities
        .iter()
        .map(|e| e.domain.as_str())
        .filter(|d| !d.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_owned)
        .collect()
}

/// Sorted, de-duplicated integrations for the integration picker.
pub fn distinct_integrations(entities: &[Entity]) -> Vec<String> {
    entities
        .iter()
        .filter_map(|e| e.integration_domain.as_deref())
        .filter(|i| !i.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_owned)
        .collect()
}
