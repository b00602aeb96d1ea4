// ── Selection tracker ──
//
// Ordered set of selected identifiers (entity ids or domain names).
// Insertion order is kept so bulk batches follow selection order.

use std::collections::HashSet;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// When selected items that are no longer visible get dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PrunePolicy {
    /// Keep only what the current filter shows, after every recompute.
    #[default]
    OnFilter,
    /// Keep cross-filter selections; drop only ids gone after a reload.
    OnReload,
}

/// Tri-state of a "select all" checkbox over the visible rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckState {
    Unchecked,
    Indeterminate,
    Checked,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: IndexSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select or deselect a single id.
    pub fn toggle(&mut self, id: &str, selected: bool) {
        if selected {
            if !self.ids.contains(id) {
                self.ids.insert(id.to_owned());
            }
        } else {
            self.ids.shift_remove(id);
        }
    }

    /// Add every id in `visible`, or remove exactly those ids.
    /// Ids outside `visible` are never touched.
    pub fn select_all<'a, I>(&mut self, visible: I, selected: bool)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for id in visible {
            self.toggle(id, selected);
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Drop every id not in `keep`.
    pub fn prune(&mut self, keep: &HashSet<&str>) {
        self.ids.retain(|id| keep.contains(id.as_str()));
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Selected ids in selection order.
    pub fn to_vec(&self) -> Vec<String> {
        self.ids.iter().cloned().collect()
    }

    /// Checkbox state for the rows in `visible`.
    pub fn check_state<'a, I>(&self, visible: I) -> CheckState
    where
        I: IntoIterator<Item = &'a str>,
    {
        let (mut shown, mut picked) = (0usize, 0usize);
        for id in visible {
            shown += 1;
            if self.ids.contains(id) {
                picked += 1;
            }
        }
        match picked {
            0 => CheckState::Unchecked,
            n if n == shown => CheckState::Checked,
            _ => CheckState::Indeterminate,
        }
    }

    /// Some, but not all, visible rows are selected.
    pub fn indeterminate<'a, I>(&self, visible: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.check_state(visible) == CheckState::Indeterminate
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn selection(ids: &[&str]) -> Selection {
        let mut s = Selection::new();
        s.select_all(ids.iter().copied(), true);
        s
    }

    #[test]
    fn toggle_adds_and_removes() {
        let mut s = Selection::new();
        s.toggle("light.a", true);
        s.toggle("light.a", true);
        assert_eq!(s.len(), 1);
        s.toggle("light.a", false);
        assert!(s.is_empty());
    }

    #[test]
    fn selection_order_is_insertion_order() {
        let mut s = selection(&["c", "a"]);
        s.toggle("b", true);
        assert_eq!(s.to_vec(), vec!["c", "a", "b"]);
        s.toggle("a", false);
        assert_eq!(s.to_vec(), vec!["c", "b"]);
    }

    #[test]
    fn prune_keeps_subset_of_visible() {
        let mut s = selection(&["light.a", "sensor.b", "switch.c"]);
        let visible: HashSet<&str> = ["sensor.b", "fan.d"].into_iter().collect();
        s.prune(&visible);
        assert!(s.iter().all(|id| visible.contains(id)));
        assert_eq!(s.to_vec(), vec!["sensor.b"]);
    }

    #[test]
    fn select_all_round_trip_leaves_outside_ids_alone() {
        let mut s = selection(&["outside.x", "light.a"]);
        let before = s.clone();
        let visible = ["light.a", "light.b", "light.c"];

        s.select_all(visible, true);
        assert!(visible.iter().all(|id| s.contains(id)));
        s.select_all(visible, false);

        assert!(s.contains("outside.x"));
        assert!(visible.iter().all(|id| !s.contains(id)));
        // Pre-call state minus the visible ids.
        let mut expected = before;
        expected.select_all(visible, false);
        assert_eq!(s, expected);
    }

    #[test]
    fn check_state_over_visible_rows() {
        let s = selection(&["a", "z"]);
        assert_eq!(s.check_state(["b", "c"]), CheckState::Unchecked);
        assert_eq!(s.check_state(["a", "b"]), CheckState::Indeterminate);
        assert!(s.indeterminate(["a", "b"]));
        assert_eq!(s.check_state(["a"]), CheckState::Checked);
        assert_eq!(s.check_state(std::iter::empty()), CheckState::Unchecked);
    }
}
