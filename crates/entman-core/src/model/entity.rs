// ── Entity domain type ──

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Retention window applied when the backend does not report one.
pub const DEFAULT_RECORDER_DAYS: u32 = 10;

/// One registry entity as managed by the panel.
///
/// Owned by Home Assistant; the panel only mirrors it and replaces the
/// whole collection on every load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// `<domain>.<object_id>`, globally unique.
    pub entity_id: String,
    /// Display label. Falls back to `entity_id`.
    pub name: String,
    pub domain: String,
    /// Integration that provides the entity, if known.
    pub integration_domain: Option<String>,
    /// Literal state value. `None` or empty means "not provided".
    pub state: Option<String>,
    /// Registry-level enable flag.
    pub enabled: bool,
    pub recorder_days: u32,
    /// History recording suppressed.
    pub recorder_exclude: bool,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl Entity {
    /// The `<domain>` prefix of an entity id.
    pub fn domain_of(entity_id: &str) -> &str {
        entity_id.split_once('.').map_or(entity_id, |(domain, _)| domain)
    }

    /// State as shown to users; missing states render as `not_provided`.
    pub fn state_label(&self) -> &str {
        match self.state.as_deref() {
            None | Some("") => "not_provided",
            Some(s) => s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_is_prefix_of_entity_id() {
        assert_eq!(Entity::domain_of("light.kitchen"), "light");
        assert_eq!(Entity::domain_of("sensor.a.b"), "sensor");
        assert_eq!(Entity::domain_of("orphan"), "orphan");
    }
}
