// ── Entity export ──
//
// Renders the currently filtered entities as a YAML-like text document.
// Nothing is written to disk here; callers decide where `content` goes.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::CoreError;
use crate::model::Entity;

/// A rendered export, ready to be saved under `filename`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Export {
    pub filename: String,
    pub content: String,
    pub count: usize,
}

/// Render `entities` in the order given.
///
/// An empty list is a validation error: there is nothing to save.
pub fn export_entities(entities: &[Entity], now: DateTime<Utc>) -> Result<Export, CoreError> {
    if entities.is_empty() {
        return Err(CoreError::validation("No entities to export"));
    }

    let mut content = String::new();
    let _ = writeln!(content, "# Entity Manager Export");
    let _ = writeln!(content, "# Generated: {}", now.to_rfc3339());
    let _ = writeln!(content, "# Total entities: {}", entities.len());
    content.push('\n');

    for entity in entities {
        let _ = writeln!(content, "- entity_id: {}", entity.entity_id);
        let _ = writeln!(content, "  name: {}", quoted(&entity.name));
        let _ = writeln!(
            content,
            "  state: {}",
            entity.state.as_deref().filter(|s| !s.is_empty()).unwrap_or("null")
        );
        let _ = writeln!(content, "  domain: {}", entity.domain);
        let _ = writeln!(
            content,
            "  integration: {}",
            entity.integration_domain.as_deref().unwrap_or("null")
        );
        let _ = writeln!(content, "  enabled: {}", entity.enabled);
        content.push('\n');
    }

    Ok(Export {
        filename: format!("export_entities_{}.txt", now.format("%Y-%m-%d")),
        content,
        count: entities.len(),
    })
}

/// Double-quoted scalar with `\` and `"` escaped.
fn quoted(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('"');
    for c in raw.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::Map;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap()
    }

    fn entity(id: &str, name: &str, state: Option<&str>, integration: Option<&str>) -> Entity {
        Entity {
            entity_id: id.into(),
            name: name.into(),
            domain: Entity::domain_of(id).into(),
            integration_domain: integration.map(Into::into),
            state: state.map(Into::into),
            enabled: true,
            recorder_days: 10,
            recorder_exclude: false,
            attributes: Map::new(),
        }
    }

    #[test]
    fn empty_export_is_a_validation_error() {
        assert!(export_entities(&[], now()).unwrap_err().is_validation());
    }

    #[test]
    fn renders_one_block_per_entity() {
        let export = export_entities(
            &[
                entity("light.kitchen", "Kitchen", Some("on"), Some("hue")),
                entity("sensor.x", "Say \"hi\"", None, None),
            ],
            now(),
        )
        .unwrap();

        assert_eq!(export.filename, "export_entities_2026-03-14.txt");
        assert_eq!(export.count, 2);
        let expected = "\
# Entity Manager Export
# Generated: 2026-03-14T09:30:00+00:00
# Total entities: 2

- entity_id: light.kitchen
  name: \"Kitchen\"
  state: on
  domain: light
  integration: hue
  enabled: true

- entity_id: sensor.x
  name: \"Say \\\"hi\\\"\"
  state: null
  domain: sensor
  integration: null
  enabled: true

";
        assert_eq!(export.content, expected);
    }
}
