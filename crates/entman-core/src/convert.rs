// ── API-to-domain type conversions ──
//
// Bridges raw `entman_api::types` responses into canonical
// `entman_core::model` types. Each impl fills the defaults the backend
// may omit and turns `status: "error"` payloads into `CoreError::Rejected`.

use entman_api::types::{
    DomainResponse, EntityResponse, PurgeAllResponse, RecorderConfigResponse,
    RecorderReportResponse, StatusResponse,
};

use crate::error::CoreError;
use crate::model::{
    DEFAULT_RECORDER_DAYS, DomainStatus, DomainSummary, Entity, PurgeOutcome,
    RecorderConfigOutcome, RecorderReport, ReportEntry, exclusion_percentage,
};

// ── Helpers ────────────────────────────────────────────────────────

/// Treat empty strings like missing values.
fn non_empty(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.is_empty())
}

fn reject_on_error<T: StatusResponse>(resp: &T) -> Result<(), CoreError> {
    resp.rejection().map_or(Ok(()), |message| Err(CoreError::Rejected { message }))
}

// ── Entity ─────────────────────────────────────────────────────────

impl From<EntityResponse> for Entity {
    fn from(raw: EntityResponse) -> Self {
        let name = non_empty(raw.name).unwrap_or_else(|| raw.entity_id.clone());
        let domain =
            non_empty(raw.domain).unwrap_or_else(|| Entity::domain_of(&raw.entity_id).to_owned());
        let integration_domain = non_empty(raw.integration_domain).or(non_empty(raw.platform));

        Self {
            entity_id: raw.entity_id,
            name,
            domain,
            integration_domain,
            state: raw.state,
            enabled: raw.enabled,
            recorder_days: raw.recorder_days.unwrap_or(DEFAULT_RECORDER_DAYS),
            recorder_exclude: raw.recorder_exclude,
            attributes: raw.attributes,
        }
    }
}

// ── Domain ─────────────────────────────────────────────────────────

impl From<DomainResponse> for DomainSummary {
    fn from(raw: DomainResponse) -> Self {
        let derived = DomainStatus::from_counts(raw.excluded_entities, raw.total_entities);
        let status = raw
            .status
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(derived);
        let exclusion_percentage = raw
            .exclusion_percentage
            .filter(|p| p.is_finite())
            .map_or_else(
                || exclusion_percentage(raw.excluded_entities, raw.total_entities),
                |p| {
                    // Clamped to 0..=100 before the cast.
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::as_conversions)]
                    let pct = p.round().clamp(0.0, 100.0) as u8;
                    pct
                },
            );

        Self {
            domain: raw.domain,
            total_entities: raw.total_entities,
            excluded_entities: raw.excluded_entities,
            enabled_entities: raw.enabled_entities,
            recorder_days: raw.recorder_days,
            has_domain_config: raw.has_domain_config,
            status,
            exclusion_percentage,
        }
    }
}

// ── Recorder ───────────────────────────────────────────────────────

impl TryFrom<RecorderReportResponse> for RecorderReport {
    type Error = CoreError;

    fn try_from(raw: RecorderReportResponse) -> Result<Self, Self::Error> {
        reject_on_error(&raw)?;
        if raw.entities_analyzed.unwrap_or(0) == 0 && raw.total_records.unwrap_or(0) == 0 {
            return Err(CoreError::rejected("report generated but returned no data"));
        }

        Ok(Self {
            entities_analyzed: raw.entities_analyzed.unwrap_or(0),
            total_records: raw.total_records.unwrap_or(0),
            entries: raw
                .report_data
                .into_iter()
                .map(|row| ReportEntry {
                    entity_id: row.entity_id,
                    record_count: row.record_count,
                })
                .collect(),
            download_url: non_empty(raw.download_url),
        })
    }
}

impl TryFrom<RecorderConfigResponse> for RecorderConfigOutcome {
    type Error = CoreError;

    fn try_from(raw: RecorderConfigResponse) -> Result<Self, Self::Error> {
        reject_on_error(&raw)?;
        Ok(Self {
            message: raw.message.unwrap_or_default(),
            excluded_entities: raw.excluded_entities,
            excluded_domains: raw.excluded_domains,
        })
    }
}

impl TryFrom<PurgeAllResponse> for PurgeOutcome {
    type Error = CoreError;

    fn try_from(raw: PurgeAllResponse) -> Result<Self, Self::Error> {
        reject_on_error(&raw)?;
        Ok(Self {
            message: raw.message.unwrap_or_default(),
            purged_entities: raw.purged_entities,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn entity(value: serde_json::Value) -> Entity {
        serde_json::from_value::<EntityResponse>(value).unwrap().into()
    }

    #[test]
    fn entity_fills_defaults() {
        let e = entity(json!({"entity_id": "switch.pump", "name": ""}));
        assert_eq!(e.name, "switch.pump");
        assert_eq!(e.domain, "switch");
        assert_eq!(e.recorder_days, DEFAULT_RECORDER_DAYS);
        assert!(e.integration_domain.is_none());
    }

    #[test]
    fn integration_falls_back_to_platform() {
        let e = entity(json!({"entity_id": "light.a", "platform": "hue"}));
        assert_eq!(e.integration_domain.as_deref(), Some("hue"));

        let e = entity(json!({"entity_id": "light.a", "platform": "hue", "integration_domain": "zha"}));
        assert_eq!(e.integration_domain.as_deref(), Some("zha"));
    }

    #[test]
    fn domain_status_derived_when_missing() {
        let raw: DomainResponse = serde_json::from_value(json!({
            "domain": "sensor",
            "total_entities": 4,
            "excluded_entities": 1,
            "enabled_entities": 4
        }))
        .unwrap();
        let summary = DomainSummary::from(raw);
        assert_eq!(summary.status, DomainStatus::PartiallyExcluded);
        assert_eq!(summary.exclusion_percentage, 25);
    }

    #[test]
    fn domain_status_from_backend_wins() {
        let raw: DomainResponse = serde_json::from_value(json!({
            "domain": "sun",
            "total_entities": 2,
            "excluded_entities": 2,
            "status": "fully_excluded",
            "exclusion_percentage": 100.0
        }))
        .unwrap();
        let summary = DomainSummary::from(raw);
        assert_eq!(summary.status, DomainStatus::FullyExcluded);
        assert_eq!(summary.exclusion_percentage, 100);
    }

    #[test]
    fn empty_report_is_rejected() {
        let raw = RecorderReportResponse {
            status: Some("success".into()),
            ..Default::default()
        };
        let err = RecorderReport::try_from(raw).unwrap_err();
        assert!(matches!(err, CoreError::Rejected { .. }));
    }

    #[test]
    fn purge_error_status_is_rejected() {
        let raw = PurgeAllResponse {
            status: Some("error".into()),
            message: Some("Recorder not available".into()),
            purged_entities: vec![],
        };
        match PurgeOutcome::try_from(raw) {
            Err(CoreError::Rejected { message }) => assert_eq!(message, "Recorder not available"),
            other => panic!("expected rejection, got {other:?}"),
        }
    }
}
