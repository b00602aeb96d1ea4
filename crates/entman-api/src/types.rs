//! Wire types for the `entity_manager` integration.
//!
//! Responses from `/api/entity_manager/*` and request bodies for
//! `/api/services/entity_manager/*`. Field names are snake_case on the
//! wire, so no renaming is applied. Everything the backend may omit is
//! `#[serde(default)]`; `entman-core` applies the domain defaults.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── Entities ─────────────────────────────────────────────────────────

/// One registry entity with its manager config, from `GET entity_manager/entities`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityResponse {
    pub entity_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    /// Newer backends send the providing integration here.
    #[serde(default)]
    pub integration_domain: Option<String>,
    /// Older backends only send the registry platform.
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub recorder_days: Option<u32>,
    #[serde(default)]
    pub recorder_exclude: bool,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

fn default_enabled() -> bool {
    true
}

// ── Domains ──────────────────────────────────────────────────────────

/// Per-domain aggregate, from `GET entity_manager/domains`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainResponse {
    pub domain: String,
    #[serde(default)]
    pub total_entities: u32,
    #[serde(default)]
    pub excluded_entities: u32,
    #[serde(default)]
    pub enabled_entities: u32,
    #[serde(default)]
    pub recorder_days: Option<u32>,
    #[serde(default)]
    pub has_domain_config: bool,
    /// One of: `empty`, `included`, `partially_excluded`, `fully_excluded`.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub exclusion_percentage: Option<f64>,
}

// ── Recorder ─────────────────────────────────────────────────────────

/// One row of the recorder report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub entity_id: String,
    #[serde(default)]
    pub record_count: u64,
}

/// Response of `POST entity_manager/recorder_report`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecorderReportResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub entities_analyzed: Option<u64>,
    #[serde(default)]
    pub total_records: Option<u64>,
    #[serde(default)]
    pub report_data: Vec<ReportRow>,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Response of `POST entity_manager/update_recorder_config`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecorderConfigResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub excluded_entities: Vec<String>,
    #[serde(default)]
    pub excluded_domains: Vec<String>,
}

/// Response of `POST entity_manager/purge_all_entities`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurgeAllResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub purged_entities: Vec<String>,
}

/// Generic acknowledgement from the domain endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    /// Catch-all for fields not modeled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Implemented by responses that carry a `status` / `message` pair.
pub trait StatusResponse {
    fn status(&self) -> Option<&str>;
    fn message(&self) -> Option<&str>;

    /// The backend reports logical failures with HTTP 200 and
    /// `status: "error"`; returns the message in that case.
    fn rejection(&self) -> Option<String> {
        (self.status() == Some("error")).then(|| {
            self.message()
                .map_or_else(|| "unknown error".to_owned(), str::to_owned)
        })
    }
}

macro_rules! status_response {
    ($($ty:ty),+ $(,)?) => {
        $(impl StatusResponse for $ty {
            fn status(&self) -> Option<&str> {
                self.status.as_deref()
            }
            fn message(&self) -> Option<&str> {
                self.message.as_deref()
            }
        })+
    };
}

status_response!(RecorderConfigResponse, PurgeAllResponse, OperationResponse);

impl StatusResponse for RecorderReportResponse {
    fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }
    fn message(&self) -> Option<&str> {
        self.error.as_deref().or(self.message.as_deref())
    }
}

// ── Service payloads ─────────────────────────────────────────────────

/// `entity_manager.update_entity_state`
#[derive(Debug, Clone, Serialize)]
pub struct UpdateEntityState<'a> {
    pub entity_id: &'a str,
    pub enabled: bool,
}

/// `entity_manager.update_recorder_days`
#[derive(Debug, Clone, Serialize)]
pub struct UpdateRecorderDays<'a> {
    pub entity_id: &'a str,
    pub recorder_days: u32,
}

/// `entity_manager.update_recorder_exclude`
#[derive(Debug, Clone, Serialize)]
pub struct UpdateRecorderExclude<'a> {
    pub entity_id: &'a str,
    pub recorder_exclude: bool,
}

/// `entity_manager.delete_entity`
#[derive(Debug, Clone, Serialize)]
pub struct EntityRef<'a> {
    pub entity_id: &'a str,
}

/// `entity_manager.bulk_update`
#[derive(Debug, Clone, Serialize)]
pub struct BulkUpdate<'a> {
    pub entity_ids: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recorder_days: Option<u32>,
}

/// `entity_manager.bulk_update_recorder_exclude`
#[derive(Debug, Clone, Serialize)]
pub struct BulkUpdateRecorderExclude<'a> {
    pub entity_ids: &'a [String],
    pub recorder_exclude: bool,
}

/// `entity_manager.bulk_delete`
#[derive(Debug, Clone, Serialize)]
pub struct EntityIds<'a> {
    pub entity_ids: &'a [String],
}

/// `entity_manager.purge_recorder`
#[derive(Debug, Clone, Serialize)]
pub struct PurgeRecorder<'a> {
    pub entity_ids: &'a [String],
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub force_purge: bool,
}

// ── Integration endpoint payloads ────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ReportRequest {
    pub limit: u32,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RecorderConfigRequest {
    pub backup_config: bool,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct PurgeAllRequest {
    pub force_purge: bool,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct DomainRequest<'a> {
    pub domain: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct DomainRecorderDaysRequest<'a> {
    pub domain: &'a str,
    pub recorder_days: u32,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct BulkDomainRecorderDaysRequest<'a> {
    pub domains: &'a [String],
    pub domain_recorder_days: u32,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct BulkExcludeDomainsRequest<'a> {
    pub domains: &'a [String],
    pub recorder_exclude: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn entity_defaults_when_fields_missing() {
        let e: EntityResponse = serde_json::from_str(r#"{"entity_id": "light.kitchen"}"#).unwrap();
        assert!(e.enabled);
        assert_eq!(e.recorder_days, None);
        assert!(!e.recorder_exclude);
        assert!(e.state.is_none());
        assert!(e.attributes.is_empty());
    }

    #[test]
    fn bulk_update_omits_unset_fields() {
        let ids = vec!["light.a".to_owned()];
        let body = BulkUpdate {
            entity_ids: &ids,
            enabled: None,
            recorder_days: Some(5),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"entity_ids": ["light.a"], "recorder_days": 5})
        );
    }

    #[test]
    fn report_rejection_prefers_error_field() {
        let resp = RecorderReportResponse {
            status: Some("error".into()),
            error: Some("database locked".into()),
            message: Some("ignored".into()),
            ..Default::default()
        };
        assert_eq!(resp.rejection().as_deref(), Some("database locked"));
    }

    #[test]
    fn ok_status_is_not_a_rejection() {
        let resp = PurgeAllResponse {
            status: Some("success".into()),
            ..Default::default()
        };
        assert!(resp.rejection().is_none());
    }
}
