// Service calls: POST /api/services/entity_manager/<service>

use serde::Serialize;
use tracing::debug;

use crate::client::EntityManagerClient;
use crate::types::{
    BulkUpdate, BulkUpdateRecorderExclude, EntityIds, EntityRef, PurgeRecorder, UpdateEntityState,
    UpdateRecorderDays, UpdateRecorderExclude,
};
use crate::Error;

/// Service domain registered by the integration.
pub const SERVICE_DOMAIN: &str = "entity_manager";

impl EntityManagerClient {
    /// Invoke `entity_manager.<service>` with a JSON payload.
    ///
    /// `POST /api/services/entity_manager/{service}`
    pub async fn call_service<B: Serialize + Sync>(
        &self,
        service: &str,
        data: &B,
    ) -> Result<(), Error> {
        debug!(service, "calling {SERVICE_DOMAIN} service");
        self.post_no_response(&format!("services/{SERVICE_DOMAIN}/{service}"), data)
            .await
    }

    // ── Single entity ────────────────────────────────────────────────

    pub async fn update_entity_state(&self, entity_id: &str, enabled: bool) -> Result<(), Error> {
        self.call_service(
            "update_entity_state",
            &UpdateEntityState { entity_id, enabled },
        )
        .await
    }

    pub async fn update_recorder_days(
        &self,
        entity_id: &str,
        recorder_days: u32,
    ) -> Result<(), Error> {
        self.call_service(
            "update_recorder_days",
            &UpdateRecorderDays {
                entity_id,
                recorder_days,
            },
        )
        .await
    }

    pub async fn update_recorder_exclude(
        &self,
        entity_id: &str,
        recorder_exclude: bool,
    ) -> Result<(), Error> {
        self.call_service(
            "update_recorder_exclude",
            &UpdateRecorderExclude {
                entity_id,
                recorder_exclude,
            },
        )
        .await
    }

    /// Remove an entity from the registry. Irreversible.
    pub async fn delete_entity(&self, entity_id: &str) -> Result<(), Error> {
        self.call_service("delete_entity", &EntityRef { entity_id })
            .await
    }

    // ── Bulk ─────────────────────────────────────────────────────────

    /// Set `enabled` and/or `recorder_days` on many entities at once.
    pub async fn bulk_update(
        &self,
        entity_ids: &[String],
        enabled: Option<bool>,
        recorder_days: Option<u32>,
    ) -> Result<(), Error> {
        self.call_service(
            "bulk_update",
            &BulkUpdate {
                entity_ids,
                enabled,
                recorder_days,
            },
        )
        .await
    }

    pub async fn bulk_update_recorder_exclude(
        &self,
        entity_ids: &[String],
        recorder_exclude: bool,
    ) -> Result<(), Error> {
        self.call_service(
            "bulk_update_recorder_exclude",
            &BulkUpdateRecorderExclude {
                entity_ids,
                recorder_exclude,
            },
        )
        .await
    }

    /// Remove many entities from the registry. Irreversible.
    pub async fn bulk_delete(&self, entity_ids: &[String]) -> Result<(), Error> {
        self.call_service("bulk_delete", &EntityIds { entity_ids })
            .await
    }

    // ── Recorder / config ────────────────────────────────────────────

    /// Purge recorded history older than each entity's retention window.
    ///
    /// With `force_purge`, entities with `recorder_days == 0` are purged
    /// entirely instead of skipped.
    pub async fn purge_recorder(&self, entity_ids: &[String], force_purge: bool) -> Result<(), Error> {
        self.call_service(
            "purge_recorder",
            &PurgeRecorder {
                entity_ids,
                force_purge,
            },
        )
        .await
    }

    /// Reload the integration's stored per-entity configuration.
    pub async fn reload_config(&self) -> Result<(), Error> {
        self.call_service("reload_config", &serde_json::json!({}))
            .await
    }
}
