// Integration REST views under /api/entity_manager/
//
// Reads (entities, domains, status) and the recorder / domain endpoints
// that the integration exposes outside the service registry. The recorder
// health check goes through Home Assistant's own history API.

use serde_json::Value;
use tracing::debug;

use crate::client::EntityManagerClient;
use crate::types::{
    BulkDomainRecorderDaysRequest, BulkExcludeDomainsRequest, DomainRecorderDaysRequest,
    DomainRequest, DomainResponse, EntityResponse, OperationResponse, PurgeAllRequest,
    PurgeAllResponse, RecorderConfigRequest, RecorderConfigResponse, RecorderReportResponse,
    ReportRequest,
};
use crate::Error;

/// Always present on a stock install, so its history is a cheap recorder check.
const HEALTH_ENTITY: &str = "sun.sun";

impl EntityManagerClient {
    // ── Reads ────────────────────────────────────────────────────────

    /// Availability probe.
    ///
    /// `GET /api/entity_manager/status`
    pub async fn status(&self) -> Result<Value, Error> {
        self.get("entity_manager/status").await
    }

    /// Every registry entity with its manager configuration.
    ///
    /// `GET /api/entity_manager/entities`
    pub async fn list_entities(&self) -> Result<Vec<EntityResponse>, Error> {
        let entities: Vec<EntityResponse> = self.get("entity_manager/entities").await?;
        debug!(count = entities.len(), "entities loaded");
        Ok(entities)
    }

    /// Per-domain aggregates.
    ///
    /// `GET /api/entity_manager/domains`
    pub async fn list_domains(&self) -> Result<Vec<DomainResponse>, Error> {
        let domains: Vec<DomainResponse> = self.get("entity_manager/domains").await?;
        debug!(count = domains.len(), "domains loaded");
        Ok(domains)
    }

    // ── Recorder ─────────────────────────────────────────────────────

    /// Top entities by recorded row count.
    ///
    /// `POST /api/entity_manager/recorder_report`
    pub async fn recorder_report(&self, limit: u32) -> Result<RecorderReportResponse, Error> {
        debug!(limit, "requesting recorder report");
        self.post("entity_manager/recorder_report", &ReportRequest { limit })
            .await
    }

    /// Whether the recorder answers history queries. Returns the number of
    /// state rows it reported for `sun.sun` over the default period.
    ///
    /// `GET /api/history/period?filter_entity_id=sun.sun&minimal_response&no_attributes`
    pub async fn recorder_health(&self) -> Result<usize, Error> {
        let path = format!(
            "history/period?filter_entity_id={HEALTH_ENTITY}&minimal_response&no_attributes"
        );
        let series: Vec<Vec<Value>> = self.get(&path).await?;
        let rows = series.iter().map(Vec::len).sum();
        debug!(rows, "recorder answered history query");
        Ok(rows)
    }

    /// Rewrite the recorder exclusion config from the excluded entities.
    ///
    /// `POST /api/entity_manager/update_recorder_config`
    pub async fn update_recorder_config(
        &self,
        backup_config: bool,
    ) -> Result<RecorderConfigResponse, Error> {
        self.post(
            "entity_manager/update_recorder_config",
            &RecorderConfigRequest { backup_config },
        )
        .await
    }

    /// Purge recorded history for every excluded entity.
    ///
    /// `POST /api/entity_manager/purge_all_entities`
    pub async fn purge_all_entities(&self, force_purge: bool) -> Result<PurgeAllResponse, Error> {
        self.post(
            "entity_manager/purge_all_entities",
            &PurgeAllRequest { force_purge },
        )
        .await
    }

    // ── Domains ──────────────────────────────────────────────────────

    /// `POST /api/entity_manager/exclude_domain`
    pub async fn exclude_domain(&self, domain: &str) -> Result<OperationResponse, Error> {
        debug!(domain, "excluding domain from recorder");
        self.post("entity_manager/exclude_domain", &DomainRequest { domain })
            .await
    }

    /// `POST /api/entity_manager/include_domain`
    pub async fn include_domain(&self, domain: &str) -> Result<OperationResponse, Error> {
        debug!(domain, "including domain in recorder");
        self.post("entity_manager/include_domain", &DomainRequest { domain })
            .await
    }

    /// `POST /api/entity_manager/update_domain_recorder_days`
    pub async fn update_domain_recorder_days(
        &self,
        domain: &str,
        recorder_days: u32,
    ) -> Result<OperationResponse, Error> {
        self.post(
            "entity_manager/update_domain_recorder_days",
            &DomainRecorderDaysRequest {
                domain,
                recorder_days,
            },
        )
        .await
    }

    /// `POST /api/entity_manager/bulk_update_domain_recorder_days`
    pub async fn bulk_update_domain_recorder_days(
        &self,
        domains: &[String],
        domain_recorder_days: u32,
    ) -> Result<OperationResponse, Error> {
        self.post(
            "entity_manager/bulk_update_domain_recorder_days",
            &BulkDomainRecorderDaysRequest {
                domains,
                domain_recorder_days,
            },
        )
        .await
    }

    /// `POST /api/entity_manager/bulk_exclude_domains`
    pub async fn bulk_exclude_domains(
        &self,
        domains: &[String],
        recorder_exclude: bool,
    ) -> Result<OperationResponse, Error> {
        self.post(
            "entity_manager/bulk_exclude_domains",
            &BulkExcludeDomainsRequest {
                domains,
                recorder_exclude,
            },
        )
        .await
    }
}
