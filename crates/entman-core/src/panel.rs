// ── Panel facade ──
//
// Full lifecycle of one entity manager panel: session setup, data
// loading, background refresh, command routing, and bulk runs. All
// observable state lives in one `watch` channel of `PanelState`.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use entman_api::EntityManagerClient;
use entman_api::types::DomainResponse;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::bulk::{
    BATCH_SIZE, BulkAction, BulkProgress, BulkReport, Confirmed, DomainAction, ensure_confirmed,
    execute_batches,
};
use crate::command::{Command, CommandEnvelope, CommandResult, route_command};
use crate::config::PanelConfig;
use crate::error::CoreError;
use crate::export::{Export, export_entities};
use crate::filter::EntityFilter;
use crate::model::{DomainSummary, Entity, RecorderHealth, RecorderReport};
use crate::state::{PanelState, ViewMode};
use crate::view::{PanelView, compose};

const COMMAND_CHANNEL_SIZE: usize = 16;

/// Default row limit of [`Panel::recorder_report`].
pub const REPORT_LIMIT: u32 = 100;

// ── ConnectionState ──────────────────────────────────────────────

/// Session state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

// ── Panel ────────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<PanelInner>`. Without a session every
/// read is a logged no-op and every write fails with
/// [`CoreError::NotConnected`].
#[derive(Clone)]
pub struct Panel {
    inner: Arc<PanelInner>,
}

struct PanelInner {
    config: PanelConfig,
    state: watch::Sender<PanelState>,
    connection_state: watch::Sender<ConnectionState>,
    client: Mutex<Option<EntityManagerClient>>,
    command_tx: Mutex<mpsc::Sender<CommandEnvelope>>,
    command_rx: Mutex<Option<mpsc::Receiver<CommandEnvelope>>>,
    cancel: CancellationToken,
    /// Child token for the current session; cancelled on disconnect,
    /// replaced on reconnect.
    cancel_child: Mutex<CancellationToken>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Panel {
    /// Create a panel. Does NOT connect; call [`connect()`](Self::connect).
    pub fn new(config: PanelConfig) -> Self {
        let (state, _) = watch::channel(PanelState::new(config.options.prune_policy));
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        let cancel = CancellationToken::new();
        let cancel_child = cancel.child_token();

        Self {
            inner: Arc::new(PanelInner {
                config,
                state,
                connection_state,
                client: Mutex::new(None),
                command_tx: Mutex::new(command_tx),
                command_rx: Mutex::new(Some(command_rx)),
                cancel,
                cancel_child: Mutex::new(cancel_child),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &PanelConfig {
        &self.inner.config
    }

    // ── Session lifecycle ────────────────────────────────────────

    /// Open a session and load the panel.
    ///
    /// Probes the integration status endpoint first; on failure the
    /// panel shows the error view and stays without a session.
    pub async fn connect(&self) -> Result<(), CoreError> {
        self.inner
            .connection_state
            .send_replace(ConnectionState::Connecting);

        let client = match self.open_session().await {
            Ok(client) => client,
            Err(e) => {
                warn!(error = %e, url = %self.inner.config.url, "connect failed");
                self.inner
                    .connection_state
                    .send_replace(ConnectionState::Failed);
                self.inner.state.send_modify(|s| s.fail_load(&e));
                return Err(e);
            }
        };

        // Fresh child token for this session (supports reconnect).
        let child = self.inner.cancel.child_token();
        *self.inner.cancel_child.lock().await = child.clone();
        *self.inner.client.lock().await = Some(client);
        self.inner
            .connection_state
            .send_replace(ConnectionState::Connected);
        info!(url = %self.inner.config.url, "connected to Home Assistant");

        {
            let mut handles = self.inner.task_handles.lock().await;
            if let Some(rx) = self.inner.command_rx.lock().await.take() {
                handles.push(tokio::spawn(command_processor_task(
                    self.clone(),
                    rx,
                    child.clone(),
                )));
            }

            let options = &self.inner.config.options;
            if options.auto_refresh && options.refresh_interval_secs > 0 {
                handles.push(tokio::spawn(refresh_task(
                    self.clone(),
                    options.refresh_interval_secs,
                    child,
                )));
            }
        }

        self.load().await
    }

    async fn open_session(&self) -> Result<EntityManagerClient, CoreError> {
        let config = &self.inner.config;
        let client = EntityManagerClient::from_token(
            config.url.as_str(),
            &config.token,
            &config.transport(),
        )?;
        let status = client.status().await?;
        debug!(%status, "integration status");
        Ok(client)
    }

    /// Drop the session and stop background tasks.
    pub async fn disconnect(&self) {
        // Cancel the child token (not the parent; allows reconnect).
        self.inner.cancel_child.lock().await.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        drop(handles);

        *self.inner.client.lock().await = None;

        // The previous receiver was consumed by the command processor.
        {
            let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
            *self.inner.command_tx.lock().await = tx;
            *self.inner.command_rx.lock().await = Some(rx);
        }

        self.inner
            .connection_state
            .send_replace(ConnectionState::Disconnected);
        debug!("disconnected");
    }

    async fn client(&self) -> Option<EntityManagerClient> {
        self.inner.client.lock().await.clone()
    }

    async fn require_client(&self) -> Result<EntityManagerClient, CoreError> {
        self.client().await.ok_or(CoreError::NotConnected)
    }

    // ── Loading ──────────────────────────────────────────────────

    /// Fetch entities and domains and replace the loaded collections.
    ///
    /// Without a session this only logs. A failure is recorded in the
    /// state (error view) and returned.
    pub async fn load(&self) -> Result<(), CoreError> {
        let Some(client) = self.client().await else {
            debug!("no Home Assistant session, skipping load");
            return Ok(());
        };

        self.inner.state.send_modify(PanelState::begin_load);

        match tokio::try_join!(client.list_entities(), list_domains_or_empty(&client)) {
            Ok((entities, domains)) => {
                let entities: Vec<Entity> = entities.into_iter().map(Entity::from).collect();
                let domains: Vec<DomainSummary> =
                    domains.into_iter().map(DomainSummary::from).collect();
                info!(
                    entities = entities.len(),
                    domains = domains.len(),
                    "panel data loaded"
                );
                let options = &self.inner.config.options;
                self.inner
                    .state
                    .send_modify(|s| s.finish_load(entities, domains, options, Utc::now()));
                Ok(())
            }
            Err(e) => {
                let err = CoreError::from(e);
                warn!(error = %err, "failed to load entity manager data");
                self.inner.state.send_modify(|s| s.fail_load(&err));
                Err(err)
            }
        }
    }

    // ── State observation ────────────────────────────────────────

    /// Subscribe to panel state changes.
    pub fn subscribe(&self) -> watch::Receiver<PanelState> {
        self.inner.state.subscribe()
    }

    /// Subscribe to session state changes.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    /// Copy of the current state.
    pub fn state(&self) -> PanelState {
        self.inner.state.borrow().clone()
    }

    /// Whether `entity_id` is selected, without copying the state.
    pub fn is_selected(&self, entity_id: &str) -> bool {
        self.inner.state.borrow().selection.contains(entity_id)
    }

    pub fn is_domain_selected(&self, domain: &str) -> bool {
        self.inner.state.borrow().domain_selection.contains(domain)
    }

    /// Selected entity and domain counts.
    pub fn selection_counts(&self) -> (usize, usize) {
        let state = self.inner.state.borrow();
        (state.selection.len(), state.domain_selection.len())
    }

    /// The view for the current state.
    pub fn view(&self) -> PanelView {
        compose(&self.inner.state.borrow(), &self.inner.config.options)
    }

    // ── Filter and selection ─────────────────────────────────────

    pub fn set_filter(&self, filter: EntityFilter) {
        self.inner.state.send_modify(|s| s.set_filter(filter));
    }

    pub fn update_filter(&self, edit: impl FnOnce(&mut EntityFilter)) {
        self.inner.state.send_modify(|s| s.update_filter(edit));
    }

    /// Returns false when `entity_id` is not loaded.
    pub fn toggle(&self, entity_id: &str, selected: bool) -> bool {
        let mut known = false;
        self.inner
            .state
            .send_modify(|s| known = s.toggle(entity_id, selected));
        known
    }

    pub fn select_all_visible(&self, selected: bool) {
        self.inner
            .state
            .send_modify(|s| s.select_all_visible(selected));
    }

    pub fn clear_selection(&self) {
        self.inner.state.send_modify(PanelState::clear_selection);
    }

    /// Returns false when `domain` is not loaded.
    pub fn toggle_domain(&self, domain: &str, selected: bool) -> bool {
        let mut known = false;
        self.inner
            .state
            .send_modify(|s| known = s.toggle_domain(domain, selected));
        known
    }

    pub fn select_all_domains(&self, selected: bool) {
        self.inner
            .state
            .send_modify(|s| s.select_all_domains(selected));
    }

    pub fn set_view(&self, view: ViewMode) {
        self.inner.state.send_modify(|s| s.view = view);
    }

    // ── Bulk runs ────────────────────────────────────────────────

    /// Apply `action` to the selected entities in batches of
    /// [`BATCH_SIZE`], then reload and clear the selection.
    ///
    /// Failed batches are reported, not raised. `on_progress` sees
    /// every batch attempt.
    pub async fn run_bulk<F>(
        &self,
        action: BulkAction,
        confirmed: Option<Confirmed>,
        mut on_progress: F,
    ) -> Result<BulkReport, CoreError>
    where
        F: FnMut(&BulkProgress) + Send,
    {
        let ids = self.inner.state.borrow().selected_ids();
        if ids.is_empty() {
            return Err(CoreError::validation("No entities selected"));
        }
        ensure_confirmed(action.is_destructive(), confirmed, &action.title())?;
        let client = self.require_client().await?;

        let report = execute_batches(&client, action, &ids, BATCH_SIZE, |progress| {
            self.inner
                .state
                .send_modify(|s| s.progress = Some(progress.clone()));
            on_progress(progress);
        })
        .await;

        let failed = report.failed_ids().len();
        info!(
            action = action.verb(),
            entities = ids.len(),
            failed,
            "bulk action finished"
        );

        if let Err(e) = self.load().await {
            warn!(error = %e, "reload after bulk action failed");
        }
        self.inner.state.send_modify(|s| {
            s.progress = None;
            s.clear_selection();
        });
        Ok(report)
    }

    /// Apply `action` to the selected domains in one call, then reload
    /// and clear the domain selection.
    pub async fn run_domain_bulk(
        &self,
        action: DomainAction,
        confirmed: Option<Confirmed>,
    ) -> Result<CommandResult, CoreError> {
        let domains = self.inner.state.borrow().selected_domains();
        if domains.is_empty() {
            return Err(CoreError::validation("No domains selected"));
        }
        if action == DomainAction::SetRecorderDays(0) {
            return Err(CoreError::validation(
                "domain retention must be at least 1 day",
            ));
        }
        ensure_confirmed(action.is_destructive(), confirmed, &action.title())?;
        let client = self.require_client().await?;

        let resp = match action {
            DomainAction::Exclude => client.bulk_exclude_domains(&domains, true).await?,
            DomainAction::Include => client.bulk_exclude_domains(&domains, false).await?,
            DomainAction::SetRecorderDays(days) => {
                client
                    .bulk_update_domain_recorder_days(&domains, days)
                    .await?
            }
        };
        info!(domains = domains.len(), "domain bulk action finished");

        if let Err(e) = self.load().await {
            warn!(error = %e, "reload after domain bulk action failed");
        }
        self.inner
            .state
            .send_modify(|s| s.domain_selection.clear());

        match resp.status.as_deref() {
            Some("error") => Err(CoreError::Rejected {
                message: resp.message.unwrap_or_else(|| "unknown error".into()),
            }),
            _ => Ok(resp.message.map_or(CommandResult::Ok, CommandResult::Message)),
        }
    }

    // ── Command execution ────────────────────────────────────────

    /// Execute a single-item command.
    ///
    /// Validated locally first, then sent through the internal channel
    /// to the command processor task; a successful write triggers a
    /// reload.
    pub async fn execute(
        &self,
        cmd: Command,
        confirmed: Option<Confirmed>,
    ) -> Result<CommandResult, CoreError> {
        cmd.validate(&self.inner.state.borrow())?;
        ensure_confirmed(cmd.is_destructive(), confirmed, &cmd.describe())?;
        if *self.inner.connection_state.borrow() != ConnectionState::Connected {
            return Err(CoreError::NotConnected);
        }

        let refreshes = cmd.refreshes();
        let (tx, rx) = tokio::sync::oneshot::channel();
        let command_tx = self.inner.command_tx.lock().await.clone();
        command_tx
            .send(CommandEnvelope {
                command: cmd,
                response_tx: tx,
            })
            .await
            .map_err(|_| CoreError::NotConnected)?;

        let result = rx.await.map_err(|_| CoreError::NotConnected)??;
        if refreshes {
            self.load().await?;
        }
        Ok(result)
    }

    // ── Recorder report ──────────────────────────────────────────

    /// Entities with the most recorded rows, heaviest first.
    pub async fn recorder_report(&self, limit: u32) -> Result<RecorderReport, CoreError> {
        let client = self.require_client().await?;
        let report = RecorderReport::try_from(client.recorder_report(limit).await?)?;
        info!(
            analyzed = report.entities_analyzed,
            records = report.total_records,
            "recorder report ready"
        );
        Ok(report)
    }

    /// Ask the recorder for a short `sun.sun` history. Rejected tokens and
    /// a missing session are errors; any other failure is reported as
    /// [`RecorderHealth::Unavailable`].
    pub async fn check_recorder(&self) -> Result<RecorderHealth, CoreError> {
        let client = self.require_client().await?;
        match client.recorder_health().await {
            Ok(rows) => {
                info!(rows, "recorder is answering");
                Ok(RecorderHealth::Healthy { rows })
            }
            Err(e) if e.is_auth() => Err(e.into()),
            Err(e) => {
                warn!(error = %e, "recorder health check failed");
                Ok(RecorderHealth::Unavailable {
                    reason: CoreError::from(e).to_string(),
                })
            }
        }
    }

    /// Restrict the entity list to the entities of `report`.
    pub fn filter_to_report(&self, report: &RecorderReport) {
        self.set_filter(EntityFilter::only_ids(report.entity_ids()));
    }

    // ── Export ───────────────────────────────────────────────────

    /// Render the filtered entities for saving.
    pub fn export(&self) -> Result<Export, CoreError> {
        export_entities(&self.inner.state.borrow().filtered, Utc::now())
    }

    // ── One-shot convenience ─────────────────────────────────────

    /// One-shot: connect, run closure, disconnect.
    ///
    /// Optimized for CLI: disables auto refresh since we only need a
    /// single request-response cycle.
    pub async fn oneshot<F, Fut, T>(config: PanelConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Panel) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let mut cfg = config;
        cfg.options.auto_refresh = false;

        let panel = Panel::new(cfg);
        if let Err(e) = panel.connect().await {
            panel.disconnect().await;
            return Err(e);
        }
        let result = f(panel.clone()).await;
        panel.disconnect().await;
        result
    }
}

// ── Helpers ──────────────────────────────────────────────────────

/// Older backends have no domains endpoint.
async fn list_domains_or_empty(
    client: &EntityManagerClient,
) -> Result<Vec<DomainResponse>, entman_api::Error> {
    match client.list_domains().await {
        Err(e) if e.is_not_found() => {
            debug!("domains endpoint not available, continuing without domains");
            Ok(Vec::new())
        }
        other => other,
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Periodically reload until cancelled.
async fn refresh_task(panel: Panel, interval_secs: u64, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Err(e) = panel.load().await {
                    warn!(error = %e, "periodic refresh failed");
                }
            }
        }
    }
}

/// Process commands from the mpsc channel one at a time.
async fn command_processor_task(
    panel: Panel,
    mut rx: mpsc::Receiver<CommandEnvelope>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                let result = match panel.require_client().await {
                    Ok(client) => {
                        debug!(command = %envelope.command.describe(), "routing command");
                        route_command(&client, envelope.command).await
                    }
                    Err(e) => Err(e),
                };
                let _ = envelope.response_tx.send(result);
            }
        }
    }
}
