//! Data bridge: connects the [`Panel`] watch channels to TUI actions.
//!
//! Runs as a background task: opens the session, then forwards every
//! panel state change and connection-state transition as an [`Action`]
//! through the TUI's action channel.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use entman_core::{ConnectionState, Panel};

use crate::action::{Action, Snapshot};

fn snapshot(panel: &Panel) -> Arc<Snapshot> {
    Arc::new(Snapshot {
        view: panel.view(),
        last_loaded: panel.state().last_loaded,
    })
}

/// Connect `panel` and stream its state into the TUI until cancelled.
///
/// A failed connect still leaves the bridge running: the panel shows
/// its error view and `r` retries through [`Action::Reload`].
pub async fn spawn_data_bridge(
    panel: Panel,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let mut state = panel.subscribe();
    let mut conn_state = panel.connection_state();

    let _ = action_tx.send(Action::Connecting);
    let _ = action_tx.send(Action::StateUpdated(snapshot(&panel)));

    if let Err(e) = panel.connect().await {
        warn!(error = %e, "failed to connect to Home Assistant");
        let _ = action_tx.send(Action::Disconnected(e.to_string()));
    }
    let _ = action_tx.send(Action::StateUpdated(snapshot(&panel)));

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            Ok(()) = state.changed() => {
                let _ =action_tx.send(Action::StateUpdated(snapshot(&panel)));
            }
            Ok(()) = conn_state.changed() => {
                let current = *conn_state.borrow_and_update();
                let action = match current {
                    ConnectionState::Connected => Action::Connected,
                    ConnectionState::Connecting => Action::Connecting,
                    ConnectionState::Disconnected => Action::Disconnected("disconnected".into()),
                    ConnectionState::Failed => Action::Disconnected("connection failed".into()),
                };
                let _ = action_tx.send(action);
            }
        }
    }

    panel.disconnect().await;
    debug!("data bridge shut down");
}
