// ── Runtime panel configuration ──
//
// These types describe how to reach Home Assistant and how the panel
// behaves. They carry the token but never touch disk: the CLI/TUI
// builds a `PanelConfig` (usually via entman-config) and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::selection::PrunePolicy;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed certs).
    DangerAcceptInvalid,
}

/// Display and loading options of the panel.
///
/// Mirrors the declarative card configuration: every field is optional
/// in TOML and falls back to the defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelOptions {
    pub title: String,
    pub show_filters: bool,
    pub show_bulk_actions: bool,
    /// Domain allow-list applied on load. Empty = every domain.
    pub domains: Vec<String>,
    /// Cap on loaded entities. 0 = unlimited.
    pub max_entities: usize,
    /// Periodically reload while connected.
    pub auto_refresh: bool,
    pub refresh_interval_secs: u64,
    pub prune_policy: PrunePolicy,
}

impl Default for PanelOptions {
    fn default() -> Self {
        Self {
            title: "Entity Manager".into(),
            show_filters: true,
            show_bulk_actions: true,
            domains: Vec::new(),
            max_entities: 0,
            auto_refresh: false,
            refresh_interval_secs: 30,
            prune_policy: PrunePolicy::default(),
        }
    }
}

/// Everything needed to connect a [`Panel`](crate::Panel).
#[derive(Debug, Clone)]
pub struct PanelConfig {
    /// Home Assistant root URL (e.g., `http://homeassistant.local:8123`).
    pub url: Url,
    /// Long-lived access token.
    pub token: SecretString,
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    pub options: PanelOptions,
}

impl PanelConfig {
    pub fn new(url: Url, token: SecretString) -> Self {
        Self {
            url,
            token,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            options: PanelOptions::default(),
        }
    }

    pub(crate) fn transport(&self) -> entman_api::TransportConfig {
        entman_api::TransportConfig {
            tls: match &self.tls {
                TlsVerification::SystemDefaults => entman_api::TlsMode::System,
                TlsVerification::CustomCa(path) => entman_api::TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => entman_api::TlsMode::DangerAcceptInvalid,
            },
            timeout: self.timeout,
        }
    }
}
