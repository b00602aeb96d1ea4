//! CLI configuration: thin wrapper around `entman_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--url, --token, etc.).

use std::time::Duration;

use secrecy::SecretString;

use entman_core::{PanelConfig, PanelOptions};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use entman_config::{
    Config, Profile, config_path, load_config_or_default, save_config, store_token,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Comma-separated profile names for help text.
pub fn available_profiles(config: &Config) -> String {
    if config.profiles.is_empty() {
        "(none)".into()
    } else {
        config.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// Build a `PanelConfig` from the config file, profile, and CLI overrides.
pub fn build_panel_config(global: &GlobalOpts) -> Result<PanelConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    if let Some(profile) = cfg.profiles.get(&profile_name) {
        return resolve_profile(&cfg, profile, &profile_name, global);
    }

    // An explicitly requested profile must exist.
    if global.profile.is_some() {
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: available_profiles(&cfg),
        });
    }

    // No profile: build from flags / env alone.
    let url_str = global.url.as_deref().ok_or_else(|| CliError::NoConfig {
        path: config_path().display().to_string(),
    })?;
    let url = entman_config::parse_url(url_str)?;
    let token = global
        .token
        .clone()
        .map(SecretString::from)
        .ok_or(CliError::NoToken {
            profile: profile_name,
        })?;

    let mut panel = PanelConfig::new(url, token);
    panel.tls = entman_config::tls_for(global.insecure || cfg.defaults.insecure, None);
    panel.timeout = Duration::from_secs(global.timeout.unwrap_or(cfg.defaults.timeout));
    panel.options = PanelOptions::default();
    Ok(panel)
}

/// Translate a `Profile` + global flags into a `PanelConfig`.
///
/// CLI flag overrides take priority over profile values.
pub fn resolve_profile(
    cfg: &Config,
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<PanelConfig, CliError> {
    // 1. URL (flag > env > profile)
    let url = entman_config::parse_url(global.url.as_deref().unwrap_or(&profile.url))?;

    // 2. Token (flag > profile chain)
    let token = match global.token {
        Some(ref token) => SecretString::from(token.clone()),
        None => entman_config::resolve_token(profile, profile_name)?,
    };

    let mut panel = PanelConfig::new(url, token);

    // 3. TLS verification
    let insecure = global.insecure || profile.insecure.unwrap_or(cfg.defaults.insecure);
    panel.tls = entman_config::tls_for(insecure, profile.ca_cert.as_deref());

    // 4. Timeout (flag > profile > defaults)
    let secs = global
        .timeout
        .or(profile.timeout)
        .unwrap_or(cfg.defaults.timeout);
    panel.timeout = Duration::from_secs(secs);

    panel.options = profile.panel.clone();
    Ok(panel)
}
