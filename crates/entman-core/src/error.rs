// ── Core error types ──
//
// User-facing errors from entman-core. Consumers never see reqwest or
// serde failures directly: the `From<entman_api::Error>` impl translates
// transport-layer errors into tagged domain variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach Home Assistant at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Not connected to Home Assistant")]
    NotConnected,

    #[error("Request timed out")]
    Timeout,

    // ── Backend errors ───────────────────────────────────────────────
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    #[error("Rejected by Home Assistant: {message}")]
    Rejected { message: String },

    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Client-side errors ───────────────────────────────────────────
    #[error("{message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification of a [`CoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    Network,
    Authentication,
    Validation,
    Rejected,
    NotFound,
    Config,
    Internal,
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConnectionFailed { .. } | Self::NotConnected | Self::Timeout => ErrorKind::Network,
            Self::AuthenticationFailed { .. } => ErrorKind::Authentication,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Rejected { .. } | Self::Api { .. } => ErrorKind::Rejected,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Config { .. } => ErrorKind::Config,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Validation failures never reach the network.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<entman_api::Error> for CoreError {
    fn from(err: entman_api::Error) -> Self {
        match err {
            entman_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            entman_api::Error::InvalidToken(reason) => CoreError::AuthenticationFailed {
                message: format!("invalid access token: {reason}"),
            },
            entman_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            entman_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            entman_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            entman_api::Error::NotFound { path } => CoreError::NotFound {
                entity_type: "Endpoint".into(),
                identifier: path,
            },
            entman_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            entman_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_map_to_tagged_kinds() {
        let auth: CoreError = entman_api::Error::Authentication {
            message: "401".into(),
        }
        .into();
        assert_eq!(auth.kind(), ErrorKind::Authentication);

        let missing: CoreError = entman_api::Error::NotFound {
            path: "/api/entity_manager/domains".into(),
        }
        .into();
        assert_eq!(missing.kind(), ErrorKind::NotFound);

        let rejected: CoreError = entman_api::Error::Api {
            status: 400,
            message: "bad entity".into(),
        }
        .into();
        assert_eq!(rejected.kind(), ErrorKind::Rejected);
    }

    #[test]
    fn validation_message_is_displayed_verbatim() {
        let err = CoreError::validation("No entities selected");
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "No entities selected");
    }
}
