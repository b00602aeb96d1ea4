// Async HTTP client for the Home Assistant REST API.
//
// Base path: /api/
// Auth: Authorization: Bearer <long-lived access token>

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::{Error, TransportConfig};

/// Longest slice of a response body carried in error messages.
const BODY_PREVIEW_LEN: usize = 200;

// ── Error response shape from Home Assistant ─────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for a Home Assistant instance running the
/// `entity_manager` integration.
///
/// Endpoint methods live in [`rest`](crate::rest) (integration views)
/// and [`services`](crate::services) (service calls).
#[derive(Debug, Clone)]
pub struct EntityManagerClient {
    http: reqwest::Client,
    base_url: Url,
}

impl EntityManagerClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a long-lived access token and transport config.
    ///
    /// Injects `Authorization: Bearer <token>` as a default header.
    pub fn from_token(
        base_url: &str,
        token: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|e| Error::InvalidToken(e.to_string()))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);

        let http = transport.build_client_with_headers(headers)?;
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
        })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
        })
    }

    /// The Home Assistant root, always ending in `/`.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Accept `http://host:8123`, `http://host:8123/` or `.../api`.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        let path = path.strip_suffix("/api").unwrap_or(&path).to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a path under `/api/` (e.g. `"entity_manager/entities"`).
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(&format!("api/{path}"))?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.api_url(path)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        Self::handle_response(path, resp).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.api_url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        Self::handle_response(path, resp).await
    }

    /// POST where the response body is irrelevant (service calls return
    /// the list of changed states, which nothing here consumes).
    pub(crate) async fn post_no_response<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), Error> {
        let url = self.api_url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        Self::handle_empty(path, resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        path: &str,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview = preview(&body);
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(Self::parse_error(path, status, resp).await)
        }
    }

    async fn handle_empty(path: &str, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::parse_error(path, status, resp).await)
        }
    }

    async fn parse_error(path: &str, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&raw)
            .ok()
            .and_then(|err| err.message.or(err.error))
            .unwrap_or_else(|| {
                if raw.is_empty() {
                    status.to_string()
                } else {
                    preview(&raw).to_owned()
                }
            });

        match status {
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                Error::Authentication { message }
            }
            reqwest::StatusCode::NOT_FOUND => Error::NotFound {
                path: format!("/api/{path}"),
            },
            _ => Error::Api {
                status: status.as_u16(),
                message,
            },
        }
    }
}

/// First [`BODY_PREVIEW_LEN`] bytes of `body`, cut on a char boundary.
fn preview(body: &str) -> &str {
    let mut end = body.len().min(BODY_PREVIEW_LEN);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        for raw in [
            "http://ha.local:8123",
            "http://ha.local:8123/",
            "http://ha.local:8123/api",
            "http://ha.local:8123/api/",
        ] {
            let url = EntityManagerClient::normalize_base_url(raw).unwrap_or_else(|e| panic!("{e}"));
            assert_eq!(url.as_str(), "http://ha.local:8123/", "input {raw}");
        }
    }

    #[test]
    fn base_url_keeps_reverse_proxy_prefix() {
        let url = EntityManagerClient::normalize_base_url("https://proxy.example/ha/")
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(url.as_str(), "https://proxy.example/ha/");
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let body = "é".repeat(150);
        let cut = preview(&body);
        assert!(cut.len() <= BODY_PREVIEW_LEN);
        assert!(body.starts_with(cut));
    }
}
