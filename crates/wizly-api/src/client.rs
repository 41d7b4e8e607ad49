// Async HTTP client for the Wizarr API.
//
// Base path: {base_url}/api
// Auth: X-API-Key header

use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::transport::TransportConfig;

/// Header carrying the API key on every request.
pub const API_KEY_HEADER: &str = "X-API-Key";

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the Wizarr API.
///
/// One request per call, no retries. Responses are returned as raw
/// `serde_json::Value` because the server's payload shapes vary between
/// versions; `wizly-core` normalizes them.
#[derive(Debug, Clone)]
pub struct WizarrClient {
    http: reqwest::Client,
    base_url: Url,
    api_root: String,
}

impl WizarrClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from an API key and transport config.
    ///
    /// Injects `X-API-Key` and `Content-Type: application/json` as default
    /// headers on every request.
    pub fn from_api_key(
        base_url: &str,
        api_key: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut key_value =
            HeaderValue::from_str(api_key.expose_secret()).map_err(|e| Error::InvalidApiKey {
                message: e.to_string(),
            })?;
        key_value.set_sensitive(true);
        headers.insert(API_KEY_HEADER, key_value);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = transport.build_client_with_headers(headers)?;
        Self::from_reqwest(base_url, http)
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Url::parse(base_url)?;
        let api_root = format!("{}/api", base_url.as_str().trim_end_matches('/'));
        Ok(Self {
            http,
            base_url,
            api_root,
        })
    }

    /// The configured server base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join an endpoint path (e.g. `"/users"`) onto `{base}/api`.
    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(Url::parse(&format!("{}{path}", self.api_root))?)
    }

    /// `{base}/api/{collection}/{id}[/{action}]` with the id encoded as
    /// exactly one path segment, so `../users/5` cannot climb out.
    fn item_url(&self, collection: &str, id: &str, action: Option<&str>) -> Result<Url, Error> {
        if matches!(id.trim(), "" | "." | "..") {
            return Err(Error::InvalidId { id: id.to_owned() });
        }
        let mut url = Url::parse(&self.api_root)?;
        url.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .push(collection)
            .push(id)
            .extend(action);
        Ok(url)
    }

    // ── Request primitive ────────────────────────────────────────────

    /// Issue one request and decode the JSON response.
    ///
    /// 200/201 decode the body (an empty body decodes to `null`), 401 maps
    /// to [`Error::Auth`], any other non-2xx to [`Error::Request`], and a
    /// failure before a response arrives to [`Error::Connectivity`].
    pub async fn request<B: Serialize + Sync + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Value, Error> {
        let url = self.url(path)?;
        self.send(method, &url, body).await
    }

    async fn send<B: Serialize + Sync + ?Sized>(
        &self,
        method: Method,
        url: &Url,
        body: Option<&B>,
    ) -> Result<Value, Error> {
        debug!("{method} {url}");

        let mut builder = self.http.request(method, url.clone());
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| Error::connectivity(url, &e))?;
        Self::handle_response(url, resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response(url: &Url, resp: reqwest::Response) -> Result<Value, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Auth);
        }

        let body = resp
            .text()
            .await
            .map_err(|e| Error::connectivity(url, &e))?;

        if !status.is_success() {
            debug!(status = status.as_u16(), %url, "request rejected");
            return Err(Error::Request {
                status: status.as_u16(),
                body,
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    async fn get(&self, path: &str) -> Result<Value, Error> {
        self.request::<Value>(Method::GET, path, None).await
    }

    /// Fetch any read endpoint by kind.
    pub async fn fetch(&self, endpoint: Endpoint) -> Result<Value, Error> {
        self.get(endpoint.path()).await
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub async fn get_status(&self) -> Result<Value, Error> {
        self.fetch(Endpoint::Status).await
    }

    pub async fn get_users(&self) -> Result<Value, Error> {
        self.fetch(Endpoint::Users).await
    }

    pub async fn get_invitations(&self) -> Result<Value, Error> {
        self.fetch(Endpoint::Invitations).await
    }

    pub async fn get_libraries(&self) -> Result<Value, Error> {
        self.fetch(Endpoint::Libraries).await
    }

    pub async fn get_servers(&self) -> Result<Value, Error> {
        self.fetch(Endpoint::Servers).await
    }

    pub async fn get_api_keys(&self) -> Result<Value, Error> {
        self.fetch(Endpoint::ApiKeys).await
    }

    // ── Invitations ──────────────────────────────────────────────────

    pub async fn create_invitation<B: Serialize + Sync + ?Sized>(
        &self,
        payload: &B,
    ) -> Result<Value, Error> {
        self.request(Method::POST, "/invitations", Some(payload))
            .await
    }

    pub async fn delete_invitation(&self, invitation_id: &str) -> Result<Value, Error> {
        let url = self.item_url("invitations", invitation_id, None)?;
        self.send::<Value>(Method::DELETE, &url, None).await
    }

    // ── Users ────────────────────────────────────────────────────────

    pub async fn delete_user(&self, user_id: &str) -> Result<Value, Error> {
        let url = self.item_url("users", user_id, None)?;
        self.send::<Value>(Method::DELETE, &url, None).await
    }

    /// Extend a user's expiry date.
    pub async fn extend_user<B: Serialize + Sync + ?Sized>(
        &self,
        user_id: &str,
        payload: &B,
    ) -> Result<Value, Error> {
        let url = self.item_url("users", user_id, Some("extend"))?;
        self.send(Method::POST, &url, Some(payload)).await
    }
}
