//! A client for interacting with SiriusXM.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use regex::Regex;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};

use crate::core::consts;
use crate::core::stream::StreamState;
use crate::domain::model::{
    AnonymousSession, AuthenticatedSession, AuthenticationGrant, DeviceSession, IdentityStatus,
};
use crate::utils::error::{Result, SxmError};

#[derive(Default)]
struct AuthState {
    device_grant: Option<String>,
    access_token: Option<String>,
    access_token_expires_at: Option<DateTime<Utc>>,
}

impl AuthState {
    fn is_expired(&self) -> bool {
        matches!(self.access_token_expires_at, Some(at) if Utc::now() >= at)
    }
}

struct ClientInner {
    http: Client,
    api_base: String,
    player_url: String,
    username: String,
    password: String,
    auth: RwLock<AuthState>,
    web_config: RwLock<Option<serde_json::Value>>,
    streams: Mutex<HashMap<(String, String), Arc<StreamState>>>,
}

/// A client for interacting with SiriusXM.
///
/// Cloning is cheap; clones share the HTTP connection pool, the session
/// state, and the stream cache.
#[derive(Clone)]
pub struct SxmClient {
    inner: Arc<ClientInner>,
}

impl SxmClient {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::with_base_urls(username, password, consts::API_BASE_URL, consts::PLAYER_PAGE_URL)
    }

    /// Credentials from `SXM_USERNAME` / `SXM_PASSWORD`.
    pub fn from_env() -> Result<Self> {
        let username = std::env::var("SXM_USERNAME").map_err(|_| SxmError::MissingConfigError {
            field: "SXM_USERNAME".to_string(),
        })?;
        let password = std::env::var("SXM_PASSWORD").map_err(|_| SxmError::MissingConfigError {
            field: "SXM_PASSWORD".to_string(),
        })?;
        Ok(Self::new(username, password))
    }

    /// Point the client at alternate endpoints, e.g. a local mock server.
    pub fn with_base_urls(
        username: impl Into<String>,
        password: impl Into<String>,
        api_base: impl Into<String>,
        player_url: impl Into<String>,
    ) -> Self {
        let http = Client::builder()
            .default_headers(consts::request_headers())
            .timeout(consts::DEFAULT_REQUEST_TIMEOUT)
            .build()
            .expect("HTTP client construction failed");

        SxmClient {
            inner: Arc::new(ClientInner {
                http,
                api_base: api_base.into().trim_end_matches('/').to_string(),
                player_url: player_url.into(),
                username: username.into(),
                password: password.into(),
                auth: RwLock::new(AuthState::default()),
                web_config: RwLock::new(None),
                streams: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Connect to SiriusXM: register a device session, authenticate, and
    /// load the web player config.
    pub async fn connect(&self) -> Result<()> {
        {
            let mut auth = self.inner.auth.write().await;
            self.create_device_session(&mut auth).await?;
            self.authenticate(&mut auth).await?;
        }
        self.refresh_config(None).await?;
        Ok(())
    }

    pub fn username(&self) -> &str {
        &self.inner.username
    }

    // ---- request primitives ------------------------------------------------

    pub(crate) fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.inner.api_base, path)
    }

    /// GET a JSON document, refreshing the access token first if needed.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let token = self.bearer_token().await?;
        self.get_json_raw(url, token.as_deref()).await
    }

    pub async fn get_text(&self, url: &str) -> Result<String> {
        let token = self.bearer_token().await?;
        let resp = self.get_raw(url, token.as_deref()).await?;
        resp.text().await.map_err(|e| self.request_error(url, e))
    }

    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let token = self.bearer_token().await?;
        let resp = self.get_raw(url, token.as_deref()).await?;
        let bytes = resp.bytes().await.map_err(|e| self.request_error(url, e))?;
        Ok(bytes.to_vec())
    }

    pub async fn post_json<T, B>(&self, url: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let token = self.bearer_token().await?;
        self.post_json_raw(url, token.as_deref(), body).await
    }

    fn request_error(&self, url: &str, source: reqwest::Error) -> SxmError {
        tracing::error!("Request to {} failed: {}", url, source);
        SxmError::request(url, source)
    }

    async fn send_checked(
        &self,
        req: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<reqwest::Response> {
        let resp = req.send().await.map_err(|e| self.request_error(url, e))?;
        resp.error_for_status().map_err(|e| self.request_error(url, e))
    }

    async fn get_raw(&self, url: &str, bearer: Option<&str>) -> Result<reqwest::Response> {
        let mut req = self.inner.http.get(url);
        if let Some(token) = bearer {
            req = req.bearer_auth(token);
        }
        self.send_checked(req, url).await
    }

    async fn get_json_raw<T: DeserializeOwned>(&self, url: &str, bearer: Option<&str>) -> Result<T> {
        let resp = self.get_raw(url, bearer).await?;
        resp.json().await.map_err(|e| self.request_error(url, e))
    }

    async fn post_json_raw<T, B>(&self, url: &str, bearer: Option<&str>, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut req = self.inner.http.post(url).json(body);
        if let Some(token) = bearer {
            req = req.bearer_auth(token);
        }
        let resp = self.send_checked(req, url).await?;
        resp.json().await.map_err(|e| self.request_error(url, e))
    }

    // ---- authentication ----------------------------------------------------

    /// Current access token, re-running the authentication chain first when
    /// the stored expiry has passed. Double-checked under the write lock so
    /// concurrent callers trigger a single re-authentication.
    async fn bearer_token(&self) -> Result<Option<String>> {
        let expired = self.inner.auth.read().await.is_expired();
        if expired {
            let mut auth = self.inner.auth.write().await;
            if auth.is_expired() {
                tracing::info!("Access token expired; requesting a new one");
                auth.access_token = None;
                auth.access_token_expires_at = None;
                self.authenticate(&mut auth).await?;
            }
        }
        Ok(self.inner.auth.read().await.access_token.clone())
    }

    async fn authenticate(&self, auth: &mut AuthState) -> Result<()> {
        match self.run_auth_chain(auth).await {
            Ok(()) => Ok(()),
            Err(err @ SxmError::AuthenticationError { .. }) => Err(err),
            Err(err) => Err(SxmError::AuthenticationError {
                handle: self.inner.username.clone(),
                message: err.to_string(),
            }),
        }
    }

    async fn run_auth_chain(&self, auth: &mut AuthState) -> Result<()> {
        let device_grant = match &auth.device_grant {
            Some(grant) => grant.clone(),
            None => self.create_device_session(auth).await?,
        };

        let anonymous: AnonymousSession = self
            .post_json_raw(
                &self.api_url("/session/v1/sessions/anonymous"),
                Some(&device_grant),
                &true,
            )
            .await?;

        let status: IdentityStatus = self
            .get_json_raw(
                &self.api_url(&format!(
                    "/identity/v1/identities/status?handle={}",
                    self.inner.username
                )),
                Some(&anonymous.access_token),
            )
            .await?;
        if !status.has_password {
            return Err(SxmError::AuthenticationError {
                handle: self.inner.username.clone(),
                message: "user does not have a password set".to_string(),
            });
        }

        let granted: AuthenticationGrant = self
            .post_json_raw(
                &self.api_url("/identity/v1/identities/authenticate/password"),
                Some(&anonymous.access_token),
                &serde_json::json!({
                    "handle": self.inner.username,
                    "password": self.inner.password,
                }),
            )
            .await?;

        let session: AuthenticatedSession = self
            .post_json_raw(
                &self.api_url("/session/v1/sessions/authenticated"),
                Some(&granted.grant),
                &true,
            )
            .await?;

        auth.access_token = Some(session.access_token);
        auth.access_token_expires_at = Some(session.access_token_expires_at);
        tracing::debug!(
            "Authenticated {}; token valid until {}",
            self.inner.username,
            session.access_token_expires_at
        );
        Ok(())
    }

    async fn create_device_session(&self, auth: &mut AuthState) -> Result<String> {
        let device: DeviceSession = self
            .post_json_raw(
                &self.api_url("/device/v1/devices"),
                None,
                &consts::device_payload(),
            )
            .await?;
        auth.device_grant = Some(device.grant.clone());
        Ok(device.grant)
    }

    // ---- web player config -------------------------------------------------

    /// Fetch the web player page and store the `config` section of its
    /// hydrated data blob. When `dump_to` is given, the full blob is
    /// pretty-printed to that file.
    pub async fn refresh_config(&self, dump_to: Option<&Path>) -> Result<()> {
        let html = self.get_text(&self.inner.player_url).await?;
        let hydrated = extract_hydrated_data(&html)?;
        if let Some(path) = dump_to {
            tokio::fs::write(path, serde_json::to_vec_pretty(&hydrated)?).await?;
        }
        let config = hydrated
            .get("config")
            .cloned()
            .unwrap_or_else(|| serde_json::json!({}));
        *self.inner.web_config.write().await = Some(config);
        Ok(())
    }

    /// The `config` section captured by the last [`refresh_config`] run.
    ///
    /// [`refresh_config`]: SxmClient::refresh_config
    pub async fn web_config(&self) -> Option<serde_json::Value> {
        self.inner.web_config.read().await.clone()
    }

    // ---- stream cache ------------------------------------------------------

    pub(crate) async fn cached_stream(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> Option<Arc<StreamState>> {
        let streams = self.inner.streams.lock().await;
        streams
            .get(&(entity_type.to_string(), entity_id.to_string()))
            .cloned()
    }

    pub(crate) async fn cache_stream(&self, state: Arc<StreamState>) {
        let mut streams = self.inner.streams.lock().await;
        streams.insert(
            (state.entity_type.clone(), state.entity_id.clone()),
            state,
        );
    }
}

fn extract_hydrated_data(html: &str) -> Result<serde_json::Value> {
    let re = Regex::new(r#"(?s)<script id="hydrated_data" type="application/json">(.*?)</script>"#)
        .unwrap();
    match re.captures(html) {
        Some(caps) => Ok(serde_json::from_str(caps[1].trim())?),
        None => Ok(serde_json::json!({})),
    }
}
