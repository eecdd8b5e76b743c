//! Single outgoing-request pipeline to the academic-affairs API.
//!
//! Every call reads the session token at dispatch time and, when present, sends it as a
//! bearer credential. Successful bodies are handed back as-is (deserialized into the
//! caller's type); every failure, in transit or from the server, becomes an [`ApiError`].
//! No retries, no caching, no deduplication happen here.

mod error;

pub use error::{normalize_failure, ApiError, DEFAULT_FAILURE_MESSAGE};

use std::time::{Duration, Instant};

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ConsoleConfig;
use crate::error::AppResult;
use crate::identity::SessionStore;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Debug, Clone)]
pub struct ApiGateway {
    base: Url,
    client: reqwest::Client,
    sessions: SessionStore,
    clear_on_unauthorized: bool,
}

impl ApiGateway {
    pub fn new(base: Url, client: reqwest::Client, sessions: SessionStore) -> Self {
        Self { base, client, sessions, clear_on_unauthorized: false }
    }

    pub fn from_config(cfg: &ConsoleConfig, sessions: SessionStore) -> AppResult<Self> {
        let base = cfg.api_url()?;
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(cfg.connect_timeout_ms))
            .build()
            .map_err(|e| crate::error::AppError::config("http_client".to_string(), e.to_string()))?;
        Ok(Self::new(base, client, sessions).clear_session_on_unauthorized(cfg.clear_session_on_unauthorized))
    }

    /// When set, a 401 from the API also clears the stored session.
    pub fn clear_session_on_unauthorized(mut self, on: bool) -> Self {
        self.clear_on_unauthorized = on;
        self
    }

    pub fn base(&self) -> &Url { &self.base }

    pub fn sessions(&self) -> &SessionStore { &self.sessions }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let rb = self.request(Method::GET, path)?;
        self.dispatch(rb, Method::GET, path).await
    }

    pub async fn get_with<Q, T>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let rb = self.request(Method::GET, path)?.query(query);
        self.dispatch(rb, Method::GET, path).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let rb = self.request(Method::POST, path)?.json(body);
        self.dispatch(rb, Method::POST, path).await
    }

    /// POST with query parameters and no body.
    pub async fn post_query<Q, T>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let rb = self.request(Method::POST, path)?.query(query);
        self.dispatch(rb, Method::POST, path).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let rb = self.request(Method::PUT, path)?.json(body);
        self.dispatch(rb, Method::PUT, path).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let rb = self.request(Method::DELETE, path)?;
        self.dispatch(rb, Method::DELETE, path).await
    }

    /// Resolve an API path against the base, keeping any path prefix the base carries.
    pub fn url(&self, path: &str) -> Result<Url, ApiError> {
        let joined = format!("{}/{}", self.base.as_str().trim_end_matches('/'), path.trim_start_matches('/'));
        Url::parse(&joined).map_err(|e| normalize_failure(None, Some(&format!("invalid request url {}: {}", joined, e)), None))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.url(path)?;
        let request_id = uuid::Uuid::new_v4().to_string();
        let mut rb = self.client.request(method, url).header(REQUEST_ID_HEADER, request_id);
        if let Some(token) = self.sessions.token() {
            match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(mut v) => {
                    v.set_sensitive(true);
                    rb = rb.header(AUTHORIZATION, v);
                }
                // an unencodable token cannot be sent; the API will treat the call as anonymous
                Err(_) => warn!(target: "eduadmin::gateway", "stored token is not a valid header value; sending unauthenticated"),
            }
        }
        Ok(rb)
    }

    async fn dispatch<T: DeserializeOwned>(&self, rb: RequestBuilder, method: Method, path: &str) -> Result<T, ApiError> {
        let started = Instant::now();
        let resp = match rb.send().await {
            Ok(r) => r,
            Err(e) => {
                debug!(target: "eduadmin::gateway", "{} {} transport failure: {}", method, path, e);
                return Err(ApiError::transport(&e));
            }
        };
        let status = resp.status();
        let bytes = resp.bytes().await.map_err(|e| ApiError::transport(&e))?;
        debug!(
            target: "eduadmin::gateway",
            "{} {} -> {} ({} bytes, {} ms)",
            method, path, status.as_u16(), bytes.len(), started.elapsed().as_millis()
        );

        if status.is_success() {
            let parsed = if bytes.is_empty() {
                serde_json::from_value(Value::Null)
            } else {
                serde_json::from_slice(&bytes)
            };
            return parsed.map_err(|e| ApiError { status: Some(status.as_u16()), message: format!("invalid response body: {}", e) });
        }

        if status.as_u16() == 401 && self.clear_on_unauthorized {
            if let Err(e) = self.sessions.clear_session() {
                warn!(target: "eduadmin::gateway", "could not clear session after 401: {}", e);
            }
        }
        let body: Option<Value> = serde_json::from_slice(&bytes).ok();
        let transport = format!("request failed with status code {}", status.as_u16());
        Err(normalize_failure(body.as_ref(), Some(&transport), Some(status.as_u16())))
    }
}
