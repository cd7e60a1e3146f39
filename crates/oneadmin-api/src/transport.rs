use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::envelope::Envelope;
use crate::error::{ApiError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
            Method::Delete => write!(f, "DELETE"),
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(m: Method) -> Self {
        match m {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// One call against the management API, independent of the HTTP stack.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Sends one request and returns the decoded envelope.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, req: ApiRequest) -> Result<Envelope>;
}

/// reqwest-backed transport. Authenticates with either a bearer access
/// token or the gateway's `session` cookie captured at login.
pub struct HttpTransport {
    client: Client,
    base_url: String,
    access_token: Option<String>,
    session_cookie: Mutex<Option<String>>,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url: String = base_url.into();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: None,
            session_cookie: Mutex::new(None),
        })
    }

    pub fn with_access_token(mut self, token: Option<String>) -> Self {
        self.access_token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn with_session_cookie(self, cookie: Option<String>) -> Self {
        if let Ok(mut slot) = self.session_cookie.lock() {
            *slot = cookie.filter(|c| !c.is_empty());
        }
        self
    }

    /// Current `name=value` session cookie, if the server has set one.
    pub fn session_cookie(&self) -> Option<String> {
        self.session_cookie.lock().ok().and_then(|c| c.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn remember_cookie(&self, headers: &reqwest::header::HeaderMap) {
        let found = headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split(';').next())
            .find(|pair| pair.trim_start().starts_with("session="))
            .map(|pair| pair.trim().to_string());
        if let Some(cookie) = found {
            if let Ok(mut slot) = self.session_cookie.lock() {
                *slot = Some(cookie);
            }
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, req: ApiRequest) -> Result<Envelope> {
        let url = format!("{}{}", self.base_url, req.path);
        debug!(method = %req.method, path = %req.path, "api request");

        let mut builder = self.client.request(req.method.into(), &url);
        if !req.query.is_empty() {
            builder = builder.query(&req.query);
        }
        if let Some(token) = &self.access_token {
            builder = builder.bearer_auth(token);
        }
        if let Some(cookie) = self.session_cookie() {
            builder = builder.header(COOKIE, cookie);
        }
        if let Some(body) = &req.body {
            builder = builder.json(body);
        }

        let resp = builder.send().await?;
        self.remember_cookie(resp.headers());

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, path = %req.path, "api error");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let env: Envelope = resp
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        if !env.success {
            debug!(path = %req.path, message = %env.message, "api rejected");
        }
        Ok(env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builder_collects_query() {
        let req = ApiRequest::get("/api/channel/")
            .query("p", 2)
            .query("id_sort", true);
        assert_eq!(req.query_value("p"), Some("2"));
        assert_eq!(req.query_value("id_sort"), Some("true"));
        assert_eq!(req.to_string(), "GET /api/channel/");
    }

    #[test]
    fn base_url_is_trimmed() {
        let t = HttpTransport::new("http://localhost:3000/", Duration::from_secs(5)).unwrap();
        assert_eq!(t.base_url(), "http://localhost:3000");
        assert!(t.session_cookie().is_none());
        let t = t.with_session_cookie(Some("session=abc".into()));
        assert_eq!(t.session_cookie().as_deref(), Some("session=abc"));
    }
}
