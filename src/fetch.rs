//! HTTP client abstraction for making requests to the OTTSONLY API
//!
//! [`ApiClient`] turns a path and verb into a request carrying the JSON
//! content type and, when a token is stored, the bearer token. Responses are
//! returned as-is on success or normalized into [`Error`] on failure. Nothing
//! is retried: each call is sent at most once.

use std::sync::Arc;

use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use url::Url;

use crate::auth::session::SessionProvider;
use crate::config::ClientOptions;
use crate::error::{ApiErrorKind, Error, Result};

struct Inner {
    base_url: String,
    http: Client,
    sessions: SessionProvider,
    client_info: String,
}

/// Shared request/response layer used by every API group
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

impl ApiClient {
    /// Create a new ApiClient rooted at `base_url`
    pub fn new(base_url: &Url, sessions: SessionProvider, options: &ClientOptions) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            inner: Arc::new(Inner {
                base_url: base_url.as_str().trim_end_matches('/').to_string(),
                http,
                sessions,
                client_info: options.client_info.clone(),
            }),
        })
    }

    pub fn sessions(&self) -> &SessionProvider {
        &self.inner.sessions
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Start a request. The stored access token is read now, not cached.
    pub fn request(&self, method: Method, path: &str) -> Result<FetchBuilder> {
        let url = format!("{}{}", self.inner.base_url, path);
        let mut fetch = FetchBuilder::new(self.inner.http.clone(), &url, method)
            .header("X-Client-Info", &self.inner.client_info);

        if let Some(token) = self.inner.sessions.access_token()? {
            fetch = fetch.bearer_auth(&token);
        }

        Ok(fetch)
    }

    pub fn get(&self, path: &str) -> Result<FetchBuilder> {
        self.request(Method::GET, path)
    }

    pub fn post(&self, path: &str) -> Result<FetchBuilder> {
        self.request(Method::POST, path)
    }

    pub fn put(&self, path: &str) -> Result<FetchBuilder> {
        self.request(Method::PUT, path)
    }
}

enum Body {
    Json(Vec<u8>),
    Multipart(Form),
}

/// Helper for building and executing HTTP requests
pub struct FetchBuilder {
    client: Client,
    url: String,
    method: Method,
    headers: HeaderMap,
    segments: Vec<String>,
    query_params: Vec<(String, String)>,
    body: Option<Body>,
}

impl FetchBuilder {
    /// Create a new FetchBuilder
    pub fn new(client: Client, url: &str, method: Method) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Self {
            client,
            url: url.to_string(),
            method,
            headers,
            segments: Vec::new(),
            query_params: Vec::new(),
            body: None,
        }
    }

    /// Add or replace a header
    pub fn header(mut self, name: &str, value: &str) -> Self {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => warn!("Skipping invalid header {}", name),
        }
        self
    }

    /// Add bearer token authentication to the request
    pub fn bearer_auth(mut self, token: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
            self.headers.insert(AUTHORIZATION, value);
        }
        self
    }

    /// Append one path segment. Reserved characters such as `/`, `?` and
    /// `#` are percent-encoded, so ids cannot change the route.
    pub fn segment(mut self, segment: &str) -> Self {
        self.segments.push(segment.to_string());
        self
    }

    /// Add a query parameter
    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query_params.push((key.to_string(), value.to_string()));
        self
    }

    /// Add several query parameters
    pub fn query_pairs<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query_params
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Add a JSON body to the request
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        let json = serde_json::to_vec(body)?;
        self.body = Some(Body::Json(json));
        Ok(self)
    }

    /// Send a multipart form. The JSON content type is dropped so the
    /// boundary header can be set for the form.
    pub fn multipart(mut self, form: Form) -> Self {
        self.headers.remove(CONTENT_TYPE);
        self.body = Some(Body::Multipart(form));
        self
    }

    /// Build the request
    fn build(self) -> Result<RequestBuilder> {
        let mut url = Url::parse(&self.url)?;

        if !self.segments.is_empty() {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| Error::config(format!("{} cannot take path segments", self.url)))?;
            path.pop_if_empty().extend(&self.segments);
        }

        if !self.query_params.is_empty() {
            let mut query_pairs = url.query_pairs_mut();
            for (key, value) in &self.query_params {
                query_pairs.append_pair(key, value);
            }
        }

        debug!("{} {}", self.method, url.path());

        let mut req = self.client.request(self.method, url.as_str());
        req = req.headers(self.headers);

        req = match self.body {
            Some(Body::Json(bytes)) => req.body(bytes),
            Some(Body::Multipart(form)) => req.multipart(form),
            None => req,
        };

        Ok(req)
    }

    /// Execute the request and return the response body as JSON
    pub async fn execute_value(self) -> Result<Value> {
        let req = self.build()?;
        let response = req.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        let result = interpret_response(status, &body);
        if let Err(e) = &result {
            warn!("API Error: {}", e);
        }
        result
    }

    /// Execute the request and decode the response body into `T`
    pub async fn execute<T: DeserializeOwned>(self) -> Result<T> {
        let value = self.execute_value().await?;
        serde_json::from_value(value).map_err(Error::Decode)
    }
}

/// Map a completed response onto the success value or the failure taxonomy
pub(crate) fn interpret_response(status: StatusCode, body: &[u8]) -> Result<Value> {
    let data = match serde_json::from_slice::<Value>(body) {
        Ok(data) => data,
        Err(_) if !status.is_success() => {
            return Err(Error::Server {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
            });
        }
        Err(_) => return Err(Error::InvalidResponse),
    };

    if !status.is_success() {
        return Err(normalize_failure(status.as_u16(), &data));
    }

    Ok(data)
}

/// Build the error for a non-success response with a JSON body
pub(crate) fn normalize_failure(status: u16, data: &Value) -> Error {
    let (kind, message) = match data.get("detail") {
        Some(Value::String(detail)) if !detail.is_empty() => {
            (ApiErrorKind::Detail, detail.clone())
        }
        Some(Value::Array(issues)) => {
            // An issue with neither field still takes its place in the list
            let messages: Vec<String> = issues
                .iter()
                .map(|issue| {
                    issue
                        .get("msg")
                        .and_then(Value::as_str)
                        .filter(|m| !m.is_empty())
                        .or_else(|| issue.get("message").and_then(Value::as_str))
                        .unwrap_or("")
                        .to_string()
                })
                .collect();
            let joined = messages.join(", ");
            let message = if joined.is_empty() {
                "Validation error".to_string()
            } else {
                joined
            };
            (ApiErrorKind::Validation(messages), message)
        }
        Some(Value::Object(detail)) => {
            let message = match detail.get("message").and_then(Value::as_str) {
                Some(m) if !m.is_empty() => m.to_string(),
                _ => Value::Object(detail.clone()).to_string(),
            };
            (ApiErrorKind::DetailObject(Value::Object(detail.clone())), message)
        }
        _ => match data.get("message").and_then(Value::as_str) {
            Some(m) if !m.is_empty() => (ApiErrorKind::Message, m.to_string()),
            _ => (ApiErrorKind::Unspecified, "Request failed".to_string()),
        },
    };

    Error::Api {
        status,
        kind,
        message,
    }
}
