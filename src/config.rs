//! Configuration options for the OTTSONLY client

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Configuration options for the OTTSONLY client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Per-request timeout. `None` leaves the HTTP stack's default in place.
    pub request_timeout: Option<Duration>,

    /// Whether the session is written to disk
    pub persist_session: bool,

    /// File the session is persisted to when `persist_session` is set
    pub session_path: Option<PathBuf>,

    /// Value of the `X-Client-Info` header
    pub client_info: String,

    /// How long a cached profile counts as fresh
    pub profile_ttl: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: None,
            persist_session: true,
            session_path: None,
            client_info: format!("ottsonly-rust/{}", env!("CARGO_PKG_VERSION")),
            profile_ttl: Duration::from_secs(30),
        }
    }
}

impl ClientOptions {
    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set whether to persist the session
    pub fn with_persist_session(mut self, value: bool) -> Self {
        self.persist_session = value;
        self
    }

    /// Set the file the session is persisted to
    pub fn with_session_path<P: Into<PathBuf>>(mut self, value: P) -> Self {
        self.session_path = Some(value.into());
        self
    }

    /// Set the `X-Client-Info` header value
    pub fn with_client_info(mut self, value: &str) -> Self {
        self.client_info = value.to_string();
        self
    }

    /// Set the freshness window of the shared profile cache
    pub fn with_profile_ttl(mut self, value: Duration) -> Self {
        self.profile_ttl = value;
        self
    }

    /// Session file used when none was configured
    pub fn resolved_session_path(&self) -> PathBuf {
        self.session_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(".ottsonly").join("session.json"))
    }
}

/// Where the API lives plus the client options
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: Url,
    pub options: ClientOptions,
}

impl ClientConfig {
    /// Creates a new configuration, validating the URL.
    pub fn new(api_url: &str, options: ClientOptions) -> Result<Self> {
        let api_url = Url::parse(api_url)?;
        if api_url.cannot_be_a_base() {
            return Err(Error::config(format!("{} cannot be used as a base URL", api_url)));
        }
        Ok(Self { api_url, options })
    }

    /// Builds the configuration from the environment (and `.env`, if present).
    ///
    /// Reads `OTTSONLY_API_URL`, `OTTSONLY_SESSION_PATH` and
    /// `OTTSONLY_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let api_url =
            std::env::var("OTTSONLY_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let mut options = ClientOptions::default();

        if let Ok(path) = std::env::var("OTTSONLY_SESSION_PATH") {
            options = options.with_session_path(path);
        }

        if let Ok(secs) = std::env::var("OTTSONLY_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                Error::config(format!("OTTSONLY_TIMEOUT_SECS must be a number, got {:?}", secs))
            })?;
            options = options.with_request_timeout(Some(Duration::from_secs(secs)));
        }

        Self::new(&api_url, options)
    }
}
