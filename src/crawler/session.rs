//! Per-worker HTTP session
//!
//! Each worker owns one `Session`, including its own connection pool and
//! cookie jar; sessions are never shared between workers. A session is
//! released when it is dropped, which covers normal completion, errors
//! propagated with `?`, panics and task abort.

use crate::config::UserAgentConfig;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: Url,
        /// Page body content
        body: String,
    },

    /// Server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// Human-readable reason for a failed fetch
    pub fn failure_reason(&self) -> Option<String> {
        match self {
            Self::Success { .. } => None,
            Self::HttpError { status_code } => Some(format!("HTTP {}", status_code)),
            Self::NetworkError { error } => Some(error.clone()),
        }
    }
}

/// Formats the user agent string: `CrawlerName/Version (+ContactURL; ContactEmail)`
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    )
}

/// Builds an HTTP client with proper configuration
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(config))
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10).min(timeout))
        .cookie_store(true)
        .gzip(true)
        .brotli(true)
        .build()
}

/// A worker's private browsing session
pub struct Session {
    label: String,
    client: Client,
}

impl Session {
    /// Opens a session; `label` names its owner in log output
    pub fn open(
        label: impl Into<String>,
        config: &UserAgentConfig,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let label = label.into();
        let client = build_http_client(config, timeout)?;
        tracing::debug!("{}: session opened", label);
        Ok(Self { label, client })
    }

    /// Navigates to `url` and returns the page body
    ///
    /// No retries are attempted; every failure is reported once.
    pub async fn fetch(&self, url: &Url) -> FetchResult {
        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => return classify_network_error(&e),
        };

        let status = response.status();
        if !status.is_success() {
            return FetchResult::HttpError {
                status_code: status.as_u16(),
            };
        }

        let final_url = response.url().clone();
        match response.text().await {
            Ok(body) => FetchResult::Success { final_url, body },
            Err(e) => FetchResult::NetworkError {
                error: e.to_string(),
            },
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        tracing::debug!("{}: session closed", self.label);
    }
}

fn classify_network_error(e: &reqwest::Error) -> FetchResult {
    let error = if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else {
        e.to_string()
    };
    FetchResult::NetworkError { error }
}
