//! HipChat API connectivity check.
//!
//! Implements [`ConnectivityChecker`] with a single request against the
//! HipChat v2 API:
//!
//! ```text
//! GET {apiUrl}room?auth_test=true
//! Authorization: Bearer {apiToken}
//! ```
//!
//! With `auth_test=true` the API validates the token without running the
//! call and answers `202 Accepted`.  Any 2xx counts as authenticated;
//! anything else, a missing token, an unparsable URL or a transport failure
//! counts as not authenticated.
//!
//! No timeout is configured on the client; the caller bounds the check with
//! [`check_with_timeout`](crate::application::check_connectivity::check_with_timeout).

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::application::check_connectivity::{ApiEndpoint, ConnectivityChecker};

/// Error type for the HipChat connectivity probe.
#[derive(Debug, Error)]
pub enum ConnectivityError {
    #[error("no API token configured")]
    MissingToken,

    #[error("invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("request to HipChat API failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// [`ConnectivityChecker`] backed by the HipChat REST API.
#[derive(Debug, Clone)]
pub struct HipChatConnectivityChecker {
    client: reqwest::Client,
}

impl HipChatConnectivityChecker {
    /// # Errors
    ///
    /// Returns [`ConnectivityError::Transport`] if the HTTP client cannot be
    /// built (for example when the TLS backend fails to initialise).
    pub fn new() -> Result<Self, ConnectivityError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("hipchat-relay/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Sends the auth test request and returns the response status.
    ///
    /// # Errors
    ///
    /// See [`ConnectivityError`].
    pub async fn probe(&self, endpoint: &ApiEndpoint) -> Result<StatusCode, ConnectivityError> {
        let token = endpoint
            .token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or(ConnectivityError::MissingToken)?;
        let url = auth_test_url(&endpoint.url)?;
        debug!(%url, "testing HipChat authentication");

        let response = self.client.get(url).bearer_auth(token).send().await?;
        Ok(response.status())
    }
}

#[async_trait]
impl ConnectivityChecker for HipChatConnectivityChecker {
    async fn test_authentication(&self, endpoint: ApiEndpoint) -> bool {
        match self.probe(&endpoint).await {
            Ok(status) => {
                debug!(%status, "HipChat authentication response");
                status.is_success()
            }
            Err(e) => {
                warn!("HipChat authentication test failed: {e}");
                false
            }
        }
    }
}

/// `{api_url}room?auth_test=true`, treating `api_url` as a directory.
fn auth_test_url(api_url: &str) -> Result<Url, ConnectivityError> {
    let mut base = Url::parse(api_url)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    let mut url = base.join("room")?;
    url.query_pairs_mut().append_pair("auth_test", "true");
    Ok(url)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
