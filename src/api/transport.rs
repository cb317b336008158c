//! Transport seam between the session layer and the Fluence backend.
//!
//! The store and the action surface only ever see [`ChatTransport`]; the
//! HTTP details (endpoints, cookie session, status mapping) live entirely in
//! [`HttpTransport`]. Tests substitute a scripted implementation.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::error::Error as StdError;
use std::fmt;

use crate::api::{Channel, CreateChannelRequest, LoginRequest, RegisterRequest, SelfResponse, User};

/// Errors produced by the HTTP transport.
#[derive(Debug)]
pub enum TransportError {
    /// The request could not be completed (connection, TLS, timeout, or
    /// response-decoding failure).
    Network(reqwest::Error),

    /// The backend answered with a status the operation does not know how to
    /// interpret.
    Status { status: StatusCode, body: String },
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Network(source) => {
                write!(f, "Request failed: {source}")
            }
            TransportError::Status { status, body } => {
                if body.is_empty() {
                    write!(f, "Server responded with status {status}")
                } else {
                    write!(f, "Server responded with status {status}: {body}")
                }
            }
        }
    }
}

impl StdError for TransportError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            TransportError::Network(source) => Some(source),
            TransportError::Status { .. } => None,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(source: reqwest::Error) -> Self {
        TransportError::Network(source)
    }
}

/// Remote operations the session layer depends on.
///
/// Every method resolves to either a server-confirmed value or a negative
/// confirmation (`None` / `false`); callers commit to the store only on the
/// confirmed branch.
#[async_trait]
pub trait ChatTransport {
    /// Resolve the current session, if any. `Ok(None)` means the backend
    /// recognizes no session for the ambient credentials.
    async fn fetch_auth(&self) -> Result<Option<User>, TransportError>;

    /// Authenticate with credentials. `Ok(None)` means the credentials were
    /// rejected.
    async fn login(&self, email: &str, password: &str) -> Result<Option<User>, TransportError>;

    /// Create an account. `Ok(None)` means the username or email is already
    /// taken. Registering does not establish a session.
    async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, TransportError>;

    /// Invalidate the current session server-side. `Ok(true)` means the
    /// session is gone and local state may be cleared.
    async fn logout(&self) -> Result<bool, TransportError>;

    /// Create a channel on a server. `Ok(None)` means the backend declined;
    /// only `Ok(Some(_))` carries a materialized channel with its
    /// server-assigned id.
    async fn post_channel(
        &self,
        server_id: u64,
        name: &str,
    ) -> Result<Option<Channel>, TransportError>;
}

/// HTTP implementation of [`ChatTransport`] against the Fluence REST surface.
///
/// The backend uses a cookie session, so the client carries a cookie store;
/// a login on this transport authenticates every later call made through it.
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        let client = Client::builder().cookie_store(true).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Decode a self-describing user response, mapping auth-rejection
    /// statuses to `None` and anything else unexpected to an error.
    async fn decode_user(
        response: reqwest::Response,
        rejected: &[StatusCode],
    ) -> Result<Option<User>, TransportError> {
        let status = response.status();
        if status.is_success() {
            let body = response.json::<SelfResponse>().await?;
            return Ok(Some(body.into()));
        }
        if rejected.contains(&status) {
            return Ok(None);
        }
        let body = response.text().await.unwrap_or_default();
        Err(TransportError::Status { status, body })
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn fetch_auth(&self) -> Result<Option<User>, TransportError> {
        let response = self.client.get(self.endpoint("authentication")).send().await?;
        Self::decode_user(response, &[StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN]).await
    }

    async fn login(&self, email: &str, password: &str) -> Result<Option<User>, TransportError> {
        let response = self
            .client
            .post(self.endpoint("login"))
            .json(&LoginRequest { email, password })
            .send()
            .await?;
        Self::decode_user(response, &[StatusCode::UNAUTHORIZED]).await
    }

    async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, TransportError> {
        let response = self
            .client
            .post(self.endpoint("register"))
            .json(&RegisterRequest {
                username,
                email,
                password,
            })
            .send()
            .await?;
        Self::decode_user(response, &[StatusCode::CONFLICT]).await
    }

    async fn logout(&self) -> Result<bool, TransportError> {
        let response = self.client.post(self.endpoint("logout")).send().await?;
        Ok(response.status().is_success())
    }

    async fn post_channel(
        &self,
        server_id: u64,
        name: &str,
    ) -> Result<Option<Channel>, TransportError> {
        let response = self
            .client
            .post(self.endpoint(&format!("servers/{server_id}/channels")))
            .json(&CreateChannelRequest { name })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let channel = response.json::<Channel>().await?;
            return Ok(Some(channel));
        }

        // Any rejection is a negative confirmation from the caller's point of
        // view; keep the status around for diagnostics only.
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(%status, body = %body, server_id, "channel creation declined");
        Ok(None)
    }
}
