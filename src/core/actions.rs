//! The action surface: every store mutation available to a consumer.
//!
//! All of these follow the same confirm-then-commit shape: issue the remote
//! call, and only on its success branch hand the server-confirmed value to
//! the store. A failed or declined call returns an error and leaves the
//! store exactly as it was; nothing speculative is ever written, so there is
//! no rollback path.

use std::error::Error as StdError;
use std::fmt;

use crate::api::transport::{ChatTransport, TransportError};
use crate::api::{Channel, User};
use crate::core::session::SessionStore;

#[derive(Debug)]
pub enum ActionError {
    /// The remote call completed but the server declined the operation
    /// (wrong credentials, conflicting name, rejected creation).
    Rejected(String),

    /// The remote call itself failed.
    Transport(TransportError),
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionError::Rejected(reason) => write!(f, "{reason}"),
            ActionError::Transport(source) => write!(f, "{source}"),
        }
    }
}

impl StdError for ActionError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ActionError::Rejected(_) => None,
            ActionError::Transport(source) => Some(source),
        }
    }
}

impl From<TransportError> for ActionError {
    fn from(source: TransportError) -> Self {
        ActionError::Transport(source)
    }
}

/// Create a channel on `server_id` and record it once the backend confirms.
///
/// The store only ever sees the materialized channel from the response, never
/// the locally collected name, so a channel without a server-assigned id
/// cannot exist in local state.
pub async fn create_channel(
    transport: &dyn ChatTransport,
    store: &mut SessionStore,
    server_id: u64,
    name: &str,
) -> Result<Channel, ActionError> {
    if name.trim().is_empty() {
        return Err(ActionError::Rejected(
            "channel name must not be empty".to_string(),
        ));
    }
    match transport.post_channel(server_id, name).await? {
        Some(channel) => {
            tracing::debug!(channel_id = channel.id, server_id, "channel created");
            store.add_channel_to_server(server_id, channel.clone());
            Ok(channel)
        }
        None => Err(ActionError::Rejected(format!(
            "the server declined to create channel '{name}'"
        ))),
    }
}

/// Authenticate and record the confirmed user.
pub async fn log_in(
    transport: &dyn ChatTransport,
    store: &mut SessionStore,
    email: &str,
    password: &str,
) -> Result<User, ActionError> {
    match transport.login(email, password).await? {
        Some(user) => {
            store.set_user(Some(user.clone()));
            Ok(user)
        }
        None => Err(ActionError::Rejected(
            "the server rejected these credentials".to_string(),
        )),
    }
}

/// Invalidate the session server-side, then clear the local user.
///
/// An unconfirmed logout leaves the user in place and is surfaced to the
/// caller; no retry happens here.
pub async fn log_out(
    transport: &dyn ChatTransport,
    store: &mut SessionStore,
) -> Result<(), ActionError> {
    if transport.logout().await? {
        store.set_user(None);
        Ok(())
    } else {
        Err(ActionError::Rejected(
            "the server did not confirm the logout".to_string(),
        ))
    }
}

/// Create an account. Registering does not establish a session, so this
/// takes no store: there is nothing to commit locally.
pub async fn register(
    transport: &dyn ChatTransport,
    username: &str,
    email: &str,
    password: &str,
) -> Result<User, ActionError> {
    match transport.register(username, email, password).await? {
        Some(user) => Ok(user),
        None => Err(ActionError::Rejected(format!(
            "an account with that username or email already exists ('{username}', '{email}')"
        ))),
    }
}
