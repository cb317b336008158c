//! One-shot session resolution at process start.

use crate::api::transport::ChatTransport;
use crate::core::session::SessionStore;

/// Resolve the current session and build the store from the result.
///
/// Runs once, before any consumer of the store exists; because the store is
/// only constructed from the resolved value, no consumer can ever observe a
/// "still loading" authentication state.
///
/// Bootstrap never fails the process: a transport error degrades to an
/// anonymous session, same as the backend reporting no session.
pub async fn bootstrap_session(transport: &dyn ChatTransport) -> SessionStore {
    let user = match transport.fetch_auth().await {
        Ok(user) => user,
        Err(err) => {
            tracing::debug!(error = %err, "session bootstrap failed; starting anonymous");
            None
        }
    };
    if let Some(user) = &user {
        tracing::debug!(user_id = user.id, username = %user.username, "session resumed");
    }
    SessionStore::new(user)
}
