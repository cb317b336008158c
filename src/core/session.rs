//! The session store: single source of truth for the authenticated user and
//! the channel lists known per server.
//!
//! The store is a plain owned value with exactly one writer; it is handed to
//! whoever drives the session (the CLI here, a UI event loop elsewhere) by
//! dependency passing, never through a global. Mutations are synchronous and
//! never fail; whether a mutation is allowed to happen at all is decided by
//! the action surface in [`crate::core::actions`], which only commits
//! server-confirmed values.
//!
//! Consumers that need to react to changes call [`SessionStore::subscribe`]
//! and receive one [`SessionEvent`] per mutation. Hosts that share the store
//! across tasks must wrap it in `Arc<Mutex<_>>` themselves; the store does
//! not impose the locking.

use std::collections::HashMap;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::api::{Channel, User};

/// Change notification emitted on every store mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The authenticated user was replaced (login, logout, or bootstrap
    /// re-run). Carries the new value, which is `None` after logout.
    UserChanged { user: Option<User> },
    /// A server-confirmed channel was appended to a server's list.
    ChannelAdded { server_id: u64, channel: Channel },
}

/// Snapshot of everything the session layer knows.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub user: Option<User>,
    /// Per-server channel lists in append order. Entries are created lazily
    /// and only ever appended to; nothing in the session layer reorders or
    /// removes them.
    pub servers_by_id: HashMap<u64, Vec<Channel>>,
}

pub struct SessionStore {
    state: SessionState,
    subscribers: Vec<UnboundedSender<SessionEvent>>,
}

impl SessionStore {
    /// Build a store from a resolved bootstrap result. The channel map starts
    /// empty and fills in as servers are visited.
    pub fn new(user: Option<User>) -> Self {
        Self {
            state: SessionState {
                user,
                servers_by_id: HashMap::new(),
            },
            subscribers: Vec::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn user(&self) -> Option<&User> {
        self.state.user.as_ref()
    }

    /// Channels known for a server, in creation order. Empty for servers the
    /// store has not seen a channel for yet.
    pub fn channels_for(&self, server_id: u64) -> &[Channel] {
        self.state
            .servers_by_id
            .get(&server_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Register for change notifications. The returned receiver sees every
    /// mutation made after this call; dropping it unsubscribes.
    pub fn subscribe(&mut self) -> UnboundedReceiver<SessionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Replace the authenticated user unconditionally. Used for both login
    /// confirmation and logout. Channel lists accumulated under the previous
    /// identity are left in place; see the session-store notes in DESIGN.md.
    pub fn set_user(&mut self, user: Option<User>) {
        self.state.user = user.clone();
        self.emit(SessionEvent::UserChanged { user });
    }

    /// Append a server-confirmed channel to a server's list, creating the
    /// entry if absent. No de-duplication: appending the same channel id
    /// twice yields two entries.
    ///
    /// Callers are trusted to pass a channel belonging to `server_id`; a
    /// mismatch is logged but the append still happens under the supplied
    /// key.
    pub fn add_channel_to_server(&mut self, server_id: u64, channel: Channel) {
        if channel.server_id != server_id {
            tracing::warn!(
                channel_id = channel.id,
                channel_server_id = channel.server_id,
                server_id,
                "channel appended under a mismatched server id"
            );
        }
        self.state
            .servers_by_id
            .entry(server_id)
            .or_default()
            .push(channel.clone());
        self.emit(SessionEvent::ChannelAdded { server_id, channel });
    }

    fn emit(&mut self, event: SessionEvent) {
        // Senders whose receiver has been dropped are pruned here.
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: u64, username: &str) -> User {
        User {
            id,
            username: username.to_string(),
        }
    }

    fn channel(id: u64, name: &str, server_id: u64) -> Channel {
        Channel {
            id,
            name: name.to_string(),
            server_id,
        }
    }

    #[test]
    fn new_store_has_no_channels() {
        let store = SessionStore::new(None);
        assert!(store.user().is_none());
        assert!(store.channels_for(42).is_empty());
        assert!(store.state().servers_by_id.is_empty());
    }

    #[test]
    fn set_user_round_trips_including_none() {
        let mut store = SessionStore::new(None);

        store.set_user(Some(user(1, "sam")));
        assert_eq!(store.user(), Some(&user(1, "sam")));

        store.set_user(None);
        assert_eq!(store.user(), None);
    }

    #[test]
    fn add_channel_creates_entry_on_first_append() {
        let mut store = SessionStore::new(None);
        store.add_channel_to_server(42, channel(7, "general", 42));

        assert_eq!(store.channels_for(42), &[channel(7, "general", 42)]);
    }

    #[test]
    fn appends_preserve_call_order_per_server() {
        let mut store = SessionStore::new(None);
        store.add_channel_to_server(1, channel(10, "alpha", 1));
        store.add_channel_to_server(2, channel(11, "other", 2));
        store.add_channel_to_server(1, channel(12, "beta", 1));
        store.add_channel_to_server(1, channel(13, "gamma", 1));

        let names: Vec<&str> = store
            .channels_for(1)
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, ["alpha", "beta", "gamma"]);
        assert_eq!(store.channels_for(2).len(), 1);
    }

    // Documents current behavior: the store does not de-duplicate by id.
    #[test]
    fn duplicate_channel_id_appends_twice() {
        let mut store = SessionStore::new(None);
        store.add_channel_to_server(5, channel(1, "general", 5));
        store.add_channel_to_server(5, channel(1, "general", 5));

        assert_eq!(store.channels_for(5).len(), 2);
    }

    #[test]
    fn logout_keeps_channel_lists() {
        let mut store = SessionStore::new(Some(user(1, "sam")));
        store.add_channel_to_server(42, channel(7, "general", 42));

        store.set_user(None);

        assert_eq!(store.user(), None);
        assert_eq!(store.channels_for(42).len(), 1);
    }

    #[test]
    fn subscribers_see_mutations_in_order() {
        let mut store = SessionStore::new(None);
        let mut rx = store.subscribe();

        store.set_user(Some(user(1, "sam")));
        store.add_channel_to_server(42, channel(7, "general", 42));

        assert_eq!(
            rx.try_recv().unwrap(),
            SessionEvent::UserChanged {
                user: Some(user(1, "sam"))
            }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            SessionEvent::ChannelAdded {
                server_id: 42,
                channel: channel(7, "general", 42)
            }
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn dropped_subscriber_does_not_block_mutations() {
        let mut store = SessionStore::new(None);
        let rx = store.subscribe();
        let mut live = store.subscribe();
        drop(rx);

        store.set_user(Some(user(2, "alex")));

        assert_eq!(
            live.try_recv().unwrap(),
            SessionEvent::UserChanged {
                user: Some(user(2, "alex"))
            }
        );
    }

    #[test]
    fn mismatched_server_id_still_appends_under_supplied_key() {
        let mut store = SessionStore::new(None);
        store.add_channel_to_server(1, channel(9, "stray", 99));

        assert_eq!(store.channels_for(1).len(), 1);
        assert!(store.channels_for(99).is_empty());
    }
}
