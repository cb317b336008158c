//! Scripted transport double used by bootstrap and action tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::api::transport::{ChatTransport, TransportError};
use crate::api::{Channel, User};

type Scripted<T> = Mutex<VecDeque<Result<T, TransportError>>>;

/// A [`ChatTransport`] whose responses are queued up front. Each call pops
/// the next scripted response for that operation; running past the script is
/// a test bug and panics.
#[derive(Default)]
pub struct ScriptedTransport {
    auth: Scripted<Option<User>>,
    login: Scripted<Option<User>>,
    register: Scripted<Option<User>>,
    logout: Scripted<bool>,
    post_channel: Scripted<Option<Channel>>,
    post_channel_calls: AtomicUsize,
}

fn status_error(code: u16) -> TransportError {
    TransportError::Status {
        status: StatusCode::from_u16(code).expect("test status code"),
        body: String::new(),
    }
}

fn pop<T>(queue: &Scripted<T>, operation: &str) -> Result<T, TransportError> {
    queue
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| panic!("no scripted response left for {operation}"))
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn auth_ok(self, user: Option<User>) -> Self {
        self.auth.lock().unwrap().push_back(Ok(user));
        self
    }

    pub fn auth_err(self, status: u16) -> Self {
        self.auth.lock().unwrap().push_back(Err(status_error(status)));
        self
    }

    pub fn login_ok(self, user: Option<User>) -> Self {
        self.login.lock().unwrap().push_back(Ok(user));
        self
    }

    pub fn register_ok(self, user: Option<User>) -> Self {
        self.register.lock().unwrap().push_back(Ok(user));
        self
    }

    pub fn logout_ok(self, confirmed: bool) -> Self {
        self.logout.lock().unwrap().push_back(Ok(confirmed));
        self
    }

    pub fn post_channel_ok(self, channel: Option<Channel>) -> Self {
        self.post_channel.lock().unwrap().push_back(Ok(channel));
        self
    }

    pub fn post_channel_err(self, status: u16) -> Self {
        self.post_channel
            .lock()
            .unwrap()
            .push_back(Err(status_error(status)));
        self
    }

    pub fn post_channel_calls(&self) -> usize {
        self.post_channel_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn fetch_auth(&self) -> Result<Option<User>, TransportError> {
        pop(&self.auth, "fetch_auth")
    }

    async fn login(&self, _email: &str, _password: &str) -> Result<Option<User>, TransportError> {
        pop(&self.login, "login")
    }

    async fn register(
        &self,
        _username: &str,
        _email: &str,
        _password: &str,
    ) -> Result<Option<User>, TransportError> {
        pop(&self.register, "register")
    }

    async fn logout(&self) -> Result<bool, TransportError> {
        pop(&self.logout, "logout")
    }

    async fn post_channel(
        &self,
        _server_id: u64,
        _name: &str,
    ) -> Result<Option<Channel>, TransportError> {
        self.post_channel_calls.fetch_add(1, Ordering::SeqCst);
        pop(&self.post_channel, "post_channel")
    }
}
