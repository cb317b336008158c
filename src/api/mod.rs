use serde::{Deserialize, Serialize};

pub mod transport;

/// The authenticated principal, as confirmed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
}

/// A channel that exists server-side.
///
/// Instances only ever come from backend responses; the client never assigns
/// channel ids, and a stored channel is never edited afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub id: u64,
    pub name: String,
    pub server_id: u64,
}

#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
pub struct CreateChannelRequest<'a> {
    pub name: &'a str,
}

/// Shape of the backend's self-describing responses (`/authentication`,
/// `/login`, `/register`). Fields the client does not track, such as the
/// caller's server memberships, are ignored on deserialization.
#[derive(Debug, Deserialize)]
pub struct SelfResponse {
    pub id: u64,
    pub username: String,
}

impl From<SelfResponse> for User {
    fn from(response: SelfResponse) -> Self {
        User {
            id: response.id,
            username: response.username,
        }
    }
}
