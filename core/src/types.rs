//! Wire DTOs for the todo API.
//!
//! These mirror the mock-server's schema but are defined independently; the
//! integration tests catch drift between the two crates.

use serde::{Deserialize, Serialize};

/// A single to-do entry owned by the logged-in account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub id: i64,
    pub content: String,
}

/// Body of `POST /register` and `POST /login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Body of `POST /todos` and `PUT /todos/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemContent {
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RegisterReply {
    pub msg: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LoginReply {
    pub access_token: String,
}

/// Error envelope. Servers that fail without one still produce a generic error.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub msg: Option<String>,
}
