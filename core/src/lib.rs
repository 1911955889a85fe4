//! Sans-IO client core for the todo service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). On top of that sits the
//! `Controller`, a state machine for the login form and the item list that
//! turns user actions and finished requests into `Effect`s for the host.
//!
//! # Design
//! - `TodoClient` is stateless; the `Session` is passed to each call.
//! - Each operation is split into `build_*` and `parse_*`, so the I/O
//!   boundary is explicit.
//! - `SessionStore` abstracts durable storage of the token and user name.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod controller;
pub mod error;
pub mod http;
pub mod session;
pub mod types;

pub use client::TodoClient;
pub use controller::{
    AuthForm, AuthMode, Controller, Effect, Event, Notification, NotificationLevel, Operation,
    View,
};
pub use error::{ApiError, SessionError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionStore};
pub use types::{Credentials, Item, ItemContent};
