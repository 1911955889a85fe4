//! Terminal host for `todo-core`.
//!
//! Loads settings from the environment, keeps the session in a file, executes
//! requests with ureq, and renders the controller state as plain text.

pub mod app;
pub mod command;
pub mod config;
pub mod dialog;
pub mod render;
pub mod transport;

pub use app::App;
pub use config::Config;
pub use transport::{Transport, UreqTransport};
