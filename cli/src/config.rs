//! Environment-driven settings for the terminal client.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use tracing::info;

pub const API_URL_VAR: &str = "TODO_API_URL";
pub const SESSION_FILE_VAR: &str = "TODO_SESSION_FILE";
const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub session_file: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `load` passes the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_url = match lookup(API_URL_VAR).filter(|v| !v.is_empty()) {
            Some(url) => url,
            None => {
                info!("{API_URL_VAR} not set, using default: {DEFAULT_API_URL}");
                DEFAULT_API_URL.to_string()
            }
        };
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(anyhow!("{API_URL_VAR} must be an http(s) URL, got {api_url:?}"));
        }

        let session_file = match lookup(SESSION_FILE_VAR).filter(|v| !v.is_empty()) {
            Some(path) => PathBuf::from(path),
            None => default_session_file().context("no data directory for the session file")?,
        };

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            session_file,
        })
    }
}

fn default_session_file() -> Option<PathBuf> {
    ProjectDirs::from("", "", "todo").map(|dirs| dirs.data_dir().join("session.json"))
}
