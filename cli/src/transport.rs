//! Executes core `HttpRequest`s over the network.

use todo_core::{ApiError, HttpMethod, HttpRequest, HttpResponse};
use tracing::debug;

/// Performs one blocking round-trip. Called from `spawn_blocking`.
pub trait Transport: Send + Sync + 'static {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// ureq-backed transport. No timeouts are configured, and 4xx/5xx
/// responses come back as data so the core decides what they mean.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = request.method.as_str(), path = %request.path, "executing");
        let agent = &self.agent;
        let headers = &request.headers;
        let path = request.path.as_str();

        let result = match (request.method, request.body.as_deref()) {
            (HttpMethod::Get, _) => with_headers(agent.get(path), headers).call(),
            (HttpMethod::Delete, _) => with_headers(agent.delete(path), headers).call(),
            (HttpMethod::Post, Some(body)) => {
                with_headers(agent.post(path), headers).send(body.as_bytes())
            }
            (HttpMethod::Post, None) => with_headers(agent.post(path), headers).send_empty(),
            (HttpMethod::Put, Some(body)) => {
                with_headers(agent.put(path), headers).send(body.as_bytes())
            }
            (HttpMethod::Put, None) => with_headers(agent.put(path), headers).send_empty(),
        };
        let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}
