//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only a `base_url`. Each operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method that
//! consumes an `HttpResponse`; the host executes the round-trip in between.
//! Protected calls take the `Session` explicitly and attach its token as a
//! bearer credential when one is supplied. A missing session is not
//! rejected locally: the server answers 401 and that flows through the
//! ordinary error path.

use tracing::debug;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::session::Session;
use crate::types::{Credentials, ErrorBody, Item, ItemContent, LoginReply, RegisterReply};

/// Synchronous, stateless client for the todo API.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_register(&self, credentials: &Credentials) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/register", None, credentials)
    }

    pub fn build_login(&self, credentials: &Credentials) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/login", None, credentials)
    }

    pub fn build_list_items(&self, session: Option<&Session>) -> HttpRequest {
        self.request(HttpMethod::Get, "/todos", session)
    }

    /// Fails with `ApiError::EmptyContent` before building anything if
    /// `content` is empty.
    pub fn build_create_item(
        &self,
        session: Option<&Session>,
        content: &str,
    ) -> Result<HttpRequest, ApiError> {
        let body = item_content(content)?;
        self.json_request(HttpMethod::Post, "/todos", session, &body)
    }

    pub fn build_update_item(
        &self,
        session: Option<&Session>,
        id: i64,
        content: &str,
    ) -> Result<HttpRequest, ApiError> {
        let body = item_content(content)?;
        self.json_request(HttpMethod::Put, &format!("/todos/{id}"), session, &body)
    }

    pub fn build_delete_item(&self, session: Option<&Session>, id: i64) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("/todos/{id}"), session)
    }

    /// Returns the server's confirmation message.
    pub fn parse_register(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_status(&response)?;
        let reply: RegisterReply = decode(&response.body)?;
        Ok(reply.msg)
    }

    /// Returns the access token.
    pub fn parse_login(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_status(&response)?;
        let reply: LoginReply = decode(&response.body)?;
        if reply.access_token.is_empty() {
            return Err(ApiError::Deserialization("empty access_token".to_string()));
        }
        Ok(reply.access_token)
    }

    /// Items in server order.
    pub fn parse_list_items(&self, response: HttpResponse) -> Result<Vec<Item>, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    pub fn parse_create_item(&self, response: HttpResponse) -> Result<Item, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    /// The body is ignored; callers re-fetch the list.
    pub fn parse_update_item(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    pub fn parse_delete_item(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    fn request(&self, method: HttpMethod, path: &str, session: Option<&Session>) -> HttpRequest {
        let mut headers = Vec::new();
        if let Some(session) = session {
            headers.push(("authorization".to_string(), session.bearer()));
        }
        debug!(method = method.as_str(), path, authenticated = session.is_some(), "building request");
        HttpRequest {
            method,
            path: format!("{}{path}", self.base_url),
            headers,
            body: None,
        }
    }

    fn json_request<T: serde::Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        session: Option<&Session>,
        body: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let mut request = self.request(method, path, session);
        request
            .headers
            .insert(0, ("content-type".to_string(), "application/json".to_string()));
        request.body = Some(body);
        Ok(request)
    }
}

fn item_content(content: &str) -> Result<ItemContent, ApiError> {
    if content.is_empty() {
        return Err(ApiError::EmptyContent);
    }
    Ok(ItemContent {
        content: content.to_string(),
    })
}

fn decode<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Every non-2xx status becomes `ApiError::Http`, keeping the body's `msg`
/// when it has one.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let message = serde_json::from_str::<ErrorBody>(&response.body)
        .ok()
        .and_then(|body| body.msg);
    Err(ApiError::Http {
        status: response.status,
        message,
    })
}
