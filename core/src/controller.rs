//! View state machine for the todo client.
//!
//! # Design
//! `Controller::handle` is the only way state changes. It takes an `Event`
//! (a user action or a finished request) and returns the `Effect`s the host
//! must carry out: send a request, persist or clear the session, open the
//! edit dialog, show a notification. The controller never performs I/O, so
//! every transition is testable by feeding events and inspecting effects.
//!
//! Requests are never de-duplicated. `loading` stays true while at least one
//! request is in flight.
//!
//! Every request carries the session generation it was issued under. Logging
//! in, resuming and logging out each start a new generation, and a completion
//! from an older one only releases its share of the loading flag.

use tracing::{debug, info, warn};

use crate::client::TodoClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::session::Session;
use crate::types::{Credentials, Item};

/// Which form the unauthenticated view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

impl AuthMode {
    pub fn toggled(self) -> Self {
        match self {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Unauthenticated(AuthForm),
    Authenticated { display_name: String },
}

/// Tags an in-flight request so its response can be routed back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Register,
    Login { username: String },
    ListItems,
    CreateItem,
    UpdateItem(i64),
    DeleteItem(i64),
}

impl Operation {
    /// Prefix for the failure notification.
    fn failure_notice(&self) -> &'static str {
        match self {
            Operation::Register | Operation::Login { .. } => "Error during authentication",
            Operation::ListItems => "Error fetching todos",
            Operation::CreateItem => "Error adding todo",
            Operation::UpdateItem(_) => "Error updating todo",
            Operation::DeleteItem(_) => "Error deleting todo",
        }
    }

    fn needs_session(&self) -> bool {
        !matches!(self, Operation::Register | Operation::Login { .. })
    }
}

#[derive(Debug)]
pub enum Event {
    /// Startup, with whatever the session store held.
    Started(Option<Session>),
    ToggleAuthMode,
    UsernameChanged(String),
    PasswordChanged(String),
    SubmitAuth,
    InputChanged(String),
    SubmitCreate,
    EditRequested(i64),
    /// The edit dialog closed. `None` means it was dismissed.
    EditAnswered { id: i64, content: Option<String> },
    DeleteRequested(i64),
    Logout,
    /// A request finished. `generation` is echoed from `Effect::Send`.
    Completed {
        operation: Operation,
        generation: u64,
        result: Result<HttpResponse, ApiError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Execute `request` and feed the outcome back as `Event::Completed`
    /// with the same `operation` and `generation`.
    Send {
        operation: Operation,
        generation: u64,
        request: HttpRequest,
    },
    SaveSession(Session),
    ClearSession,
    /// Ask the user for new text; answer with `Event::EditAnswered`.
    OpenEditDialog { id: i64, current: String },
    Notify(Notification),
}

const EMPTY_CONTENT_NOTICE: &str = "Empty todos cannot be saved";
const MISSING_CREDENTIALS_NOTICE: &str = "Username and password are required";
const UNKNOWN_ITEM_NOTICE: &str = "Todo not found";

pub struct Controller {
    client: TodoClient,
    session: Option<Session>,
    view: View,
    items: Vec<Item>,
    input: String,
    in_flight: usize,
    generation: u64,
}

impl Controller {
    pub fn new(client: TodoClient) -> Self {
        Self {
            client,
            session: None,
            view: View::Unauthenticated(AuthForm::default()),
            items: Vec::new(),
            input: String::new(),
            in_flight: 0,
            generation: 0,
        }
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.view, View::Authenticated { .. })
    }

    pub fn handle(&mut self, event: Event) -> Vec<Effect> {
        let mut effects = Vec::new();
        match event {
            Event::Started(stored) => self.start(stored, &mut effects),
            Event::ToggleAuthMode => {
                if let View::Unauthenticated(form) = &mut self.view {
                    form.mode = form.mode.toggled();
                }
            }
            Event::UsernameChanged(username) => {
                if let View::Unauthenticated(form) = &mut self.view {
                    form.username = username;
                }
            }
            Event::PasswordChanged(password) => {
                if let View::Unauthenticated(form) = &mut self.view {
                    form.password = password;
                }
            }
            Event::SubmitAuth => self.submit_auth(&mut effects),
            Event::InputChanged(text) => {
                if self.is_authenticated() {
                    self.input = text;
                }
            }
            Event::SubmitCreate => self.submit_create(&mut effects),
            Event::EditRequested(id) => self.request_edit(id, &mut effects),
            Event::EditAnswered { id, content } => self.submit_edit(id, content, &mut effects),
            Event::DeleteRequested(id) => self.submit_delete(id, &mut effects),
            Event::Logout => self.logout(&mut effects),
            Event::Completed {
                operation,
                generation,
                result,
            } => self.complete(operation, generation, result, &mut effects),
        }
        effects
    }

    fn start(&mut self, stored: Option<Session>, effects: &mut Vec<Effect>) {
        let Some(session) = stored else {
            debug!("no stored session");
            return;
        };
        info!(user = %session.display_name, "resuming stored session");
        self.authenticate(session, effects);
    }

    fn authenticate(&mut self, session: Session, effects: &mut Vec<Effect>) {
        self.generation += 1;
        self.view = View::Authenticated {
            display_name: session.display_name.clone(),
        };
        self.session = Some(session);
        self.fetch_items(effects);
    }

    fn submit_auth(&mut self, effects: &mut Vec<Effect>) {
        let View::Unauthenticated(form) = &self.view else {
            debug!("auth submitted while authenticated, ignoring");
            return;
        };
        if form.username.is_empty() || form.password.is_empty() {
            effects.push(Effect::Notify(Notification::error(MISSING_CREDENTIALS_NOTICE)));
            return;
        }
        let credentials = Credentials {
            username: form.username.clone(),
            password: form.password.clone(),
        };
        let (operation, built) = match form.mode {
            AuthMode::Register => (Operation::Register, self.client.build_register(&credentials)),
            AuthMode::Login => (
                Operation::Login {
                    username: credentials.username.clone(),
                },
                self.client.build_login(&credentials),
            ),
        };
        match built {
            Ok(request) => self.send(operation, request, effects),
            Err(e) => self.fail(&operation, e, effects),
        }
    }

    fn submit_create(&mut self, effects: &mut Vec<Effect>) {
        if !self.is_authenticated() {
            return;
        }
        match self.client.build_create_item(self.session.as_ref(), &self.input) {
            Ok(request) => self.send(Operation::CreateItem, request, effects),
            Err(ApiError::EmptyContent) => {
                effects.push(Effect::Notify(Notification::error(EMPTY_CONTENT_NOTICE)))
            }
            Err(e) => self.fail(&Operation::CreateItem, e, effects),
        }
    }

    fn request_edit(&mut self, id: i64, effects: &mut Vec<Effect>) {
        if !self.is_authenticated() {
            return;
        }
        match self.items.iter().find(|item| item.id == id) {
            Some(item) => effects.push(Effect::OpenEditDialog {
                id,
                current: item.content.clone(),
            }),
            None => {
                debug!(id, "edit requested for unknown item");
                effects.push(Effect::Notify(Notification::error(UNKNOWN_ITEM_NOTICE)));
            }
        }
    }

    fn submit_edit(&mut self, id: i64, content: Option<String>, effects: &mut Vec<Effect>) {
        if !self.is_authenticated() {
            return;
        }
        let content = content.unwrap_or_default();
        match self.client.build_update_item(self.session.as_ref(), id, &content) {
            Ok(request) => self.send(Operation::UpdateItem(id), request, effects),
            Err(ApiError::EmptyContent) => {
                effects.push(Effect::Notify(Notification::error(EMPTY_CONTENT_NOTICE)))
            }
            Err(e) => self.fail(&Operation::UpdateItem(id), e, effects),
        }
    }

    fn submit_delete(&mut self, id: i64, effects: &mut Vec<Effect>) {
        if !self.is_authenticated() {
            return;
        }
        let request = self.client.build_delete_item(self.session.as_ref(), id);
        self.send(Operation::DeleteItem(id), request, effects);
    }

    fn logout(&mut self, effects: &mut Vec<Effect>) {
        info!("logging out");
        self.generation += 1;
        self.session = None;
        self.items.clear();
        self.input.clear();
        self.view = View::Unauthenticated(AuthForm::default());
        effects.push(Effect::ClearSession);
        effects.push(Effect::Notify(Notification::success("Logged out successfully")));
    }

    fn fetch_items(&mut self, effects: &mut Vec<Effect>) {
        let request = self.client.build_list_items(self.session.as_ref());
        self.send(Operation::ListItems, request, effects);
    }

    fn send(&mut self, operation: Operation, request: HttpRequest, effects: &mut Vec<Effect>) {
        self.in_flight += 1;
        debug!(?operation, in_flight = self.in_flight, "request issued");
        effects.push(Effect::Send {
            operation,
            generation: self.generation,
            request,
        });
    }

    fn fail(&self, operation: &Operation, error: ApiError, effects: &mut Vec<Effect>) {
        warn!(?operation, %error, "request failed");
        let notice = operation.failure_notice();
        let message = match error.server_message() {
            // Auth failures show the server's text verbatim.
            Some(msg) if !operation.needs_session() => msg.to_string(),
            Some(msg) => format!("{notice}: {msg}"),
            None => notice.to_string(),
        };
        effects.push(Effect::Notify(Notification::error(message)));
    }

    fn complete(
        &mut self,
        operation: Operation,
        generation: u64,
        result: Result<HttpResponse, ApiError>,
        effects: &mut Vec<Effect>,
    ) {
        self.in_flight = self.in_flight.saturating_sub(1);
        debug!(?operation, in_flight = self.in_flight, "request completed");

        if generation != self.generation {
            debug!(?operation, generation, "dropping response from an earlier session");
            return;
        }
        if !operation.needs_session() {
            if let View::Unauthenticated(form) = &mut self.view {
                form.password.clear();
            }
        }

        let response = match result {
            Ok(response) => response,
            Err(e) => return self.fail(&operation, e, effects),
        };

        match operation {
            Operation::Register => {
                match self.client.parse_register(response) {
                    Ok(msg) => {
                        if let View::Unauthenticated(form) = &mut self.view {
                            form.mode = AuthMode::Login;
                        }
                        effects.push(Effect::Notify(Notification::success(msg)));
                    }
                    Err(e) => self.fail(&Operation::Register, e, effects),
                }
            }
            Operation::Login { username } => {
                match self.client.parse_login(response) {
                    Ok(token) => {
                        let session = Session::new(token, username);
                        info!(user = %session.display_name, "logged in");
                        effects.push(Effect::SaveSession(session.clone()));
                        self.authenticate(session, effects);
                        effects.push(Effect::Notify(Notification::success("Login successful")));
                    }
                    Err(e) => self.fail(&Operation::Login { username }, e, effects),
                }
            }
            Operation::ListItems => match self.client.parse_list_items(response) {
                Ok(items) => self.items = items,
                Err(e) => self.fail(&Operation::ListItems, e, effects),
            },
            Operation::CreateItem => match self.client.parse_create_item(response) {
                Ok(item) => {
                    self.items.push(item);
                    self.input.clear();
                    effects.push(Effect::Notify(Notification::success("Todo added successfully")));
                }
                Err(e) => self.fail(&Operation::CreateItem, e, effects),
            },
            Operation::UpdateItem(id) => match self.client.parse_update_item(response) {
                Ok(()) => {
                    self.fetch_items(effects);
                    effects.push(Effect::Notify(Notification::success("Todo updated successfully")));
                }
                Err(e) => self.fail(&Operation::UpdateItem(id), e, effects),
            },
            Operation::DeleteItem(id) => match self.client.parse_delete_item(response) {
                Ok(()) => {
                    self.fetch_items(effects);
                    effects.push(Effect::Notify(Notification::success("Todo deleted successfully")));
                }
                Err(e) => self.fail(&Operation::DeleteItem(id), e, effects),
            },
        }
    }
}
