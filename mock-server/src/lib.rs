use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{FromRequestParts, Path, State},
    http::{header, request::Parts, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: i64,
    pub content: String,
}

#[derive(Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct TodoContent {
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
    pub msg: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
}

#[derive(Default)]
pub struct Store {
    passwords: HashMap<String, String>,
    tokens: HashMap<String, String>,
    // (owner, todo) in creation order.
    todos: Vec<(String, Todo)>,
    next_id: i64,
}

pub type Db = Arc<RwLock<Store>>;

type Failure = (StatusCode, Json<Message>);

fn failure(status: StatusCode, msg: &str) -> Failure {
    (status, Json(Message { msg: msg.to_string() }))
}

/// Username behind a valid `Authorization: Bearer <token>` header.
pub struct AuthUser(pub String);

impl FromRequestParts<Db> for AuthUser {
    type Rejection = Failure;

    async fn from_request_parts(parts: &mut Parts, db: &Db) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| failure(StatusCode::UNAUTHORIZED, "Missing Authorization Header"))?;
        let store = db.read().await;
        store
            .tokens
            .get(token)
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| failure(StatusCode::UNAUTHORIZED, "Invalid token"))
    }
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{id}", put(update_todo).delete(delete_todo))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn register(
    State(db): State<Db>,
    Json(input): Json<Credentials>,
) -> Result<(StatusCode, Json<Message>), Failure> {
    if input.username.is_empty() || input.password.is_empty() {
        return Err(failure(StatusCode::BAD_REQUEST, "Username and password are required"));
    }
    let mut store = db.write().await;
    if store.passwords.contains_key(&input.username) {
        return Err(failure(StatusCode::BAD_REQUEST, "User already exists"));
    }
    info!(user = %input.username, "registered");
    store.passwords.insert(input.username, input.password);
    Ok((
        StatusCode::CREATED,
        Json(Message {
            msg: "User created successfully".to_string(),
        }),
    ))
}

async fn login(
    State(db): State<Db>,
    Json(input): Json<Credentials>,
) -> Result<Json<AccessToken>, Failure> {
    let mut store = db.write().await;
    if store.passwords.get(&input.username) != Some(&input.password) {
        info!(user = %input.username, "login rejected");
        return Err(failure(StatusCode::UNAUTHORIZED, "Bad username or password"));
    }
    let token = Uuid::new_v4().simple().to_string();
    info!(user = %input.username, "logged in");
    store.tokens.insert(token.clone(), input.username);
    Ok(Json(AccessToken { access_token: token }))
}

async fn list_todos(State(db): State<Db>, AuthUser(user): AuthUser) -> Json<Vec<Todo>> {
    let store = db.read().await;
    let todos: Vec<Todo> = store
        .todos
        .iter()
        .filter(|(owner, _)| *owner == user)
        .map(|(_, todo)| todo.clone())
        .collect();
    debug!(%user, count = todos.len(), "listed todos");
    Json(todos)
}

async fn create_todo(
    State(db): State<Db>,
    AuthUser(user): AuthUser,
    Json(input): Json<TodoContent>,
) -> Result<(StatusCode, Json<Todo>), Failure> {
    if input.content.is_empty() {
        return Err(failure(StatusCode::BAD_REQUEST, "Content is required"));
    }
    let mut store = db.write().await;
    store.next_id += 1;
    let todo = Todo {
        id: store.next_id,
        content: input.content,
    };
    debug!(%user, id = todo.id, "created todo");
    store.todos.push((user, todo.clone()));
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn update_todo(
    State(db): State<Db>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
    Json(input): Json<TodoContent>,
) -> Result<Json<Todo>, Failure> {
    if input.content.is_empty() {
        return Err(failure(StatusCode::BAD_REQUEST, "Content is required"));
    }
    let mut store = db.write().await;
    let (_, todo) = store
        .todos
        .iter_mut()
        .find(|(owner, todo)| *owner == user && todo.id == id)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Todo not found"))?;
    todo.content = input.content;
    debug!(%user, id, "updated todo");
    Ok(Json(todo.clone()))
}

async fn delete_todo(
    State(db): State<Db>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, Failure> {
    let mut store = db.write().await;
    let position = store
        .todos
        .iter()
        .position(|(owner, todo)| *owner == user && todo.id == id)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Todo not found"))?;
    store.todos.remove(position);
    debug!(%user, id, "deleted todo");
    Ok(StatusCode::NO_CONTENT)
}
