//! Auth and CRUD lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises every client
//! operation over real HTTP using ureq. The second test drives the
//! `Controller` end to end, executing its `Send` effects synchronously and
//! applying session effects to a `MemorySessionStore`.

use pretty_assertions::assert_eq;
use todo_core::{
    ApiError, Controller, Credentials, Effect, Event, HttpMethod, HttpRequest, HttpResponse,
    MemorySessionStore, Notification, Session, SessionStore, TodoClient,
};

/// Execute an `HttpRequest` using ureq and return an `HttpResponse`.
///
/// 4xx/5xx responses come back as data rather than `Err`, so the core
/// client handles status interpretation.
fn execute(req: HttpRequest) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let mut response = match (req.method, req.body) {
        (HttpMethod::Get, _) => with_headers(agent.get(&req.path), &req.headers).call(),
        (HttpMethod::Delete, _) => with_headers(agent.delete(&req.path), &req.headers).call(),
        (HttpMethod::Post, Some(body)) => {
            with_headers(agent.post(&req.path), &req.headers).send(body.as_bytes())
        }
        (HttpMethod::Post, None) => with_headers(agent.post(&req.path), &req.headers).send_empty(),
        (HttpMethod::Put, Some(body)) => {
            with_headers(agent.put(&req.path), &req.headers).send(body.as_bytes())
        }
        (HttpMethod::Put, None) => with_headers(agent.put(&req.path), &req.headers).send_empty(),
    }
    .expect("HTTP transport error");

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    HttpResponse::new(status, body)
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

/// Start the mock server on a random port and return its base URL.
fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn credentials(username: &str, password: &str) -> Credentials {
    Credentials {
        username: username.to_string(),
        password: password.to_string(),
    }
}

#[test]
fn auth_and_crud_lifecycle() {
    let client = TodoClient::new(&start_server());

    // Step 1: register, then register again.
    let req = client.build_register(&credentials("alice", "pw")).unwrap();
    let msg = client.parse_register(execute(req)).unwrap();
    assert_eq!(msg, "User created successfully");

    let req = client.build_register(&credentials("alice", "pw")).unwrap();
    let err = client.parse_register(execute(req)).unwrap_err();
    assert_eq!(err.server_message(), Some("User already exists"));

    // Step 2: bad password, then a real login.
    let req = client.build_login(&credentials("alice", "nope")).unwrap();
    let err = client.parse_login(execute(req)).unwrap_err();
    assert!(matches!(err, ApiError::Http { status: 401, .. }));
    assert_eq!(err.server_message(), Some("Bad username or password"));

    let req = client.build_login(&credentials("alice", "pw")).unwrap();
    let token = client.parse_login(execute(req)).unwrap();
    let session = Session::new(token, "alice");

    // Step 3: protected call without a session is refused by the server.
    let err = client
        .parse_list_items(execute(client.build_list_items(None)))
        .unwrap_err();
    assert!(matches!(err, ApiError::Http { status: 401, .. }));

    // Step 4: list — empty.
    let req = client.build_list_items(Some(&session));
    assert!(client.parse_list_items(execute(req)).unwrap().is_empty());

    // Step 5: create two.
    let req = client.build_create_item(Some(&session), "a").unwrap();
    let a = client.parse_create_item(execute(req)).unwrap();
    let req = client.build_create_item(Some(&session), "buy milk").unwrap();
    let milk = client.parse_create_item(execute(req)).unwrap();
    assert_eq!(milk.content, "buy milk");

    // Step 6: empty content never leaves the client.
    assert!(matches!(
        client.build_create_item(Some(&session), ""),
        Err(ApiError::EmptyContent)
    ));

    // Step 7: update, then re-fetch to observe it.
    let req = client.build_update_item(Some(&session), a.id, "b").unwrap();
    client.parse_update_item(execute(req)).unwrap();
    let items = client
        .parse_list_items(execute(client.build_list_items(Some(&session))))
        .unwrap();
    let contents: Vec<&str> = items.iter().map(|i| i.content.as_str()).collect();
    assert_eq!(contents, vec!["b", "buy milk"]);

    // Step 8: delete, then the list no longer contains it.
    let req = client.build_delete_item(Some(&session), a.id);
    client.parse_delete_item(execute(req)).unwrap();
    let items = client
        .parse_list_items(execute(client.build_list_items(Some(&session))))
        .unwrap();
    assert_eq!(items, vec![milk]);

    // Step 9: delete again — generic HTTP error with the server's message.
    let req = client.build_delete_item(Some(&session), a.id);
    let err = client.parse_delete_item(execute(req)).unwrap_err();
    assert!(matches!(err, ApiError::Http { status: 404, .. }));
}

/// Feed `event` to the controller, executing every effect inline.
/// Returns the notifications in the order they were produced.
fn drive(controller: &mut Controller, store: &mut MemorySessionStore, event: Event) -> Vec<Notification> {
    let mut notifications = Vec::new();
    let mut pending = vec![event];
    while let Some(event) = pending.pop() {
        for effect in controller.handle(event) {
            match effect {
                Effect::Send {
                    operation,
                    generation,
                    request,
                } => pending.push(Event::Completed {
                    operation,
                    generation,
                    result: Ok(execute(request)),
                }),
                Effect::SaveSession(session) => store.save(&session).unwrap(),
                Effect::ClearSession => store.clear().unwrap(),
                Effect::OpenEditDialog { id, current } => pending.push(Event::EditAnswered {
                    id,
                    content: Some(format!("{current}!")),
                }),
                Effect::Notify(n) => notifications.push(n),
            }
        }
    }
    notifications
}

#[test]
fn controller_session_lifecycle() {
    let base = start_server();
    let mut store = MemorySessionStore::default();
    let mut controller = Controller::new(TodoClient::new(&base));

    // Register through the form.
    let stored = store.load().unwrap();
    drive(&mut controller, &mut store, Event::Started(stored));
    drive(&mut controller, &mut store, Event::ToggleAuthMode);
    drive(&mut controller, &mut store, Event::UsernameChanged("alice".to_string()));
    drive(&mut controller, &mut store, Event::PasswordChanged("pw".to_string()));
    let notes = drive(&mut controller, &mut store, Event::SubmitAuth);
    assert_eq!(notes, vec![Notification::success("User created successfully")]);

    // Log in; the session is persisted and the (empty) list is fetched.
    drive(&mut controller, &mut store, Event::PasswordChanged("pw".to_string()));
    let notes = drive(&mut controller, &mut store, Event::SubmitAuth);
    assert_eq!(notes, vec![Notification::success("Login successful")]);
    let saved = store.load().unwrap().expect("session saved");
    assert_eq!(saved.display_name, "alice");
    assert!(controller.is_authenticated());
    assert!(controller.items().is_empty());

    // Create, edit, delete.
    drive(&mut controller, &mut store, Event::InputChanged("a".to_string()));
    drive(&mut controller, &mut store, Event::SubmitCreate);
    drive(&mut controller, &mut store, Event::InputChanged("buy milk".to_string()));
    drive(&mut controller, &mut store, Event::SubmitCreate);
    let ids: Vec<i64> = controller.items().iter().map(|i| i.id).collect();
    assert_eq!(ids.len(), 2);

    let notes = drive(&mut controller, &mut store, Event::EditRequested(ids[0]));
    assert_eq!(notes, vec![Notification::success("Todo updated successfully")]);
    assert_eq!(controller.items()[0].content, "a!");

    let notes = drive(&mut controller, &mut store, Event::DeleteRequested(ids[0]));
    assert_eq!(notes, vec![Notification::success("Todo deleted successfully")]);
    assert!(controller.items().iter().all(|i| i.id != ids[0]));
    assert!(!controller.loading());

    // A fresh controller resumes from the stored session.
    let mut resumed = Controller::new(TodoClient::new(&base));
    let stored = store.load().unwrap();
    assert!(stored.is_some());
    drive(&mut resumed, &mut store, Event::Started(stored));
    assert!(resumed.is_authenticated());
    assert_eq!(resumed.items(), controller.items());

    // Logout clears storage and the list.
    drive(&mut resumed, &mut store, Event::Logout);
    assert!(store.load().unwrap().is_none());
    assert!(resumed.items().is_empty());
}
