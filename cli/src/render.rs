//! Text rendering of the controller state and notifications.

use std::fmt::Write;

use todo_core::{AuthMode, Controller, Notification, NotificationLevel, View};

pub fn view(controller: &Controller) -> String {
    let mut out = String::new();
    match controller.view() {
        View::Unauthenticated(form) => {
            let (title, hint) = match form.mode {
                AuthMode::Login => ("Login", "Need to register? type `switch`"),
                AuthMode::Register => ("Register", "Already have an account? type `switch`"),
            };
            let _ = writeln!(out, "== {title} ==");
            let _ = writeln!(out, "Enter `<username> <password>`. {hint}.");
        }
        View::Authenticated { display_name } => {
            let _ = writeln!(out, "Welcome, {display_name} !");
            let _ = writeln!(out, "== Todo list ==");
            if controller.loading() {
                let _ = writeln!(out, "Loading...");
            }
            if controller.items().is_empty() {
                let _ = writeln!(out, "  (no todos)");
            }
            for item in controller.items() {
                let _ = writeln!(out, "  [{}] {}", item.id, item.content);
            }
            let _ = writeln!(out, "add <text> | edit <id> | delete <id> | logout | quit");
        }
    }
    out
}

pub fn notification(notification: &Notification) -> String {
    let mark = match notification.level {
        NotificationLevel::Success => "ok",
        NotificationLevel::Error => "error",
    };
    format!("[{mark}] {}", notification.message)
}

pub fn help(authenticated: bool) -> &'static str {
    if authenticated {
        "commands: add <text>, edit <id>, delete <id>, logout, quit"
    } else {
        "commands: <username> <password>, switch, quit"
    }
}

#[cfg(test)]
mod tests {
    use todo_core::{Effect, Event, HttpResponse, Operation, Session, TodoClient};

    use super::*;

    #[test]
    fn login_form() {
        let c = Controller::new(TodoClient::new("http://api.test"));
        let text = view(&c);
        assert!(text.starts_with("== Login =="));
        assert!(text.contains("Need to register?"));
    }

    #[test]
    fn register_form() {
        let mut c = Controller::new(TodoClient::new("http://api.test"));
        c.handle(Event::ToggleAuthMode);
        assert!(view(&c).starts_with("== Register =="));
    }

    #[test]
    fn list_with_spinner_then_items() {
        let mut c = Controller::new(TodoClient::new("http://api.test"));
        let effects = c.handle(Event::Started(Some(Session::new("tok1", "alice"))));
        let text = view(&c);
        assert!(text.contains("Welcome, alice !"));
        assert!(text.contains("Loading..."));

        let Some(Effect::Send { generation, .. }) = effects.into_iter().next() else {
            panic!("expected the initial fetch")
        };
        c.handle(Event::Completed {
            operation: Operation::ListItems,
            generation,
            result: Ok(HttpResponse::new(200, r#"[{"id":1,"content":"a"}]"#)),
        });
        let text = view(&c);
        assert!(!text.contains("Loading..."));
        assert!(text.contains("  [1] a"));
    }

    #[test]
    fn notification_marks_level() {
        assert_eq!(notification(&Notification::error("nope")), "[error] nope");
        assert_eq!(notification(&Notification::success("yes")), "[ok] yes");
    }
}
