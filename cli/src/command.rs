//! Parsing of terminal input lines into user actions.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Flip between the login and register forms.
    Switch,
    Credentials { username: String, password: String },
    Add(String),
    Edit(i64),
    Delete(i64),
    Logout,
    Help,
    Quit,
    Invalid(String),
}

/// Parses a line in the context of the current view.
///
/// On the auth form any line that is not a keyword is read as
/// `<username> <password>`.
pub fn parse(line: &str, authenticated: bool) -> Command {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word {
        "quit" | "exit" => return Command::Quit,
        "help" | "?" => return Command::Help,
        _ => {}
    }

    if !authenticated {
        if word == "switch" {
            return Command::Switch;
        }
        return match rest.split_whitespace().collect::<Vec<_>>().as_slice() {
            [password] if !word.is_empty() => Command::Credentials {
                username: word.to_string(),
                password: password.to_string(),
            },
            _ => Command::Invalid("expected `<username> <password>`".to_string()),
        };
    }

    match word {
        "add" => Command::Add(rest.to_string()),
        "edit" => id_arg(rest).map_or_else(Command::Invalid, Command::Edit),
        "delete" | "del" | "rm" => id_arg(rest).map_or_else(Command::Invalid, Command::Delete),
        "logout" => Command::Logout,
        other => Command::Invalid(format!("unknown command `{other}`")),
    }
}

fn id_arg(rest: &str) -> Result<i64, String> {
    rest.parse()
        .map_err(|_| format!("expected a numeric id, got `{rest}`"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_form_reads_credentials() {
        assert_eq!(
            parse("alice pw", false),
            Command::Credentials {
                username: "alice".to_string(),
                password: "pw".to_string()
            }
        );
    }

    #[test]
    fn auth_form_keywords() {
        assert_eq!(parse("switch", false), Command::Switch);
        assert_eq!(parse("quit", false), Command::Quit);
        assert!(matches!(parse("alice", false), Command::Invalid(_)));
        assert!(matches!(parse("a b c", false), Command::Invalid(_)));
    }

    #[test]
    fn add_keeps_inner_spacing() {
        assert_eq!(parse("add buy  oat milk ", true), Command::Add("buy  oat milk".to_string()));
    }

    #[test]
    fn bare_add_is_empty_text() {
        assert_eq!(parse("add", true), Command::Add(String::new()));
    }

    #[test]
    fn edit_and_delete_take_ids() {
        assert_eq!(parse("edit 3", true), Command::Edit(3));
        assert_eq!(parse("rm 4", true), Command::Delete(4));
        assert!(matches!(parse("delete x", true), Command::Invalid(_)));
    }

    #[test]
    fn switch_is_not_a_list_command() {
        assert!(matches!(parse("switch", true), Command::Invalid(_)));
        assert_eq!(parse("logout", true), Command::Logout);
    }
}
