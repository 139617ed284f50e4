use thiserror::Error;

/// One line of REPL input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login,
    Signup,
    Logout,
    WhoAmI,
    Sessions,
    /// Start a session whose first message is the argument
    New(String),
    Open(String),
    Refresh,
    Help,
    Quit,
    /// Plain text for the open session
    Send(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command: {0} (try /help)")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

impl Command {
    /// Parse a trimmed, non-empty input line
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        if line == "exit" || line == "quit" {
            return Ok(Command::Quit);
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Ok(Command::Send(line.to_string()));
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };
        let command = match name {
            "login" => Command::Login,
            "signup" => Command::Signup,
            "logout" => Command::Logout,
            "whoami" => Command::WhoAmI,
            "sessions" => Command::Sessions,
            "refresh" => Command::Refresh,
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            "new" if arg.is_empty() => return Err(CommandError::Usage("/new <message>")),
            "new" => Command::New(arg.to_string()),
            "open" if arg.is_empty() => return Err(CommandError::Usage("/open <session-id>")),
            "open" => Command::Open(arg.to_string()),
            other => return Err(CommandError::Unknown(format!("/{}", other))),
        };
        Ok(command)
    }
}

pub const HELP: &[(&str, &str)] = &[
    ("/login", "Log in with email and password"),
    ("/signup", "Create an account"),
    ("/logout", "Log out"),
    ("/whoami", "Show who is signed in"),
    ("/sessions", "List your sessions"),
    ("/new <message>", "Start a new chat with a first message"),
    ("/open <id>", "Open an existing chat"),
    ("/refresh", "Reload the open chat from the server"),
    ("/help", "Show this help"),
    ("/quit", "Exit"),
];
