use anyhow::{Context, Result};
use colored::Colorize;
use rustyline::completion::Completer;
use rustyline::config::{ColorMode, Configurer};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Editor, Helper};
use shopchat_api::{AuthApi, AuthClient, HttpClient, SessionApi, SessionClient};
use shopchat_chat::{AuthState, ChatSessionController, Handoff, SendOutcome};
use shopchat_types::new_session_id;
use std::borrow::Cow::{self, Borrowed, Owned};
use std::io::Stdout;
use std::rc::Rc;

use crate::cli::Cli;
use crate::command::{Command, HELP};
use crate::terminal_view::TerminalView;

/// Line editor helper that can hide what is typed
#[derive(Default)]
struct ShellHelper {
    masking: bool,
}

impl Helper for ShellHelper {}

impl Completer for ShellHelper {
    type Candidate = String;
}

impl Hinter for ShellHelper {
    type Hint = String;
}

impl Validator for ShellHelper {}

impl Highlighter for ShellHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if self.masking {
            Owned("*".repeat(line.chars().count()))
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        self.masking
    }
}

/// Everything one REPL run talks to
struct Shell {
    auth_api: Rc<dyn AuthApi>,
    auth: AuthState,
    handoff: Handoff,
    controller: ChatSessionController,
    view: Rc<TerminalView<Stdout>>,
    editor: Editor<ShellHelper, DefaultHistory>,
}

fn print_error(message: &str) {
    eprintln!("{} {}", "❌".bright_red(), message.red());
}

impl Shell {
    fn new(cli: &Cli) -> Result<Self> {
        let config = cli.api_config();
        let http = HttpClient::new(&config)
            .with_context(|| format!("Invalid backend URL: {}", config.base_url))?;
        println!("{}", format!("Backend: {}", http.base_url()).bright_black());

        let auth_api: Rc<dyn AuthApi> = Rc::new(AuthClient::new(http.clone()));
        let sessions: Rc<dyn SessionApi> = Rc::new(SessionClient::new(http));
        let handoff = Handoff::in_memory();
        let view = Rc::new(TerminalView::new(std::io::stdout()));
        let controller = ChatSessionController::new(sessions, handoff.clone(), view.clone());

        let mut editor: Editor<ShellHelper, DefaultHistory> = Editor::new()?;
        editor.set_helper(Some(ShellHelper::default()));
        // Only command lines go to history, never sub-prompt answers
        editor.set_auto_add_history(false);

        Ok(Self {
            auth: AuthState::new(auth_api.clone()),
            auth_api,
            handoff,
            controller,
            view,
            editor,
        })
    }

    fn prompt(&self) -> String {
        let session = if self.controller.is_mounted() {
            let id = self.controller.session_id();
            format!("[{}]", id.chars().take(8).collect::<String>()).bright_magenta()
        } else {
            "[no chat]".bright_black()
        };
        format!("{} {} ", session, "You:".bright_green().bold())
    }

    /// Read a line for a sub-prompt; `None` when the user gave up
    fn ask(&mut self, label: &str) -> Result<Option<String>> {
        match self.editor.readline(&format!("{} ", label.bright_cyan())) {
            Ok(line) => Ok(Some(line.trim().to_string())),
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Like `ask`, with the typed characters shown as `*`
    fn ask_secret(&mut self, label: &str) -> Result<Option<String>> {
        self.set_masking(true);
        let answer = self.ask(label);
        self.set_masking(false);
        answer
    }

    fn set_masking(&mut self, masking: bool) {
        if let Some(helper) = self.editor.helper_mut() {
            helper.masking = masking;
        }
        // Highlighting, and so masking, only runs when colors are forced
        self.editor
            .set_color_mode(if masking { ColorMode::Forced } else { ColorMode::Enabled });
    }

    async fn login(&self, email: &str, password: &str) {
        if self.auth.login(email, password, print_error).await {
            self.print_identity();
        }
    }

    fn print_identity(&self) {
        match self.auth.current_user() {
            Some(user) => println!(
                "{} Signed in as {} <{}>",
                "👤".bright_cyan(),
                user.full_name.bold(),
                user.email
            ),
            None => println!("{} Not signed in", "👤".bright_black()),
        }
    }

    async fn list_sessions(&self) {
        match self.auth_api.profile().await {
            Ok(Some(profile)) if profile.sessions.is_empty() => {
                println!("{} No sessions yet", "ℹ️".bright_blue())
            }
            Ok(Some(profile)) => {
                println!("{} Your sessions:", "💬".bright_cyan());
                for session in &profile.sessions {
                    let title = session.title().unwrap_or("(empty)");
                    println!("  {}  {}", session.id.bright_magenta(), title);
                }
            }
            Ok(None) => print_error("Log in to see your sessions"),
            Err(e) => print_error(&format!("Failed to list sessions: {}", e)),
        }
    }

    async fn open(&self, session_id: &str) {
        self.view.reset();
        self.controller.mount(session_id).await;
    }

    async fn send(&self, text: &str) {
        let Some(send) = self.controller.send(text) else {
            if !self.controller.is_mounted() {
                print_error("No chat is open, use /new <message> or /open <id>");
            }
            return;
        };
        if send.await == SendOutcome::Delivered {
            // Pick up whatever the assistant has written so far
            if let Err(e) = self.controller.refresh().await {
                log::debug!("Refresh after send failed: {}", e);
            }
        }
    }

    /// Returns false when the REPL should stop
    async fn dispatch(&mut self, command: Command) -> Result<bool> {
        match command {
            Command::Quit => return Ok(false),
            Command::Help => {
                println!("{} Commands:", "💡".bright_yellow());
                for (usage, what) in HELP {
                    println!("  {:<18} - {}", usage, what);
                }
                println!("  Anything else is sent to the open chat.");
            }
            Command::Login => {
                let Some(email) = self.ask("Email:")? else { return Ok(true) };
                let Some(password) = self.ask_secret("Password:")? else { return Ok(true) };
                self.login(&email, &password).await;
            }
            Command::Signup => {
                let Some(name) = self.ask("Full name:")? else { return Ok(true) };
                let Some(email) = self.ask("Email:")? else { return Ok(true) };
                let Some(password) = self.ask_secret("Password:")? else { return Ok(true) };
                if self.auth.signup(&name, &email, &password, print_error).await {
                    self.print_identity();
                }
            }
            Command::Logout => {
                self.auth.logout().await;
                println!("{} Logged out", "👋".bright_cyan());
            }
            Command::WhoAmI => self.print_identity(),
            Command::Sessions => self.list_sessions().await,
            Command::New(message) => {
                if !self.auth.is_authenticated() {
                    self.auth.trigger_auth();
                    print_error("Log in first with /login or /signup");
                    return Ok(true);
                }
                self.handoff.stage(&message);
                let session_id = new_session_id();
                println!("{}", format!("New chat {}", session_id).bright_black());
                self.open(&session_id).await;
            }
            Command::Open(session_id) => self.open(&session_id).await,
            Command::Refresh => {
                if let Err(e) = self.controller.refresh().await {
                    print_error(&format!("Refresh failed: {}", e));
                }
            }
            Command::Send(text) => self.send(&text).await,
        }
        Ok(true)
    }
}

/// Run the interactive client until /quit or end of input
pub async fn run_repl_mode(cli: &Cli) -> Result<()> {
    println!("{}", "🛒 shopchat - WebScraper AI in your terminal".bright_cyan().bold());
    println!("{}", "Type /help for commands, /quit to exit\n".bright_black());

    let mut shell = Shell::new(cli)?;

    shell.auth.initialize().await;
    if !shell.auth.is_authenticated() {
        if let Some((email, password)) = cli.credentials() {
            shell.login(email, password).await;
        }
    }
    shell.print_identity();

    if let Some(session_id) = &cli.session {
        shell.open(session_id).await;
    }

    loop {
        let prompt = shell.prompt();
        match shell.editor.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = shell.editor.add_history_entry(line);

                match Command::parse(line) {
                    Ok(command) => {
                        if !shell.dispatch(command).await? {
                            break;
                        }
                    }
                    Err(e) => print_error(&e.to_string()),
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("Failed to read input"),
        }
    }

    shell.controller.unmount();
    println!("{}", "Goodbye!".bright_cyan());
    Ok(())
}
