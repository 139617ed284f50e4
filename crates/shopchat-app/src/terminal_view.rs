use colored::Colorize;
use shopchat_chat::ChatView;
use shopchat_types::{Message, Role, ASSISTANT_NAME};
use std::cell::RefCell;
use std::io::Write;

/// Prints the chat as a transcript.
///
/// A terminal cannot redraw earlier lines, so each render prints only the
/// entries that were not on screen before, and notes entries that vanished.
pub struct TerminalView<W: Write> {
    out: RefCell<W>,
    shown: RefCell<Vec<Message>>,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: RefCell::new(out),
            shown: RefCell::new(Vec::new()),
        }
    }

    /// Forget what was printed, e.g. before opening another session
    pub fn reset(&self) {
        self.shown.borrow_mut().clear();
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    fn write_line(&self, line: &str) {
        let mut out = self.out.borrow_mut();
        if let Err(e) = writeln!(out, "{}", line).and_then(|_| out.flush()) {
            log::warn!("Failed to write to terminal: {}", e);
        }
    }
}

fn format_message(msg: &Message) -> String {
    match msg.role {
        Role::User => format!("{} {}", "You:".bright_green().bold(), msg.content),
        Role::Assistant => format!("{} {}", format!("{}:", ASSISTANT_NAME).bright_cyan().bold(), msg.content),
    }
}

/// Pair each entry of `next` with an unused entry of `previous`, by id first
/// and then by role and content (server copies of a send get new ids).
/// Returns the unmatched entries of `next` and of `previous`.
fn diff<'a>(previous: &'a [Message], next: &'a [Message]) -> (Vec<&'a Message>, Vec<&'a Message>) {
    let mut matched = vec![false; previous.len()];
    let mut added = Vec::new();
    for msg in next {
        let hit = (0..previous.len())
            .find(|&i| !matched[i] && previous[i].id == msg.id)
            .or_else(|| {
                (0..previous.len()).find(|&i| {
                    !matched[i] && previous[i].role == msg.role && previous[i].content == msg.content
                })
            });
        match hit {
            Some(i) => matched[i] = true,
            None => added.push(msg),
        }
    }
    let removed = previous
        .iter()
        .zip(&matched)
        .filter(|(_, matched)| !**matched)
        .map(|(p, _)| p)
        .collect();
    (added, removed)
}

impl<W: Write> ChatView for TerminalView<W> {
    fn render(&self, messages: &[Message]) {
        let previous = self.shown.replace(messages.to_vec());
        let (added, removed) = diff(&previous, messages);

        for gone in removed {
            self.write_line(&format!("withdrawn: {}", gone.content).bright_black().to_string());
        }
        for msg in added {
            self.write_line(&format_message(msg));
        }
    }

    fn scroll_to_end(&self) {}

    fn clear_input(&self) {}

    fn notify_error(&self, message: &str) {
        self.write_line(&format!("{} {}", "✗".bright_red(), message.red()));
    }
}
