use shopchat_types::Message;

/// What the chat controller needs from whatever displays it
pub trait ChatView {
    /// Show the full message sequence
    fn render(&self, messages: &[Message]);

    /// Keep the newest message in view
    fn scroll_to_end(&self);

    /// Empty the text input after a submit
    fn clear_input(&self);

    /// Show a short-lived failure notice
    fn notify_error(&self, message: &str);
}
