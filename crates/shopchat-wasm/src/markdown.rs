use pulldown_cmark::{html, Event, Options, Parser};
use shopchat_types::Role;

/// Render markdown to HTML.
///
/// Raw HTML in the source is emitted as escaped text.
pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);
    html_output
}

fn render_plain(text: &str) -> String {
    crate::utils::escape_html(text).replace('\n', "<br>")
}

/// Render message content: assistant replies as markdown, user text verbatim
pub fn render_message_content(content: &str, role: Role) -> String {
    match role {
        Role::Assistant => render_markdown(content),
        Role::User => render_plain(content),
    }
}
