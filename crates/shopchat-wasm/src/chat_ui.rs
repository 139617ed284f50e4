use gloo_timers::future::TimeoutFuture;
use shopchat_chat::{is_submit_key, ChatSessionController, ChatView, Phase, SendOutcome};
use shopchat_types::{Message, Role, ASSISTANT_NAME};
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement, KeyboardEvent};

use crate::config::{BrowserConfig, TOAST_DURATION_MS};
use crate::dom;
use crate::markdown;
use crate::utils;

/// Renders the message list of the chat page
pub struct DomChatView {
    document: Document,
    container: Element,
    input: HtmlInputElement,
    send_button: Option<HtmlElement>,
    toasts: Option<Element>,
}

impl DomChatView {
    pub fn new(document: &Document) -> Result<Self, JsValue> {
        Ok(Self {
            document: document.clone(),
            container: dom::get_element_by_id(document, "messagesContainer")?,
            input: dom::get_input_by_id(document, "messageInput")?,
            send_button: dom::find_html_element(document, "sendButton"),
            toasts: document.get_element_by_id("toastContainer"),
        })
    }

    fn render_message(&self, msg: &Message) -> Result<Element, JsValue> {
        let msg_div = self.document.create_element("div")?;
        msg_div.set_class_name(&format!("message {}", msg.role));

        let mut html = String::new();
        if msg.role == Role::Assistant {
            html.push_str(&format!(r#"<div class="message-role">{}</div>"#, ASSISTANT_NAME));
        }
        let markdown_class = if msg.role == Role::Assistant { " markdown" } else { "" };
        html.push_str(&format!(
            r#"<div class="message-content{}">{}</div>"#,
            markdown_class,
            markdown::render_message_content(&msg.content, msg.role)
        ));
        if let (Role::User, Some(timestamp)) = (msg.role, msg.timestamp.as_ref()) {
            html.push_str(&format!(
                r#"<div class="message-time">{}</div>"#,
                utils::format_time(timestamp)
            ));
        }

        msg_div.set_inner_html(&html);
        Ok(msg_div)
    }

    fn show_toast(&self, message: &str) -> Result<(), JsValue> {
        let toast = self.document.create_element("div")?;
        toast.set_class_name("toast error");
        dom::set_text_content(&toast, message);

        let parent = self.toasts.as_ref().unwrap_or(&self.container);
        parent.append_child(&toast)?;

        spawn_local(async move {
            TimeoutFuture::new(TOAST_DURATION_MS).await;
            toast.remove();
        });
        Ok(())
    }
}

/// Enable the send button only while there is something to send
fn sync_send_button(button: Option<&HtmlElement>, text: &str) {
    if let Some(button) = button {
        let result = if text.trim().is_empty() {
            button.set_attribute("disabled", "")
        } else {
            button.remove_attribute("disabled")
        };
        if let Err(e) = result {
            log::warn!("Failed to update send button: {:?}", e);
        }
    }
}

impl ChatView for DomChatView {
    fn render(&self, messages: &[Message]) {
        dom::clear_element(&self.container);
        for msg in messages {
            let appended = self
                .render_message(msg)
                .and_then(|el| self.container.append_child(&el).map(|_| ()));
            if let Err(e) = appended {
                log::error!("Failed to render message {}: {:?}", msg.id, e);
            }
        }
    }

    fn scroll_to_end(&self) {
        dom::scroll_to_bottom(&self.container);
    }

    fn clear_input(&self) {
        self.input.set_value("");
        sync_send_button(self.send_button.as_ref(), "");
    }

    fn notify_error(&self, message: &str) {
        if let Err(e) = self.show_toast(message) {
            log::error!("Failed to show notification: {:?}", e);
        }
    }
}

/// Wires the chat page to a controller
#[derive(Clone)]
pub struct ChatApp {
    document: Document,
    controller: ChatSessionController,
    poll_interval_ms: u32,
    poll_generation: Rc<Cell<u64>>,
}

impl ChatApp {
    pub fn new(document: Document, controller: ChatSessionController, config: &BrowserConfig) -> Self {
        Self {
            document,
            controller,
            poll_interval_ms: config.poll_interval_ms,
            poll_generation: Rc::new(Cell::new(0)),
        }
    }

    pub fn start(self, session_id: &str) -> Result<(), JsValue> {
        self.setup_message_input()?;
        self.setup_navigation()?;
        self.open(session_id);
        Ok(())
    }

    fn open(&self, session_id: &str) {
        log::info!("Opening chat session: {}", session_id);
        spawn_local(self.controller.mount(session_id));
        self.start_polling();
    }

    fn setup_message_input(&self) -> Result<(), JsValue> {
        let input = dom::get_input_by_id(&self.document, "messageInput")?;
        let send_button = dom::find_html_element(&self.document, "sendButton");
        sync_send_button(send_button.as_ref(), &input.value());

        let controller = self.controller.clone();
        let input_clone = input.clone();
        let button_clone = send_button.clone();
        dom::listen(&input, "input", move |_: web_sys::Event| {
            let text = input_clone.value();
            controller.set_input(&text);
            sync_send_button(button_clone.as_ref(), &text);
        })?;

        // Enter key handler
        let controller = self.controller.clone();
        let input_clone = input.clone();
        dom::listen(&input, "keydown", move |event: KeyboardEvent| {
            if !is_submit_key(&event.key(), event.shift_key()) {
                return;
            }
            event.prevent_default();
            controller.set_input(&input_clone.value());
            if let Some(send) = controller.handle_key(&event.key(), event.shift_key()) {
                spawn_send(send);
            }
        })?;

        if let Some(button) = send_button {
            let controller = self.controller.clone();
            dom::add_click_listener(&button, move || {
                controller.set_input(&input.value());
                if let Some(send) = controller.submit() {
                    spawn_send(send);
                }
            })?;
        }

        Ok(())
    }

    /// Back/forward between chat routes remounts the same controller
    fn setup_navigation(&self) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
        let app = self.clone();
        dom::listen(&window, "popstate", move |_: web_sys::PopStateEvent| {
            match utils::get_session_id_from_url() {
                Ok(id) if id != app.controller.session_id() => app.open(&id),
                Ok(_) => {}
                Err(e) => {
                    log::info!("Left the chat route: {:?}", e);
                    app.controller.unmount();
                }
            }
        })
    }

    /// Refresh history on an interval until the next mount or unmount
    fn start_polling(&self) {
        let generation = self.poll_generation.get() + 1;
        self.poll_generation.set(generation);
        if self.poll_interval_ms == 0 {
            return;
        }

        let controller = self.controller.clone();
        let current = self.poll_generation.clone();
        let interval = self.poll_interval_ms;
        spawn_local(async move {
            loop {
                TimeoutFuture::new(interval).await;
                if current.get() != generation || !controller.is_mounted() {
                    break;
                }
                if controller.phase() != Phase::Steady {
                    continue;
                }
                if let Err(e) = controller.refresh().await {
                    log::debug!("History refresh failed: {}", e);
                }
            }
            log::debug!("Stopped polling (generation {})", generation);
        });
    }
}

fn spawn_send(send: futures::future::LocalBoxFuture<'static, SendOutcome>) {
    spawn_local(async move {
        let outcome = send.await;
        log::debug!("Send finished: {:?}", outcome);
    });
}
