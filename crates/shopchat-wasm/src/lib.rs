use shopchat_api::{AuthClient, HttpClient, SessionApi, SessionClient};
use shopchat_chat::{AuthState, ChatSessionController, Handoff};
use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Window};

mod auth_ui;
mod chat_ui;
pub mod config;
mod dom;
mod markdown;
pub mod storage;
pub mod utils;

pub use config::BrowserConfig;

/// Objects shared by every screen of the page
struct App {
    config: BrowserConfig,
    document: Document,
    auth: Rc<AuthState>,
    sessions: Rc<dyn SessionApi>,
    handoff: Handoff,
}

thread_local! {
    static APP: RefCell<Option<Rc<App>>> = const { RefCell::new(None) };
}

/// Initialize the WASM module
/// This sets up panic hooks and logging
#[wasm_bindgen(start)]
pub fn init() {
    // Set panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    wasm_logger::init(wasm_logger::Config::default());

    log::info!("shopchat WASM initialized");
}

/// Build the API clients and auth state and bind the auth widgets.
///
/// `config_json` is an optional `BrowserConfig` in JSON. Identity is
/// re-established from the session cookie in the background.
#[wasm_bindgen]
pub fn init_app(config_json: Option<String>) -> Result<(), JsValue> {
    let config = BrowserConfig::parse(config_json.as_deref()).map_err(js_error)?;
    log::info!("Using backend at {}", config.api.base_url);

    let http = HttpClient::new(&config.api).map_err(js_error)?;
    let auth = Rc::new(AuthState::new(Rc::new(AuthClient::new(http.clone()))));
    let handoff = Handoff::new(Rc::new(storage::SessionStorageStore::open()?));
    let document = document()?;

    auth_ui::bind(&document, auth.clone())?;
    {
        let auth = auth.clone();
        wasm_bindgen_futures::spawn_local(async move { auth.initialize().await });
    }

    let app = App {
        config,
        document,
        auth,
        sessions: Rc::new(SessionClient::new(http)),
        handoff,
    };
    APP.with(|slot| *slot.borrow_mut() = Some(Rc::new(app)));
    Ok(())
}

/// Initialize the chat page for the session in the current `/chat/{id}` URL
#[wasm_bindgen]
pub fn init_chat_session() -> Result<(), JsValue> {
    let app = app()?;
    let session_id = utils::get_session_id_from_url()?;

    let view = Rc::new(chat_ui::DomChatView::new(&app.document)?);
    let controller = ChatSessionController::new(app.sessions.clone(), app.handoff.clone(), view);
    chat_ui::ChatApp::new(app.document.clone(), controller, &app.config).start(&session_id)
}

/// Start a new conversation from the landing page.
///
/// Stages `message` for the chat page and navigates to a fresh session
/// route. Returns false without navigating when the message is blank or
/// nobody is signed in, in which case the sign-in dialog is opened.
#[wasm_bindgen]
pub fn start_new_chat(message: String) -> Result<bool, JsValue> {
    let app = app()?;
    if message.trim().is_empty() {
        return Ok(false);
    }
    if !app.auth.is_authenticated() {
        app.auth.trigger_auth();
        return Ok(false);
    }

    app.handoff.stage(&message);
    let path = utils::chat_path(&shopchat_types::new_session_id());
    log::info!("Starting new chat at {}", path);
    window()?.location().assign(&path)?;
    Ok(true)
}

fn app() -> Result<Rc<App>, JsValue> {
    APP.with(|slot| slot.borrow().clone())
        .ok_or_else(|| JsValue::from_str("init_app must be called first"))
}

fn js_error(e: impl Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Get the window object
fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("No window object"))
}

/// Get the document object
fn document() -> Result<Document, JsValue> {
    window()?
        .document()
        .ok_or_else(|| JsValue::from_str("No document object"))
}
