//! Sign-in dialog, user badge and logout button.
//!
//! Every widget is optional so pages without an auth area can still bind.

use shopchat_chat::{AuthState, AuthStatus};
use std::rc::Rc;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Event};

use crate::dom;

pub fn bind(document: &Document, auth: Rc<AuthState>) -> Result<(), JsValue> {
    render(document, &auth);
    let doc = document.clone();
    auth.subscribe(move |state| render(&doc, state));

    if let Some(button) = dom::find_html_element(document, "signInButton") {
        let auth = auth.clone();
        dom::add_click_listener(&button, move || auth.trigger_auth())?;
    }

    if let Some(button) = dom::find_html_element(document, "closeAuthButton") {
        let auth = auth.clone();
        let doc = document.clone();
        dom::add_click_listener(&button, move || {
            clear_error(&doc);
            auth.close_auth_dialog();
        })?;
    }

    if let Some(button) = dom::find_html_element(document, "logoutButton") {
        let auth = auth.clone();
        dom::add_click_listener(&button, move || spawn_local(auth.logout()))?;
    }

    if let Some(form) = document.get_element_by_id("loginForm") {
        let auth = auth.clone();
        let doc = document.clone();
        dom::listen(&form, "submit", move |event: Event| {
            event.prevent_default();
            let (email, password) = match (
                dom::get_input_by_id(&doc, "loginEmail"),
                dom::get_input_by_id(&doc, "loginPassword"),
            ) {
                (Ok(email), Ok(password)) => (email, password),
                _ => {
                    log::error!("Login form is missing its inputs");
                    return;
                }
            };
            clear_error(&doc);

            let auth = auth.clone();
            let doc = doc.clone();
            spawn_local(async move {
                let err_doc = doc.clone();
                let signed_in = auth
                    .login(&email.value(), &password.value(), move |msg| {
                        show_error(&err_doc, msg)
                    })
                    .await;
                if signed_in {
                    password.set_value("");
                }
            });
        })?;
    }

    if let Some(form) = document.get_element_by_id("signupForm") {
        let doc = document.clone();
        dom::listen(&form, "submit", move |event: Event| {
            event.prevent_default();
            let fields = ["signupName", "signupEmail", "signupPassword"]
                .map(|id| dom::get_input_by_id(&doc, id));
            let [Ok(name), Ok(email), Ok(password)] = fields else {
                log::error!("Signup form is missing its inputs");
                return;
            };
            clear_error(&doc);

            let auth = auth.clone();
            let doc = doc.clone();
            spawn_local(async move {
                let err_doc = doc.clone();
                let created = auth
                    .signup(&name.value(), &email.value(), &password.value(), move |msg| {
                        show_error(&err_doc, msg)
                    })
                    .await;
                if created {
                    password.set_value("");
                }
            });
        })?;
    }

    Ok(())
}

fn render(document: &Document, state: &AuthState) {
    let status = state.status();

    if let Some(dialog) = dom::find_html_element(document, "authDialog") {
        dom::set_visible(&dialog, state.is_auth_dialog_open());
    }
    if let Some(badge) = document.get_element_by_id("userName") {
        let name = match &status {
            AuthStatus::Authenticated(user) => user.full_name.as_str(),
            _ => "",
        };
        dom::set_text_content(&badge, name);
    }
    if let Some(button) = dom::find_html_element(document, "signInButton") {
        dom::set_visible(&button, status == AuthStatus::Anonymous);
    }
    if let Some(button) = dom::find_html_element(document, "logoutButton") {
        dom::set_visible(&button, state.is_authenticated());
    }
}

fn show_error(document: &Document, message: &str) {
    match dom::find_html_element(document, "authError") {
        Some(el) => {
            dom::set_text_content(&el, message);
            dom::show_element(&el);
        }
        None => log::warn!("Auth error with nowhere to show it: {}", message),
    }
}

fn clear_error(document: &Document) {
    if let Some(el) = dom::find_html_element(document, "authError") {
        dom::set_text_content(&el, "");
        dom::hide_element(&el);
    }
}
