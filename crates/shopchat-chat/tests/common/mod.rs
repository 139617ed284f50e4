#![allow(dead_code)]

use async_trait::async_trait;
use futures::channel::oneshot;
use shopchat_api::{ApiError, AuthApi, SessionApi};
use shopchat_chat::ChatView;
use shopchat_types::{AuthUser, Message, MessageId, ProfileUpdate, Role, UserProfile};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

fn unavailable() -> ApiError {
    ApiError::Status {
        status: 503,
        body: "service unavailable".to_string(),
    }
}

pub fn history_message(id: &str, role: Role, content: &str) -> Message {
    Message {
        id: MessageId::from(id),
        content: content.to_string(),
        role,
        timestamp: None,
    }
}

pub fn contents(messages: &[Message]) -> Vec<String> {
    messages.iter().map(|m| m.content.clone()).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Fetch(String),
    Create { message: String, session_id: String },
    Append { session_id: String, content: String },
}

/// In-memory backend for session endpoints
#[derive(Default)]
pub struct FakeSessionApi {
    pub sessions: RefCell<HashMap<String, Vec<Message>>>,
    pub calls: RefCell<Vec<Call>>,
    /// Appends with these contents fail
    pub failing_contents: RefCell<HashSet<String>>,
    pub fail_fetch: Cell<bool>,
    pub fail_create: Cell<bool>,
    /// Yield to the scheduler before answering so calls overlap
    pub yield_first: Cell<bool>,
    /// The next fetch reads the history, then waits for this before answering
    pub fetch_gate: RefCell<Option<oneshot::Receiver<()>>>,
    /// The next append is stored, then waits for this before answering
    pub append_gate: RefCell<Option<oneshot::Receiver<()>>>,
}

/// Hold the next call behind `gate`; send on the returned handle to release it
fn close_gate(gate: &RefCell<Option<oneshot::Receiver<()>>>) -> oneshot::Sender<()> {
    let (release, wait) = oneshot::channel();
    *gate.borrow_mut() = Some(wait);
    release
}

async fn pass_gate(gate: &RefCell<Option<oneshot::Receiver<()>>>) {
    let wait = gate.borrow_mut().take();
    if let Some(wait) = wait {
        let _ = wait.await;
    }
}

impl FakeSessionApi {
    pub fn with_session(self, session_id: &str, history: Vec<Message>) -> Self {
        self.sessions
            .borrow_mut()
            .insert(session_id.to_string(), history);
        self
    }

    /// Simulate the backend writing a message on its own
    pub fn push_server_message(&self, session_id: &str, message: Message) {
        self.sessions
            .borrow_mut()
            .entry(session_id.to_string())
            .or_default()
            .push(message);
    }

    pub fn fail_append_of(&self, content: &str) {
        self.failing_contents.borrow_mut().insert(content.to_string());
    }

    pub fn hold_next_fetch(&self) -> oneshot::Sender<()> {
        close_gate(&self.fetch_gate)
    }

    pub fn hold_next_append(&self) -> oneshot::Sender<()> {
        close_gate(&self.append_gate)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn create_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Create { .. }))
            .count()
    }

    async fn maybe_yield(&self) {
        if self.yield_first.get() {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait(?Send)]
impl SessionApi for FakeSessionApi {
    async fn fetch_session(&self, session_id: &str) -> Result<Vec<Message>, ApiError> {
        self.calls.borrow_mut().push(Call::Fetch(session_id.to_string()));
        self.maybe_yield().await;
        if self.fail_fetch.get() {
            return Err(unavailable());
        }
        let history = self
            .sessions
            .borrow()
            .get(session_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(session_id.to_string()));
        pass_gate(&self.fetch_gate).await;
        history
    }

    async fn create_session(&self, first_message: &str, session_id: &str) -> Result<(), ApiError> {
        self.calls.borrow_mut().push(Call::Create {
            message: first_message.to_string(),
            session_id: session_id.to_string(),
        });
        self.maybe_yield().await;
        if self.fail_create.get() {
            return Err(unavailable());
        }
        self.sessions.borrow_mut().insert(
            session_id.to_string(),
            vec![history_message("server-first", Role::User, first_message)],
        );
        Ok(())
    }

    async fn append_message(&self, session_id: &str, role: Role, content: &str) -> Result<(), ApiError> {
        self.calls.borrow_mut().push(Call::Append {
            session_id: session_id.to_string(),
            content: content.to_string(),
        });
        self.maybe_yield().await;
        if self.failing_contents.borrow().contains(content) {
            return Err(unavailable());
        }
        let id = format!("server-{}", self.calls.borrow().len());
        self.push_server_message(session_id, history_message(&id, role, content));
        pass_gate(&self.append_gate).await;
        Ok(())
    }
}

/// Chat view that records what it was asked to show
#[derive(Default)]
pub struct RecordingView {
    pub renders: RefCell<Vec<Vec<String>>>,
    pub scrolls: Cell<usize>,
    pub input_clears: Cell<usize>,
    pub errors: RefCell<Vec<String>>,
}

impl RecordingView {
    pub fn last_render(&self) -> Vec<String> {
        self.renders.borrow().last().cloned().unwrap_or_default()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.borrow().clone()
    }
}

impl ChatView for RecordingView {
    fn render(&self, messages: &[Message]) {
        self.renders.borrow_mut().push(contents(messages));
    }

    fn scroll_to_end(&self) {
        self.scrolls.set(self.scrolls.get() + 1);
    }

    fn clear_input(&self) {
        self.input_clears.set(self.input_clears.get() + 1);
    }

    fn notify_error(&self, message: &str) {
        self.errors.borrow_mut().push(message.to_string());
    }
}

pub fn ada() -> AuthUser {
    AuthUser {
        id: "u1".to_string(),
        email: "ada@example.com".to_string(),
        full_name: "Ada Lovelace".to_string(),
    }
}

/// In-memory backend for identity endpoints
#[derive(Default)]
pub struct FakeAuthApi {
    /// email -> (password, user)
    pub accounts: RefCell<HashMap<String, (String, AuthUser)>>,
    /// Who the ambient cookie identifies
    pub signed_in: RefCell<Option<AuthUser>>,
    pub unreachable: Cell<bool>,
    pub logout_calls: Cell<usize>,
    /// Yield to the scheduler after a profile update is stored, before answering
    pub yield_after_update: Cell<bool>,
}

impl FakeAuthApi {
    pub fn with_account(self, password: &str, user: AuthUser) -> Self {
        self.accounts
            .borrow_mut()
            .insert(user.email.clone(), (password.to_string(), user));
        self
    }

    pub fn with_cookie_for(self, user: AuthUser) -> Self {
        *self.signed_in.borrow_mut() = Some(user);
        self
    }

    fn check_reachable(&self) -> Result<(), ApiError> {
        if self.unreachable.get() {
            Err(unavailable())
        } else {
            Ok(())
        }
    }
}

fn profile_of(user: &AuthUser) -> UserProfile {
    UserProfile {
        id: user.id.clone(),
        email: user.email.clone(),
        name: user.full_name.clone(),
        role: "user".to_string(),
        sessions: Vec::new(),
    }
}

#[async_trait(?Send)]
impl AuthApi for FakeAuthApi {
    async fn profile(&self) -> Result<Option<UserProfile>, ApiError> {
        self.check_reachable()?;
        Ok(self.signed_in.borrow().as_ref().map(profile_of))
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthUser, ApiError> {
        self.check_reachable()?;
        let accounts = self.accounts.borrow();
        match accounts.get(email) {
            Some((expected, user)) if expected == password => {
                *self.signed_in.borrow_mut() = Some(user.clone());
                Ok(user.clone())
            }
            _ => Err(ApiError::InvalidCredentials),
        }
    }

    async fn signup(&self, full_name: &str, email: &str, password: &str) -> Result<AuthUser, ApiError> {
        self.check_reachable()?;
        if self.accounts.borrow().contains_key(email) {
            return Err(ApiError::AccountExists);
        }
        let user = AuthUser {
            id: format!("u{}", self.accounts.borrow().len() + 1),
            email: email.to_string(),
            full_name: full_name.to_string(),
        };
        self.accounts
            .borrow_mut()
            .insert(email.to_string(), (password.to_string(), user.clone()));
        *self.signed_in.borrow_mut() = Some(user.clone());
        Ok(user)
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.logout_calls.set(self.logout_calls.get() + 1);
        self.check_reachable()?;
        *self.signed_in.borrow_mut() = None;
        Ok(())
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, ApiError> {
        self.check_reachable()?;
        let mut signed_in = self.signed_in.borrow_mut();
        let user = signed_in.as_mut().ok_or(ApiError::Status {
            status: 401,
            body: "Not authenticated".to_string(),
        })?;
        if let Some(name) = &update.name {
            user.full_name = name.clone();
        }
        let profile = profile_of(user);
        drop(signed_in);
        if self.yield_after_update.get() {
            tokio::task::yield_now().await;
        }
        Ok(profile)
    }

    async fn delete_account(&self) -> Result<(), ApiError> {
        self.check_reachable()?;
        if let Some(user) = self.signed_in.borrow_mut().take() {
            self.accounts.borrow_mut().remove(&user.email);
        }
        Ok(())
    }
}
