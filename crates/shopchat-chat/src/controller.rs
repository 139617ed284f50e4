//! Message lifecycle of one chat session.
//!
//! Every user action is applied to the local sequence first and confirmed or
//! rolled back when the backend answers. Operations do their local work
//! eagerly and hand back a future carrying the network half, so the host can
//! render immediately and drive the request on its own event loop.

use futures::future::{FutureExt, LocalBoxFuture};
use shopchat_api::{ApiError, SessionApi};
use shopchat_types::{Message, MessageId, Role};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::handoff::Handoff;
use crate::view::ChatView;

pub const SEND_FAILED_NOTICE: &str = "Failed to send query to agent";
pub const LOAD_FAILED_NOTICE: &str = "Failed to load this conversation";
pub const START_FAILED_NOTICE: &str = "Failed to start a new conversation";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Never mounted
    Idle,
    /// First message of a new session is being declared to the backend
    Bootstrapping,
    /// History of an existing session is loading
    Resuming,
    Steady,
    Unmounted,
}

/// How a send ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Delivered,
    /// The backend call failed and the optimistic entry was removed
    RolledBack,
    /// The session was left before the backend answered
    Discarded,
}

/// True for Enter without the shift modifier
pub fn is_submit_key(key: &str, shift: bool) -> bool {
    key == "Enter" && !shift
}

/// An optimistic entry whose server copy has not been seen in a history yet
struct Pending {
    id: MessageId,
    /// Fetch counter at the time the backend confirmed it
    confirmed_at: Option<u64>,
}

struct ChatState {
    session_id: String,
    messages: Vec<Message>,
    /// In submission order; always the tail of `messages`
    pending: Vec<Pending>,
    /// Length of the last server history the sequence was built from
    server_len: usize,
    input: String,
    phase: Phase,
}

impl ChatState {
    fn new(session_id: &str, phase: Phase) -> Self {
        Self {
            session_id: session_id.to_string(),
            messages: Vec::new(),
            pending: Vec::new(),
            server_len: 0,
            input: String::new(),
            phase,
        }
    }
}

struct Inner {
    api: Rc<dyn SessionApi>,
    handoff: Handoff,
    view: Rc<dyn ChatView>,
    state: RefCell<ChatState>,
    /// Bumped on every mount and unmount; continuations from an older epoch
    /// must not touch state
    epoch: Cell<u64>,
    /// Tickets handed to history fetches, never reset
    fetches: Cell<u64>,
    /// Newest ticket whose history was applied
    applied: Cell<u64>,
}

impl Inner {
    fn advance_epoch(&self) -> u64 {
        let next = self.epoch.get() + 1;
        self.epoch.set(next);
        next
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.epoch.get() == epoch
    }

    fn publish(&self) {
        let messages = self.state.borrow().messages.clone();
        self.view.render(&messages);
        self.view.scroll_to_end();
    }

    fn set_phase(&self, phase: Phase) {
        self.state.borrow_mut().phase = phase;
    }

    /// Take a ticket for a history fetch that is about to start
    fn begin_fetch(&self) -> u64 {
        let ticket = self.fetches.get() + 1;
        self.fetches.set(ticket);
        ticket
    }

    fn confirm(&self, id: &MessageId) {
        let confirmed_at = self.fetches.get();
        let mut state = self.state.borrow_mut();
        if let Some(entry) = state.pending.iter_mut().find(|p| &p.id == id) {
            entry.confirmed_at = Some(confirmed_at);
        }
    }

    /// Replace the sequence with the history fetched under `ticket`.
    ///
    /// A pending entry is dropped once the history holds its server copy or
    /// it was confirmed before the fetch started. The others stay after the
    /// history in submission order. Histories older than one already applied
    /// are ignored.
    fn reconcile(&self, ticket: u64, history: Vec<Message>) {
        if ticket < self.applied.get() {
            log::debug!("Ignoring history from superseded fetch {}", ticket);
            return;
        }
        self.applied.set(ticket);
        {
            let mut state = self.state.borrow_mut();
            let state = &mut *state;

            // Entries the last history did not have; server copies are among them
            let fresh = history.get(state.server_len..).unwrap_or(&history[..]);
            let mut claimed = vec![false; fresh.len()];
            let mut kept = Vec::new();
            let mut tail = Vec::new();
            for entry in state.pending.drain(..) {
                let Some(local) = state.messages.iter().find(|m| m.id == entry.id) else {
                    continue;
                };
                let copy = (0..fresh.len()).find(|&i| {
                    !claimed[i] && fresh[i].role == local.role && fresh[i].content == local.content
                });
                if let Some(i) = copy {
                    claimed[i] = true;
                    continue;
                }
                let covered = entry.confirmed_at.is_some_and(|at| at < ticket);
                if !covered {
                    tail.push(local.clone());
                    kept.push(entry);
                }
            }

            state.server_len = history.len();
            state.messages = history;
            state.messages.extend(tail);
            state.pending = kept;
        }
        self.publish();
    }

    fn rollback(&self, id: &MessageId) {
        {
            let mut state = self.state.borrow_mut();
            state.messages.retain(|m| &m.id != id);
            state.pending.retain(|p| &p.id != id);
        }
        self.publish();
    }
}

/// Handle to the state of the chat screen.
///
/// Clones share state. The same controller is remounted when the route
/// switches to another session.
#[derive(Clone)]
pub struct ChatSessionController {
    inner: Rc<Inner>,
}

impl ChatSessionController {
    pub fn new(api: Rc<dyn SessionApi>, handoff: Handoff, view: Rc<dyn ChatView>) -> Self {
        Self {
            inner: Rc::new(Inner {
                api,
                handoff,
                view,
                state: RefCell::new(ChatState::new("", Phase::Idle)),
                epoch: Cell::new(0),
                fetches: Cell::new(0),
                applied: Cell::new(0),
            }),
        }
    }

    pub fn session_id(&self) -> String {
        self.inner.state.borrow().session_id.clone()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.inner.state.borrow().messages.clone()
    }

    pub fn phase(&self) -> Phase {
        self.inner.state.borrow().phase
    }

    pub fn is_bootstrapping(&self) -> bool {
        self.phase() == Phase::Bootstrapping
    }

    pub fn is_mounted(&self) -> bool {
        !matches!(self.phase(), Phase::Idle | Phase::Unmounted)
    }

    pub fn input(&self) -> String {
        self.inner.state.borrow().input.clone()
    }

    pub fn set_input(&self, text: &str) {
        self.inner.state.borrow_mut().input = text.to_string();
    }

    /// Enter a session route.
    ///
    /// A staged first message is shown before this returns and the returned
    /// future declares the session to the backend; otherwise the future loads
    /// the session history. Whatever was in flight for a previous mount is
    /// ignored from here on.
    pub fn mount(&self, session_id: &str) -> LocalBoxFuture<'static, ()> {
        let epoch = self.inner.advance_epoch();
        let inner = Rc::clone(&self.inner);
        let session_id = session_id.to_string();

        match self.inner.handoff.consume() {
            Some(first) => {
                log::info!("Bootstrapping new session {}", session_id);
                let message = Message::user(first.as_str());
                let id = message.id.clone();
                {
                    let mut state = self.inner.state.borrow_mut();
                    *state = ChatState::new(&session_id, Phase::Bootstrapping);
                    state.pending.push(Pending {
                        id: id.clone(),
                        confirmed_at: None,
                    });
                    state.messages.push(message);
                }
                self.inner.publish();

                async move {
                    let result = inner.api.create_session(&first, &session_id).await;
                    if !inner.is_current(epoch) {
                        log::debug!("Dropping create-session result for {}", session_id);
                        return;
                    }
                    match result {
                        Ok(()) => inner.confirm(&id),
                        Err(e) => {
                            log::warn!("Failed to create session {}: {}", session_id, e);
                            // Stays on screen until a history replaces it
                            inner.state.borrow_mut().pending.retain(|p| p.id != id);
                            inner.view.notify_error(START_FAILED_NOTICE);
                        }
                    }
                    inner.set_phase(Phase::Steady);
                }
                .boxed_local()
            }
            None => {
                log::info!("Resuming session {}", session_id);
                *self.inner.state.borrow_mut() = ChatState::new(&session_id, Phase::Resuming);
                self.inner.publish();
                let ticket = self.inner.begin_fetch();

                async move {
                    let result = inner.api.fetch_session(&session_id).await;
                    if !inner.is_current(epoch) {
                        log::debug!("Dropping history for {}", session_id);
                        return;
                    }
                    match result {
                        Ok(history) => inner.reconcile(ticket, history),
                        Err(e) => {
                            log::warn!("Failed to load session {}: {}", session_id, e);
                            inner.view.notify_error(LOAD_FAILED_NOTICE);
                        }
                    }
                    inner.set_phase(Phase::Steady);
                }
                .boxed_local()
            }
        }
    }

    /// Leave the session; late responses become no-ops
    pub fn unmount(&self) {
        self.inner.advance_epoch();
        let mut state = self.inner.state.borrow_mut();
        log::debug!("Unmounting session {}", state.session_id);
        *state = ChatState::new("", Phase::Unmounted);
    }

    /// Send the current input. `None` when there is nothing to send.
    pub fn submit(&self) -> Option<LocalBoxFuture<'static, SendOutcome>> {
        let text = self.input();
        self.send(&text)
    }

    /// Key handler for the input: Enter without shift submits
    pub fn handle_key(&self, key: &str, shift: bool) -> Option<LocalBoxFuture<'static, SendOutcome>> {
        if is_submit_key(key, shift) {
            self.submit()
        } else {
            None
        }
    }

    /// Append `text` optimistically and return the future that delivers it.
    ///
    /// Blank text and an unmounted controller send nothing. The input is
    /// cleared right away and stays cleared even if delivery fails.
    pub fn send(&self, text: &str) -> Option<LocalBoxFuture<'static, SendOutcome>> {
        if text.trim().is_empty() {
            return None;
        }
        if !self.is_mounted() {
            log::warn!("Ignoring send without a mounted session");
            return None;
        }

        let epoch = self.inner.epoch.get();
        let message = Message::user(text);
        let id = message.id.clone();
        let session_id = {
            let mut state = self.inner.state.borrow_mut();
            state.pending.push(Pending {
                id: id.clone(),
                confirmed_at: None,
            });
            state.messages.push(message);
            state.input.clear();
            state.session_id.clone()
        };
        self.inner.publish();
        self.inner.view.clear_input();

        let inner = Rc::clone(&self.inner);
        let content = text.to_string();
        Some(
            async move {
                let result = inner.api.append_message(&session_id, Role::User, &content).await;
                if !inner.is_current(epoch) {
                    return SendOutcome::Discarded;
                }
                match result {
                    Ok(()) => {
                        inner.confirm(&id);
                        SendOutcome::Delivered
                    }
                    Err(e) => {
                        log::warn!("Failed to send message to {}: {}", session_id, e);
                        inner.rollback(&id);
                        inner.view.notify_error(SEND_FAILED_NOTICE);
                        SendOutcome::RolledBack
                    }
                }
            }
            .boxed_local(),
        )
    }

    /// Re-read the history so entries written by the server appear.
    ///
    /// Sends the fetched history does not show yet stay at the end, including
    /// ones delivered while the fetch was outstanding.
    pub fn refresh(&self) -> LocalBoxFuture<'static, Result<(), ApiError>> {
        let epoch = self.inner.epoch.get();
        let inner = Rc::clone(&self.inner);
        let mounted = self.is_mounted();
        let session_id = self.session_id();
        let ticket = self.inner.begin_fetch();

        async move {
            if !mounted {
                return Ok(());
            }
            let history = inner.api.fetch_session(&session_id).await?;
            if inner.is_current(epoch) {
                inner.reconcile(ticket, history);
            }
            Ok(())
        }
        .boxed_local()
    }
}
