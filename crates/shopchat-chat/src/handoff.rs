//! One-shot handoff of a first message between screens.
//!
//! The landing screen stages the message and navigates to a fresh session
//! route; the chat screen consumes it on mount. Both keys are cleared by the
//! first `consume()` so a remount of the same session resumes instead of
//! creating the session a second time.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Flag key, holds `"true"` while a new session is pending
pub const IS_NEW_SESSION_KEY: &str = "is_new_session";

/// Key holding the pending first message
pub const MESSAGE_KEY: &str = "message";

/// Short-lived key/value storage that survives a navigation
pub trait HandoffStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// Process-local store for hosts without browser storage
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl HandoffStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

#[derive(Clone)]
pub struct Handoff {
    store: Rc<dyn HandoffStore>,
}

impl Handoff {
    pub fn new(store: Rc<dyn HandoffStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Rc::new(MemoryStore::default()))
    }

    /// Leave a first message for the next session screen
    pub fn stage(&self, message: &str) {
        self.store.set(MESSAGE_KEY, message);
        self.store.set(IS_NEW_SESSION_KEY, "true");
    }

    pub fn is_pending(&self) -> bool {
        self.store.get(IS_NEW_SESSION_KEY).as_deref() == Some("true")
    }

    /// Read and clear the handoff.
    ///
    /// Returns the staged message when the new-session flag was set and the
    /// message is not blank. Both keys are removed whatever they held.
    pub fn consume(&self) -> Option<String> {
        let flagged = self.is_pending();
        let message = self.store.get(MESSAGE_KEY);

        self.store.remove(MESSAGE_KEY);
        self.store.remove(IS_NEW_SESSION_KEY);

        if !flagged {
            return None;
        }
        match message {
            Some(message) if !message.trim().is_empty() => Some(message),
            _ => {
                log::warn!("New-session flag was set without a message, resuming instead");
                None
            }
        }
    }
}
