//! Session and identity state for the shopchat front-ends
//!
//! Everything here is single-threaded: state lives behind `Rc<RefCell<_>>`
//! and network continuations are returned as local futures for the host
//! (browser event loop or terminal runtime) to drive.

pub mod auth_state;
pub mod controller;
pub mod handoff;
pub mod view;

pub use auth_state::{AuthState, AuthStatus};
pub use controller::{is_submit_key, ChatSessionController, Phase, SendOutcome};
pub use handoff::{Handoff, HandoffStore, MemoryStore};
pub use view::ChatView;
