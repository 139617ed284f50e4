//! Terminal front-end for shopchat
//!
//! Drives the same auth state and chat controller as the browser front-end,
//! with a transcript view and a rustyline prompt.

pub mod cli;
pub mod command;
pub mod repl;
pub mod terminal_view;

pub use cli::Cli;
pub use repl::run_repl_mode;
