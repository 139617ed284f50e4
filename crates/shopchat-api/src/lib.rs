//! HTTP clients for the shopchat backend
//!
//! `SessionClient` and `AuthClient` are thin typed wrappers over the backend's
//! session and identity endpoints. Both share one [`HttpClient`] so they send
//! the same ambient credentials: the browser's cookies on wasm, a shared cookie
//! jar natively.

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod request_logger;
pub mod session;

pub use auth::{AuthApi, AuthClient};
pub use config::{normalize_base_url, ApiConfig};
pub use error::ApiError;
pub use http::HttpClient;
pub use session::{SessionApi, SessionClient};
