use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use shopchat_types::{
    AppendMessageRequest, CreateSessionRequest, Message, QueuedSession, Role, SessionHistory,
    SessionStatus,
};

use crate::error::ApiError;
use crate::http::HttpClient;

/// Session endpoints of the backend.
///
/// Futures are not `Send`: on wasm they wrap browser fetch promises.
#[async_trait(?Send)]
pub trait SessionApi {
    /// Ordered history of a session
    async fn fetch_session(&self, session_id: &str) -> Result<Vec<Message>, ApiError>;

    /// Declare a new session seeded with its first user message.
    ///
    /// Not deduplicated: callers invoke this at most once per session.
    async fn create_session(&self, first_message: &str, session_id: &str) -> Result<(), ApiError>;

    /// Append one message to an existing session
    async fn append_message(&self, session_id: &str, role: Role, content: &str) -> Result<(), ApiError>;
}

/// `SessionApi` over HTTP
#[derive(Debug, Clone)]
pub struct SessionClient {
    http: HttpClient,
}

impl SessionClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Processing status of a session handled by the background worker
    pub async fn session_status(&self, session_id: &str) -> Result<SessionStatus, ApiError> {
        let url = self.http.endpoint(&["api", "users", "session-status", session_id]);
        let reply = self.http.send(Method::GET, url, None).await?;

        if reply.status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(session_id.to_string()));
        }
        reply.error_for_status()?.json()
    }

    /// Queue a message for asynchronous processing in a server-minted session
    pub async fn start_async_chat(&self, message: &str) -> Result<QueuedSession, ApiError> {
        let url = self.http.endpoint(&["api", "users", "process-chat-async"]);
        // The endpoint takes the bare message as its JSON body
        let body = serde_json::Value::String(message.to_string());

        let queued: QueuedSession = self
            .http
            .send(Method::POST, url, Some(body))
            .await?
            .error_for_status()?
            .json()?;

        log::info!("Queued session {} as task {}", queued.session_id, queued.task_id);
        Ok(queued)
    }
}

#[async_trait(?Send)]
impl SessionApi for SessionClient {
    async fn fetch_session(&self, session_id: &str) -> Result<Vec<Message>, ApiError> {
        let url = self.http.endpoint(&["api", "users", "get-session", session_id]);
        let reply = self.http.send(Method::GET, url, None).await?;

        if reply.status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(session_id.to_string()));
        }

        // The backend answers `null` for an unknown id on some paths
        match reply.error_for_status()?.json::<Option<SessionHistory>>()? {
            Some(history) => Ok(history.chats),
            None => Err(ApiError::NotFound(session_id.to_string())),
        }
    }

    async fn create_session(&self, first_message: &str, session_id: &str) -> Result<(), ApiError> {
        let url = self.http.endpoint(&["api", "users", "create-session"]);
        let body = serde_json::to_value(CreateSessionRequest {
            message: first_message,
            session_id,
        })?;

        self.http
            .send(Method::POST, url, Some(body))
            .await?
            .error_for_status()?;

        log::info!("Created session {}", session_id);
        Ok(())
    }

    async fn append_message(&self, session_id: &str, role: Role, content: &str) -> Result<(), ApiError> {
        let url = self.http.endpoint(&["api", "users", "update-session", session_id]);
        let body = serde_json::to_value(AppendMessageRequest { role, content })?;

        let reply = self.http.send(Method::PATCH, url, Some(body)).await?;
        if reply.status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(session_id.to_string()));
        }
        reply.error_for_status()?;
        Ok(())
    }
}
