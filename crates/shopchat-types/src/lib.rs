//! Core types and structures for shopchat
//!
//! This crate provides the data model shared by the API clients, the session
//! controllers and both front-ends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// ============================================================================
// Constants
// ============================================================================

/// Backend used when no URL is configured
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Display name of the assistant in the chat view
pub const ASSISTANT_NAME: &str = "WebScraper AI";

// ============================================================================
// Message Types
// ============================================================================

/// Helper function to deserialize string or null values
pub fn deserialize_string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        _ => Ok(String::new()),
    }
}

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    #[serde(alias = "ai")]
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque message identifier.
///
/// Optimistic entries get a fresh UUID on creation. History entries keep the
/// server's id when one is sent and get a fresh one otherwise, so every entry
/// in a sequence can be addressed individually.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MessageId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Message structure for a chat session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default = "MessageId::generate")]
    pub id: MessageId,
    #[serde(deserialize_with = "deserialize_string_or_null", default)]
    pub content: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Message {
    /// Build a locally-timestamped user message that has not been confirmed
    /// by the server yet.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: MessageId::generate(),
            content: content.into(),
            role: Role::User,
            timestamp: Some(Utc::now()),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

// ============================================================================
// Session Types
// ============================================================================

/// Mint an identifier for a session that does not exist on the server yet
pub fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Stored session as returned by `get-session`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionHistory {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub chats: Vec<Message>,
}

/// Session entry embedded in the identity payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSummary {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub chats: Vec<Message>,
    #[serde(default)]
    pub status: Option<String>,
}

impl SessionSummary {
    /// First user message, used as a title when listing sessions
    pub fn title(&self) -> Option<&str> {
        self.chats
            .iter()
            .find(|m| m.is_user())
            .map(|m| m.content.as_str())
    }
}

/// Processing status of an asynchronously handled session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatus {
    pub session_id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub chats: Vec<Message>,
    #[serde(default)]
    pub meta: serde_json::Value,
}

/// Acknowledgement for a queued asynchronous chat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedSession {
    pub session_id: String,
    pub task_id: String,
    pub status: String,
    #[serde(default)]
    pub message: String,
}

// ============================================================================
// User Types
// ============================================================================

/// Authenticated user as held by the auth state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    #[serde(rename = "name")]
    pub full_name: String,
}

/// Full identity payload returned by `/api/users/me`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub sessions: Vec<SessionSummary>,
}

impl From<&UserProfile> for AuthUser {
    fn from(profile: &UserProfile) -> Self {
        Self {
            id: profile.id.clone(),
            email: profile.email.clone(),
            full_name: profile.name.clone(),
        }
    }
}

/// Partial profile update; unset fields are left unchanged on the server
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub password: Option<String>,
}

impl fmt::Debug for ProfileUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileUpdate")
            .field("name", &self.name)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct CreateSessionRequest<'a> {
    pub message: &'a str,
    pub session_id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct AppendMessageRequest<'a> {
    pub role: Role,
    pub content: &'a str,
}

#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
pub struct RegisterRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub name: &'a str,
}
