use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use shopchat_types::{AuthUser, LoginRequest, ProfileUpdate, RegisterRequest, UserProfile};

use crate::error::ApiError;
use crate::http::HttpClient;

/// Identity endpoints of the backend
#[async_trait(?Send)]
pub trait AuthApi {
    /// Full identity payload, `None` when the caller is not authenticated
    async fn profile(&self) -> Result<Option<UserProfile>, ApiError>;

    /// Current user, `None` when not authenticated.
    ///
    /// Only transport-level problems are errors.
    async fn who_am_i(&self) -> Result<Option<AuthUser>, ApiError> {
        Ok(self.profile().await?.as_ref().map(AuthUser::from))
    }

    /// Exchange credentials for a session cookie.
    ///
    /// Any non-200 answer is `ApiError::InvalidCredentials`.
    async fn login(&self, email: &str, password: &str) -> Result<AuthUser, ApiError>;

    async fn signup(&self, full_name: &str, email: &str, password: &str) -> Result<AuthUser, ApiError>;

    async fn logout(&self) -> Result<(), ApiError>;

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, ApiError>;

    async fn delete_account(&self) -> Result<(), ApiError>;
}

/// `AuthApi` over HTTP
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: HttpClient,
}

impl AuthClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait(?Send)]
impl AuthApi for AuthClient {
    async fn profile(&self) -> Result<Option<UserProfile>, ApiError> {
        let url = self.http.endpoint(&["api", "users", "me"]);
        let reply = self.http.send(Method::GET, url, None).await?;

        if reply.status != StatusCode::OK {
            log::debug!("Not authenticated (status {})", reply.status.as_u16());
            return Ok(None);
        }
        Ok(Some(reply.json()?))
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthUser, ApiError> {
        let url = self.http.endpoint(&["api", "auth", "login"]);
        let body = serde_json::to_value(LoginRequest { email, password })?;

        let reply = self.http.send(Method::POST, url, Some(body)).await?;
        if reply.status != StatusCode::OK {
            log::info!("Login rejected for {} (status {})", email, reply.status.as_u16());
            return Err(ApiError::InvalidCredentials);
        }
        reply.json()
    }

    async fn signup(&self, full_name: &str, email: &str, password: &str) -> Result<AuthUser, ApiError> {
        let url = self.http.endpoint(&["api", "auth", "register"]);
        let body = serde_json::to_value(RegisterRequest {
            email,
            password,
            name: full_name,
        })?;

        let reply = self.http.send(Method::POST, url, Some(body)).await?;
        if reply.status == StatusCode::CONFLICT {
            return Err(ApiError::AccountExists);
        }
        reply.error_for_status()?.json()
    }

    async fn logout(&self) -> Result<(), ApiError> {
        let url = self.http.endpoint(&["api", "auth", "logout"]);
        self.http
            .send(Method::POST, url, None)
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, ApiError> {
        let url = self.http.endpoint(&["api", "users", "me"]);
        let body = serde_json::to_value(update)?;

        self.http
            .send(Method::PATCH, url, Some(body))
            .await?
            .error_for_status()?
            .json()
    }

    async fn delete_account(&self) -> Result<(), ApiError> {
        let url = self.http.endpoint(&["api", "users", "me"]);
        self.http
            .send(Method::DELETE, url, None)
            .await?
            .error_for_status()?;
        Ok(())
    }
}
