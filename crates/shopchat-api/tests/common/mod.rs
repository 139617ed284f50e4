#![allow(dead_code)]

use serde_json::{json, Value};
use shopchat_api::{ApiConfig, AuthClient, HttpClient, SessionClient};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mock backend with helpers for the endpoints the clients use
pub struct BackendMock {
    pub server: MockServer,
}

impl BackendMock {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn http(&self) -> HttpClient {
        HttpClient::new(&ApiConfig::new(&self.server.uri()).with_verbose(true))
            .expect("mock server uri is a valid base url")
    }

    pub fn session_client(&self) -> SessionClient {
        SessionClient::new(self.http())
    }

    pub fn auth_client(&self) -> AuthClient {
        AuthClient::new(self.http())
    }

    /// Respond to `method path` with a JSON body
    pub async fn respond(&self, verb: &str, route: &str, status: u16, body: Value) {
        Mock::given(method(verb))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// JSON bodies of every request received on `route`
    pub async fn bodies_for(&self, route: &str) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.url.path() == route)
            .map(|r| serde_json::from_slice(&r.body).unwrap_or(Value::Null))
            .collect()
    }
}

pub fn user_json(id: &str, name: &str, email: &str) -> Value {
    json!({
        "id": id,
        "email": email,
        "name": name,
        "role": "user",
        "created_at": "2025-01-01T00:00:00",
        "updated_at": "2025-01-01T00:00:00"
    })
}

/// Client pointed at a port nothing listens on
pub fn unreachable_http() -> HttpClient {
    HttpClient::new(&ApiConfig::new("http://127.0.0.1:1")).expect("valid url")
}
