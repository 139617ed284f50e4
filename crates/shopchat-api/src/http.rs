use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::{normalize_base_url, ApiConfig};
use crate::error::ApiError;
use crate::request_logger::{log_request, log_response};

/// Shared transport for all backend clients.
///
/// Cloning is cheap and clones share the connection pool and, natively, the
/// cookie jar that carries the session cookie set by login.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
    verbose: bool,
}

/// Status and body of a completed exchange
#[derive(Debug)]
pub struct Reply {
    pub status: StatusCode,
    pub body: String,
}

impl Reply {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Turn any non-2xx status into `ApiError::Status`
    pub fn error_for_status(self) -> Result<Self, ApiError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ApiError::Status {
                status: self.status.as_u16(),
                body: self.body,
            })
        }
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

impl HttpClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let normalized = normalize_base_url(&config.base_url);
        let base_url = Url::parse(&normalized)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", normalized, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(normalized));
        }

        Ok(Self {
            client: build_client()?,
            base_url,
            verbose: config.verbose,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join path segments onto the base URL, percent-encoding each segment
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Send a request with ambient credentials and read the whole body
    pub async fn send(&self, method: Method, url: Url, body: Option<Value>) -> Result<Reply, ApiError> {
        log_request(&method, &url, body.as_ref(), self.verbose);

        let mut request = self.client.request(method, url.clone());
        if let Some(ref body) = body {
            request = request.json(body);
        }

        let response = with_credentials(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        log_response(status, &url, &body, self.verbose);

        Ok(Reply { status, body })
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn build_client() -> Result<Client, ApiError> {
    Ok(Client::builder().cookie_store(true).build()?)
}

#[cfg(target_arch = "wasm32")]
fn build_client() -> Result<Client, ApiError> {
    Ok(Client::builder().build()?)
}

/// The browser owns the cookie jar; ask fetch to attach it to cross-origin calls
#[cfg(target_arch = "wasm32")]
fn with_credentials(request: RequestBuilder) -> RequestBuilder {
    request.fetch_credentials_include()
}

#[cfg(not(target_arch = "wasm32"))]
fn with_credentials(request: RequestBuilder) -> RequestBuilder {
    request
}
