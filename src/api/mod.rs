//! HTTP client for the Truverizen backend.
//!
//! Thin wrappers over the REST endpoints used by the platform:
//! authentication, processing history, user/company administration and
//! the AI indexing service.

mod indexing;
mod types;

pub use indexing::{decode_payload, encode_file, encode_payload, DocumentIndexer};
pub use types::{
    ApiAuthUser, ApiCompany, ApiHistoryItem, ApiUser, AuthRequest, AuthResponse, IndexingRequest,
    IndexingResponse, NewCompanyPayload, NewUserPayload, UpdateUserPayload,
};

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

/// Default backend host used by the platform.
pub const DEFAULT_API_URL: &str = "http://16.16.197.117:5050";

/// Errors raised by backend calls.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid API URL '{0}'")]
    InvalidUrl(String),
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("API request failed: HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Failed to parse response: {0}")]
    Parse(String),
    #[error("Invalid API response: missing {0}")]
    MissingField(&'static str),
    #[error("{0}")]
    Rejected(String),
}

/// Client for the Truverizen REST API.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client for `base_url` with the given request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url =
            Url::parse(base_url).map_err(|_| ApiError::InvalidUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| ApiError::Connection(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let url = format!("{}/{}", base, path.trim_start_matches('/'));
        Url::parse(&url).map_err(|_| ApiError::InvalidUrl(url))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.endpoint(path)?;
        debug!("{} {}", method, url);
        Ok(self.client.request(method, url))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let resp = request
            .send()
            .await
            .map_err(|e| ApiError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            warn!("Backend returned HTTP {}", status);
            return Err(ApiError::Status { status, body });
        }

        Ok(resp)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self.send(self.request(Method::GET, path)?).await?;
        resp.json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn send_json<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<Response, ApiError> {
        self.send(self.request(method, path)?.json(body)).await
    }

    /// Check credentials against `POST /authenticate`.
    ///
    /// The backend answers 200 with `is_success: false` for bad credentials,
    /// which is reported as [`ApiError::Rejected`].
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<ApiAuthUser, ApiError> {
        let request = self
            .request(Method::POST, "authenticate")?
            .json(&AuthRequest { email, password });
        let resp = request
            .send()
            .await
            .map_err(|e| ApiError::Connection(e.to_string()))?;

        let auth: AuthResponse = resp
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;

        if !auth.is_success {
            return Err(ApiError::Rejected("Invalid email or password".to_string()));
        }

        let user = auth.user.ok_or(ApiError::MissingField("user"))?;
        info!("Authenticated {}", user.email);
        Ok(user)
    }

    /// Fetch processing history from `GET /show_data`.
    pub async fn history(&self) -> Result<Vec<ApiHistoryItem>, ApiError> {
        self.get_json("show_data").await
    }

    /// Fetch all users from `GET /users`.
    pub async fn users(&self) -> Result<Vec<ApiUser>, ApiError> {
        self.get_json("users").await
    }

    /// Fetch all companies from `GET /get_companies`.
    pub async fn companies(&self) -> Result<Vec<ApiCompany>, ApiError> {
        self.get_json("get_companies").await
    }

    pub async fn create_user(&self, payload: &NewUserPayload) -> Result<(), ApiError> {
        self.send_json(Method::POST, "create_user", payload).await?;
        info!("Created user {}", payload.email);
        Ok(())
    }

    pub async fn update_user(&self, id: &str, payload: &UpdateUserPayload) -> Result<(), ApiError> {
        let path = format!("update_user/{}", urlencoding::encode(id));
        self.send_json(Method::PUT, &path, payload).await?;
        info!("Updated user {}", id);
        Ok(())
    }

    pub async fn delete_user(&self, id: &str) -> Result<(), ApiError> {
        let path = format!("delete_user/{}", urlencoding::encode(id));
        self.send(self.request(Method::DELETE, &path)?).await?;
        info!("Deleted user {}", id);
        Ok(())
    }

    pub async fn add_company(&self, payload: &NewCompanyPayload) -> Result<(), ApiError> {
        self.send_json(Method::POST, "add_company", payload).await?;
        info!("Added company {}", payload.company_name);
        Ok(())
    }

    /// Send a base64 document to the AI indexing service and return the
    /// processed document, also base64.
    pub async fn process_document(&self, base64: &str) -> Result<String, ApiError> {
        let resp = self
            .send_json(
                Method::POST,
                "get_ai_indexing_processed",
                &IndexingRequest { base_64: base64 },
            )
            .await?;

        let body: IndexingResponse = resp
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;

        body.processed_base64
            .filter(|s| !s.is_empty())
            .ok_or(ApiError::MissingField("processed_base64"))
    }
}
