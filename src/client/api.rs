use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use super::model::{ProductRecord, ProductRequest};
use super::session::Credential;
use crate::database::models::ProductId;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("credential expired or invalid")]
    Unauthorized { message: Option<String> },

    #[error("{}", .message.as_deref().unwrap_or("action is not allowed"))]
    Forbidden { message: Option<String> },

    #[error("{message}")]
    Validation {
        message: String,
        field_errors: BTreeMap<String, String>,
    },

    #[error("server responded with {status}")]
    Status { status: u16, message: Option<String> },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid server URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("credential store error: {0}")]
    CredentialStore(#[from] std::io::Error),
}

impl ClientError {
    /// Message supplied by the server, if the response carried one
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Unauthorized { message }
            | ClientError::Forbidden { message }
            | ClientError::Status { message, .. } => message.as_deref(),
            ClientError::Validation { message, .. } => Some(message),
            ClientError::Transport(_)
            | ClientError::Decode(_)
            | ClientError::InvalidUrl(_)
            | ClientError::CredentialStore(_) => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized { .. })
    }
}

/// Remote product API. Every call takes the credential explicitly.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list_products(&self, credential: &Credential) -> Result<Vec<ProductRecord>, ClientError>;

    async fn get_product(&self, credential: &Credential, id: ProductId) -> Result<ProductRecord, ClientError>;

    async fn create_product(
        &self,
        credential: &Credential,
        request: &ProductRequest,
    ) -> Result<ProductRecord, ClientError>;

    async fn update_product(
        &self,
        credential: &Credential,
        id: ProductId,
        request: &ProductRequest,
    ) -> Result<ProductRecord, ClientError>;

    async fn delete_product(&self, credential: &Credential, id: ProductId) -> Result<(), ClientError>;

    async fn logout(&self, credential: &Credential) -> Result<(), ClientError>;
}

/// Accepts both `{"success": true, "data": ...}` and a bare body
#[derive(Deserialize)]
#[serde(untagged)]
enum Body<T> {
    Enveloped { data: T },
    Bare(T),
}

impl<T> Body<T> {
    fn into_inner(self) -> T {
        match self {
            Body::Enveloped { data } => data,
            Body::Bare(data) => data,
        }
    }
}

#[derive(Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    field_errors: BTreeMap<String, String>,
}

/// reqwest-backed implementation talking to the catalog server
#[derive(Clone)]
pub struct HttpCatalogClient {
    base: Url,
    http: reqwest::Client,
}

impl HttpCatalogClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { base, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base.join(path)?)
    }

    fn request(&self, method: Method, url: Url, credential: &Credential) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(credential.as_str())
            .header(header::ACCEPT, "application/json")
    }

    async fn expect_body<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let response = Self::check_status(response).await?;
        let bytes = response.bytes().await?;
        let body: Body<T> = serde_json::from_slice(&bytes)?;
        Ok(body.into_inner())
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let bytes = response.bytes().await.unwrap_or_default();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap_or_default();
        tracing::debug!("Request failed with {}: {:?}", status, body.message);

        Err(match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized { message: body.message },
            StatusCode::FORBIDDEN => ClientError::Forbidden { message: body.message },
            StatusCode::UNPROCESSABLE_ENTITY => ClientError::Validation {
                message: body
                    .message
                    .unwrap_or_else(|| "The given data was invalid.".to_string()),
                field_errors: body.field_errors,
            },
            other => ClientError::Status {
                status: other.as_u16(),
                message: body.message,
            },
        })
    }

    /// GET /health without credentials
    pub async fn health(&self) -> Result<serde_json::Value, ClientError> {
        let response = self.http.get(self.endpoint("health")?).send().await?;
        Self::expect_body(response).await
    }
}

#[async_trait]
impl CatalogApi for HttpCatalogClient {
    async fn list_products(&self, credential: &Credential) -> Result<Vec<ProductRecord>, ClientError> {
        let url = self.endpoint("api/products")?;
        let response = self.request(Method::GET, url, credential).send().await?;
        Self::expect_body(response).await
    }

    async fn get_product(&self, credential: &Credential, id: ProductId) -> Result<ProductRecord, ClientError> {
        let url = self.endpoint(&format!("api/products/{id}"))?;
        let response = self.request(Method::GET, url, credential).send().await?;
        Self::expect_body(response).await
    }

    async fn create_product(
        &self,
        credential: &Credential,
        request: &ProductRequest,
    ) -> Result<ProductRecord, ClientError> {
        let url = self.endpoint("api/products")?;
        let response = self
            .request(Method::POST, url, credential)
            .json(request)
            .send()
            .await?;
        Self::expect_body(response).await
    }

    async fn update_product(
        &self,
        credential: &Credential,
        id: ProductId,
        request: &ProductRequest,
    ) -> Result<ProductRecord, ClientError> {
        let url = self.endpoint(&format!("api/products/{id}"))?;
        let response = self
            .request(Method::PUT, url, credential)
            .json(request)
            .send()
            .await?;
        Self::expect_body(response).await
    }

    async fn delete_product(&self, credential: &Credential, id: ProductId) -> Result<(), ClientError> {
        let url = self.endpoint(&format!("api/products/{id}"))?;
        let response = self.request(Method::DELETE, url, credential).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn logout(&self, credential: &Credential) -> Result<(), ClientError> {
        let url = self.endpoint("api/logout")?;
        let response = self.request(Method::POST, url, credential).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }
}
