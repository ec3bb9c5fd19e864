//! REST seam between the controller and the inventory backend.

/// `reqwest` implementation of [`ProductApi`].
pub mod http;

use async_trait::async_trait;
use thiserror::Error;

use crate::product::{HistoryLogEntry, Product, ProductFields};

/// Failures talking to the inventory backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, DNS, TLS, or timeout failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// Non-success status; `message` is the server's `{message}` when it sent one.
    #[error("server rejected request ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Server-provided message.
        message: Option<String>,
    },
    /// Response body did not match the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    /// Anything else.
    #[error("{0}")]
    Other(String),
}

impl ApiError {
    /// Server-provided message, if the backend explained the rejection.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

/// Result of a backend call.
pub type ApiResult<T> = Result<T, ApiError>;

/// REST surface of the inventory backend.
#[async_trait]
pub trait ProductApi: Send + Sync + 'static {
    /// `GET /api/products`
    async fn list_products(&self) -> ApiResult<Vec<Product>>;
    /// `GET /api/products/search?name=<q>`
    async fn search_products(&self, name: &str) -> ApiResult<Vec<Product>>;
    /// `POST /api/products`
    async fn create_product(&self, draft: &ProductFields) -> ApiResult<Product>;
    /// `PUT /api/products/{id}`
    async fn update_product(&self, id: &str, fields: &ProductFields) -> ApiResult<Product>;
    /// `DELETE /api/products/{id}`
    async fn delete_product(&self, id: &str) -> ApiResult<()>;
    /// `GET /api/products/{id}/history`
    async fn product_history(&self, id: &str) -> ApiResult<Vec<HistoryLogEntry>>;

    /// Lists everything, or searches by name when `query` is set.
    async fn fetch_products(&self, query: Option<&str>) -> ApiResult<Vec<Product>> {
        match query {
            Some(name) => self.search_products(name).await,
            None => self.list_products().await,
        }
    }
}

/// Path of the CSV export endpoint, relative to the API origin.
pub const EXPORT_PATH: &str = "/api/products/export";

/// Absolute export URL for `base`, tolerating a trailing slash.
pub fn export_url(base: &str) -> String {
    format!("{}{EXPORT_PATH}", base.trim_end_matches('/'))
}
