//! reqwest-backed [`ProductApi`] speaking the inventory REST contract.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, de::DeserializeOwned};

use super::{ApiError, ApiResult, ProductApi};
use crate::{
    config::ClientConfig,
    product::{HistoryLogEntry, Product, ProductFields},
};

/// HTTP client for one backend origin.
#[derive(Debug, Clone)]
pub struct HttpProductApi {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl HttpProductApi {
    /// Client with reqwest defaults (no explicit timeout).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Client built from config, applying `request_timeout_ms` when set.
    pub fn from_config(config: &ClientConfig) -> ApiResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(ms) = config.request_timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        Ok(Self {
            http: builder.build()?,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Origin with any trailing slash removed.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn products_url(&self) -> String {
        self.url("/api/products")
    }

    fn search_url(&self, name: &str) -> String {
        self.url(&format!("/api/products/search?name={}", urlencoding::encode(name)))
    }

    fn product_url(&self, id: &str) -> String {
        self.url(&format!("/api/products/{}", urlencoding::encode(id)))
    }

    fn history_url(&self, id: &str) -> String {
        format!("{}/history", self.product_url(id))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> ApiResult<T> {
        tracing::debug!(%url, "GET");
        let resp = self.http.get(url).send().await?;
        read_json(resp).await
    }
}

#[async_trait]
impl ProductApi for HttpProductApi {
    async fn list_products(&self) -> ApiResult<Vec<Product>> {
        self.get_json(self.products_url()).await
    }

    async fn search_products(&self, name: &str) -> ApiResult<Vec<Product>> {
        self.get_json(self.search_url(name)).await
    }

    async fn create_product(&self, draft: &ProductFields) -> ApiResult<Product> {
        tracing::debug!(name = %draft.name, "POST product");
        let resp = self
            .http
            .post(self.products_url())
            .json(draft)
            .send()
            .await?;
        read_json(resp).await
    }

    async fn update_product(&self, id: &str, fields: &ProductFields) -> ApiResult<Product> {
        tracing::debug!(%id, "PUT product");
        let resp = self.http.put(self.product_url(id)).json(fields).send().await?;
        read_json(resp).await
    }

    async fn delete_product(&self, id: &str) -> ApiResult<()> {
        tracing::debug!(%id, "DELETE product");
        let resp = self.http.delete(self.product_url(id)).send().await?;
        check_response(resp).await?;
        Ok(())
    }

    async fn product_history(&self, id: &str) -> ApiResult<Vec<HistoryLogEntry>> {
        self.get_json(self.history_url(id)).await
    }
}

/// Maps a non-success status to [`ApiError::Rejected`], lifting `{message}`
/// out of the body when the server sent JSON.
pub async fn check_response(resp: reqwest::Response) -> ApiResult<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.bytes().await.unwrap_or_default();
    let message = serde_json::from_slice::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty());
    Err(ApiError::Rejected {
        status: status.as_u16(),
        message,
    })
}

async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> ApiResult<T> {
    let resp = check_response(resp).await?;
    let body = resp.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}
