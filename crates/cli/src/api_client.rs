use anyhow::{Context, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Client for the server's admin and health endpoints.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url).context("invalid server URL")?;
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
        })
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).context("failed to build API URL")
    }

    async fn send_json<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> Result<T> {
        let response = req.send().await?;
        let status = response.status();
        tracing::debug!(url = %response.url(), %status, "API response");
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            anyhow::bail!("API error ({}): {}", status, body);
        }
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn cache_stats(&self) -> Result<CacheStatsResponse> {
        let url = self.url("/api/admin/cache-stats")?;
        self.send_json(self.http.get(url)).await
    }

    /// Clear one resource's cache entry, or all entries when `resource` is `None`.
    pub async fn clear_cache(&self, resource: Option<&str>) -> Result<ClearCacheResponse> {
        let url = self.url("/api/admin/clear-cache")?;
        let req = ClearCacheRequest {
            resource_type: resource.map(str::to_string),
        };
        self.send_json(self.http.post(url).json(&req)).await
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        let url = self.url("/api/health")?;
        self.send_json(self.http.get(url)).await
    }
}

#[derive(Debug, Serialize)]
pub struct ClearCacheRequest {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CacheStatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub keys: u64,
    pub ksize: u64,
    pub vsize: u64,
}

#[derive(Debug, Deserialize)]
pub struct ClearCacheResponse {
    pub success: bool,
    pub message: String,
    pub timestamp: String,
    #[serde(flatten)]
    pub stats: CacheStatsResponse,
}

#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
