use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::Config;
use crate::error::CatalogError;
use crate::models::{MovieDetail, MovieId, MoviePage};

#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn fetch_popular(&self, page: u32) -> Result<MoviePage, CatalogError>;
    async fn search(&self, query: &str) -> Result<MoviePage, CatalogError>;
    async fn fetch_detail(&self, id: MovieId) -> Result<MovieDetail, CatalogError>;
}

#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    api_key: String,
    base_url: String,
    language: String,
}

impl TmdbClient {
    pub fn from_config(config: &Config) -> Result<Self> {
        let user_agent = format!("cinelist/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .context("Failed to build TMDB HTTP client")?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            language: config.language.clone(),
        })
    }

    fn url(&self, path: &str, extra: &str) -> String {
        format!(
            "{}{path}?api_key={}&language={}{extra}",
            self.base_url,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(&self.language)
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, extra: &str) -> Result<T, CatalogError> {
        if self.api_key.is_empty() {
            return Err(CatalogError::MissingCredential);
        }
        if !self.base_url.starts_with("http") {
            return Err(CatalogError::InvalidRequest(format!(
                "base url '{}' is not http(s)",
                self.base_url
            )));
        }
        let res = self.client.get(self.url(path, extra)).send().await?;
        let status = res.status();
        let text = res.text().await?;
        debug!("GET {} -> {} ({} bytes)", path, status, text.len());
        if !status.is_success() {
            return Err(CatalogError::InvalidRequest(format!("{path} -> {status}")));
        }
        if text.trim().is_empty() {
            return Err(CatalogError::Unknown);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl CatalogApi for TmdbClient {
    async fn fetch_popular(&self, page: u32) -> Result<MoviePage, CatalogError> {
        self.get_json("/movie/popular", &format!("&page={}", page.max(1)))
            .await
    }

    async fn search(&self, query: &str) -> Result<MoviePage, CatalogError> {
        let extra = format!("&query={}", urlencoding::encode(query));
        self.get_json("/search/movie", &extra).await
    }

    async fn fetch_detail(&self, id: MovieId) -> Result<MovieDetail, CatalogError> {
        self.get_json(&format!("/movie/{id}"), "&append_to_response=credits,videos")
            .await
    }
}
