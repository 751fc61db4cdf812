//! TMDB catalog client.
//!
//! A thin pass-through: requests are signed with the configured API key and
//! the JSON bodies are handed back untouched for the frontend to render.

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::TmdbConfig;
use crate::error::{AppError, AppResult};

/// HTTP connect timeout for catalog calls.
const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// HTTP total timeout for catalog calls.
const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const LANGUAGE: &str = "en-US";

/// What a search covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    Multi,
    Movie,
    Tv,
}

impl SearchScope {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "multi" => Some(Self::Multi),
            "movie" => Some(Self::Movie),
            "tv" => Some(Self::Tv),
            _ => None,
        }
    }

    fn path(&self) -> &'static str {
        match self {
            Self::Multi => "/search/multi",
            Self::Movie => "/search/movie",
            Self::Tv => "/search/tv",
        }
    }
}

/// What a discover listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoverScope {
    Movie,
    Tv,
}

impl DiscoverScope {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "movie" => Some(Self::Movie),
            "tv" => Some(Self::Tv),
            _ => None,
        }
    }

    fn path(&self) -> &'static str {
        match self {
            Self::Movie => "/discover/movie",
            Self::Tv => "/discover/tv",
        }
    }
}

/// Client for the TMDB v3 API.
#[derive(Clone)]
pub struct TmdbClient {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl TmdbClient {
    pub fn new(config: &TmdbConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(HTTP_CONNECT_TIMEOUT)
            .timeout(HTTP_REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build catalog HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// Movie details.
    pub async fn movie(&self, id: u64) -> AppResult<Value> {
        self.get(&format!("/movie/{}", id), &[]).await
    }

    /// TV show details.
    pub async fn tv(&self, id: u64) -> AppResult<Value> {
        self.get(&format!("/tv/{}", id), &[]).await
    }

    /// Title search. `query` must not be blank.
    pub async fn search(&self, scope: SearchScope, query: &str, page: u32) -> AppResult<Value> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidInput("query must not be empty".to_string()));
        }
        self.get(
            scope.path(),
            &[("query", query.to_string()), ("page", page.max(1).to_string())],
        )
        .await
    }

    /// Popular titles, most popular first.
    pub async fn discover(&self, scope: DiscoverScope, page: u32) -> AppResult<Value> {
        self.get(
            scope.path(),
            &[
                ("sort_by", "popularity.desc".to_string()),
                ("page", page.max(1).to_string()),
            ],
        )
        .await
    }

    fn url(&self, path: &str, params: &[(&str, String)]) -> String {
        let mut url = format!(
            "{}{}?language={}&include_adult=false",
            self.base_url, path, LANGUAGE
        );
        for (name, value) in params {
            url.push('&');
            url.push_str(name);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        url
    }

    async fn get(&self, path: &str, params: &[(&str, String)]) -> AppResult<Value> {
        let url = self.url(path, params);
        debug!(path = %path, "Catalog request");

        let response = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .send()
            .await
            .map_err(|e| {
                warn!(path = %path, "Catalog request failed: {}", e);
                AppError::Upstream(format!("Request to {} failed", path))
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound("Title".to_string()));
        }
        if !status.is_success() {
            warn!(path = %path, status = %status, "Catalog returned an error status");
            return Err(AppError::Upstream(format!("{} returned {}", path, status)));
        }

        response.json::<Value>().await.map_err(|e| {
            warn!(path = %path, "Catalog returned an unreadable body: {}", e);
            AppError::Upstream(format!("Invalid response from {}", path))
        })
    }
}
