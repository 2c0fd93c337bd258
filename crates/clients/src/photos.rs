//! Representative photos from Unsplash.

use async_trait::async_trait;
use serde::Deserialize;

use crate::http::{parse_response, ClientError, DEFAULT_TIMEOUT};

const UNSPLASH_SEARCH_URL: &str = "https://api.unsplash.com/search/photos";

/// Placeholder image labelled with the upper-cased query.
pub fn placeholder_url(query: &str) -> String {
    format!(
        "https://via.placeholder.com/400x300?text={}",
        query.to_uppercase().replace(' ', "+")
    )
}

/// Finds a photo for a free-text query. Falls back to [`placeholder_url`].
#[async_trait]
pub trait PhotoLookup: Send + Sync {
    async fn photo_url(&self, query: &str) -> String;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<PhotoResult>,
}

#[derive(Debug, Deserialize)]
struct PhotoResult {
    urls: PhotoUrls,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    regular: String,
}

/// Unsplash search client. Without an access key every lookup returns the
/// placeholder.
pub struct UnsplashClient {
    client: reqwest::Client,
    access_key: Option<String>,
    base_url: String,
}

impl UnsplashClient {
    pub fn new(client: reqwest::Client, access_key: Option<String>) -> Self {
        Self {
            client,
            access_key: access_key.filter(|k| !k.is_empty()),
            base_url: UNSPLASH_SEARCH_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn fetch(&self, access_key: &str, query: &str) -> Result<Option<String>, ClientError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("query", query), ("per_page", "1"), ("client_id", access_key)])
            .timeout(DEFAULT_TIMEOUT)
            .send()
            .await?;

        let body: SearchResponse = parse_response(response).await?;
        Ok(body.results.into_iter().next().map(|r| r.urls.regular))
    }
}

#[async_trait]
impl PhotoLookup for UnsplashClient {
    async fn photo_url(&self, query: &str) -> String {
        let Some(access_key) = self.access_key.as_deref() else {
            return placeholder_url(query);
        };

        match self.fetch(access_key, query).await {
            Ok(Some(url)) => url,
            Ok(None) => placeholder_url(query),
            Err(e) => {
                tracing::warn!(error = %e, query, "Photo lookup failed");
                placeholder_url(query)
            }
        }
    }
}
