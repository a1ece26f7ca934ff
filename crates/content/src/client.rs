//! HTTP client for the remote content API
//!
//! - `GET {base_url}/content?usmos=A,B` returns a JSON array of items
//! - `GET {base_url}/content/{id}` returns one item, or 404

use reqwest::{header, Client, StatusCode, Url};

use crate::{ContentConfig, ContentError, ContentItem, ContentService};

pub struct HttpContentService {
    http: Client,
    base_url: Url,
}

impl HttpContentService {
    pub fn new(config: ContentConfig) -> Result<Self, ContentError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        if let Some(key) = &config.api_key {
            let mut value = header::HeaderValue::from_str(&format!("Bearer {}", key))
                .map_err(|e| ContentError::Configuration(format!("Invalid API key: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }

        let http = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ContentError::Configuration(format!("HTTP client: {}", e)))?;

        let base_url = Url::parse(&config.base_url).map_err(|e| {
            ContentError::Configuration(format!("Invalid content API URL '{}': {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ContentError::Configuration(format!(
                "Content API URL '{}' cannot carry a path",
                config.base_url
            )));
        }

        Ok(Self { http, base_url })
    }

    /// `{base_url}/content/{segments..}` with each segment percent-encoded
    fn content_url(&self, segments: &[&str]) -> Result<Url, ContentError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ContentError::Configuration("Content API URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .push("content")
            .extend(segments);
        Ok(url)
    }
}

#[async_trait::async_trait]
impl ContentService for HttpContentService {
    async fn get_content_by_tags(&self, tags: &[String]) -> Result<Vec<ContentItem>, ContentError> {
        let response = self
            .http
            .get(self.content_url(&[])?)
            .query(&[("usmos", tags.join(","))])
            .send()
            .await
            .map_err(|e| ContentError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, "Content API rejected tag lookup");
            return Err(ContentError::Response(format!(
                "Content API returned {}: {}",
                status, body
            )));
        }

        let items: Vec<ContentItem> = response
            .json()
            .await
            .map_err(|e| ContentError::Response(format!("Failed to parse content: {}", e)))?;

        tracing::debug!(count = items.len(), "Content retrieved by tags");
        Ok(items)
    }

    async fn get_content_by_id(
        &self,
        content_id: &str,
    ) -> Result<Option<ContentItem>, ContentError> {
        let response = self
            .http
            .get(self.content_url(&[content_id])?)
            .send()
            .await
            .map_err(|e| ContentError::Request(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response
                .json()
                .await
                .map(Some)
                .map_err(|e| ContentError::Response(format!("Failed to parse content: {}", e))),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(ContentError::Response(format!(
                    "Content API returned {}: {}",
                    status, body
                )))
            }
        }
    }
}
