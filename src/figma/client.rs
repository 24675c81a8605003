//! REST client for the Figma API.
//!
//! Two endpoints are used: `GET /files/{key}` for the full document tree and
//! `GET /images/{key}?ids=..&format=svg` for render URLs. Every request carries
//! the personal access token in the `X-Figma-Token` header.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::document::{FileResponse, ImagesResponse};
use super::{ApiError, DesignApi, DocumentNode, ImageFormat};
use crate::user_agent;

/// Header carrying the personal access token.
const TOKEN_HEADER: &str = "x-figma-token";

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Large files take a while to serialize server-side.
const READ_TIMEOUT_SECS: u64 = 300;

/// Figma REST client.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct FigmaClient {
    client: Client,
    base_url: String,
}

impl FigmaClient {
    /// Creates a client for `base_url` (e.g. `https://api.figma.com/v1`).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] if the token is not a valid
    /// header value or the HTTP client cannot be built.
    pub fn new(base_url: &str, token: &str) -> Result<Self, ApiError> {
        let mut token_value = HeaderValue::from_str(token)
            .map_err(|_| ApiError::invalid_request("access token contains invalid characters"))?;
        token_value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(TOKEN_HEADER, token_value);

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
            .gzip(true)
            .user_agent(user_agent::default_user_agent())
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::invalid_request(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Returns the configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn files_url(&self, file_id: &str) -> String {
        format!("{}/files/{file_id}", self.base_url)
    }

    fn images_url(
        &self,
        file_id: &str,
        ids: &[String],
        format: ImageFormat,
    ) -> Result<Url, ApiError> {
        let mut url = Url::parse(&format!("{}/images/{file_id}", self.base_url))
            .map_err(|e| ApiError::invalid_request(format!("invalid API base URL: {e}")))?;
        url.query_pairs_mut()
            .append_pair("ids", &ids.join(","))
            .append_pair("format", format.as_str());
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::transport(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::http_status(url, status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::transport(url, e))?;
        decode_body(&body).map_err(|e| ApiError::decode(url, e.to_string()))
    }
}

/// Decodes a JSON body without serde_json's nesting limit.
///
/// Every tree level costs two JSON levels, so the default limit of 128 would
/// reject documents with more than about sixty nested frames.
fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, serde_json::Error> {
    let mut deserializer = serde_json::Deserializer::from_slice(body);
    deserializer.disable_recursion_limit();
    let value = T::deserialize(&mut deserializer)?;
    deserializer.end()?;
    Ok(value)
}

#[async_trait]
impl DesignApi for FigmaClient {
    #[instrument(skip(self))]
    async fn fetch_document_tree(&self, file_id: &str) -> Result<DocumentNode, ApiError> {
        let url = self.files_url(file_id);
        let file: FileResponse = self.get_json(&url).await?;
        debug!(pages = file.document.children.len(), "fetched document tree");
        Ok(file.document)
    }

    #[instrument(skip(self, ids), fields(ids = ids.len()))]
    async fn resolve_image_urls(
        &self,
        file_id: &str,
        ids: &[String],
        format: ImageFormat,
    ) -> Result<HashMap<String, Option<String>>, ApiError> {
        let url = self.images_url(file_id, ids, format)?;
        let response: ImagesResponse = self.get_json(url.as_str()).await?;
        if let Some(message) = response.err {
            return Err(ApiError::Api {
                url: url.to_string(),
                message,
            });
        }
        debug!(resolved = response.images.len(), "resolved image urls");
        Ok(response.images)
    }
}
