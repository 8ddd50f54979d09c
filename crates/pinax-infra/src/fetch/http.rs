// Copyright 2026 pinax
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! HTTP-backed image fetching.

use async_trait::async_trait;
use pinax_core::fetch::{FetchError, ImageFetcher};
use pinax_core::image::ImageData;
use thiserror::Error;

/// What went wrong while resolving one reference over HTTP.
///
/// This is the rich, infra-side error; at the [`ImageFetcher`] seam it is
/// flattened into the contract's [`FetchError`] taxonomy.
#[derive(Debug, Error)]
pub enum HttpFetchError {
    /// The request itself failed (transport, TLS, non-success status, body).
    #[error("request for '{reference}' failed: {source}")]
    Request {
        /// The reference that was being fetched.
        reference: String,
        /// The underlying client error.
        source: reqwest::Error,
    },
    /// The response body is not a decodable image.
    #[error("response for '{reference}' is not a decodable image: {source}")]
    Decode {
        /// The reference that was being fetched.
        reference: String,
        /// The underlying decoder error.
        source: image::ImageError,
    },
}

impl From<HttpFetchError> for FetchError {
    fn from(error: HttpFetchError) -> Self {
        match error {
            HttpFetchError::Request { reference, source } => FetchError::Request {
                reference,
                detail: source.to_string(),
            },
            HttpFetchError::Decode { reference, source } => FetchError::Decode {
                reference,
                detail: source.to_string(),
            },
        }
    }
}

/// Resolves image references with a shared HTTP client and decodes the
/// response body to RGBA8.
///
/// No retry, backoff, or timeout policy beyond the client's own defaults: a
/// failed reference is reported and simply stays absent until the caller
/// re-provisions.
#[derive(Debug, Clone, Default)]
pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    /// Creates a fetcher with a default client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fetcher reusing an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn fetch_decoded(&self, reference: &str) -> Result<ImageData, HttpFetchError> {
        let response = self
            .client
            .get(reference)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|source| HttpFetchError::Request {
                reference: reference.to_string(),
                source,
            })?;
        let bytes = response
            .bytes()
            .await
            .map_err(|source| HttpFetchError::Request {
                reference: reference.to_string(),
                source,
            })?;
        log::debug!("fetched {} byte(s) from '{reference}'", bytes.len());
        decode(reference, &bytes)
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, reference: &str) -> Result<ImageData, FetchError> {
        self.fetch_decoded(reference).await.map_err(FetchError::from)
    }
}

fn decode(reference: &str, bytes: &[u8]) -> Result<ImageData, HttpFetchError> {
    let decoded = image::load_from_memory(bytes).map_err(|source| HttpFetchError::Decode {
        reference: reference.to_string(),
        source,
    })?;

    // Keep in sRGB space; the surface expects plain RGBA8.
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(ImageData::new(width, height, rgba.into_raw()))
}
