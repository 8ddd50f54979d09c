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

//! In-memory image fetching for bundled assets, tools, and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use pinax_core::fetch::{FetchError, ImageFetcher};
use pinax_core::image::ImageData;

/// Serves images from an in-memory table keyed by reference.
///
/// Useful for bundled art that ships with the application, and as a
/// deterministic fetcher in tests and demos. A reference with no entry
/// reports a [`FetchError::Request`], like a dead URL would.
#[derive(Debug, Clone, Default)]
pub struct MemoryImageFetcher {
    images: HashMap<String, ImageData>,
}

impl MemoryImageFetcher {
    /// Creates an empty fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `data` under `reference`, replacing any previous entry.
    pub fn insert(&mut self, reference: impl Into<String>, data: ImageData) {
        self.images.insert(reference.into(), data);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_image(mut self, reference: impl Into<String>, data: ImageData) -> Self {
        self.insert(reference, data);
        self
    }
}

#[async_trait]
impl ImageFetcher for MemoryImageFetcher {
    async fn fetch(&self, reference: &str) -> Result<ImageData, FetchError> {
        match self.images.get(reference) {
            Some(data) => Ok(data.clone()),
            None => Err(FetchError::Request {
                reference: reference.to_string(),
                detail: "no image registered for reference".to_string(),
            }),
        }
    }
}
