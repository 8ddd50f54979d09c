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

//! The asynchronous image-fetching contract.
//!
//! Fetching a remote reference is a slow network operation, so the contract
//! is asynchronous and designed for fan-out: every item of a provisioning
//! round is fetched independently, in parallel, on a worker pool. A concrete
//! implementation of this trait lives in `pinax-infra` and typically wraps an
//! HTTP client plus an image decoder.

mod error;

pub use error::FetchError;

use crate::image::ImageData;
use async_trait::async_trait;

/// Retrieves remote image references and decodes them into bitmaps.
///
/// Implementations must be shareable across worker tasks (`Send + Sync`);
/// the provisioning layer holds them behind an `Arc` and issues one `fetch`
/// per missing image, concurrently.
///
/// A failed fetch is never fatal: the caller records the failure, the image
/// is simply absent from the surface afterward, and sibling fetches continue
/// unaffected.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Resolves a single reference into a decoded bitmap.
    async fn fetch(&self, reference: &str) -> Result<ImageData, FetchError>;
}
