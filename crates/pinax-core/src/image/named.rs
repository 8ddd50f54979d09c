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

use super::ImageData;

/// The provenance class of a [`NamedImage`].
///
/// The two classes are provisioned through separate paths: local images are
/// committed to the surface synchronously, remote images go through an
/// asynchronous provisioning round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageClass {
    /// Already decoded in memory; no fetch required.
    Local,
    /// A remote reference that must be fetched and decoded first.
    Remote,
}

/// The payload carried by a [`NamedImage`], one variant per provenance class.
#[derive(Debug, Clone, PartialEq)]
pub enum ImagePayload {
    /// An already-decoded bitmap.
    Local(ImageData),
    /// An opaque reference (typically a URL) resolved by an
    /// [`ImageFetcher`](crate::fetch::ImageFetcher).
    Remote(String),
}

/// An image a source wants present on the surface registry, keyed by name.
///
/// The name is the sole dedup and removal key: an image already present on
/// the surface under the same name is never re-provisioned, regardless of
/// payload. Name uniqueness is per attach cycle, not globally enforced.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedImage {
    /// Registry key on the surface.
    pub name: String,
    /// What to install under that key.
    pub payload: ImagePayload,
}

impl NamedImage {
    /// Creates a local (already-decoded) named image.
    pub fn local(name: impl Into<String>, data: ImageData) -> Self {
        Self {
            name: name.into(),
            payload: ImagePayload::Local(data),
        }
    }

    /// Creates a remote named image from a fetchable reference.
    pub fn remote(name: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload: ImagePayload::Remote(reference.into()),
        }
    }

    /// The provenance class of this image.
    pub fn class(&self) -> ImageClass {
        match self.payload {
            ImagePayload::Local(_) => ImageClass::Local,
            ImagePayload::Remote(_) => ImageClass::Remote,
        }
    }

    /// Whether this image still needs a fetch.
    pub fn is_remote(&self) -> bool {
        self.class() == ImageClass::Remote
    }
}
