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

//! Tracking of the images a source wants on its surface.

use pinax_core::image::{ImageClass, ImagePayload, NamedImage};
use pinax_core::surface::Surface;

/// A remote fetch work item: a registry name plus the reference to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteImage {
    /// Registry key the fetched bitmap will be installed under.
    pub name: String,
    /// The reference handed to the fetcher.
    pub reference: String,
}

/// The missing subset of an [`ImageSet`], split by provenance class.
#[derive(Debug, Clone, Default)]
pub struct MissingImages {
    /// Already-decoded images absent from the surface; committed synchronously.
    pub local: Vec<NamedImage>,
    /// Remote references absent from the surface; fetched by a provisioning round.
    pub remote: Vec<RemoteImage>,
}

impl MissingImages {
    /// True when nothing is missing in either class.
    pub fn is_empty(&self) -> bool {
        self.local.is_empty() && self.remote.is_empty()
    }
}

/// The set of named images a source wants present on its surface.
///
/// The set is an ordered sequence partitioned by provenance class at query
/// time. It only ever computes deltas; it never mutates the surface, and
/// replacing it never retroactively removes images already committed under a
/// previous set (removal is the lifecycle's explicit detach-time operation).
#[derive(Debug, Clone, Default)]
pub struct ImageSet {
    images: Vec<NamedImage>,
}

impl ImageSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Swaps the entire tracked set.
    pub fn replace(&mut self, images: Vec<NamedImage>) {
        self.images = images;
    }

    /// Swaps only the entries of one provenance class, preserving the other.
    ///
    /// Entries in `images` that belong to the other class are ignored.
    pub fn replace_class(&mut self, class: ImageClass, images: Vec<NamedImage>) {
        self.images.retain(|image| image.class() != class);
        self.images
            .extend(images.into_iter().filter(|image| image.class() == class));
    }

    /// Computes the subset not yet present on `surface`, by name.
    ///
    /// Name identity is the sole dedup key: an image already registered under
    /// the same name is excluded regardless of payload. An empty surface
    /// registry simply reports everything as missing; there is no error
    /// outcome.
    pub fn compute_missing<S: Surface>(&self, surface: &S) -> MissingImages {
        let mut missing = MissingImages::default();
        for image in &self.images {
            if surface.has_image(&image.name) {
                continue;
            }
            match &image.payload {
                ImagePayload::Local(_) => missing.local.push(image.clone()),
                ImagePayload::Remote(reference) => missing.remote.push(RemoteImage {
                    name: image.name.clone(),
                    reference: reference.clone(),
                }),
            }
        }
        missing
    }

    /// Iterates the tracked names in insertion order (duplicates included).
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.images.iter().map(|image| image.name.as_str())
    }

    /// True when no images are tracked.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Number of tracked images.
    pub fn len(&self) -> usize {
        self.images.len()
    }
}
