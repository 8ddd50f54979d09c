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

//! The rendering-surface contract.
//!
//! A surface is the live rendering target: it owns a named-image registry and
//! hosts installed data sources. This module defines the abstract interface
//! the provisioning layer consumes; concrete surfaces live in `pinax-infra`
//! or in the embedding application.

mod source;

pub use source::{SourceData, SourceOptions};

use crate::image::ImageData;

/// A live rendering target owning a named-image registry and hosted sources.
///
/// Surfaces are single-owner: all mutation happens from one logical thread of
/// control, the surface's command context. Nothing in this trait is `Send` or
/// `Sync`; the provisioning layer is responsible for marshaling asynchronous
/// work back onto the owning thread before calling any `&mut self` method.
///
/// Registry semantics: image names are the only identity. Adding an image
/// under an existing name replaces it; removing an absent name is a silent
/// no-op, not an error.
pub trait Surface {
    /// Returns whether an image is present in the registry under `name`.
    fn has_image(&self, name: &str) -> bool;

    /// Installs `image` into the registry under `name`.
    fn add_image(&mut self, name: &str, image: ImageData);

    /// Removes the image registered under `name`, if any.
    fn remove_image(&mut self, name: &str);

    /// Installs a data source on the surface.
    fn install_source(&mut self, id: &str, data: &SourceData, options: &SourceOptions);

    /// Removes the data source installed under `id`, if any.
    fn remove_source(&mut self, id: &str);

    /// Replaces the data of an already-installed source.
    fn update_source(&mut self, id: &str, data: &SourceData);
}
