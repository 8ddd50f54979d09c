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

//! # Pinax Core
//!
//! Foundational crate containing traits, core types, and interface contracts
//! for attaching data sources to a live rendering surface.
//!
//! This crate defines the "common language" shared by the provisioning and
//! infrastructure crates: the [`Surface`] contract, the named-image value
//! types, the asynchronous [`ImageFetcher`] seam, and the generic event
//! primitives. It has no knowledge of how images are fetched or where
//! surfaces come from.

#![warn(missing_docs)]

pub mod event;
pub mod fetch;
pub mod image;
pub mod surface;

pub use event::{EventBus, ResourceEvent};
pub use fetch::{FetchError, ImageFetcher};
pub use image::{ImageClass, ImageData, ImagePayload, NamedImage};
pub use surface::{SourceData, SourceOptions, Surface};
