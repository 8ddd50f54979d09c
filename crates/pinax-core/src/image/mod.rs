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

//! Primitive types for named surface images.
//!
//! A surface owns a registry of images keyed by name. The images a source
//! wants on that registry come from two provenance classes: bitmaps that are
//! already decoded in memory, and remote references that still need a fetch.
//! This module defines the value types for both; tracking, delta computation,
//! and provisioning live in higher-level crates.

mod data;
mod named;

pub use data::ImageData;
pub use named::{ImageClass, ImagePayload, NamedImage};
