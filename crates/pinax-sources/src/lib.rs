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

//! Attachable data sources for pinax surfaces.
//!
//! This crate coordinates the gap between "a source was asked to attach" and
//! "every image the source needs exists on the surface". [`ImageSet`] tracks
//! the wanted images and computes the missing subset, [`ProvisioningTask`]
//! fetches a batch of missing remote images concurrently, and
//! [`SourceLifecycle`] owns the attach/detach state machine that stays safe
//! against detachment racing an in-flight fetch.

pub mod image_set;
pub mod lifecycle;
pub mod provisioning;

pub use image_set::{ImageSet, MissingImages, RemoteImage};
pub use lifecycle::{LifecycleState, SourceLifecycle};
pub use provisioning::{ProvisioningComplete, ProvisioningTask, RoundPurpose};
