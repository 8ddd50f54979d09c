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

//! Concrete implementations of the pinax external-dependency contracts:
//! fetchers that resolve remote image references, and a headless in-memory
//! surface for tests, tools, and demos.

pub mod fetch;
pub mod surface;

pub use fetch::{HttpFetchError, HttpImageFetcher, MemoryImageFetcher};
pub use surface::{HeadlessSurface, SurfaceOp};
