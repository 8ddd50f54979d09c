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

/// An interaction event forwarded from a source to an external handler.
///
/// The payload is an opaque JSON value; this crate never inspects it, it only
/// carries it from the surface boundary to whoever subscribed.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceEvent {
    /// Id of the source the event originated from.
    pub source_id: String,
    /// Event name, e.g. `"press"`.
    pub name: String,
    /// Opaque event payload.
    pub payload: serde_json::Value,
}
