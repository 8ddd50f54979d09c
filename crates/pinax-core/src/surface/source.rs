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

use serde::{Deserialize, Serialize};

/// What a source displays: either an inline geometry document or a URL the
/// surface resolves itself.
///
/// The document is opaque here. Parsing and validation are the surface's
/// business, not the provisioning layer's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceData {
    /// An inline geometry document, passed through verbatim.
    Shape(String),
    /// A URL the surface fetches and parses on its own.
    Url(String),
}

/// Options forwarded verbatim to [`Surface::install_source`].
///
/// Every field is optional; unset fields defer to the surface's defaults.
///
/// [`Surface::install_source`]: crate::surface::Surface::install_source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceOptions {
    /// Cluster nearby point features.
    pub cluster: Option<bool>,
    /// Cluster radius in screen units.
    pub cluster_radius: Option<u32>,
    /// Highest zoom level at which clustering applies.
    pub cluster_max_zoom: Option<u32>,
    /// Highest zoom level at which the source is tiled.
    pub max_zoom: Option<u32>,
    /// Tile buffer size in screen units.
    pub buffer: Option<u32>,
    /// Geometry simplification tolerance.
    pub tolerance: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_default_to_all_unset() {
        let options = SourceOptions::default();
        let value = serde_json::to_value(&options).expect("options serialize");
        assert!(value.as_object().unwrap().values().all(|v| v.is_null()));
    }

    #[test]
    fn source_data_round_trips_through_serde() {
        let data = SourceData::Shape(r#"{"type":"FeatureCollection","features":[]}"#.into());
        let json = serde_json::to_string(&data).expect("serialize");
        let back: SourceData = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, data);
    }
}
