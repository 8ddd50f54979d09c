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

// Pinax sandbox
// Runs one attach/detach cycle against a headless surface and prints the
// surface journal, so the provisioning flow can be watched with RUST_LOG.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use pinax_core::image::ImageData;
use pinax_core::surface::{SourceData, SourceOptions};
use pinax_infra::fetch::MemoryImageFetcher;
use pinax_infra::surface::HeadlessSurface;
use pinax_sources::SourceLifecycle;

fn main() -> Result<()> {
    env_logger::init();

    let runtime = tokio::runtime::Runtime::new().context("failed to build worker runtime")?;

    // A deterministic fetcher: "pin" resolves, "flag" fails like a dead URL.
    let fetcher = MemoryImageFetcher::new()
        .with_image("mem://pin", ImageData::solid(16, 16, [220, 40, 40, 255]));

    let mut source = SourceLifecycle::new(
        "demo-roads",
        SourceData::Shape(r#"{"type":"FeatureCollection","features":[]}"#.to_string()),
        Arc::new(fetcher),
        runtime.handle().clone(),
    );
    source.set_options(SourceOptions {
        cluster: Some(true),
        cluster_radius: Some(40),
        ..SourceOptions::default()
    });
    source.bind(HeadlessSurface::new());

    source.set_native_images([("dot".to_string(), ImageData::solid(8, 8, [40, 40, 220, 255]))]);
    source.set_images([
        ("pin".to_string(), "mem://pin".to_string()),
        ("flag".to_string(), "mem://flag".to_string()),
    ]);

    log::info!("requesting attach");
    source.attach();
    source.pump_timeout(Duration::from_secs(5));
    log::info!("state after pump: {:?}", source.state());

    source.on_resource_event("press", serde_json::json!({ "x": 120, "y": 48 }));
    if let Ok(event) = source.resource_events().try_recv() {
        log::info!("forwarded event {}: {}", event.name, event.payload);
    }

    source.detach();

    let surface = source
        .unbind()
        .context("surface was bound at the start of the run")?;
    for op in surface.journal() {
        println!("{op:?}");
    }

    Ok(())
}
