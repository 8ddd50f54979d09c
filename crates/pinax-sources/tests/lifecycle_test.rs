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

//! End-to-end lifecycle scenarios: attach gated on real (stubbed) fetch
//! fan-out, detach racing in-flight rounds, and refresh rounds.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use pinax_core::fetch::{FetchError, ImageFetcher};
use pinax_core::image::ImageData;
use pinax_core::surface::{SourceData, Surface};
use pinax_infra::fetch::MemoryImageFetcher;
use pinax_infra::surface::{HeadlessSurface, SurfaceOp};
use pinax_sources::{LifecycleState, SourceLifecycle};

/// Delegates to a [`MemoryImageFetcher`] while recording every reference in
/// fetch order.
struct RecordingFetcher {
    inner: MemoryImageFetcher,
    log: Mutex<Vec<String>>,
}

impl RecordingFetcher {
    fn new(inner: MemoryImageFetcher) -> Self {
        Self {
            inner,
            log: Mutex::new(Vec::new()),
        }
    }

    fn fetched(&self) -> Vec<String> {
        self.log.lock().expect("log lock").clone()
    }
}

#[async_trait]
impl ImageFetcher for RecordingFetcher {
    async fn fetch(&self, reference: &str) -> Result<ImageData, FetchError> {
        self.log
            .lock()
            .expect("log lock")
            .push(reference.to_string());
        self.inner.fetch(reference).await
    }
}

/// Holds every fetch on a semaphore until the test releases it.
struct GatedFetcher {
    gate: Arc<tokio::sync::Semaphore>,
}

impl GatedFetcher {
    fn new() -> (Self, Arc<tokio::sync::Semaphore>) {
        let gate = Arc::new(tokio::sync::Semaphore::new(0));
        (
            Self {
                gate: Arc::clone(&gate),
            },
            gate,
        )
    }
}

#[async_trait]
impl ImageFetcher for GatedFetcher {
    async fn fetch(&self, _reference: &str) -> Result<ImageData, FetchError> {
        let permit = self
            .gate
            .acquire()
            .await
            .expect("gate stays open for the test's lifetime");
        permit.forget();
        Ok(ImageData::solid(1, 1, [255, 0, 0, 255]))
    }
}

fn pump_until_attached<S: Surface>(source: &mut SourceLifecycle<S>) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while source.state() != LifecycleState::Attached && Instant::now() < deadline {
        source.pump_timeout(Duration::from_millis(50));
    }
    assert_eq!(source.state(), LifecycleState::Attached, "attach completed");
}

#[test]
fn test_mixed_batch_tolerates_a_failing_image() {
    let runtime = tokio::runtime::Runtime::new().expect("runtime");

    // "b" resolves, "c" has no entry and fails like a dead URL.
    let fetcher =
        MemoryImageFetcher::new().with_image("mem://b", ImageData::solid(4, 4, [0, 255, 0, 255]));

    let mut source = SourceLifecycle::new(
        "poi",
        SourceData::Shape("{}".to_string()),
        Arc::new(fetcher),
        runtime.handle().clone(),
    );
    source.bind(HeadlessSurface::new());
    source.set_native_images([("a".to_string(), ImageData::solid(2, 2, [9; 4]))]);
    source.set_images([
        ("b".to_string(), "mem://b".to_string()),
        ("c".to_string(), "mem://c".to_string()),
    ]);

    source.attach();
    assert_eq!(
        source.state(),
        LifecycleState::AttachRequested,
        "remote images pending, attach must not block"
    );
    // The local image is committed before the round resolves.
    assert!(source.surface().unwrap().has_image("a"));

    pump_until_attached(&mut source);

    let surface = source.surface().unwrap();
    assert!(surface.has_image("a"));
    assert!(surface.has_image("b"));
    assert!(!surface.has_image("c"), "failed image is simply absent");
    assert_eq!(surface.installs("poi"), 1, "source installed exactly once");
}

#[test]
fn test_detach_before_completion_suppresses_the_attach() {
    let runtime = tokio::runtime::Runtime::new().expect("runtime");
    let (fetcher, gate) = GatedFetcher::new();

    let mut source = SourceLifecycle::new(
        "poi",
        SourceData::Shape("{}".to_string()),
        Arc::new(fetcher),
        runtime.handle().clone(),
    );
    source.bind(HeadlessSurface::new());
    source.set_images([("pin".to_string(), "gated://pin".to_string())]);

    source.attach();
    assert_eq!(source.state(), LifecycleState::AttachRequested);

    // Detach while the fetch is still parked on the gate.
    source.detach();
    assert_eq!(source.state(), LifecycleState::Detached);

    // Let the fetch resolve, then give its completion every chance to land.
    gate.add_permits(1);
    source.pump_timeout(Duration::from_secs(5));
    source.pump_timeout(Duration::from_millis(200));

    assert_eq!(source.state(), LifecycleState::Detached, "no ghost attach");
    let surface = source.surface().unwrap();
    assert_eq!(surface.installs("poi"), 0, "source never installed");
    assert!(
        surface.journal().is_empty(),
        "registry untouched after the fetch resolves"
    );
}

#[test]
fn test_superset_refresh_fetches_only_new_names() {
    let runtime = tokio::runtime::Runtime::new().expect("runtime");

    let fetcher = Arc::new(RecordingFetcher::new(
        MemoryImageFetcher::new()
            .with_image("mem://a", ImageData::solid(1, 1, [1; 4]))
            .with_image("mem://b", ImageData::solid(1, 1, [2; 4])),
    ));

    let mut source = SourceLifecycle::new(
        "poi",
        SourceData::Shape("{}".to_string()),
        Arc::clone(&fetcher) as Arc<dyn ImageFetcher>,
        runtime.handle().clone(),
    );
    source.bind(HeadlessSurface::new());
    source.set_images([("a".to_string(), "mem://a".to_string())]);

    source.attach();
    pump_until_attached(&mut source);
    assert_eq!(fetcher.fetched(), vec!["mem://a"]);

    // Superset: "a" is already on the surface, only "b" may be fetched.
    source.set_images([
        ("a".to_string(), "mem://a".to_string()),
        ("b".to_string(), "mem://b".to_string()),
    ]);

    let deadline = Instant::now() + Duration::from_secs(5);
    while !source.surface().unwrap().has_image("b") && Instant::now() < deadline {
        source.pump_timeout(Duration::from_millis(50));
    }

    let surface = source.surface().unwrap();
    assert!(surface.has_image("a"));
    assert!(surface.has_image("b"));
    assert_eq!(
        fetcher.fetched(),
        vec!["mem://a", "mem://b"],
        "present names are not re-fetched"
    );
    assert_eq!(surface.installs("poi"), 1, "refresh never re-installs");
}

#[test]
fn test_stale_round_cannot_double_install_after_reattach() {
    let runtime = tokio::runtime::Runtime::new().expect("runtime");
    let (fetcher, gate) = GatedFetcher::new();

    let mut source = SourceLifecycle::new(
        "poi",
        SourceData::Shape("{}".to_string()),
        Arc::new(fetcher),
        runtime.handle().clone(),
    );
    source.bind(HeadlessSurface::new());
    source.set_images([("pin".to_string(), "gated://pin".to_string())]);

    // Round one parks on the gate, then is orphaned by the detach.
    source.attach();
    source.detach();

    // Round two parks behind it.
    source.attach();
    assert_eq!(source.state(), LifecycleState::AttachRequested);

    // Release both rounds and drain everything that arrives.
    gate.add_permits(2);
    pump_until_attached(&mut source);
    source.pump_timeout(Duration::from_millis(200));
    source.pump();

    let surface = source.surface().unwrap();
    assert_eq!(
        surface.installs("poi"),
        1,
        "the orphaned round must not install a second time"
    );
    let adds = surface
        .journal()
        .iter()
        .filter(|op| matches!(op, SurfaceOp::AddImage(_)))
        .count();
    assert_eq!(adds, 1, "the orphaned round's image is dropped too");
}
