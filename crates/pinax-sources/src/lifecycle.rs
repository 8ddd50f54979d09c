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

//! The attach/detach state machine of a data source.
//!
//! A source may only be installed on its surface once every image it needs is
//! present in the surface registry. [`SourceLifecycle`] decides whether a
//! provisioning round is needed before attaching, launches it, and suppresses
//! its effect when the source is detached while fetches are still in flight.
//!
//! All surface mutation happens from the thread that calls into the
//! lifecycle. Worker tasks never touch the surface; their results come back
//! over a channel and take effect inside [`SourceLifecycle::pump`], which the
//! owning thread drives.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use pinax_core::event::{EventBus, ResourceEvent};
use pinax_core::fetch::{FetchError, ImageFetcher};
use pinax_core::image::{ImageClass, ImageData, ImagePayload, NamedImage};
use pinax_core::surface::{SourceData, SourceOptions, Surface};

use crate::image_set::ImageSet;
use crate::provisioning::{ProvisioningComplete, ProvisioningTask, RoundPurpose};

/// Where a source stands relative to its surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Not on the surface; the resting state.
    Detached,
    /// Attach requested, waiting for a provisioning round to finish.
    AttachRequested,
    /// Installed on the surface.
    Attached,
}

/// Coordinates attaching a data source to a surface, gated on image
/// provisioning, and stays safe against concurrent detachment.
///
/// The lifecycle owns the surface binding and is driven entirely from one
/// thread, the surface's command context. `attach` never blocks: when remote
/// images are missing the lifecycle parks in [`LifecycleState::AttachRequested`]
/// and finishes the attach when the round's completion is pumped. A `detach`
/// issued while a round is in flight wins unconditionally; the late
/// completion is dropped on arrival.
///
/// Every provisioning round carries an id. Completions whose id does not
/// match the current round are stale (a detach or a newer round superseded
/// them) and are discarded without touching the surface.
pub struct SourceLifecycle<S: Surface> {
    id: String,
    data: SourceData,
    options: SourceOptions,
    images: ImageSet,
    state: LifecycleState,
    round: u64,
    surface: Option<S>,
    fetcher: Arc<dyn ImageFetcher>,
    runtime: tokio::runtime::Handle,
    completion_tx: flume::Sender<ProvisioningComplete>,
    completion_rx: flume::Receiver<ProvisioningComplete>,
    events: EventBus<ResourceEvent>,
}

impl<S: Surface> SourceLifecycle<S> {
    /// Creates a detached lifecycle for the source `id`.
    ///
    /// `runtime` is the worker pool provisioning fetches run on; the calling
    /// thread itself never blocks on it.
    pub fn new(
        id: impl Into<String>,
        data: SourceData,
        fetcher: Arc<dyn ImageFetcher>,
        runtime: tokio::runtime::Handle,
    ) -> Self {
        let (completion_tx, completion_rx) = flume::unbounded();
        Self {
            id: id.into(),
            data,
            options: SourceOptions::default(),
            images: ImageSet::new(),
            state: LifecycleState::Detached,
            round: 0,
            surface: None,
            fetcher,
            runtime,
            completion_tx,
            completion_rx,
            events: EventBus::new(),
        }
    }

    /// Binds the surface this source will attach to.
    pub fn bind(&mut self, surface: S) {
        if self.surface.is_some() {
            log::warn!("source '{}': rebinding surface", self.id);
        }
        self.surface = Some(surface);
    }

    /// Releases the bound surface, if any.
    ///
    /// Unbinding while not detached logically detaches the source first: any
    /// in-flight round becomes stale and the state resets, but the departing
    /// surface is handed back untouched.
    pub fn unbind(&mut self) -> Option<S> {
        if self.state != LifecycleState::Detached {
            log::warn!(
                "source '{}': surface unbound while {:?}, resetting to detached",
                self.id,
                self.state
            );
            self.state = LifecycleState::Detached;
            self.round += 1;
        }
        self.surface.take()
    }

    /// Requests the source be attached to the bound surface.
    ///
    /// If nothing is missing from the surface registry the source is
    /// installed synchronously and no provisioning round is launched. Missing
    /// local images are committed synchronously either way; missing remote
    /// images launch a round, and the install happens when its completion is
    /// pumped, unless a detach arrives first.
    ///
    /// With no bound surface, or outside [`LifecycleState::Detached`], this
    /// is a logged no-op.
    pub fn attach(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            log::warn!("source '{}': attach with no bound surface", self.id);
            return;
        };
        if self.state != LifecycleState::Detached {
            log::debug!(
                "source '{}': attach ignored while {:?}",
                self.id,
                self.state
            );
            return;
        }

        let missing = self.images.compute_missing(&*surface);
        if missing.is_empty() {
            surface.install_source(&self.id, &self.data, &self.options);
            self.state = LifecycleState::Attached;
            log::debug!("source '{}' attached with no provisioning", self.id);
            return;
        }

        self.state = LifecycleState::AttachRequested;
        Self::commit_locals(surface, missing.local);

        if missing.remote.is_empty() {
            // Only locals were missing; nothing left to wait for.
            surface.install_source(&self.id, &self.data, &self.options);
            self.state = LifecycleState::Attached;
            log::debug!("source '{}' attached after local commit", self.id);
            return;
        }

        self.round += 1;
        ProvisioningTask::new(self.round, RoundPurpose::Attach, missing.remote).launch(
            &self.runtime,
            Arc::clone(&self.fetcher),
            self.completion_tx.clone(),
        );
    }

    /// Detaches the source. Always safe, idempotent, never blocking.
    ///
    /// Any in-flight provisioning round becomes stale. Leaving `Attached` or
    /// `AttachRequested` removes every tracked image name from the registry
    /// (locals may already be committed while a round is pending); leaving
    /// `Attached` also removes the installed source.
    pub fn detach(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            log::warn!("source '{}': detach with no bound surface", self.id);
            return;
        };
        let previous = self.state;
        self.state = LifecycleState::Detached;
        self.round += 1;

        if previous == LifecycleState::Detached {
            return;
        }

        let mut seen = HashSet::new();
        for name in self.images.names() {
            if seen.insert(name) {
                surface.remove_image(name);
            }
        }
        if previous == LifecycleState::Attached {
            surface.remove_source(&self.id);
        }
        log::debug!("source '{}' detached", self.id);
    }

    /// Replaces the tracked remote images with `(name, reference)` entries.
    ///
    /// While `Attached`, newly-missing names trigger a fresh refresh round;
    /// images already present on the surface are left untouched.
    pub fn set_images<I>(&mut self, images: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let images = images
            .into_iter()
            .map(|(name, reference)| NamedImage::remote(name, reference))
            .collect();
        self.images.replace_class(ImageClass::Remote, images);

        if self.state != LifecycleState::Attached {
            return;
        }
        let Some(surface) = self.surface.as_ref() else {
            return;
        };
        let missing = self.images.compute_missing(surface);
        if missing.remote.is_empty() {
            return;
        }
        self.round += 1;
        ProvisioningTask::new(self.round, RoundPurpose::Refresh, missing.remote).launch(
            &self.runtime,
            Arc::clone(&self.fetcher),
            self.completion_tx.clone(),
        );
    }

    /// Replaces the tracked local images with `(name, bitmap)` entries.
    ///
    /// While `Attached`, newly-missing locals are committed synchronously.
    pub fn set_native_images<I>(&mut self, images: I)
    where
        I: IntoIterator<Item = (String, ImageData)>,
    {
        let images = images
            .into_iter()
            .map(|(name, data)| NamedImage::local(name, data))
            .collect();
        self.images.replace_class(ImageClass::Local, images);

        if self.state != LifecycleState::Attached {
            return;
        }
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let missing = self.images.compute_missing(&*surface);
        Self::commit_locals(surface, missing.local);
    }

    /// Replaces the source data, updating the live source when attached.
    pub fn set_data(&mut self, data: SourceData) {
        self.data = data;
        if self.state == LifecycleState::Attached {
            if let Some(surface) = self.surface.as_mut() {
                surface.update_source(&self.id, &self.data);
            }
        }
    }

    /// Replaces the install options. Takes effect on the next install.
    pub fn set_options(&mut self, options: SourceOptions) {
        self.options = options;
    }

    /// Applies every provisioning completion currently queued.
    ///
    /// This is the marshaling point: the owning thread calls it (typically
    /// once per frame or after a wakeup) and all resulting surface writes
    /// happen here, serialized with every other lifecycle operation.
    pub fn pump(&mut self) {
        let completions: Vec<_> = self.completion_rx.try_iter().collect();
        for completion in completions {
            self.apply_completion(completion);
        }
    }

    /// Waits up to `timeout` for a completion, then drains the queue.
    pub fn pump_timeout(&mut self, timeout: Duration) {
        let completion = match self.completion_rx.recv_timeout(timeout) {
            Ok(completion) => completion,
            Err(_) => return,
        };
        self.apply_completion(completion);
        self.pump();
    }

    /// Forwards an interaction event to the external handler.
    pub fn on_resource_event(&self, name: impl Into<String>, payload: serde_json::Value) {
        self.events.publish(ResourceEvent {
            source_id: self.id.clone(),
            name: name.into(),
            payload,
        });
    }

    /// The receiver external handlers subscribe to for interaction events.
    pub fn resource_events(&self) -> &flume::Receiver<ResourceEvent> {
        self.events.receiver()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Id of the source this lifecycle manages.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The tracked image set.
    pub fn images(&self) -> &ImageSet {
        &self.images
    }

    /// The bound surface, if any.
    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    fn apply_completion(&mut self, completion: ProvisioningComplete) {
        if completion.round != self.round {
            log::debug!(
                "source '{}': dropping stale round {} (current {})",
                self.id,
                completion.round,
                self.round
            );
            return;
        }
        let Some(surface) = self.surface.as_mut() else {
            log::debug!(
                "source '{}': round {} completed with no bound surface",
                self.id,
                completion.round
            );
            return;
        };

        match (self.state, completion.purpose) {
            (LifecycleState::AttachRequested, RoundPurpose::Attach) => {
                Self::commit_fetched(&self.id, surface, completion.results);
                surface.install_source(&self.id, &self.data, &self.options);
                self.state = LifecycleState::Attached;
                log::debug!("source '{}' attached after provisioning", self.id);
            }
            (LifecycleState::Attached, RoundPurpose::Refresh) => {
                Self::commit_fetched(&self.id, surface, completion.results);
            }
            (state, purpose) => {
                log::debug!(
                    "source '{}': suppressing {:?} completion while {:?}",
                    self.id,
                    purpose,
                    state
                );
            }
        }
    }

    fn commit_locals(surface: &mut S, images: Vec<NamedImage>) {
        for image in images {
            let NamedImage { name, payload } = image;
            if let ImagePayload::Local(data) = payload {
                surface.add_image(&name, data);
            }
        }
    }

    fn commit_fetched(
        id: &str,
        surface: &mut S,
        results: Vec<(String, Result<ImageData, FetchError>)>,
    ) {
        for (name, result) in results {
            match result {
                Ok(data) => {
                    if !surface.has_image(&name) {
                        surface.add_image(&name, data);
                    }
                }
                Err(error) => {
                    log::warn!("source '{id}': image '{name}' failed to provision: {error}");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinax_infra::surface::{HeadlessSurface, SurfaceOp};

    /// Fetcher for tests that must never reach the network path.
    struct PanicFetcher;

    #[async_trait::async_trait]
    impl ImageFetcher for PanicFetcher {
        async fn fetch(&self, reference: &str) -> Result<ImageData, FetchError> {
            panic!("unexpected fetch of '{reference}'");
        }
    }

    fn lifecycle(runtime: &tokio::runtime::Runtime) -> SourceLifecycle<HeadlessSurface> {
        SourceLifecycle::new(
            "roads",
            SourceData::Shape("{}".to_string()),
            Arc::new(PanicFetcher),
            runtime.handle().clone(),
        )
    }

    #[test]
    fn operations_without_a_surface_are_noops() {
        let runtime = tokio::runtime::Runtime::new().expect("runtime");
        let mut source = lifecycle(&runtime);

        source.attach();
        assert_eq!(source.state(), LifecycleState::Detached);

        source.detach();
        assert_eq!(source.state(), LifecycleState::Detached);
    }

    #[test]
    fn attach_with_nothing_missing_installs_synchronously() {
        let runtime = tokio::runtime::Runtime::new().expect("runtime");
        let mut source = lifecycle(&runtime);
        source.bind(HeadlessSurface::new());

        source.attach();

        assert_eq!(source.state(), LifecycleState::Attached);
        let surface = source.surface().expect("bound");
        assert_eq!(
            surface.journal(),
            &[SurfaceOp::InstallSource("roads".to_string())],
            "exactly one install, no image traffic"
        );
    }

    #[test]
    fn attach_skips_provisioning_when_images_already_present() {
        let runtime = tokio::runtime::Runtime::new().expect("runtime");
        let mut source = lifecycle(&runtime);

        let mut surface = HeadlessSurface::new();
        surface.add_image("pin", ImageData::solid(1, 1, [0; 4]));
        source.bind(surface);

        // PanicFetcher proves no fetch is issued for the present name.
        source.set_images([("pin".to_string(), "stub://pin".to_string())]);
        source.attach();

        assert_eq!(source.state(), LifecycleState::Attached);
        assert_eq!(source.surface().unwrap().installs("roads"), 1);
    }

    #[test]
    fn attach_with_only_locals_missing_commits_and_installs_synchronously() {
        let runtime = tokio::runtime::Runtime::new().expect("runtime");
        let mut source = lifecycle(&runtime);
        source.bind(HeadlessSurface::new());

        source.set_native_images([("dot".to_string(), ImageData::solid(2, 2, [5; 4]))]);
        source.attach();

        assert_eq!(source.state(), LifecycleState::Attached);
        let surface = source.surface().unwrap();
        assert!(surface.has_image("dot"));
        assert_eq!(
            surface.journal(),
            &[
                SurfaceOp::AddImage("dot".to_string()),
                SurfaceOp::InstallSource("roads".to_string()),
            ]
        );
    }

    #[test]
    fn attach_while_attached_is_ignored() {
        let runtime = tokio::runtime::Runtime::new().expect("runtime");
        let mut source = lifecycle(&runtime);
        source.bind(HeadlessSurface::new());

        source.attach();
        source.attach();

        assert_eq!(source.surface().unwrap().installs("roads"), 1);
    }

    #[test]
    fn detach_removes_each_tracked_name_once() {
        let runtime = tokio::runtime::Runtime::new().expect("runtime");
        let mut source = lifecycle(&runtime);

        let mut surface = HeadlessSurface::new();
        // "pin" is tracked in both classes and already present, so nothing is
        // missing at attach time and the PanicFetcher stays untouched.
        surface.add_image("pin", ImageData::solid(1, 1, [0; 4]));
        source.bind(surface);

        source.set_native_images([
            ("pin".to_string(), ImageData::solid(1, 1, [0; 4])),
            ("dot".to_string(), ImageData::solid(1, 1, [1; 4])),
        ]);
        source.set_images([("pin".to_string(), "stub://pin".to_string())]);

        source.attach();
        assert_eq!(source.state(), LifecycleState::Attached);
        source.detach();

        let surface = source.surface().unwrap();
        let removals: Vec<_> = surface
            .journal()
            .iter()
            .filter(|op| matches!(op, SurfaceOp::RemoveImage(_)))
            .collect();
        assert_eq!(
            removals,
            vec![
                &SurfaceOp::RemoveImage("pin".to_string()),
                &SurfaceOp::RemoveImage("dot".to_string()),
            ],
            "union of both classes, each name at most once"
        );
        assert!(!surface.contains_source("roads"));
    }

    #[test]
    fn detach_is_idempotent() {
        let runtime = tokio::runtime::Runtime::new().expect("runtime");
        let mut source = lifecycle(&runtime);
        source.bind(HeadlessSurface::new());

        source.attach();
        source.detach();
        let journal_len = source.surface().unwrap().journal().len();

        source.detach();
        assert_eq!(source.state(), LifecycleState::Detached);
        assert_eq!(
            source.surface().unwrap().journal().len(),
            journal_len,
            "second detach touches nothing"
        );
    }

    #[test]
    fn set_native_images_while_attached_commits_missing_locals() {
        let runtime = tokio::runtime::Runtime::new().expect("runtime");
        let mut source = lifecycle(&runtime);
        source.bind(HeadlessSurface::new());
        source.attach();

        source.set_native_images([("badge".to_string(), ImageData::solid(3, 3, [7; 4]))]);

        let surface = source.surface().unwrap();
        assert!(surface.has_image("badge"));
        // Re-setting the same images provisions nothing new.
        let journal_len = surface.journal().len();
        source.set_native_images([("badge".to_string(), ImageData::solid(3, 3, [7; 4]))]);
        assert_eq!(source.surface().unwrap().journal().len(), journal_len);
    }

    #[test]
    fn set_data_while_attached_updates_the_live_source() {
        let runtime = tokio::runtime::Runtime::new().expect("runtime");
        let mut source = lifecycle(&runtime);
        source.bind(HeadlessSurface::new());
        source.attach();

        source.set_data(SourceData::Url("https://tiles.test/roads.json".to_string()));

        let surface = source.surface().unwrap();
        assert_eq!(
            surface.journal().last(),
            Some(&SurfaceOp::UpdateSource("roads".to_string()))
        );
    }

    #[test]
    fn resource_events_reach_subscribers() {
        let runtime = tokio::runtime::Runtime::new().expect("runtime");
        let source = lifecycle(&runtime);

        source.on_resource_event("press", serde_json::json!({ "x": 4, "y": 2 }));

        let event = source.resource_events().try_recv().expect("event queued");
        assert_eq!(event.source_id, "roads");
        assert_eq!(event.name, "press");
        assert_eq!(event.payload["x"], 4);
    }

    #[test]
    fn unbind_while_attached_resets_state() {
        let runtime = tokio::runtime::Runtime::new().expect("runtime");
        let mut source = lifecycle(&runtime);
        source.bind(HeadlessSurface::new());
        source.attach();

        let surface = source.unbind().expect("surface returned");
        assert!(surface.contains_source("roads"), "surface handed back as-is");
        assert_eq!(source.state(), LifecycleState::Detached);
    }
}
