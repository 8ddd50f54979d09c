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

//! Concurrent fetch fan-out for one batch of missing remote images.

use std::sync::Arc;

use pinax_core::fetch::{FetchError, ImageFetcher};
use pinax_core::image::ImageData;
use tokio::task::JoinSet;

use crate::image_set::RemoteImage;

/// Why a provisioning round was launched.
///
/// The lifecycle applies a completion differently depending on the purpose:
/// an `Attach` round gates the install of the source itself, a `Refresh`
/// round only tops up the registry of an already-attached source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPurpose {
    /// The round gates a pending attach.
    Attach,
    /// The round adds newly-tracked images to an attached source.
    Refresh,
}

/// The single terminal event of a provisioning round.
///
/// Fetched bitmaps ride in `results` so that the surface registry is only
/// ever written by the lifecycle, on the owning thread, never by the round's
/// worker tasks.
#[derive(Debug)]
pub struct ProvisioningComplete {
    /// Identity of the round this completion belongs to.
    pub round: u64,
    /// Purpose the round was launched with.
    pub purpose: RoundPurpose,
    /// Per-item outcome, one entry per issued fetch.
    pub results: Vec<(String, Result<ImageData, FetchError>)>,
}

/// One batch attempt to fetch a set of missing remote images concurrently.
///
/// Every item is fetched independently on the worker pool; a per-item failure
/// is recorded and never aborts its siblings. The completion event is sent
/// exactly once, after every issued fetch has resolved. A task is not
/// cancelable mid-flight; a stale round's completion is suppressed by the
/// lifecycle instead, and the wasted network work is tolerated.
#[derive(Debug)]
pub struct ProvisioningTask {
    round: u64,
    purpose: RoundPurpose,
    items: Vec<RemoteImage>,
}

impl ProvisioningTask {
    /// Creates a round for the given work items.
    pub fn new(round: u64, purpose: RoundPurpose, items: Vec<RemoteImage>) -> Self {
        Self {
            round,
            purpose,
            items,
        }
    }

    /// Identity of this round.
    pub fn round(&self) -> u64 {
        self.round
    }

    /// Number of fetches this round will issue.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the round has no work.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Launches the round, consuming it.
    ///
    /// An empty round completes synchronously on the calling thread, with an
    /// immediate success event and no worker involvement. Otherwise the
    /// fan-out runs on `runtime` and the completion is delivered through
    /// `completions` once the last item has resolved.
    pub fn launch(
        self,
        runtime: &tokio::runtime::Handle,
        fetcher: Arc<dyn ImageFetcher>,
        completions: flume::Sender<ProvisioningComplete>,
    ) {
        let Self {
            round,
            purpose,
            items,
        } = self;

        if items.is_empty() {
            log::debug!("provisioning round {round} has no items, completing immediately");
            let _ = completions.send(ProvisioningComplete {
                round,
                purpose,
                results: Vec::new(),
            });
            return;
        }

        log::debug!(
            "launching provisioning round {round} with {} item(s)",
            items.len()
        );

        runtime.spawn(async move {
            let mut fetches = JoinSet::new();
            for item in items {
                let fetcher = Arc::clone(&fetcher);
                fetches.spawn(async move {
                    let result = fetcher.fetch(&item.reference).await;
                    (item.name, result)
                });
            }

            let mut results = Vec::with_capacity(fetches.len());
            while let Some(joined) = fetches.join_next().await {
                match joined {
                    Ok(entry) => results.push(entry),
                    Err(join_error) => {
                        log::error!("provisioning fetch task failed to run: {join_error}");
                    }
                }
            }

            if completions
                .send(ProvisioningComplete {
                    round,
                    purpose,
                    results,
                })
                .is_err()
            {
                log::debug!("provisioning round {round} completed after its owner was dropped");
            }
        });
    }
}
