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

//! A headless in-memory surface.

use std::collections::HashMap;

use pinax_core::image::ImageData;
use pinax_core::surface::{SourceData, SourceOptions, Surface};

/// One recorded mutation of a [`HeadlessSurface`], in submission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceOp {
    /// `add_image` with this name.
    AddImage(String),
    /// `remove_image` with this name.
    RemoveImage(String),
    /// `install_source` with this id.
    InstallSource(String),
    /// `remove_source` with this id.
    RemoveSource(String),
    /// `update_source` with this id.
    UpdateSource(String),
}

/// An in-memory [`Surface`] with an append-only operation journal.
///
/// The journal records every call that changed surface state, in submission
/// order, which is exactly what the provisioning layer's ordering guarantees
/// are stated in terms of; tests assert against it directly. Calls that are
/// no-ops by contract (removing an absent name, updating an uninstalled
/// source) leave no journal entry.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    images: HashMap<String, ImageData>,
    sources: HashMap<String, (SourceData, SourceOptions)>,
    journal: Vec<SurfaceOp>,
}

impl HeadlessSurface {
    /// Creates an empty surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// The bitmap registered under `name`, if any.
    pub fn image(&self, name: &str) -> Option<&ImageData> {
        self.images.get(name)
    }

    /// Number of images currently in the registry.
    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    /// Whether a source is currently installed under `id`.
    pub fn contains_source(&self, id: &str) -> bool {
        self.sources.contains_key(id)
    }

    /// The data and options a source was installed with, if installed.
    pub fn source(&self, id: &str) -> Option<&(SourceData, SourceOptions)> {
        self.sources.get(id)
    }

    /// Every mutating call so far, in submission order.
    pub fn journal(&self) -> &[SurfaceOp] {
        &self.journal
    }

    /// How many times a source with `id` has been installed.
    pub fn installs(&self, id: &str) -> usize {
        self.journal
            .iter()
            .filter(|op| matches!(op, SurfaceOp::InstallSource(installed) if installed == id))
            .count()
    }
}

impl Surface for HeadlessSurface {
    fn has_image(&self, name: &str) -> bool {
        self.images.contains_key(name)
    }

    fn add_image(&mut self, name: &str, image: ImageData) {
        log::trace!("headless surface: add image '{name}'");
        self.images.insert(name.to_string(), image);
        self.journal.push(SurfaceOp::AddImage(name.to_string()));
    }

    fn remove_image(&mut self, name: &str) {
        if self.images.remove(name).is_some() {
            log::trace!("headless surface: remove image '{name}'");
            self.journal.push(SurfaceOp::RemoveImage(name.to_string()));
        }
    }

    fn install_source(&mut self, id: &str, data: &SourceData, options: &SourceOptions) {
        log::trace!("headless surface: install source '{id}'");
        self.sources
            .insert(id.to_string(), (data.clone(), options.clone()));
        self.journal.push(SurfaceOp::InstallSource(id.to_string()));
    }

    fn remove_source(&mut self, id: &str) {
        if self.sources.remove(id).is_some() {
            log::trace!("headless surface: remove source '{id}'");
            self.journal.push(SurfaceOp::RemoveSource(id.to_string()));
        }
    }

    fn update_source(&mut self, id: &str, data: &SourceData) {
        if let Some((stored, _)) = self.sources.get_mut(id) {
            log::trace!("headless surface: update source '{id}'");
            *stored = data.clone();
            self.journal.push(SurfaceOp::UpdateSource(id.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_is_keyed_by_name() {
        let mut surface = HeadlessSurface::new();
        surface.add_image("pin", ImageData::solid(1, 1, [1; 4]));
        surface.add_image("pin", ImageData::solid(2, 2, [2; 4]));

        assert_eq!(surface.image_count(), 1, "same name replaces");
        assert_eq!(surface.image("pin").unwrap().width, 2);

        surface.remove_image("absent");
        assert_eq!(surface.image_count(), 1, "absent removal is a no-op");
    }

    #[test]
    fn journal_preserves_submission_order() {
        let mut surface = HeadlessSurface::new();
        let data = SourceData::Shape("{}".to_string());
        surface.add_image("pin", ImageData::solid(1, 1, [0; 4]));
        surface.install_source("roads", &data, &SourceOptions::default());
        surface.remove_source("roads");

        assert_eq!(
            surface.journal(),
            &[
                SurfaceOp::AddImage("pin".to_string()),
                SurfaceOp::InstallSource("roads".to_string()),
                SurfaceOp::RemoveSource("roads".to_string()),
            ]
        );
    }

    #[test]
    fn update_source_only_touches_installed_sources() {
        let mut surface = HeadlessSurface::new();
        let original = SourceData::Shape("{}".to_string());
        let updated = SourceData::Url("https://tiles.test/roads.json".to_string());

        surface.update_source("roads", &updated);
        assert!(!surface.contains_source("roads"));
        assert!(surface.journal().is_empty(), "no-op leaves no entry");

        surface.install_source("roads", &original, &SourceOptions::default());
        surface.update_source("roads", &updated);
        assert_eq!(surface.source("roads").unwrap().0, updated);
    }
}
