// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The cache proper: lookup, lazy loading, periodic sweep.

use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::loader::AssetLoader;

/// A name-keyed cache of reference-counted assets.
///
/// Entries are shared out as [`Rc`] handles. [`AssetCache::update`] runs on
/// the frame clock and, at most once per [`AssetCache::SWEEP_INTERVAL`],
/// drops every entry whose only remaining reference is the cache's own.
pub struct AssetCache<L: AssetLoader> {
    loader: L,
    entries: HashMap<String, Rc<L::Asset>>,
    last_sweep: Option<Instant>,
}

impl<L: AssetLoader> core::fmt::Debug for AssetCache<L> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AssetCache")
            .field("entries", &self.entries.len())
            .field("last_sweep", &self.last_sweep)
            .finish_non_exhaustive()
    }
}

impl<L: AssetLoader> AssetCache<L> {
    /// Minimum frame-clock time between sweeps of unreferenced entries.
    pub const SWEEP_INTERVAL: Duration = Duration::from_millis(5000);

    /// Creates an empty cache around a loader.
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            entries: HashMap::new(),
            last_sweep: None,
        }
    }

    /// Returns the asset named `name`, loading it from `path` if it is not
    /// cached yet.
    ///
    /// Returns `None` if loading fails; nothing is cached in that case, so
    /// a later call retries.
    pub fn provide(&mut self, name: &str, path: impl AsRef<Path>) -> Option<Rc<L::Asset>> {
        if let Some(existing) = self.get(name) {
            return Some(existing);
        }
        self.load(name, path)
    }

    /// Unconditionally (re)loads `name` from `path`, overwriting any cached
    /// entry. Returns `None` on failure (the previous entry, if any, is
    /// kept).
    pub fn load(&mut self, name: &str, path: impl AsRef<Path>) -> Option<Rc<L::Asset>> {
        let path = path.as_ref();
        match self.loader.load(path) {
            Ok(asset) => {
                let asset = Rc::new(asset);
                self.entries.insert(name.to_owned(), Rc::clone(&asset));
                Some(asset)
            }
            Err(err) => {
                warn!("failed to load asset {name:?} from {}: {err}", path.display());
                None
            }
        }
    }

    /// Returns the cached asset named `name`. Never loads.
    pub fn get(&self, name: &str) -> Option<Rc<L::Asset>> {
        self.entries.get(name).map(Rc::clone)
    }

    /// Advances the cache's frame clock.
    ///
    /// Once more than [`Self::SWEEP_INTERVAL`] of frame time has passed
    /// since the previous sweep, drops every entry with no external
    /// references. The first call only arms the clock.
    pub fn update(&mut self, _dt: f64, frame: Instant) {
        match self.last_sweep {
            None => self.last_sweep = Some(frame),
            Some(last) if frame.duration_since(last) > Self::SWEEP_INTERVAL => {
                self.last_sweep = Some(frame);
                let before = self.entries.len();
                self.entries.retain(|_, asset| Rc::strong_count(asset) > 1);
                let swept = before - self.entries.len();
                if swept > 0 {
                    debug!("swept {swept} unreferenced asset(s), {} remain", self.entries.len());
                }
            }
            Some(_) => {}
        }
    }

    /// Read access to the underlying name→asset map.
    pub fn assets(&self) -> &HashMap<String, Rc<L::Asset>> {
        &self.entries
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
