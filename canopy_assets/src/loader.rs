// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pluggable asset loading.

use std::fmt::Display;
use std::path::Path;

/// Turns a path into an asset.
///
/// Implementations may keep state (decoders, device handles); the cache
/// calls them mutably.
pub trait AssetLoader {
    /// The loaded asset type.
    type Asset;
    /// The failure type; only displayed in logs, never propagated.
    type Error: Display;

    /// Loads the asset at `path`.
    fn load(&mut self, path: &Path) -> Result<Self::Asset, Self::Error>;
}

/// Loads assets as raw bytes from the filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileLoader;

impl AssetLoader for FileLoader {
    type Asset = Vec<u8>;
    type Error = std::io::Error;

    fn load(&mut self, path: &Path) -> Result<Vec<u8>, std::io::Error> {
        std::fs::read(path)
    }
}
