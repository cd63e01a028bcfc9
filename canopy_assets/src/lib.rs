// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Assets: a name-keyed, reference-counted asset cache.
//!
//! [`AssetCache`] hands out [`Rc`](std::rc::Rc) handles to loaded assets and
//! periodically sweeps entries nobody but the cache itself still references.
//! It performs no scene logic; the scene tree's elements reference assets by
//! name and the rendering backend resolves them here.
//!
//! Loading is delegated to an [`AssetLoader`]; [`FileLoader`] is the obvious
//! one, reading raw bytes from disk. Load failures surface as `None`, never
//! as errors — a missing texture is a recoverable condition for the caller.

mod cache;
mod loader;

pub use cache::AssetCache;
pub use loader::{AssetLoader, FileLoader};
