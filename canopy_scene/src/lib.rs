// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Scene: a retained-mode hierarchical element tree for 2D.
//!
//! The scene is a generational arena of elements, each owning an ordered
//! list of children, carrying a local [`Placement`] and a z-index, and
//! memoizing its composed world transform behind a dirty flag.
//!
//! - Structure: [`Scene::create`], [`Scene::spawn`], [`Scene::attach`],
//!   [`Scene::detach`], [`Scene::remove`], [`Scene::contains`].
//! - Reparenting semantics are selected per call with [`TransformPolicy`]
//!   (keep the world position, keep the relative offset, or snap to the new
//!   parent) and [`DuplicatePolicy`].
//! - Ordering: children are kept sorted ascending by z-index at all times,
//!   ties stable in attach order; [`Scene::set_z_index`] re-sorts.
//! - Transforms: component setters invalidate the whole subtree eagerly;
//!   [`Scene::world_transform`] recomputes lazily and caches per element,
//!   so per-frame reads are amortized O(1).
//! - Traversal: [`Scene::update`] and [`Scene::draw`] visit depth-first in
//!   ascending z; drawing composes an accumulated [`Affine`](kurbo::Affine)
//!   and hands it to a [`DrawTarget`], the rendering-backend boundary.
//!
//! Everything is single-threaded: mutations and traversals are strictly
//! interleaved, never concurrent. Handles ([`ElementId`]) are generational;
//! operations on a destroyed element's handle read as missing instead of
//! touching whatever reused its slot.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod behavior;
mod scene;
mod traverse;
mod types;

pub use behavior::{Behavior, DrawTarget, Sprite};
pub use canopy_transform::Placement;
pub use scene::Scene;
pub use types::{
    DuplicatePolicy, ElementFlags, ElementId, FrameStamp, SceneError, TransformPolicy,
};
