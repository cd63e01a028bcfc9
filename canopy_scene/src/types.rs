// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the scene tree: element identifiers, flags, and policies.

/// Identifier for an element in the scene (generational).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ElementId(pub(crate) u32, pub(crate) u32);

impl ElementId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Element flags gating traversal.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ElementFlags: u8 {
        /// Element and its subtree participate in draw traversal.
        const VISIBLE = 0b0000_0001;
        /// Element and its subtree participate in update traversal.
        const ACTIVE  = 0b0000_0010;
    }
}

impl Default for ElementFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::ACTIVE
    }
}

/// What happens to a child's transform when it is attached to a parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransformPolicy {
    /// Bake the child's current world transform into its local placement and
    /// make it absolute. The child does not move visually and will not
    /// follow the new parent afterwards.
    KeepAbsolute,
    /// Make the child relative and leave its placement untouched. The local
    /// offset is preserved, so the world position generally changes to
    /// reflect the new parent's transform.
    KeepRelative,
    /// Make the child relative and reset its placement to identity, placing
    /// it exactly at the new parent's origin.
    SnapToTarget,
}

/// Whether [`Scene::attach`](crate::Scene::attach) checks for an existing link.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Scan the parent's children first; attaching an element that is
    /// already a child is a no-op reported as failure.
    Checked,
    /// Skip the scan. The caller asserts the element is not already a child
    /// of this parent. Used by the spawn path.
    Unchecked,
}

/// A monotonic frame-clock timestamp, in seconds since an arbitrary start.
///
/// Supplied by the owning frame loop alongside the delta time; the tree only
/// forwards it to element behaviors.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct FrameStamp(pub f64);

/// Errors for operations that violate a caller invariant.
///
/// Recoverable conditions (duplicate attach, stale-handle reads) are reported
/// as `bool`/`Option` returns instead; these errors indicate the caller's own
/// bookkeeping is wrong and are expected to propagate to its error boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    /// The element is not a child of the given parent.
    #[error("element is not a child of the given parent")]
    NotAChild,
    /// An element id refers to a slot that has been freed or reused.
    #[error("stale element id")]
    Stale,
}
