// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The element arena: structure, reparenting, transforms.

use alloc::boxed::Box;
use alloc::vec::Vec;

use canopy_transform::{Placement, decompose};
use kurbo::{Affine, Point, Vec2};
use smallvec::SmallVec;

use crate::behavior::Behavior;
use crate::types::{DuplicatePolicy, ElementFlags, ElementId, SceneError, TransformPolicy};

pub(crate) struct Element {
    pub(crate) generation: u32,
    pub(crate) parent: Option<ElementId>,
    /// Invariant: sorted non-decreasing by z-index, ties in insertion order.
    pub(crate) children: SmallVec<[ElementId; 4]>,
    pub(crate) placement: Placement,
    pub(crate) z_index: i32,
    /// When true, the world transform composes with the parent's; when
    /// false, the local placement alone is the world transform.
    pub(crate) relative: bool,
    pub(crate) flags: ElementFlags,
    pub(crate) world: Affine,
    pub(crate) world_dirty: bool,
    pub(crate) behavior: Option<Box<dyn Behavior>>,
}

impl Element {
    fn new(generation: u32) -> Self {
        Self {
            generation,
            parent: None,
            children: SmallVec::new(),
            placement: Placement::IDENTITY,
            z_index: 0,
            relative: false,
            flags: ElementFlags::default(),
            world: Affine::IDENTITY,
            world_dirty: true,
            behavior: None,
        }
    }
}

/// A retained-mode tree of 2D elements.
///
/// Elements live in a generational arena and are addressed by [`ElementId`]
/// handles; a freed slot bumps its generation, so handles to destroyed
/// elements read as "missing" instead of aliasing their successors.
///
/// Each element carries a local [`Placement`], a z-index ordering it among
/// its siblings, and a memoized world transform. Structure mutations
/// ([`attach`](Self::attach), [`detach`](Self::detach),
/// [`remove`](Self::remove)) and transform mutations invalidate the cached
/// world transforms of the whole affected subtree; reads recompute lazily
/// and are amortized O(1) per frame.
///
/// The scene is single-threaded: mutation and traversal are strictly
/// interleaved, never concurrent.
pub struct Scene {
    slots: Vec<Option<Element>>,
    /// Last generation per slot (persists across frees).
    generations: Vec<u32>,
    free_list: Vec<usize>,
}

impl core::fmt::Debug for Scene {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.slots.len();
        let alive = self.slots.iter().filter(|s| s.is_some()).count();
        f.debug_struct("Scene")
            .field("elements_total", &total)
            .field("elements_alive", &alive)
            .field("free_list", &self.free_list.len())
            .finish_non_exhaustive()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Creates a new empty scene.
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// Returns true if `id` refers to a live element.
    ///
    /// An id is live if its slot is occupied and its generation matches the
    /// slot's current generation.
    pub fn is_alive(&self, id: ElementId) -> bool {
        self.slots
            .get(id.idx())
            .and_then(|s| s.as_ref())
            .map(|el| el.generation == id.1)
            .unwrap_or(false)
    }

    /// Creates a detached root element with an identity placement.
    ///
    /// The element is absolute (not relative to anything) until attached.
    pub fn create(&mut self) -> ElementId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.slots[idx] = Some(Element::new(generation));
            (idx, generation)
        } else {
            let generation = 1_u32;
            self.slots.push(Some(Element::new(generation)));
            self.generations.push(generation);
            (self.slots.len() - 1, generation)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "ElementId uses 32-bit indices by design."
        )]
        let idx = idx as u32;
        ElementId::new(idx, generation)
    }

    /// Constructs a child and immediately attaches it to `parent` with the
    /// snap-to-target policy (identity placement, relative).
    ///
    /// # Errors
    ///
    /// [`SceneError::Stale`] if `parent` is dead; the tree cannot hold an
    /// element nobody owns.
    pub fn spawn(&mut self, parent: ElementId) -> Result<ElementId, SceneError> {
        if !self.is_alive(parent) {
            return Err(SceneError::Stale);
        }
        let child = self.create();
        let attached = self.attach(
            parent,
            child,
            TransformPolicy::SnapToTarget,
            DuplicatePolicy::Unchecked,
        );
        debug_assert!(attached, "a fresh element always attaches");
        Ok(child)
    }

    /// Installs (or clears) the behavior of a live element.
    pub fn set_behavior(&mut self, id: ElementId, behavior: Option<Box<dyn Behavior>>) {
        if let Some(el) = self.element_opt_mut(id) {
            el.behavior = behavior;
        }
    }

    // --- reparenting protocol ---

    /// Attaches `child` to `parent`, keeping the children sorted by z-index.
    ///
    /// The insertion position is found by binary search; an incoming element
    /// lands after any existing siblings with the same z-index, so ties stay
    /// in attach order. An element already under another parent is unlinked
    /// from it first.
    ///
    /// Returns `false` with no mutation when either id is dead, when
    /// `duplicate` is [`DuplicatePolicy::Checked`] and `child` is already a
    /// child of `parent`, or when `parent` lies inside `child`'s own subtree
    /// (which would corrupt ownership).
    pub fn attach(
        &mut self,
        parent: ElementId,
        child: ElementId,
        transform: TransformPolicy,
        duplicate: DuplicatePolicy,
    ) -> bool {
        if !self.is_alive(parent) || !self.is_alive(child) {
            return false;
        }
        if self.in_subtree(parent, child) {
            return false;
        }
        if duplicate == DuplicatePolicy::Checked
            && self.element(parent).children.iter().any(|&c| c == child)
        {
            return false;
        }
        match transform {
            // Bake against the child's current ancestry, before relinking.
            TransformPolicy::KeepAbsolute => self.bake_world(child),
            TransformPolicy::KeepRelative => self.element_mut(child).relative = true,
            TransformPolicy::SnapToTarget => {
                let el = self.element_mut(child);
                el.placement = Placement::IDENTITY;
                el.relative = true;
            }
        }
        if let Some(old) = self.element(child).parent {
            self.unlink(old, child);
        }
        self.element_mut(child).parent = Some(parent);
        self.mark_subtree_dirty(child);
        let z = self.element(child).z_index;
        let idx = self.sorted_insert_index(parent, z);
        self.element_mut(parent).children.insert(idx, child);
        true
    }

    /// Removes `child` from `parent` and destroys it together with its
    /// whole subtree. Returns `false` if `child` is not a child of `parent`
    /// or either id is dead.
    pub fn remove(&mut self, parent: ElementId, child: ElementId) -> bool {
        if !self.is_alive(parent) || !self.is_alive(child) {
            return false;
        }
        if !self.element(parent).children.iter().any(|&c| c == child) {
            return false;
        }
        self.unlink(parent, child);
        self.free_subtree(child);
        true
    }

    /// Destroys a detached or root element together with its subtree.
    ///
    /// Returns `false` if the id is dead or the element still has a parent
    /// (use [`remove`](Self::remove) through the parent instead).
    pub fn remove_root(&mut self, id: ElementId) -> bool {
        if !self.is_alive(id) || self.element(id).parent.is_some() {
            return false;
        }
        self.free_subtree(id);
        true
    }

    /// Detaches `child` from `parent`, transferring ownership to the caller.
    ///
    /// The child's world transform at the moment of the call is baked into
    /// its placement and it becomes absolute, so its visual position is
    /// frozen. The element stays in the arena as a root; the caller's
    /// handle is now the only way to reach it.
    ///
    /// # Errors
    ///
    /// [`SceneError::Stale`] if either id is dead, [`SceneError::NotAChild`]
    /// if `child` is not actually a child of `parent`.
    pub fn detach(&mut self, parent: ElementId, child: ElementId) -> Result<(), SceneError> {
        if !self.is_alive(parent) || !self.is_alive(child) {
            return Err(SceneError::Stale);
        }
        if !self.element(parent).children.iter().any(|&c| c == child) {
            return Err(SceneError::NotAChild);
        }
        self.bake_world(child);
        self.unlink(parent, child);
        self.mark_subtree_dirty(child);
        Ok(())
    }

    /// Whether `child` is a direct child of `parent`. O(children).
    pub fn contains(&self, parent: ElementId, child: ElementId) -> bool {
        self.is_alive(parent) && self.element(parent).children.iter().any(|&c| c == child)
    }

    // --- ordering ---

    /// Sets an element's z-index and re-sorts it among its siblings.
    ///
    /// The element is extracted and reinserted under the same placement
    /// rule as [`attach`](Self::attach), so it lands after existing
    /// siblings with the equal z-index. O(siblings).
    pub fn set_z_index(&mut self, id: ElementId, z: i32) {
        let Some(el) = self.element_opt_mut(id) else {
            return;
        };
        if el.z_index == z {
            return;
        }
        el.z_index = z;
        let Some(parent) = el.parent else { return };
        if let Some(pos) = self.element(parent).children.iter().position(|&c| c == id) {
            self.element_mut(parent).children.remove(pos);
            let idx = self.sorted_insert_index(parent, z);
            self.element_mut(parent).children.insert(idx, id);
        }
    }

    /// Returns the z-index of a live element.
    pub fn z_index(&self, id: ElementId) -> Option<i32> {
        self.element_opt(id).map(|el| el.z_index)
    }

    // --- structure accessors ---

    /// Returns the parent of a live element, or `None` for roots, detached
    /// elements, and stale ids.
    pub fn parent_of(&self, id: ElementId) -> Option<ElementId> {
        self.element_opt(id).and_then(|el| el.parent)
    }

    /// Returns the children of a live element in z order, or an empty slice
    /// for stale ids.
    pub fn children_of(&self, id: ElementId) -> &[ElementId] {
        self.element_opt(id).map_or(&[], |el| &el.children)
    }

    /// Returns the flags of a live element.
    pub fn flags(&self, id: ElementId) -> Option<ElementFlags> {
        self.element_opt(id).map(|el| el.flags)
    }

    /// Replaces the flags of a live element.
    pub fn set_flags(&mut self, id: ElementId, flags: ElementFlags) {
        if let Some(el) = self.element_opt_mut(id) {
            el.flags = flags;
        }
    }

    /// Whether a live element's transform is relative to its parent.
    pub fn is_relative(&self, id: ElementId) -> Option<bool> {
        self.element_opt(id).map(|el| el.relative)
    }

    /// Makes an element's transform relative to its parent (or absolute),
    /// invalidating the subtree's cached world transforms.
    pub fn set_relative(&mut self, id: ElementId, relative: bool) {
        let Some(el) = self.element_opt_mut(id) else {
            return;
        };
        if el.relative == relative {
            return;
        }
        el.relative = relative;
        self.mark_subtree_dirty(id);
    }

    // --- local transform ---

    /// Returns the local placement of a live element.
    pub fn placement(&self, id: ElementId) -> Option<Placement> {
        self.element_opt(id).map(|el| el.placement)
    }

    /// Returns the local transform of a live element as a matrix.
    pub fn local_transform(&self, id: ElementId) -> Option<Affine> {
        self.element_opt(id).map(|el| el.placement.to_affine())
    }

    /// Local position of a live element.
    pub fn position(&self, id: ElementId) -> Option<Point> {
        self.element_opt(id).map(|el| el.placement.position)
    }

    /// Local rotation of a live element, in degrees.
    pub fn rotation(&self, id: ElementId) -> Option<f64> {
        self.element_opt(id).map(|el| el.placement.rotation)
    }

    /// Local scale of a live element.
    pub fn scale(&self, id: ElementId) -> Option<Vec2> {
        self.element_opt(id).map(|el| el.placement.scale)
    }

    /// Local origin (pivot) of a live element.
    pub fn origin(&self, id: ElementId) -> Option<Point> {
        self.element_opt(id).map(|el| el.placement.origin)
    }

    /// Sets the local position.
    pub fn set_position(&mut self, id: ElementId, position: Point) {
        let Some(el) = self.element_opt_mut(id) else {
            return;
        };
        if el.placement.position == position {
            return;
        }
        el.placement.position = position;
        self.mark_subtree_dirty(id);
    }

    /// Sets the local rotation, in degrees.
    pub fn set_rotation(&mut self, id: ElementId, degrees: f64) {
        let Some(el) = self.element_opt_mut(id) else {
            return;
        };
        if el.placement.rotation == degrees {
            return;
        }
        el.placement.rotation = degrees;
        self.mark_subtree_dirty(id);
    }

    /// Sets the local scale.
    pub fn set_scale(&mut self, id: ElementId, scale: Vec2) {
        let Some(el) = self.element_opt_mut(id) else {
            return;
        };
        if el.placement.scale == scale {
            return;
        }
        el.placement.scale = scale;
        self.mark_subtree_dirty(id);
    }

    /// Sets the local origin (pivot).
    pub fn set_origin(&mut self, id: ElementId, origin: Point) {
        let Some(el) = self.element_opt_mut(id) else {
            return;
        };
        if el.placement.origin == origin {
            return;
        }
        el.placement.origin = origin;
        self.mark_subtree_dirty(id);
    }

    /// Moves the element by `delta` in parent space.
    pub fn translate_by(&mut self, id: ElementId, delta: Vec2) {
        let Some(el) = self.element_opt_mut(id) else {
            return;
        };
        el.placement.position += delta;
        self.mark_subtree_dirty(id);
    }

    /// Rotates the element by `degrees`.
    pub fn rotate_by(&mut self, id: ElementId, degrees: f64) {
        let Some(el) = self.element_opt_mut(id) else {
            return;
        };
        el.placement.rotation += degrees;
        self.mark_subtree_dirty(id);
    }

    /// Multiplies the element's scale componentwise by `factor`.
    pub fn scale_by(&mut self, id: ElementId, factor: Vec2) {
        let Some(el) = self.element_opt_mut(id) else {
            return;
        };
        el.placement.scale.x *= factor.x;
        el.placement.scale.y *= factor.y;
        self.mark_subtree_dirty(id);
    }

    /// Sets the local transform from an explicit matrix.
    ///
    /// The matrix is decomposed and applied through the component setters,
    /// so subtree invalidation happens as usual. The origin is left as-is;
    /// decomposition folds any pivot into the translation.
    pub fn set_local_transform(&mut self, id: ElementId, affine: Affine) {
        let d = decompose(affine);
        self.set_position(id, d.position);
        self.set_rotation(id, d.rotation);
        self.set_scale(id, d.scale);
    }

    // --- world transform ---

    /// Returns the world transform of a live element.
    ///
    /// Recomputes lazily: the first read after an invalidation walks the
    /// dirty ancestor chain once, caching at every level, so repeated
    /// per-frame reads are O(1).
    pub fn world_transform(&mut self, id: ElementId) -> Option<Affine> {
        if !self.is_alive(id) {
            return None;
        }
        Some(self.world_of(id))
    }

    /// World-space position of a live element.
    pub fn world_position(&mut self, id: ElementId) -> Option<Point> {
        self.world_transform(id).map(canopy_transform::position)
    }

    /// World-space rotation of a live element, in degrees.
    pub fn world_rotation(&mut self, id: ElementId) -> Option<f64> {
        self.world_transform(id).map(canopy_transform::rotation)
    }

    /// World-space scale of a live element.
    pub fn world_scale(&mut self, id: ElementId) -> Option<Vec2> {
        self.world_transform(id).map(canopy_transform::scale)
    }

    // --- internals ---

    /// Access a live element; panics if `id` is stale.
    pub(crate) fn element(&self, id: ElementId) -> &Element {
        self.slots[id.idx()].as_ref().expect("dangling ElementId")
    }

    /// Access a live element mutably; panics if `id` is stale.
    pub(crate) fn element_mut(&mut self, id: ElementId) -> &mut Element {
        self.slots[id.idx()].as_mut().expect("dangling ElementId")
    }

    pub(crate) fn element_opt(&self, id: ElementId) -> Option<&Element> {
        let el = self.slots.get(id.idx())?.as_ref()?;
        (el.generation == id.1).then_some(el)
    }

    pub(crate) fn element_opt_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        let el = self.slots.get_mut(id.idx())?.as_mut()?;
        (el.generation == id.1).then_some(el)
    }

    /// Whether `node` lies in the subtree rooted at `root` (inclusive).
    /// Walks the parent chain, O(depth).
    fn in_subtree(&self, node: ElementId, root: ElementId) -> bool {
        let mut cur = Some(node);
        while let Some(id) = cur {
            if id == root {
                return true;
            }
            cur = self.element(id).parent;
        }
        false
    }

    /// First child index whose z-index exceeds `z`; equal keys insert after.
    fn sorted_insert_index(&self, parent: ElementId, z: i32) -> usize {
        self.element(parent)
            .children
            .partition_point(|&c| self.element(c).z_index <= z)
    }

    fn unlink(&mut self, parent: ElementId, child: ElementId) {
        self.element_mut(parent).children.retain(|c| *c != child);
        self.element_mut(child).parent = None;
    }

    fn free_subtree(&mut self, id: ElementId) {
        let children = self.element(id).children.clone();
        for c in children {
            self.free_subtree(c);
        }
        self.slots[id.idx()] = None;
        self.free_list.push(id.idx());
    }

    pub(crate) fn mark_subtree_dirty(&mut self, id: ElementId) {
        let Some(el) = self.element_opt_mut(id) else {
            return;
        };
        el.world_dirty = true;
        let children = el.children.clone();
        for c in children {
            self.mark_subtree_dirty(c);
        }
    }

    /// Recomputes and returns the world transform of a live element.
    fn world_of(&mut self, id: ElementId) -> Affine {
        // Collect the dirty chain from `id` up to its first clean (or
        // chain-terminating) ancestor. Eager invalidation guarantees a
        // dirty element never sits below a clean descendant, so the walk
        // can stop at the first clean ancestor.
        let mut chain: SmallVec<[ElementId; 8]> = SmallVec::new();
        let mut cur = id;
        loop {
            let el = self.element(cur);
            if !el.world_dirty {
                break;
            }
            chain.push(cur);
            match el.parent {
                Some(p) if el.relative && self.is_alive(p) => cur = p,
                _ => break,
            }
        }
        // Recompute top-down; each element's parent is clean by the time
        // its own composition runs.
        for &e in chain.iter().rev() {
            let el = self.element(e);
            let local = el.placement.to_affine();
            let world = match el.parent {
                Some(p) if el.relative && self.is_alive(p) => self.element(p).world * local,
                _ => local,
            };
            let el = self.element_mut(e);
            el.world = world;
            el.world_dirty = false;
        }
        self.element(id).world
    }

    /// Freezes an element's current world transform into its placement and
    /// makes it absolute. Any origin is folded into the translation.
    fn bake_world(&mut self, id: ElementId) {
        let d = decompose(self.world_of(id));
        let el = self.element_mut(id);
        el.placement = Placement {
            position: d.position,
            rotation: d.rotation,
            scale: d.scale,
            origin: Point::ZERO,
        };
        el.relative = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn assert_sorted(scene: &Scene, parent: ElementId) {
        let zs: Vec<i32> = scene
            .children_of(parent)
            .iter()
            .map(|&c| scene.z_index(c).unwrap())
            .collect();
        assert!(
            zs.windows(2).all(|w| w[0] <= w[1]),
            "children out of z order: {zs:?}"
        );
    }

    fn child_with_z(scene: &mut Scene, parent: ElementId, z: i32) -> ElementId {
        let id = scene.spawn(parent).unwrap();
        scene.set_z_index(id, z);
        id
    }

    #[test]
    fn spawn_snaps_to_parent() {
        let mut scene = Scene::new();
        let root = scene.create();
        scene.set_position(root, Point::new(30.0, 40.0));
        let child = scene.spawn(root).unwrap();

        assert_eq!(scene.parent_of(child), Some(root));
        assert_eq!(scene.is_relative(child), Some(true));
        assert_eq!(scene.placement(child), Some(Placement::IDENTITY));
        assert_eq!(
            scene.world_transform(child),
            scene.world_transform(root),
            "snapped child coincides with the parent"
        );
    }

    #[test]
    fn spawn_on_dead_parent_fails() {
        let mut scene = Scene::new();
        let root = scene.create();
        scene.remove_root(root);
        assert_eq!(scene.spawn(root), Err(SceneError::Stale));
    }

    #[test]
    fn children_stay_sorted_through_mutation() {
        let mut scene = Scene::new();
        let root = scene.create();
        for z in [5, -3, 0, 9, 0, 2, -3] {
            child_with_z(&mut scene, root, z);
            assert_sorted(&scene, root);
        }
        let kids: Vec<ElementId> = scene.children_of(root).to_vec();
        scene.set_z_index(kids[0], 100);
        assert_sorted(&scene, root);
        scene.set_z_index(kids[3], -50);
        assert_sorted(&scene, root);
        scene.detach(root, kids[5]).unwrap();
        assert_sorted(&scene, root);
        scene.attach(
            root,
            kids[5],
            TransformPolicy::KeepAbsolute,
            DuplicatePolicy::Checked,
        );
        assert_sorted(&scene, root);
    }

    #[test]
    fn equal_z_keeps_attach_order() {
        let mut scene = Scene::new();
        let root = scene.create();
        let a = child_with_z(&mut scene, root, 2);
        let b = child_with_z(&mut scene, root, 2);
        let c = child_with_z(&mut scene, root, 2);
        assert_eq!(scene.children_of(root), &[a, b, c]);
    }

    #[test]
    fn checked_duplicate_attach_is_a_noop() {
        let mut scene = Scene::new();
        let root = scene.create();
        let a = child_with_z(&mut scene, root, 1);
        let b = child_with_z(&mut scene, root, 2);
        scene.set_position(a, Point::new(7.0, 0.0));

        let attached = scene.attach(
            root,
            a,
            TransformPolicy::SnapToTarget,
            DuplicatePolicy::Checked,
        );
        assert!(!attached);
        assert_eq!(scene.children_of(root), &[a, b], "shape unchanged");
        assert_eq!(
            scene.position(a),
            Some(Point::new(7.0, 0.0)),
            "placement unchanged"
        );
    }

    #[test]
    fn attach_into_own_subtree_is_refused() {
        let mut scene = Scene::new();
        let root = scene.create();
        let child = scene.spawn(root).unwrap();
        let grandchild = scene.spawn(child).unwrap();

        assert!(!scene.attach(
            grandchild,
            root,
            TransformPolicy::KeepRelative,
            DuplicatePolicy::Checked,
        ));
        assert!(!scene.attach(
            root,
            root,
            TransformPolicy::KeepRelative,
            DuplicatePolicy::Checked,
        ));
        assert_eq!(scene.parent_of(root), None);
        assert_eq!(scene.parent_of(grandchild), Some(child));
    }

    #[test]
    fn z_reorder_scenario() {
        // Root with A (z 0) and B (z 5); attach C at z 2, then push it past B.
        let mut scene = Scene::new();
        let root = scene.create();
        let a = child_with_z(&mut scene, root, 0);
        let b = child_with_z(&mut scene, root, 5);
        let c = scene.create();
        scene.set_z_index(c, 2);
        assert!(scene.attach(
            root,
            c,
            TransformPolicy::SnapToTarget,
            DuplicatePolicy::Checked,
        ));
        assert_eq!(scene.children_of(root), &[a, c, b]);

        scene.set_z_index(c, 10);
        assert_eq!(scene.children_of(root), &[a, b, c]);
    }

    #[test]
    fn relative_child_follows_parent() {
        // Child at local (10, 0) under a root at the origin reads (10, 0);
        // moving the root by (5, 5) moves the child to (15, 5) without any
        // direct mutation of the child.
        let mut scene = Scene::new();
        let root = scene.create();
        let child = scene.spawn(root).unwrap();
        scene.set_position(child, Point::new(10.0, 0.0));

        assert_eq!(scene.world_position(child), Some(Point::new(10.0, 0.0)));
        scene.translate_by(root, Vec2::new(5.0, 5.0));
        assert_eq!(scene.world_position(child), Some(Point::new(15.0, 5.0)));
    }

    #[test]
    fn ancestor_mutation_dirties_whole_subtree() {
        let mut scene = Scene::new();
        let root = scene.create();
        let child = scene.spawn(root).unwrap();
        let grandchild = scene.spawn(child).unwrap();

        // Clean everything.
        scene.world_transform(grandchild).unwrap();
        assert!(!scene.element(root).world_dirty);
        assert!(!scene.element(child).world_dirty);
        assert!(!scene.element(grandchild).world_dirty);

        scene.set_rotation(root, 90.0);
        assert!(scene.element(root).world_dirty);
        assert!(scene.element(child).world_dirty);
        assert!(scene.element(grandchild).world_dirty);

        // A read reflects the new ancestor transform and re-cleans the chain.
        scene.set_position(grandchild, Point::new(1.0, 0.0));
        let p = scene.world_position(grandchild).unwrap();
        assert!((p - Point::new(0.0, 1.0)).hypot() < 1e-12);
        assert!(!scene.element(child).world_dirty);
    }

    #[test]
    fn world_read_is_cached_until_invalidation() {
        let mut scene = Scene::new();
        let root = scene.create();
        let child = scene.spawn(root).unwrap();
        scene.set_position(root, Point::new(3.0, 0.0));

        let first = scene.world_transform(child).unwrap();
        assert!(!scene.element(child).world_dirty);
        let second = scene.world_transform(child).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn detach_freezes_world_position() {
        let mut scene = Scene::new();
        let root = scene.create();
        scene.set_position(root, Point::new(100.0, 0.0));
        scene.set_rotation(root, 30.0);
        let child = scene.spawn(root).unwrap();
        scene.set_position(child, Point::new(10.0, 5.0));

        let before = scene.world_transform(child).unwrap();
        scene.detach(root, child).unwrap();

        assert_eq!(scene.parent_of(child), None);
        assert_eq!(scene.is_relative(child), Some(false));
        let after = scene.world_transform(child).unwrap();
        for (got, want) in after.as_coeffs().iter().zip(before.as_coeffs()) {
            assert!((got - want).abs() < 1e-9);
        }

        // Moving the old parent no longer affects the detached element.
        scene.translate_by(root, Vec2::new(50.0, 50.0));
        let frozen = scene.world_transform(child).unwrap();
        for (got, want) in frozen.as_coeffs().iter().zip(before.as_coeffs()) {
            assert!((got - want).abs() < 1e-9);
        }
    }

    #[test]
    fn detach_then_reattach_keep_absolute_preserves_position() {
        let mut scene = Scene::new();
        let old_parent = scene.create();
        scene.set_position(old_parent, Point::new(20.0, -10.0));
        let new_parent = scene.create();
        scene.set_position(new_parent, Point::new(-300.0, 4.0));
        scene.set_rotation(new_parent, 45.0);
        let child = scene.spawn(old_parent).unwrap();
        scene.set_position(child, Point::new(1.0, 2.0));

        let before = scene.world_position(child).unwrap();
        scene.detach(old_parent, child).unwrap();
        assert!(scene.attach(
            new_parent,
            child,
            TransformPolicy::KeepAbsolute,
            DuplicatePolicy::Checked,
        ));

        let after = scene.world_position(child).unwrap();
        assert!((after - before).hypot() < 1e-9);

        // KeepAbsolute also means the child does not follow the new parent.
        scene.translate_by(new_parent, Vec2::new(9.0, 9.0));
        let still = scene.world_position(child).unwrap();
        assert!((still - before).hypot() < 1e-9);
    }

    #[test]
    fn keep_relative_preserves_offset_not_position() {
        let mut scene = Scene::new();
        let parent = scene.create();
        scene.set_position(parent, Point::new(50.0, 0.0));
        let child = scene.create();
        scene.set_position(child, Point::new(10.0, 0.0));

        assert!(scene.attach(
            parent,
            child,
            TransformPolicy::KeepRelative,
            DuplicatePolicy::Checked,
        ));
        // The local offset survives; the world position now includes the
        // parent's translation.
        assert_eq!(scene.position(child), Some(Point::new(10.0, 0.0)));
        assert_eq!(scene.world_position(child), Some(Point::new(60.0, 0.0)));
    }

    #[test]
    fn snap_to_target_matches_parent_world() {
        let mut scene = Scene::new();
        let parent = scene.create();
        scene.set_position(parent, Point::new(8.0, 9.0));
        scene.set_rotation(parent, 15.0);
        let child = scene.create();
        scene.set_position(child, Point::new(-4.0, 0.0));

        assert!(scene.attach(
            parent,
            child,
            TransformPolicy::SnapToTarget,
            DuplicatePolicy::Checked,
        ));
        assert_eq!(scene.world_transform(child), scene.world_transform(parent));
    }

    #[test]
    fn reparent_between_parents_unlinks_old() {
        let mut scene = Scene::new();
        let p1 = scene.create();
        let p2 = scene.create();
        let child = scene.spawn(p1).unwrap();

        assert!(scene.attach(
            p2,
            child,
            TransformPolicy::KeepRelative,
            DuplicatePolicy::Checked,
        ));
        assert!(!scene.contains(p1, child));
        assert!(scene.contains(p2, child));
        assert_eq!(scene.parent_of(child), Some(p2));
    }

    #[test]
    fn remove_destroys_subtree_and_bumps_generation() {
        let mut scene = Scene::new();
        let root = scene.create();
        let child = scene.spawn(root).unwrap();
        let grandchild = scene.spawn(child).unwrap();

        assert!(scene.remove(root, child));
        assert!(!scene.is_alive(child));
        assert!(!scene.is_alive(grandchild));
        assert!(scene.is_alive(root));
        assert!(scene.children_of(root).is_empty());

        // Slot reuse must not resurrect old handles.
        let fresh = scene.create();
        assert!(scene.is_alive(fresh));
        assert!(!scene.is_alive(child));
        assert!(!scene.is_alive(grandchild));
        if fresh.0 == child.0 {
            assert!(fresh.1 > child.1, "generation must increase on reuse");
        }
    }

    #[test]
    fn remove_non_child_fails() {
        let mut scene = Scene::new();
        let root = scene.create();
        let stranger = scene.create();
        assert!(!scene.remove(root, stranger));
        assert!(scene.is_alive(stranger));
    }

    #[test]
    fn detach_errors() {
        let mut scene = Scene::new();
        let root = scene.create();
        let stranger = scene.create();
        assert_eq!(scene.detach(root, stranger), Err(SceneError::NotAChild));

        let child = scene.spawn(root).unwrap();
        scene.remove(root, child);
        assert_eq!(scene.detach(root, child), Err(SceneError::Stale));
    }

    #[test]
    fn stale_ids_read_as_missing() {
        let mut scene = Scene::new();
        let id = scene.create();
        scene.remove_root(id);

        assert_eq!(scene.z_index(id), None);
        assert_eq!(scene.parent_of(id), None);
        assert!(scene.children_of(id).is_empty());
        assert_eq!(scene.world_transform(id), None);
        assert_eq!(scene.placement(id), None);
        // Setters on stale ids are silent no-ops.
        scene.set_position(id, Point::new(1.0, 1.0));
        scene.set_z_index(id, 3);
    }

    #[test]
    fn set_local_transform_goes_through_setters() {
        let mut scene = Scene::new();
        let root = scene.create();
        let child = scene.spawn(root).unwrap();
        scene.world_transform(child).unwrap();

        let m = Affine::translate(Vec2::new(5.0, 6.0)) * Affine::rotate(30_f64.to_radians());
        scene.set_local_transform(root, m);

        assert_eq!(scene.position(root), Some(Point::new(5.0, 6.0)));
        assert!((scene.rotation(root).unwrap() - 30.0).abs() < 1e-9);
        assert!(
            scene.element(child).world_dirty,
            "matrix assignment must invalidate like any other setter"
        );
        let world = scene.world_transform(root).unwrap();
        for (got, want) in world.as_coeffs().iter().zip(m.as_coeffs()) {
            assert!((got - want).abs() < 1e-9);
        }
    }

    #[test]
    fn absolute_element_ignores_ancestry() {
        let mut scene = Scene::new();
        let root = scene.create();
        scene.set_position(root, Point::new(100.0, 100.0));
        let child = scene.spawn(root).unwrap();
        scene.set_position(child, Point::new(3.0, 4.0));
        scene.set_relative(child, false);

        assert_eq!(scene.world_position(child), Some(Point::new(3.0, 4.0)));
        // Still logically owned by the parent.
        assert!(scene.contains(root, child));
    }
}
