// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame traversal: update and draw.
//!
//! Both walks are depth-first pre-order and visit children strictly in
//! ascending z-index order, which the child-sort invariant already
//! guarantees. Draw order is the painter's algorithm: lower z-index
//! siblings are emitted first, so higher ones occlude them when they
//! overlap.

use kurbo::Affine;
use smallvec::SmallVec;

use crate::behavior::DrawTarget;
use crate::scene::Scene;
use crate::types::{ElementFlags, ElementId, FrameStamp};

impl Scene {
    /// Runs the update traversal from `root`.
    ///
    /// Every visited element's behavior receives the same `(dt, frame)`
    /// pair; there is no per-element time scaling. Subtrees whose root
    /// lacks [`ElementFlags::ACTIVE`] are skipped entirely. Dead ids are
    /// ignored.
    ///
    /// A behavior may mutate the scene, including detaching or removing its
    /// own element; its behavior slot is lifted out for the duration of the
    /// call and only restored if the element is still alive and the slot
    /// still empty.
    pub fn update(&mut self, root: ElementId, dt: f64, frame: FrameStamp) {
        let Some(el) = self.element_opt_mut(root) else {
            return;
        };
        if !el.flags.contains(ElementFlags::ACTIVE) {
            return;
        }
        let mut behavior = el.behavior.take();
        if let Some(b) = behavior.as_mut() {
            b.update(self, root, dt, frame);
        }
        let Some(el) = self.element_opt_mut(root) else {
            // The behavior destroyed its own element.
            return;
        };
        if el.behavior.is_none() {
            el.behavior = behavior;
        }
        let children: SmallVec<[ElementId; 4]> = el.children.clone();
        for c in children {
            self.update(c, dt, frame);
        }
    }

    /// Runs the draw traversal from `root`.
    ///
    /// `states` is the accumulated render transform handed down by the
    /// caller (the identity for a whole-scene draw). Each relative element
    /// composes its local transform into it before drawing itself and its
    /// children; an absolute element restarts the accumulation from its
    /// local transform alone. Subtrees whose root lacks
    /// [`ElementFlags::VISIBLE`] are skipped. Dead ids are ignored.
    pub fn draw(&self, root: ElementId, target: &mut dyn DrawTarget, states: Affine) {
        let Some(el) = self.element_opt(root) else {
            return;
        };
        if !el.flags.contains(ElementFlags::VISIBLE) {
            return;
        }
        let local = el.placement.to_affine();
        let states = if el.relative { states * local } else { local };
        if let Some(b) = &el.behavior {
            b.draw(self, root, target, states);
        }
        for &c in &el.children {
            self.draw(c, target, states);
        }
    }
}
