// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-element capabilities: update/draw hooks and the render boundary.

use alloc::string::String;

use kurbo::{Affine, Vec2};

use crate::scene::Scene;
use crate::types::{ElementId, FrameStamp};

/// The rendering backend boundary.
///
/// The tree never produces pixels itself; it hands the target fully composed
/// world-space transforms in painter's order (ascending z, depth first) and
/// the target decides what to do with them.
pub trait DrawTarget {
    /// Draw a textured quad under the given transform.
    fn draw_sprite(&mut self, sprite: &Sprite, transform: Affine);
}

/// Capability interface stored per element.
///
/// Both hooks default to no-ops, so plain grouping elements need no behavior
/// at all. `update` receives the scene mutably (the behavior is temporarily
/// lifted out of its slot for the duration of the call), `draw` receives it
/// shared alongside the accumulated render transform.
pub trait Behavior {
    /// Per-frame logic. `dt` is the time since the previous frame in
    /// seconds, `frame` the current frame's timestamp.
    fn update(&mut self, scene: &mut Scene, id: ElementId, dt: f64, frame: FrameStamp) {
        let _ = (scene, id, dt, frame);
    }

    /// Contribute drawing to the frame. `states` is the accumulated
    /// transform for this element, already composed with every relative
    /// ancestor.
    fn draw(&self, scene: &Scene, id: ElementId, target: &mut dyn DrawTarget, states: Affine) {
        let _ = (scene, id, target, states);
    }
}

/// A textured quad, referencing its texture by asset name.
///
/// The name is resolved by the backend against whatever asset cache it uses;
/// the tree itself holds no texture data.
#[derive(Clone, Debug, PartialEq)]
pub struct Sprite {
    /// Asset name of the texture to draw.
    pub texture: String,
    /// Quad size in local units.
    pub size: Vec2,
}

impl Behavior for Sprite {
    fn draw(&self, _scene: &Scene, _id: ElementId, target: &mut dyn DrawTarget, states: Affine) {
        target.draw_sprite(self, states);
    }
}
