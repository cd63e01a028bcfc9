// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Component-wise 2D transforms.

use kurbo::{Affine, Point, Vec2};

/// A local 2D transform expressed as components rather than a matrix.
///
/// The composed matrix applies, in order: translate by `-origin`, scale,
/// rotate, translate by `position`. `origin` is the pivot both rotation and
/// scaling happen around, expressed in the element's own coordinate space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Translation, in parent space.
    pub position: Point,
    /// Rotation around `origin`, in degrees (counterclockwise).
    pub rotation: f64,
    /// Per-axis scale factor around `origin`.
    pub scale: Vec2,
    /// Pivot point for rotation and scale, in local space.
    pub origin: Point,
}

impl Placement {
    /// The identity placement: no translation, rotation, or scaling.
    pub const IDENTITY: Self = Self {
        position: Point::ZERO,
        rotation: 0.0,
        scale: Vec2::new(1.0, 1.0),
        origin: Point::ZERO,
    };

    /// Creates a placement at `position` with no rotation or scaling.
    #[inline]
    #[must_use]
    pub const fn from_position(position: Point) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Composes the components into a single affine transform.
    #[inline]
    #[must_use]
    pub fn to_affine(&self) -> Affine {
        Affine::translate(self.position.to_vec2())
            * Affine::rotate(self.rotation.to_radians())
            * Affine::scale_non_uniform(self.scale.x, self.scale.y)
            * Affine::translate(-self.origin.to_vec2())
    }
}

impl Default for Placement {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}
