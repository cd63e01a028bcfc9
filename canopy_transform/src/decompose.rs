// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pure decomposition of a composed affine into placement components.

use kurbo::{Affine, Point, Vec2};

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// The components extracted from a composed affine transform.
///
/// Produced by [`decompose`]. The `origin` of a [`Placement`](crate::Placement)
/// is not recoverable from a matrix (it is folded into the translation), so it
/// does not appear here.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decomposed {
    /// The translation column.
    pub position: Point,
    /// Rotation in degrees.
    pub rotation: f64,
    /// Per-axis scale, sign-corrected for mirroring.
    pub scale: Vec2,
}

/// Extracts the translation component of `affine`.
#[inline]
#[must_use]
pub fn position(affine: Affine) -> Point {
    let [.., e, f] = affine.as_coeffs();
    Point::new(e, f)
}

/// Extracts the rotation of `affine`, in degrees.
///
/// The angle is read from the matrix's second column, which scaling along x
/// never touches, so a non-uniform x-scale cannot skew the result. The
/// alternative of dividing an extracted scale by the cosine of the angle
/// blows up near ±90° and is not used here.
#[inline]
#[must_use]
pub fn rotation(affine: Affine) -> f64 {
    let [_, _, c, d, ..] = affine.as_coeffs();
    (-c).atan2(d).to_degrees()
}

/// Extracts the per-axis scale of `affine`.
///
/// Each factor is the norm of the corresponding matrix column, carrying the
/// sign of that column's diagonal entry, so mirrored (negative) scales come
/// back negative rather than being folded into a bogus rotation.
#[inline]
#[must_use]
pub fn scale(affine: Affine) -> Vec2 {
    let [a, b, c, d, ..] = affine.as_coeffs();
    let sx = (a * a + b * b).sqrt();
    let sy = (c * c + d * d).sqrt();
    Vec2::new(
        if a < 0.0 { -sx } else { sx },
        if d < 0.0 { -sy } else { sy },
    )
}

/// Decomposes `affine` into position, rotation, and scale in one call.
#[inline]
#[must_use]
pub fn decompose(affine: Affine) -> Decomposed {
    Decomposed {
        position: position(affine),
        rotation: rotation(affine),
        scale: scale(affine),
    }
}
