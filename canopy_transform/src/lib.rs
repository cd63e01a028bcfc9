// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Transform: 2D placement components and affine decomposition.
//!
//! This crate provides the two halves of the component↔matrix mapping the
//! scene tree relies on:
//!
//! - [`Placement`]: a transform expressed as position, rotation, scale, and
//!   origin, composed into a kurbo [`Affine`](kurbo::Affine) on demand.
//! - [`decompose`] (and the per-component [`position`], [`rotation`],
//!   [`scale`]): pure functions mapping a composed affine back to those
//!   components.
//!
//! Composing a [`Decomposed`] triple back into a matrix and decomposing it
//! again reproduces the triple to floating-point tolerance wherever the
//! factorization is unambiguous (rotation within ±90°, positive y-scale;
//! mirrored x-scale is fine). A rotated, mirrored-in-y affine has more than
//! one valid (rotation, scale) factorization, so no decomposition can pick
//! "the" original one there.
//!
//! This crate is `no_std`. Enable exactly one of the `std` (default) or
//! `libm` features.

#![cfg_attr(not(feature = "std"), no_std)]

mod decompose;
mod placement;

pub use decompose::{Decomposed, decompose, position, rotation, scale};
pub use placement::Placement;
