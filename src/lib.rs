#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mandelbrot plane renderer
//!
//! The Mandelbrot set is the set of points c on the complex plane for
//! which repeatedly squaring z and adding c, starting from zero, never
//! runs off to infinity.  For the points that do run away, the number
//! of iterations it took them to cross the escape radius is a
//! "velocity", and that velocity is what we color.
//!
//! A `Plane` maps a grid of pixels onto a region of the complex plane,
//! evaluates every pixel in parallel, runs the result through one of
//! four color schemes, and keeps the result in a single RGBA buffer
//! that a host can read in place: `buffer_view()` in Rust, or
//! `mandel_plane_pixels_ptr()` across the C boundary.
//!
//! ```
//! let mut plane = mandelplane::Plane::new(64, 48).unwrap();
//! plane.compute("hsv").unwrap();
//! assert_eq!(plane.buffer_view().unwrap().len(), 64 * 48 * 4);
//! ```

pub mod cancel;
pub mod colors;
pub mod errors;
pub mod escape;
pub mod host;
pub mod plane;
pub mod planes;

pub use cancel::CancelToken;
pub use colors::{colorize, Rgba, Scheme, INSIDE};
pub use errors::PlaneError;
pub use escape::{escape_time, Escape};
pub use plane::{Plane, State, DEFAULT_MAX_ITERATIONS};
pub use planes::{Pixel, PlaneMapper, Viewport};
