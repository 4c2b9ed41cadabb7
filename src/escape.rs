// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time evaluator.  This is the hot loop of the whole
//! crate: a full plane runs it up to width * height * max_iterations
//! times, so the orbit is kept as two bare f64s rather than a Complex
//! and the escape test is done on the squared modulus.

use num::Complex;

use crate::cancel::CancelToken;

/// How many iterations an orbit may run between two looks at the
/// cancellation token.
pub const CANCEL_CHECK_INTERVAL: u32 = 4096;

/// The squared escape radius.
const ESCAPE_NORM_SQR: f64 = 4.0;

/// The fate of a single sample point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Escape {
    /// The orbit stayed bounded for every iteration we were allowed.
    InSet,
    /// The orbit left the escape radius on iteration `iterations`,
    /// with `|z| == modulus` at that moment.
    Escaped {
        /// The first iteration at which |z| > 2, counting z_1 = c as 1
        iterations: u32,
        /// |z| at that iteration; may be infinite if the orbit overflowed
        modulus: f64,
    },
}

impl Escape {
    /// Did this point escape?
    pub fn escaped(&self) -> bool {
        match *self {
            Escape::InSet => false,
            Escape::Escaped { .. } => true,
        }
    }
}

/// The state of z_n for one sample point.
struct Orbit {
    re: f64,
    im: f64,
    c_re: f64,
    c_im: f64,
    n: u32,
}

impl Orbit {
    fn new(c: Complex<f64>) -> Orbit {
        Orbit {
            re: 0.0,
            im: 0.0,
            c_re: c.re,
            c_im: c.im,
            n: 0,
        }
    }

    /// Iterate until the orbit escapes or `n` reaches `stop`.  A NaN
    /// or infinite norm fails the `<=` test and so counts as an escape.
    #[inline]
    fn advance(&mut self, stop: u32) -> Option<Escape> {
        let (mut re, mut im) = (self.re, self.im);
        while self.n < stop {
            let re2 = re * re;
            let im2 = im * im;
            im = 2.0 * re * im + self.c_im;
            re = re2 - im2 + self.c_re;
            self.n += 1;
            let norm = re * re + im * im;
            if !(norm <= ESCAPE_NORM_SQR) {
                return Some(Escape::Escaped {
                    iterations: self.n,
                    modulus: norm.sqrt(),
                });
            }
        }
        self.re = re;
        self.im = im;
        None
    }
}

/// As I understand it, the two halves of this expression are the
/// closed-form tests for the main cardioid and the period-2 bulb.
/// Points that pass either are guaranteed to be inside the set, so we
/// can skip iterating them entirely; the big black heart is the most
/// expensive part of the picture otherwise.
#[inline]
pub fn in_main_bulbs(c: Complex<f64>) -> bool {
    let y2 = c.im * c.im;
    let q = (c.re - 0.25) * (c.re - 0.25) + y2;
    q * (q + (c.re - 0.25)) <= 0.25 * y2 || (c.re + 1.0) * (c.re + 1.0) + y2 <= 0.0625
}

/// This is our classic iterator function: iterate z = z^2 + c from
/// zero and report the first iteration at which |z| exceeds 2, or
/// InSet if that never happens within `max_iterations`.
pub fn escape_time(c: Complex<f64>, max_iterations: u32) -> Escape {
    Orbit::new(c).advance(max_iterations).unwrap_or(Escape::InSet)
}

/// The same as `escape_time`, but skips the iteration for points
/// that are provably inside the set.
pub fn escape_time_checked(c: Complex<f64>, max_iterations: u32) -> Escape {
    if in_main_bulbs(c) {
        return Escape::InSet;
    }
    escape_time(c, max_iterations)
}

/// The cancellable evaluator.  The orbit runs in slices of
/// `CANCEL_CHECK_INTERVAL` iterations, and the token is polled between
/// slices.  Returns None if the token fired before the point was
/// decided; otherwise the result is identical to `escape_time_checked`.
pub fn escape_time_cancellable(
    c: Complex<f64>,
    max_iterations: u32,
    cancel: &CancelToken,
) -> Option<Escape> {
    if in_main_bulbs(c) {
        return Some(Escape::InSet);
    }
    let mut orbit = Orbit::new(c);
    while orbit.n < max_iterations {
        let stop = max_iterations.min(orbit.n.saturating_add(CANCEL_CHECK_INTERVAL));
        if let Some(escape) = orbit.advance(stop) {
            return Some(escape);
        }
        if orbit.n < max_iterations && cancel.is_cancelled() {
            return None;
        }
    }
    Some(Escape::InSet)
}
