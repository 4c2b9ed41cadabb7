// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Every way a plane can refuse a request.

use failure::Fail;

/// The error type for all fallible plane operations.  Nothing in the
/// library panics on bad input; it comes back as one of these.
#[derive(Debug, Clone, PartialEq, Fail)]
pub enum PlaneError {
    /// The color scheme name did not match any known scheme.
    #[fail(display = "unknown color scheme: {:?}", _0)]
    InvalidScheme(String),

    /// A plane must be at least one pixel in each direction.
    #[fail(display = "invalid plane dimensions: {}x{}", width, height)]
    InvalidDimensions {
        /// Requested width in pixels
        width: usize,
        /// Requested height in pixels
        height: usize,
    },

    /// The viewport is inverted, empty, or not finite.
    #[fail(display = "the viewport must have finite, increasing real and imaginary ranges")]
    InvalidViewport,

    /// The iteration bound must be at least one.
    #[fail(display = "the iteration bound must be at least 1")]
    InvalidIterations,

    /// The buffer was requested before a compute pass completed.
    #[fail(display = "the plane buffer is not ready; call compute first")]
    BufferNotReady,

    /// The compute pass was abandoned through its cancellation token.
    #[fail(display = "the compute pass was cancelled")]
    Cancelled,

    /// A worker thread died during the compute pass.
    #[fail(display = "a compute worker panicked")]
    WorkerPanicked,
}

impl PlaneError {
    /// A stable negative status code for the C host boundary.
    pub fn code(&self) -> i32 {
        match *self {
            PlaneError::InvalidScheme(_) => -1,
            PlaneError::InvalidDimensions { .. } => -2,
            PlaneError::InvalidViewport => -3,
            PlaneError::InvalidIterations => -4,
            PlaneError::BufferNotReady => -5,
            PlaneError::Cancelled => -6,
            PlaneError::WorkerPanicked => -7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_problem() {
        let e = PlaneError::InvalidScheme("ultraviolet".to_string());
        assert_eq!(format!("{}", e), "unknown color scheme: \"ultraviolet\"");
        let e = PlaneError::InvalidDimensions {
            width: 0,
            height: 12,
        };
        assert_eq!(format!("{}", e), "invalid plane dimensions: 0x12");
    }

    #[test]
    fn codes_are_distinct_and_negative() {
        let all = vec![
            PlaneError::InvalidScheme(String::new()),
            PlaneError::InvalidDimensions {
                width: 0,
                height: 0,
            },
            PlaneError::InvalidViewport,
            PlaneError::InvalidIterations,
            PlaneError::BufferNotReady,
            PlaneError::Cancelled,
            PlaneError::WorkerPanicked,
        ];
        let mut codes: Vec<i32> = all.iter().map(|e| e.code()).collect();
        assert!(codes.iter().all(|c| *c < 0));
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
    }
}
