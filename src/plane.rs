// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The Plane owns the pixel buffer and runs the compute pass over it.
//!
//! A pass splits the buffer into contiguous bands of rows, one band
//! per worker thread.  The bands never overlap and no pixel is read
//! before it is written, so the workers share nothing mutable and
//! need no locks; the crossbeam scope joins all of them before the
//! plane is marked Computed, and only a Computed plane will lend its
//! buffer out.

use std::time::Instant;

use log::{debug, info, trace, warn};
use num::Complex;

use crate::cancel::CancelToken;
use crate::colors::{colorize, Rgba, Scheme};
use crate::errors::PlaneError;
use crate::escape::escape_time_cancellable;
use crate::planes::{check_dimensions, Pixel, PlaneMapper, Viewport};

/// The iteration bound used unless the host asks for another.
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

const BYTES_PER_PIXEL: usize = 4;

/// Where a plane is in its lifecycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum State {
    /// Geometry is set, but the buffer holds nothing worth reading.
    Uninitialized,
    /// A full pass has completed with the given scheme.
    Computed(Scheme),
}

/// A grid of pixels over a region of the complex plane, and the RGBA
/// buffer that holds its rendering.
#[derive(Debug)]
pub struct Plane {
    mapper: PlaneMapper,
    default_viewport: bool,
    max_iterations: u32,
    threads: usize,
    pixels: Vec<u8>,
    state: State,
}

impl Plane {
    /// A plane over the default viewport, which is the classic view of
    /// the set widened to the aspect ratio of the grid.
    pub fn new(width: usize, height: usize) -> Result<Plane, PlaneError> {
        let viewport = Viewport::default_for(width, height)?;
        let mut plane = Plane::with_viewport(width, height, viewport)?;
        plane.default_viewport = true;
        Ok(plane)
    }

    /// A plane over an explicit viewport.  The viewport is used as
    /// given; if its aspect ratio differs from the grid's, the image
    /// will be stretched.
    pub fn with_viewport(width: usize, height: usize, viewport: Viewport) -> Result<Plane, PlaneError> {
        let mapper = PlaneMapper::new(width, height, viewport)?;
        Ok(Plane {
            mapper,
            default_viewport: false,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            threads: num_cpus::get(),
            pixels: Vec::new(),
            state: State::Uninitialized,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.mapper.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.mapper.height()
    }

    /// Number of pixels in the grid, width * height.
    pub fn pixel_count(&self) -> usize {
        self.mapper.len()
    }

    /// The region of the complex plane being rendered.
    pub fn viewport(&self) -> Viewport {
        self.mapper.viewport
    }

    /// The pixel-to-point mapping this plane samples with.
    pub fn mapper(&self) -> &PlaneMapper {
        &self.mapper
    }

    /// The iteration bound for the escape-time evaluator.
    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// How many worker threads a compute pass will use at most.
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// The lifecycle state.
    pub fn state(&self) -> State {
        self.state
    }

    /// True once a compute pass has completed and nothing has changed
    /// since.
    pub fn is_ready(&self) -> bool {
        self.state != State::Uninitialized
    }

    /// Change the iteration bound.  Invalidates the current buffer.
    pub fn set_max_iterations(&mut self, max_iterations: u32) -> Result<(), PlaneError> {
        if max_iterations == 0 {
            return Err(PlaneError::InvalidIterations);
        }
        if max_iterations != self.max_iterations {
            self.max_iterations = max_iterations;
            self.state = State::Uninitialized;
        }
        Ok(())
    }

    /// Change the worker count.  Zero is treated as one.  The result of
    /// a pass does not depend on the worker count, so the buffer stays
    /// valid.
    pub fn set_threads(&mut self, threads: usize) {
        self.threads = threads.max(1);
    }

    /// Render a different region of the complex plane.  Invalidates the
    /// current buffer.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.mapper.viewport = viewport;
        self.default_viewport = false;
        self.state = State::Uninitialized;
    }

    /// Go back to the default viewport for the current grid size.
    pub fn use_default_viewport(&mut self) -> Result<(), PlaneError> {
        self.mapper.viewport = Viewport::default_for(self.width(), self.height())?;
        self.default_viewport = true;
        self.state = State::Uninitialized;
        Ok(())
    }

    /// Change the size of the grid.  The old buffer is released and a
    /// new one is allocated by the next compute pass; any view of the
    /// old buffer is gone with it.  A plane on the default viewport gets
    /// the default viewport for the new aspect ratio.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), PlaneError> {
        check_dimensions(width, height)?;
        if width == self.width() && height == self.height() {
            return Ok(());
        }
        let viewport = if self.default_viewport {
            Viewport::default_for(width, height)?
        } else {
            self.mapper.viewport
        };
        debug!(
            "resizing plane from {}x{} to {}x{}",
            self.width(),
            self.height(),
            width,
            height
        );
        self.mapper = PlaneMapper::new(width, height, viewport)?;
        self.pixels = Vec::new();
        self.state = State::Uninitialized;
        Ok(())
    }

    /// Run a full compute pass with the scheme named `scheme`.  An
    /// unknown name is reported before anything is touched, so a
    /// previously computed buffer is still there and still readable.
    pub fn compute(&mut self, scheme: &str) -> Result<(), PlaneError> {
        let scheme: Scheme = scheme.parse()?;
        self.compute_scheme(scheme)
    }

    /// Run a full compute pass with `scheme`.
    pub fn compute_scheme(&mut self, scheme: Scheme) -> Result<(), PlaneError> {
        self.compute_cancellable(scheme, &CancelToken::new())
    }

    /// Run a full compute pass that gives up when `cancel` fires.  On
    /// cancellation the plane is left Uninitialized, because part of
    /// the buffer has already been overwritten.
    pub fn compute_cancellable(&mut self, scheme: Scheme, cancel: &CancelToken) -> Result<(), PlaneError> {
        let start = Instant::now();
        let (width, height) = (self.width(), self.height());
        let threads = self.threads.min(height).max(1);
        debug!(
            "computing {}x{} plane: scheme {}, {} iterations, {} threads",
            width, height, scheme, self.max_iterations, threads
        );

        let size = self.pixel_count() * BYTES_PER_PIXEL;
        if self.pixels.len() != size {
            debug!("allocating {} byte plane buffer", size);
            self.pixels = vec![0; size];
        }
        self.state = State::Uninitialized;

        let rows_per_band = (height + threads - 1) / threads;
        let band_bytes = rows_per_band * width * BYTES_PER_PIXEL;
        let mapper = self.mapper;
        let max_iterations = self.max_iterations;

        let outcome = crossbeam::scope(|spawner| {
            let handles: Vec<_> = self
                .pixels
                .chunks_mut(band_bytes)
                .enumerate()
                .map(|(band, pixels)| {
                    let first_row = band * rows_per_band;
                    spawner.spawn(move |_| {
                        render_band(&mapper, scheme, max_iterations, first_row, pixels, cancel)
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join())
                .collect::<Vec<_>>()
        });

        let results = match outcome {
            Ok(results) => results,
            Err(_) => return Err(PlaneError::WorkerPanicked),
        };
        let mut finished = true;
        for result in results {
            match result {
                Ok(done) => finished &= done,
                Err(_) => return Err(PlaneError::WorkerPanicked),
            }
        }
        if !finished {
            warn!("compute pass cancelled after {:?}", start.elapsed());
            return Err(PlaneError::Cancelled);
        }

        self.state = State::Computed(scheme);
        info!("computed {}x{} plane in {:?}", width, height, start.elapsed());
        Ok(())
    }

    /// Lend the RGBA buffer: row-major, top row first, four bytes per
    /// pixel.  Only available after a completed compute pass.
    pub fn buffer_view(&self) -> Result<&[u8], PlaneError> {
        match self.state {
            State::Uninitialized => Err(PlaneError::BufferNotReady),
            State::Computed(_) => Ok(&self.pixels),
        }
    }

    /// One pixel of a computed buffer.  None before a pass completes or
    /// for a pixel off the grid.
    pub fn pixel(&self, px: usize, py: usize) -> Option<Rgba> {
        let buffer = self.buffer_view().ok()?;
        let offset = self.mapper.offset(&Pixel(px, py))? * BYTES_PER_PIXEL;
        Rgba::from_bytes(&buffer[offset..])
    }
}

/// Render the rows of one band.  `pixels` starts at row `first_row`
/// and holds whole rows.  Returns false if the pass was cancelled
/// before the band was finished.
fn render_band(
    mapper: &PlaneMapper,
    scheme: Scheme,
    max_iterations: u32,
    first_row: usize,
    pixels: &mut [u8],
    cancel: &CancelToken,
) -> bool {
    let row_bytes = mapper.width() * BYTES_PER_PIXEL;
    trace!(
        "band starting at row {}: {} rows",
        first_row,
        pixels.len() / row_bytes
    );
    for (i, row) in pixels.chunks_mut(row_bytes).enumerate() {
        if cancel.is_cancelled() {
            return false;
        }
        let im = mapper.row_to_im(first_row + i);
        for (px, out) in row.chunks_mut(BYTES_PER_PIXEL).enumerate() {
            let c = Complex::new(mapper.column_to_re(px), im);
            let escape = match escape_time_cancellable(c, max_iterations, cancel) {
                Some(escape) => escape,
                None => return false,
            };
            out.copy_from_slice(&colorize(scheme, escape, max_iterations).to_bytes());
        }
    }
    true
}
