// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the PlaneMapper struct, which describes a relationship
//! between a rectangle on the integral plane with an origin at 0,0
//! in the top-left corner, and a rectangle on the complex plane (the
//! Viewport).  Every pixel is sampled at its center, not its corner,
//! so the sample grid sits symmetrically inside the viewport.

use itertools::iproduct;
use num::Complex;

use crate::errors::PlaneError;

/// The classic full view of the Mandelbrot set, before the aspect
/// correction.
const CLASSIC_RE: (f64, f64) = (-2.5, 1.0);
const CLASSIC_IM: (f64, f64) = (-1.25, 1.25);

/// Describes the width and height of an integral plane that is assumed to start at
/// 0,0 and all values are assumed to be non-negative integers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntegralPlane(pub usize, pub usize);

/// Describes the x, y of a pixel in the integral plane.  x runs left
/// to right, y runs top to bottom.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// The rectangle of the complex plane that gets mapped onto the
/// pixel grid.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    /// Smallest real value, at the left edge
    pub re_min: f64,
    /// Largest real value, at the right edge
    pub re_max: f64,
    /// Imaginary value at the top edge
    pub im_min: f64,
    /// Imaginary value at the bottom edge
    pub im_max: f64,
}

impl Viewport {
    /// Build a viewport from its two ranges, refusing inverted, empty or
    /// non-finite ones.
    pub fn new(re_min: f64, re_max: f64, im_min: f64, im_max: f64) -> Result<Viewport, PlaneError> {
        let finite = [re_min, re_max, im_min, im_max].iter().all(|v| v.is_finite());
        if !finite || re_min >= re_max || im_min >= im_max {
            return Err(PlaneError::InvalidViewport);
        }
        Ok(Viewport {
            re_min,
            re_max,
            im_min,
            im_max,
        })
    }

    /// Build a viewport from the two corners of the region.  The
    /// corners may be given in any order.
    pub fn from_corners(a: Complex<f64>, b: Complex<f64>) -> Result<Viewport, PlaneError> {
        Viewport::new(a.re.min(b.re), a.re.max(b.re), a.im.min(b.im), a.im.max(b.im))
    }

    /// Build a viewport centered on `center`, where `scale` is the
    /// width (and height) of a single pixel in the complex plane.
    pub fn from_center(
        center: Complex<f64>,
        scale: f64,
        width: usize,
        height: usize,
    ) -> Result<Viewport, PlaneError> {
        check_dimensions(width, height)?;
        if !(scale > 0.0) {
            return Err(PlaneError::InvalidViewport);
        }
        let half_re = scale * width as f64 / 2.0;
        let half_im = scale * height as f64 / 2.0;
        Viewport::new(
            center.re - half_re,
            center.re + half_re,
            center.im - half_im,
            center.im + half_im,
        )
    }

    /// The classic view, widened along one axis so that a pixel covers
    /// the same distance horizontally and vertically.  The fractal is
    /// never stretched and never cropped.
    pub fn default_for(width: usize, height: usize) -> Result<Viewport, PlaneError> {
        check_dimensions(width, height)?;
        let (re_min, re_max) = CLASSIC_RE;
        let (im_min, im_max) = CLASSIC_IM;
        let (re_span, im_span) = (re_max - re_min, im_max - im_min);
        let pixel_aspect = width as f64 / height as f64;

        if pixel_aspect > re_span / im_span {
            let re_center = (re_min + re_max) / 2.0;
            let half = im_span * pixel_aspect / 2.0;
            Viewport::new(re_center - half, re_center + half, im_min, im_max)
        } else {
            let im_center = (im_min + im_max) / 2.0;
            let half = re_span / pixel_aspect / 2.0;
            Viewport::new(re_min, re_max, im_center - half, im_center + half)
        }
    }

    /// Width of the region along the real axis.
    pub fn re_span(&self) -> f64 {
        self.re_max - self.re_min
    }

    /// Height of the region along the imaginary axis.
    pub fn im_span(&self) -> f64 {
        self.im_max - self.im_min
    }
}

/// A grid must have at least one pixel each way, and its RGBA buffer
/// (four bytes a pixel) must fit in a single allocation, which Rust caps
/// at `isize::MAX` bytes.
pub(crate) fn check_dimensions(width: usize, height: usize) -> Result<(), PlaneError> {
    let bytes = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(4))
        .filter(|&n| n <= isize::max_value() as usize);
    if width == 0 || height == 0 || bytes.is_none() {
        return Err(PlaneError::InvalidDimensions { width, height });
    }
    Ok(())
}

/// Contains the definitions of two planes: an integral cartesian plane,
/// and a complex cartesian plane.  Maps points from one to the other.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlaneMapper {
    /// The size of the integral cartesian plane.
    pub integral_plane: IntegralPlane,
    /// The region of the complex plane being sampled.
    pub viewport: Viewport,
}

impl PlaneMapper {
    /// Constructor.  Takes the size of the integral plane and the
    /// viewport it samples.
    pub fn new(width: usize, height: usize, viewport: Viewport) -> Result<PlaneMapper, PlaneError> {
        check_dimensions(width, height)?;
        Ok(PlaneMapper {
            integral_plane: IntegralPlane(width, height),
            viewport,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.integral_plane.0
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.integral_plane.1
    }

    /// The total number of points in the integral grid.  Used to
    /// calculate memory needs.
    pub fn len(&self) -> usize {
        self.integral_plane.0 * self.integral_plane.1
    }

    /// Real coordinate of the center of column `px`.
    #[inline]
    pub fn column_to_re(&self, px: usize) -> f64 {
        let v = &self.viewport;
        v.re_min + (px as f64 + 0.5) / self.integral_plane.0 as f64 * (v.re_max - v.re_min)
    }

    /// Imaginary coordinate of the center of row `py`.
    #[inline]
    pub fn row_to_im(&self, py: usize) -> f64 {
        let v = &self.viewport;
        v.im_min + (py as f64 + 0.5) / self.integral_plane.1 as f64 * (v.im_max - v.im_min)
    }

    /// Given a pixel on the integral cartesian plane, map its center to
    /// a point on the complex cartesian plane.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        Complex::new(self.column_to_re(pixel.0), self.row_to_im(pixel.1))
    }

    /// Given a complex number, find the pixel whose cell contains it,
    /// or None if the point is outside the viewport.
    pub fn point_to_pixel(&self, point: &Complex<f64>) -> Option<Pixel> {
        let v = &self.viewport;
        let left = (point.re - v.re_min) / v.re_span() * self.integral_plane.0 as f64;
        let top = (point.im - v.im_min) / v.im_span() * self.integral_plane.1 as f64;
        if !(left >= 0.0 && top >= 0.0) {
            return None;
        }
        let pixel = Pixel(left as usize, top as usize);
        if pixel.0 >= self.integral_plane.0 || pixel.1 >= self.integral_plane.1 {
            return None;
        }
        Some(pixel)
    }

    /// The row-major index of a pixel, or None if the pixel is off the
    /// grid.
    pub fn offset(&self, pixel: &Pixel) -> Option<usize> {
        if pixel.0 >= self.integral_plane.0 || pixel.1 >= self.integral_plane.1 {
            return None;
        }
        Some(pixel.1 * self.integral_plane.0 + pixel.0)
    }

    /// Every pixel in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = Pixel> {
        iproduct!(0..self.integral_plane.1, 0..self.integral_plane.0).map(|(y, x)| Pixel(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn square(size: usize, lo: f64, hi: f64) -> PlaneMapper {
        PlaneMapper::new(size, size, Viewport::new(lo, hi, lo, hi).unwrap()).unwrap()
    }

    #[test]
    fn viewport_fails_on_bad_shape() {
        assert_eq!(Viewport::new(1.0, -1.0, -1.0, 1.0), Err(PlaneError::InvalidViewport));
        assert_eq!(Viewport::new(-1.0, 1.0, 1.0, 1.0), Err(PlaneError::InvalidViewport));
        assert_eq!(
            Viewport::new(-1.0, std::f64::NAN, -1.0, 1.0),
            Err(PlaneError::InvalidViewport)
        );
    }

    #[test]
    fn viewport_from_corners_accepts_any_order() {
        let v = Viewport::from_corners(Complex::new(1.0, -1.0), Complex::new(-1.0, 1.0)).unwrap();
        assert_eq!(v, Viewport::new(-1.0, 1.0, -1.0, 1.0).unwrap());
    }

    #[test]
    fn viewport_from_center() {
        let v = Viewport::from_center(Complex::new(0.0, 0.0), 0.5, 8, 4).unwrap();
        assert_eq!(v, Viewport::new(-2.0, 2.0, -1.0, 1.0).unwrap());
        assert!(Viewport::from_center(Complex::new(0.0, 0.0), 0.0, 8, 4).is_err());
    }

    #[test]
    fn planemapper_fails_on_empty_grid() {
        let v = Viewport::new(-1.0, 1.0, -1.0, 1.0).unwrap();
        assert_eq!(
            PlaneMapper::new(0, 4, v),
            Err(PlaneError::InvalidDimensions {
                width: 0,
                height: 4
            })
        );
        assert!(PlaneMapper::new(4, 0, v).is_err());
        assert!(PlaneMapper::new(4, 4, v).is_ok());
    }

    #[test]
    fn planemapper_fails_on_unaddressable_grid() {
        let v = Viewport::new(-1.0, 1.0, -1.0, 1.0).unwrap();
        let huge = usize::max_value() / 4 + 1;
        assert_eq!(
            PlaneMapper::new(huge, 1, v),
            Err(PlaneError::InvalidDimensions {
                width: huge,
                height: 1
            })
        );
        let half = usize::max_value() / 2;
        assert!(PlaneMapper::new(half, half, v).is_err());
        assert!(Viewport::default_for(half, 3).is_err());
        assert!(PlaneMapper::new(isize::max_value() as usize / 4 + 1, 1, v).is_err());
        assert!(PlaneMapper::new(isize::max_value() as usize / 4, 1, v).is_ok());
    }

    #[test]
    fn default_viewport_is_classic_for_matching_aspect() {
        let v = Viewport::default_for(350, 250).unwrap();
        assert!((v.re_min + 2.5).abs() < 1e-12);
        assert!((v.re_max - 1.0).abs() < 1e-12);
        assert!((v.im_min + 1.25).abs() < 1e-12);
        assert!((v.im_max - 1.25).abs() < 1e-12);
    }

    #[test]
    fn default_viewport_preserves_aspect() {
        for &(w, h) in &[(16, 16), (1000, 200), (200, 1000), (37, 91)] {
            let v = Viewport::default_for(w, h).unwrap();
            let pixel_w = v.re_span() / w as f64;
            let pixel_h = v.im_span() / h as f64;
            assert!((pixel_w - pixel_h).abs() < 1e-12, "{}x{}", w, h);
            // The classic view is always fully contained.
            assert!(v.re_min <= -2.5 + 1e-12 && v.re_max >= 1.0 - 1e-12);
            assert!(v.im_min <= -1.25 + 1e-12 && v.im_max >= 1.25 - 1e-12);
        }
    }

    #[test]
    fn pixel_to_point_samples_centers() {
        let pm = square(4, -2.0, 2.0);
        assert_eq!(pm.pixel_to_point(&Pixel(0, 0)), Complex::new(-1.5, -1.5));
        assert_eq!(pm.pixel_to_point(&Pixel(1, 2)), Complex::new(-0.5, 0.5));
        assert_eq!(pm.pixel_to_point(&Pixel(3, 3)), Complex::new(1.5, 1.5));
    }

    #[test]
    fn top_row_is_im_min() {
        let pm = square(4, -2.0, 2.0);
        assert!(pm.row_to_im(0) < pm.row_to_im(1));
        assert!(pm.row_to_im(3) < pm.viewport.im_max);
    }

    #[test]
    fn point_to_pixel_round_trips_centers() {
        let pm = square(640, -2.0, 2.0);
        for p in &[Pixel(0, 0), Pixel(320, 17), Pixel(639, 639)] {
            assert_eq!(pm.point_to_pixel(&pm.pixel_to_point(p)), Some(*p));
        }
        assert_eq!(pm.point_to_pixel(&Complex::new(2.0, 0.0)), None);
        assert_eq!(pm.point_to_pixel(&Complex::new(-2.1, 0.0)), None);
    }

    #[test]
    fn offsets_are_row_major() {
        let pm = PlaneMapper::new(5, 3, Viewport::default_for(5, 3).unwrap()).unwrap();
        assert_eq!(pm.offset(&Pixel(0, 0)), Some(0));
        assert_eq!(pm.offset(&Pixel(4, 0)), Some(4));
        assert_eq!(pm.offset(&Pixel(0, 1)), Some(5));
        assert_eq!(pm.offset(&Pixel(5, 0)), None);
        let all: Vec<Pixel> = pm.pixels().collect();
        assert_eq!(all.len(), pm.len());
        assert_eq!(all[6], Pixel(1, 1));
    }

    #[test]
    fn sampling_is_deterministic() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let w = rng.gen_range(1, 2000);
            let h = rng.gen_range(1, 2000);
            let v = Viewport::default_for(w, h).unwrap();
            let a = PlaneMapper::new(w, h, v).unwrap();
            let b = PlaneMapper::new(w, h, v).unwrap();
            let p = Pixel(rng.gen_range(0, w), rng.gen_range(0, h));
            let (pa, pb) = (a.pixel_to_point(&p), b.pixel_to_point(&p));
            assert_eq!(pa.re.to_bits(), pb.re.to_bits());
            assert_eq!(pa.im.to_bits(), pb.im.to_bits());
        }
    }
}
