// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Color schemes.  Each scheme is a pure gradient from a normalized
//! escape speed t in [0, 1] to an opaque RGBA color; points inside the
//! set are always INSIDE, whatever the scheme.
//!
//! The schemes are a closed set chosen by name, so they are a plain
//! enum and a match rather than a table of trait objects.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use num::clamp;

use crate::errors::PlaneError;
use crate::escape::Escape;

/// One RGBA pixel, written to the buffer in R, G, B, A order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Rgba {
    /// Red channel
    pub red: u8,
    /// Green channel
    pub green: u8,
    /// Blue channel
    pub blue: u8,
    /// Alpha channel; 255 is fully opaque
    pub alpha: u8,
}

impl Rgba {
    /// An opaque color.
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Rgba {
        Rgba {
            red,
            green,
            blue,
            alpha: 255,
        }
    }

    /// The four channels in buffer order.
    #[inline]
    pub fn to_bytes(self) -> [u8; 4] {
        [self.red, self.green, self.blue, self.alpha]
    }

    /// Read a pixel back out of a buffer slice of at least four bytes.
    pub fn from_bytes(bytes: &[u8]) -> Option<Rgba> {
        match bytes {
            [red, green, blue, alpha, ..] => Some(Rgba {
                red: *red,
                green: *green,
                blue: *blue,
                alpha: *alpha,
            }),
            _ => None,
        }
    }
}

/// The color of every point inside the set, under every scheme.
pub const INSIDE: Rgba = Rgba::rgb(0, 0, 0);

// A banded run from deep blue up through pale blue into amber.
const BASIC_PALETTE: [Rgba; 8] = [
    Rgba::rgb(0x10, 0x10, 0x60),
    Rgba::rgb(0x20, 0x30, 0x90),
    Rgba::rgb(0x30, 0x60, 0xc0),
    Rgba::rgb(0x40, 0x90, 0xe0),
    Rgba::rgb(0x80, 0xc0, 0xf0),
    Rgba::rgb(0xc0, 0xe0, 0xff),
    Rgba::rgb(0xff, 0xe0, 0xa0),
    Rgba::rgb(0xff, 0xb0, 0x40),
];

// Evenly spaced control points for the RGB gradient.
const RGB_STOPS: [(f64, f64, f64); 5] = [
    (0.0, 7.0, 100.0),
    (32.0, 107.0, 203.0),
    (237.0, 255.0, 255.0),
    (255.0, 170.0, 0.0),
    (120.0, 30.0, 0.0),
];

const HSV_HUE_START: f64 = 240.0;
const HSV_SATURATION: f64 = 0.85;
const HSV_VALUE: f64 = 1.0;

// D65 reference white.
const WHITE_X: f64 = 0.950_47;
const WHITE_Y: f64 = 1.0;
const WHITE_Z: f64 = 1.088_83;

/// The available color schemes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// A small banded palette indexed by bucketed escape speed.
    Basic,
    /// Hue sweep from blue to red in HSV space.
    Hsv,
    /// Lightness/chroma/hue gradient; the most expensive and the
    /// smoothest to the eye.
    Lch,
    /// Linear interpolation between a few RGB control colors.
    Rgb,
}

impl Scheme {
    /// Every scheme, in the order a host should offer them.
    pub fn all() -> &'static [Scheme] {
        &[Scheme::Basic, Scheme::Hsv, Scheme::Lch, Scheme::Rgb]
    }

    /// The name a host uses to select this scheme.
    pub fn name(self) -> &'static str {
        match self {
            Scheme::Basic => "basic",
            Scheme::Hsv => "hsv",
            Scheme::Lch => "lch",
            Scheme::Rgb => "rgb",
        }
    }

    /// Does this scheme use the continuous escape estimate?  Basic is
    /// banded on purpose.
    pub fn is_smooth(self) -> bool {
        self != Scheme::Basic
    }

    /// The scheme's gradient.  `t` is clamped into [0, 1]; gradient(0.0)
    /// and gradient(1.0) are the scheme's two endpoint colors.
    pub fn gradient(self, t: f64) -> Rgba {
        let t = if t.is_nan() { 0.0 } else { clamp(t, 0.0, 1.0) };
        match self {
            Scheme::Basic => basic(t),
            Scheme::Hsv => hsv(t),
            Scheme::Lch => lch(t),
            Scheme::Rgb => rgb(t),
        }
    }
}

impl FromStr for Scheme {
    type Err = PlaneError;

    fn from_str(s: &str) -> Result<Scheme, PlaneError> {
        Scheme::all()
            .iter()
            .cloned()
            .find(|scheme| scheme.name() == s)
            .ok_or_else(|| PlaneError::InvalidScheme(s.to_string()))
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The normalized escape speed n / max, in [0, 1].
pub fn escape_ratio(iterations: u32, max_iterations: u32) -> f64 {
    clamp(iterations as f64 / max_iterations.max(1) as f64, 0.0, 1.0)
}

/// The continuous ("normalized iteration count") version of
/// escape_ratio, which removes the banding.  Falls back to the plain
/// ratio when the modulus is too small or not finite for the
/// correction to mean anything.
pub fn smooth_ratio(iterations: u32, modulus: f64, max_iterations: u32) -> f64 {
    let nu = modulus.log2().log2();
    let t = (iterations as f64 + 1.0 - nu) / max_iterations.max(1) as f64;
    if t.is_finite() {
        clamp(t, 0.0, 1.0)
    } else {
        escape_ratio(iterations, max_iterations)
    }
}

/// Map the fate of a point to its color under `scheme`.
pub fn colorize(scheme: Scheme, escape: Escape, max_iterations: u32) -> Rgba {
    match escape {
        Escape::InSet => INSIDE,
        Escape::Escaped { iterations, modulus } => {
            let t = if scheme.is_smooth() {
                smooth_ratio(iterations, modulus, max_iterations)
            } else {
                escape_ratio(iterations, max_iterations)
            };
            scheme.gradient(t)
        }
    }
}

#[inline]
fn channel(v: f64) -> u8 {
    clamp(v.round(), 0.0, 255.0) as u8
}

fn basic(t: f64) -> Rgba {
    let index = ((t * BASIC_PALETTE.len() as f64) as usize).min(BASIC_PALETTE.len() - 1);
    BASIC_PALETTE[index]
}

fn rgb(t: f64) -> Rgba {
    let segments = RGB_STOPS.len() - 1;
    let position = t * segments as f64;
    let i = (position as usize).min(segments - 1);
    let f = position - i as f64;
    let (r0, g0, b0) = RGB_STOPS[i];
    let (r1, g1, b1) = RGB_STOPS[i + 1];
    Rgba::rgb(
        channel(r0 + (r1 - r0) * f),
        channel(g0 + (g1 - g0) * f),
        channel(b0 + (b1 - b0) * f),
    )
}

fn hsv(t: f64) -> Rgba {
    let (r, g, b) = hsv_to_rgb(HSV_HUE_START * (1.0 - t), HSV_SATURATION, HSV_VALUE);
    Rgba::rgb(channel(r * 255.0), channel(g * 255.0), channel(b * 255.0))
}

/// Hue in degrees, saturation and value in [0, 1]; returns channels in
/// [0, 1].
fn hsv_to_rgb(hue: f64, saturation: f64, value: f64) -> (f64, f64, f64) {
    let c = value * saturation;
    let h = (hue % 360.0) / 60.0;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let m = value - c;
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    (r + m, g + m, b + m)
}

fn lch(t: f64) -> Rgba {
    let v = 1.0 - (PI * t).cos().powi(2);
    let lightness = 75.0 - 75.0 * v;
    let chroma = 28.0 + lightness;
    let hue = (360.0 * t).powf(1.5) % 360.0;
    let (r, g, b) = lch_to_srgb(lightness, chroma, hue);
    Rgba::rgb(channel(r * 255.0), channel(g * 255.0), channel(b * 255.0))
}

/// CIE LCh(ab) to gamma-encoded sRGB, through Lab and XYZ under D65.
/// Out-of-gamut channels are clamped.
fn lch_to_srgb(lightness: f64, chroma: f64, hue: f64) -> (f64, f64, f64) {
    let h = hue.to_radians();
    let (a, b) = (chroma * h.cos(), chroma * h.sin());

    let fy = (lightness + 16.0) / 116.0;
    let fx = fy + a / 500.0;
    let fz = fy - b / 200.0;
    let x = WHITE_X * lab_finv(fx);
    let y = WHITE_Y * lab_finv(fy);
    let z = WHITE_Z * lab_finv(fz);

    let r = 3.240_454_2 * x - 1.537_138_5 * y - 0.498_531_4 * z;
    let g = -0.969_266_0 * x + 1.876_010_8 * y + 0.041_556_0 * z;
    let b = 0.055_643_4 * x - 0.204_025_9 * y + 1.057_225_2 * z;
    (gamma(r), gamma(g), gamma(b))
}

fn lab_finv(t: f64) -> f64 {
    const DELTA: f64 = 6.0 / 29.0;
    if t > DELTA {
        t * t * t
    } else {
        3.0 * DELTA * DELTA * (t - 4.0 / 29.0)
    }
}

fn gamma(linear: f64) -> f64 {
    let v = linear.max(0.0).min(1.0);
    if v <= 0.003_130_8 {
        12.92 * v
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    }
}
