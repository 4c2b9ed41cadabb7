// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use clap::{App, Arg, ArgMatches};
use failure::{err_msg, Error};
use image::ColorType;
use log::debug;
use num::Complex;
use std::convert::TryFrom;
use std::fmt::Display;
use std::str::FromStr;

use mandelplane::{Plane, Scheme, Viewport};

/// Splits "640x480" or "-0.5,1.25" at the separator and parses both
/// halves.
fn parse_pair<T: FromStr>(s: &str, separator: char) -> Option<(T, T)> {
    let index = s.find(separator)?;
    let left = s[..index].parse().ok()?;
    let right = s[index + 1..].parse().ok()?;
    Some((left, right))
}

fn parse_corner(s: &str) -> Option<Complex<f64>> {
    parse_pair(s, ',').map(|(re, im)| Complex::new(re, im))
}

// The image encoders take u32 dimensions.
fn parse_size(s: &str) -> Result<(u32, u32), String> {
    match parse_pair::<u32>(s, 'x') {
        Some((width, height)) if width > 0 && height > 0 => Ok((width, height)),
        Some(_) => Err("Image dimensions must be greater than zero".to_string()),
        None => Err(format!(
            "Could not parse output image size; expected WIDTHxHEIGHT, each at most {}",
            u32::max_value()
        )),
    }
}

fn check_corner(s: &str, which: &str) -> Result<(), String> {
    parse_corner(s)
        .map(|_| ())
        .ok_or_else(|| format!("Could not parse {} corner; expected RE,IM", which))
}

fn check_count<T>(s: &str, low: T, high: T, what: &str) -> Result<(), String>
where
    T: FromStr + PartialOrd + Display + Copy,
{
    let n: T = s.parse().map_err(|_| format!("Could not parse {}", what))?;
    if (low..=high).contains(&n) {
        Ok(())
    } else {
        Err(format!("The {} must be between {} and {}", what, low, high))
    }
}

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const SCHEME: &str = "scheme";
const LEFTLOWER: &str = "leftlower";
const RIGHTUPPER: &str = "rightupper";
const THREADS: &str = "threads";
const ITERATIONS: &str = "iterations";

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get();

    App::new("mandel")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Mandelbrot plane renderer")
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output file; the format follows the extension (png, ppm, bmp, ...)"),
        )
        .arg(
            Arg::with_name(SIZE)
                .required(false)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("800x600")
                .validator(|s| parse_size(&s).map(|_| ()))
                .help("Size of output image"),
        )
        .arg(
            Arg::with_name(SCHEME)
                .required(false)
                .long(SCHEME)
                .short("c")
                .takes_value(true)
                .default_value("basic")
                .validator(|s| s.parse::<Scheme>().map(|_| ()).map_err(|e| e.to_string()))
                .help("Color scheme: basic, hsv, lch or rgb"),
        )
        .arg(
            Arg::with_name(LEFTLOWER)
                .required(false)
                .long(LEFTLOWER)
                .short("l")
                .takes_value(true)
                .allow_hyphen_values(true)
                .requires(RIGHTUPPER)
                .validator(|s| check_corner(&s, "left lower"))
                .help("Left lower corner of the mandelbrot space (default: the classic view)"),
        )
        .arg(
            Arg::with_name(RIGHTUPPER)
                .required(false)
                .long(RIGHTUPPER)
                .short("r")
                .takes_value(true)
                .allow_hyphen_values(true)
                .requires(LEFTLOWER)
                .validator(|s| check_corner(&s, "right upper"))
                .help("Right upper corner of the mandelbrot space (default: the classic view)"),
        )
        .arg(
            Arg::with_name(THREADS)
                .required(false)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .validator(move |s| check_count(&s, 1, max_threads, "thread count"))
                .help("Number of threads to use in solver (default: all cores)"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .required(false)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("100")
                .validator(|s| check_count(&s, 1u32, 100_000, "iteration count"))
                .help("Maximum number of iterations per pixel"),
        )
        .get_matches()
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str, Error> {
    matches
        .value_of(name)
        .ok_or_else(|| err_msg(format!("missing --{}", name)))
}

fn build_plane(matches: &ArgMatches) -> Result<Plane, Error> {
    let (width, height) = parse_size(required(matches, SIZE)?).map_err(err_msg)?;
    let (width, height) = (width as usize, height as usize);

    let mut plane = match (matches.value_of(LEFTLOWER), matches.value_of(RIGHTUPPER)) {
        (Some(leftlower), Some(rightupper)) => {
            let leftlower =
                parse_corner(leftlower).ok_or_else(|| err_msg("Error parsing left lower point"))?;
            let rightupper =
                parse_corner(rightupper).ok_or_else(|| err_msg("Error parsing right upper point"))?;
            Plane::with_viewport(width, height, Viewport::from_corners(leftlower, rightupper)?)?
        }
        _ => Plane::new(width, height)?,
    };

    plane.set_max_iterations(u32::from_str(required(matches, ITERATIONS)?)?)?;
    if let Some(threads) = matches.value_of(THREADS) {
        plane.set_threads(usize::from_str(threads)?);
    }
    Ok(plane)
}

fn run(matches: &ArgMatches) -> Result<(), Error> {
    let mut plane = build_plane(matches)?;
    debug!("viewport {:?}", plane.viewport());
    plane.compute(required(matches, SCHEME)?)?;

    let output = required(matches, OUTPUT)?;
    image::save_buffer(
        output,
        plane.buffer_view()?,
        u32::try_from(plane.width())?,
        u32::try_from(plane.height())?,
        ColorType::RGBA(8),
    )?;
    Ok(())
}

fn main() {
    env_logger::init();
    let matches = args();
    if let Err(e) = run(&matches) {
        eprintln!("Render failure: {}", e);
        for cause in e.iter_causes() {
            eprintln!("  caused by: {}", cause);
        }
        std::process::exit(1);
    }
}
