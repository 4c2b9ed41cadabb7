// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The C boundary.  A foreign host (a wasm page, a C program, a GUI
//! toolkit) creates a plane, asks for a compute pass, then reads the
//! pixels in place through `mandel_plane_pixels_ptr` and
//! `mandel_plane_buffer_len`.  Nothing is copied across the boundary.
//!
//! The pointer returned by `mandel_plane_pixels_ptr` stays valid until
//! the next call that takes the plane mutably (`compute`, `resize`,
//! `free`).  The host must never write through it or free it.

use std::ffi::CStr;
use std::os::raw::c_char;
use std::ptr;

use crate::plane::Plane;

/// Status returned by `mandel_plane_compute` on success.
pub const MANDEL_OK: i32 = 0;

/// Status for a null plane or scheme-name pointer.
pub const MANDEL_NULL_ARGUMENT: i32 = -100;

/// Create a plane of `width` x `height` pixels over the default
/// viewport, iterating at most `max_iterations` times per pixel.
/// Returns null if any argument is invalid.  The plane must be
/// released with `mandel_plane_free`.
#[no_mangle]
pub extern "C" fn mandel_plane_new(width: usize, height: usize, max_iterations: u32) -> *mut Plane {
    let mut plane = match Plane::new(width, height) {
        Ok(plane) => plane,
        Err(_) => return ptr::null_mut(),
    };
    if plane.set_max_iterations(max_iterations).is_err() {
        return ptr::null_mut();
    }
    Box::into_raw(Box::new(plane))
}

/// Run a compute pass with the NUL-terminated scheme name.  Returns
/// `MANDEL_OK`, or the negative code of the error.
///
/// # Safety
///
/// `plane` must come from `mandel_plane_new` and not yet be freed;
/// `scheme` must be a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn mandel_plane_compute(plane: *mut Plane, scheme: *const c_char) -> i32 {
    if plane.is_null() || scheme.is_null() {
        return MANDEL_NULL_ARGUMENT;
    }
    let plane = &mut *plane;
    let name = CStr::from_ptr(scheme).to_string_lossy();
    match plane.compute(&name) {
        Ok(()) => MANDEL_OK,
        Err(e) => e.code(),
    }
}

/// Change the size of the plane.  Any pointer previously returned by
/// `mandel_plane_pixels_ptr` is invalid afterwards.
///
/// # Safety
///
/// `plane` must come from `mandel_plane_new` and not yet be freed.
#[no_mangle]
pub unsafe extern "C" fn mandel_plane_resize(plane: *mut Plane, width: usize, height: usize) -> i32 {
    if plane.is_null() {
        return MANDEL_NULL_ARGUMENT;
    }
    match (*plane).resize(width, height) {
        Ok(()) => MANDEL_OK,
        Err(e) => e.code(),
    }
}

/// The start of the RGBA buffer, or null if no pass has completed.
///
/// # Safety
///
/// `plane` must come from `mandel_plane_new` and not yet be freed.
#[no_mangle]
pub unsafe extern "C" fn mandel_plane_pixels_ptr(plane: *const Plane) -> *const u8 {
    if plane.is_null() {
        return ptr::null();
    }
    match (*plane).buffer_view() {
        Ok(buffer) => buffer.as_ptr(),
        Err(_) => ptr::null(),
    }
}

/// Length in bytes of the RGBA buffer, or 0 if no pass has completed.
///
/// # Safety
///
/// `plane` must come from `mandel_plane_new` and not yet be freed.
#[no_mangle]
pub unsafe extern "C" fn mandel_plane_buffer_len(plane: *const Plane) -> usize {
    if plane.is_null() {
        return 0;
    }
    (*plane).buffer_view().map(|buffer| buffer.len()).unwrap_or(0)
}

/// Number of pixels, width * height.
///
/// # Safety
///
/// `plane` must come from `mandel_plane_new` and not yet be freed.
#[no_mangle]
pub unsafe extern "C" fn mandel_plane_npixels(plane: *const Plane) -> usize {
    if plane.is_null() {
        return 0;
    }
    (*plane).pixel_count()
}

/// Release a plane and its buffer.  Null is ignored.
///
/// # Safety
///
/// `plane` must come from `mandel_plane_new` and must not be used
/// again afterwards.
#[no_mangle]
pub unsafe extern "C" fn mandel_plane_free(plane: *mut Plane) {
    if !plane.is_null() {
        drop(Box::from_raw(plane));
    }
}
