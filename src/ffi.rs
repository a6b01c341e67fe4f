//! FFI bindings for interlace
//!
//! This module provides C-compatible functions for calling the fusion
//! engine from other languages. All functions use C strings
//! (null-terminated) and return allocated memory that must be freed by the
//! caller using `interlace_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::fuse::TimelineFuser;
use crate::narrative::render_narrative;
use crate::types::Timeline;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

unsafe fn read_log_args(
    transcript_json: *const c_char,
    visual_json: *const c_char,
    acoustic_json: *const c_char,
) -> Option<(String, String, String)> {
    let transcript = match cstr_to_string(transcript_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid transcript string pointer");
            return None;
        }
    };

    let visual = match cstr_to_string(visual_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid visual log string pointer");
            return None;
        }
    };

    let acoustic = match cstr_to_string(acoustic_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid acoustic log string pointer");
            return None;
        }
    };

    Some((transcript, visual, acoustic))
}

/// Fuse the three producer JSON logs and return the timeline payload JSON.
///
/// # Safety
/// - `transcript_json`, `visual_json`, and `acoustic_json` must be valid
///   null-terminated C strings.
/// - Returns a newly allocated string that must be freed with
///   `interlace_free_string`.
/// - Returns NULL on error; call `interlace_last_error` to get the error
///   message.
#[no_mangle]
pub unsafe extern "C" fn interlace_fuse_logs(
    transcript_json: *const c_char,
    visual_json: *const c_char,
    acoustic_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let (transcript, visual, acoustic) =
        match read_log_args(transcript_json, visual_json, acoustic_json) {
            Some(args) => args,
            None => return ptr::null_mut(),
        };

    match TimelineFuser::new().fuse_logs(&transcript, &visual, &acoustic) {
        Ok(payload) => string_to_cstr(&payload),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Fuse the three producer JSON logs and return the narrative text
/// (one line per event, newline-joined).
///
/// # Safety
/// - `transcript_json`, `visual_json`, and `acoustic_json` must be valid
///   null-terminated C strings.
/// - Returns a newly allocated string that must be freed with
///   `interlace_free_string`.
/// - Returns NULL on error; call `interlace_last_error` to get the error
///   message.
#[no_mangle]
pub unsafe extern "C" fn interlace_fuse_to_narrative(
    transcript_json: *const c_char,
    visual_json: *const c_char,
    acoustic_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let (transcript, visual, acoustic) =
        match read_log_args(transcript_json, visual_json, acoustic_json) {
            Some(args) => args,
            None => return ptr::null_mut(),
        };

    match TimelineFuser::new().fuse_logs(&transcript, &visual, &acoustic) {
        Ok(payload) => {
            let timeline: Timeline = match serde_json::from_str::<serde_json::Value>(&payload)
                .ok()
                .and_then(|v| serde_json::from_value(v["events"].clone()).ok())
            {
                Some(t) => t,
                None => {
                    set_last_error("Failed to extract events from payload");
                    return ptr::null_mut();
                }
            };
            string_to_cstr(&render_narrative(&timeline))
        }
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free a string returned by interlace functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by an interlace function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn interlace_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next interlace function call on
///   this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn interlace_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the interlace library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn interlace_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
