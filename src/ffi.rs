//! FFI bindings for Classense
//!
//! C-compatible functions for calling the engine from other languages. All
//! functions use null-terminated C strings and return allocated memory that
//! must be freed by the caller using `classense_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::config::EngineConfig;
use crate::pipeline::{analyze_to_report, EngagementProcessor};
use crate::ENGINE_VERSION;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert a C string to a Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert a Rust string to a C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Parse an optional config JSON pointer; null means defaults
unsafe fn config_from_ptr(config_json: *const c_char) -> Result<EngineConfig, String> {
    match cstr_to_string(config_json) {
        None => Ok(EngineConfig::default()),
        Some(json) => EngineConfig::from_json(&json).map_err(|e| e.to_string()),
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Analyze a pose sequence JSON and return an engagement report JSON.
///
/// # Safety
/// - `sequence_json` must be a valid null-terminated C string.
/// - `config_json` may be NULL for the default configuration.
/// - Returns a newly allocated string that must be freed with
///   `classense_free_string`.
/// - Returns NULL on error; call `classense_last_error` for the message.
#[no_mangle]
pub unsafe extern "C" fn classense_analyze(
    sequence_json: *const c_char,
    config_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let sequence = match cstr_to_string(sequence_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid sequence JSON pointer");
            return ptr::null_mut();
        }
    };

    let config = match config_from_ptr(config_json) {
        Ok(config) => config,
        Err(message) => {
            set_last_error(&message);
            return ptr::null_mut();
        }
    };

    match analyze_to_report(&sequence, &config) {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateful API
// ============================================================================

/// Create a processor with persistent trend baselines.
///
/// # Safety
/// - `config_json` may be NULL for the default configuration.
/// - Returns NULL on error; the handle must be freed with
///   `classense_processor_free`.
#[no_mangle]
pub unsafe extern "C" fn classense_processor_new(
    config_json: *const c_char,
) -> *mut EngagementProcessor {
    clear_last_error();

    match config_from_ptr(config_json) {
        Ok(config) => Box::into_raw(Box::new(EngagementProcessor::with_config(config))),
        Err(message) => {
            set_last_error(&message);
            ptr::null_mut()
        }
    }
}

/// Process a pose sequence JSON through a processor handle.
///
/// # Safety
/// - `processor` must be a handle from `classense_processor_new`.
/// - `sequence_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with
///   `classense_free_string`; NULL on error.
#[no_mangle]
pub unsafe extern "C" fn classense_processor_process(
    processor: *mut EngagementProcessor,
    sequence_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let Some(processor) = processor.as_mut() else {
        set_last_error("Invalid processor pointer");
        return ptr::null_mut();
    };

    let sequence = match cstr_to_string(sequence_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid sequence JSON pointer");
            return ptr::null_mut();
        }
    };

    match processor.process(&sequence) {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free a processor handle.
///
/// # Safety
/// - `processor` must be a handle from `classense_processor_new`, or NULL.
#[no_mangle]
pub unsafe extern "C" fn classense_processor_free(processor: *mut EngagementProcessor) {
    if !processor.is_null() {
        drop(Box::from_raw(processor));
    }
}

// ============================================================================
// Utilities
// ============================================================================

/// Return the last error message, or NULL if none.
///
/// # Safety
/// - The returned pointer is valid until the next engine call on this
///   thread; do not free it.
#[no_mangle]
pub unsafe extern "C" fn classense_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Free a string returned by this library.
///
/// # Safety
/// - `ptr` must have been returned by a `classense_*` function, or NULL.
#[no_mangle]
pub unsafe extern "C" fn classense_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

/// Return the engine version as a newly allocated string.
///
/// # Safety
/// - The returned string must be freed with `classense_free_string`.
#[no_mangle]
pub unsafe extern "C" fn classense_version() -> *mut c_char {
    string_to_cstr(ENGINE_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::forward_frame;
    use crate::types::PoseSequence;
    use std::ffi::CString;

    fn sequence_cstring() -> CString {
        let frames: PoseSequence = (0..5)
            .map(|i| Some(forward_frame(i as f64, 0.5, 0.5)))
            .collect();
        CString::new(serde_json::to_string(&frames).unwrap()).unwrap()
    }

    #[test]
    fn test_analyze_round_trip() {
        let input = sequence_cstring();
        let output = unsafe { classense_analyze(input.as_ptr(), ptr::null()) };
        assert!(!output.is_null());

        let report = unsafe { CStr::from_ptr(output) }.to_str().unwrap();
        let value: serde_json::Value = serde_json::from_str(report).unwrap();
        assert_eq!(value["producer"]["name"], "classense");

        unsafe { classense_free_string(output) };
    }

    #[test]
    fn test_error_reported_for_bad_input() {
        let input = CString::new("not json").unwrap();
        let output = unsafe { classense_analyze(input.as_ptr(), ptr::null()) };
        assert!(output.is_null());

        let error = unsafe { classense_last_error() };
        assert!(!error.is_null());
        let message = unsafe { CStr::from_ptr(error) }.to_str().unwrap();
        assert!(message.contains("parse"));
    }

    #[test]
    fn test_processor_lifecycle() {
        let processor = unsafe { classense_processor_new(ptr::null()) };
        assert!(!processor.is_null());

        let input = sequence_cstring();
        let output = unsafe { classense_processor_process(processor, input.as_ptr()) };
        assert!(!output.is_null());

        unsafe {
            classense_free_string(output);
            classense_processor_free(processor);
        }
    }

    #[test]
    fn test_null_pointer_rejected() {
        let output = unsafe { classense_analyze(ptr::null(), ptr::null()) };
        assert!(output.is_null());

        let error = unsafe { classense_last_error() };
        assert!(!error.is_null());
    }
}
