//! FFI (Foreign Function Interface) bindings for cross-language interop.
//!
//! Native frontends describe a plugin without linking against any Rust
//! types: they pass a fact document path and a plugin URI and get the
//! descriptor back as a JSON string.
//!
//! # Memory Management
//!
//! - Rust allocates the returned string
//! - The caller MUST pass it to `plugininfo_free_string` to prevent leaks
//! - Strings are null-terminated UTF-8
//!
//! # Usage from C
//!
//! ```c
//! char *json = plugininfo_describe_json("/var/lib/lv2/facts.json",
//!                                       "http://example.org/amp");
//! if (json) {
//!     puts(json);
//!     plugininfo_free_string(json);
//! }
//! ```

use crate::registry::describe_plugin;
use crate::repository::FactGraph;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::path::Path;
use std::ptr;
use tracing::warn;

/// Describe the plugin `uri` found in the fact document at `facts_path`.
/// Returns the descriptor as JSON, or null when an argument is invalid, the
/// document cannot be loaded or the plugin does not exist.
/// Caller MUST call plugininfo_free_string() on a non-null result.
#[no_mangle]
pub extern "C" fn plugininfo_describe_json(
    facts_path: *const c_char,
    uri: *const c_char,
) -> *mut c_char {
    let (Some(facts_path), Some(uri)) = (c_char_to_str(facts_path), c_char_to_str(uri)) else {
        return ptr::null_mut();
    };

    let graph = match FactGraph::load_files(&[Path::new(facts_path)]) {
        Ok(graph) => graph,
        Err(e) => {
            warn!(error = %e, "failed to load fact document");
            return ptr::null_mut();
        }
    };

    match describe_plugin(&graph, uri).map(|descriptor| serde_json::to_string(&descriptor)) {
        Ok(Ok(json)) => string_to_c_char(&json),
        Ok(Err(e)) => {
            warn!(error = %e, "failed to serialize descriptor");
            ptr::null_mut()
        }
        Err(e) => {
            warn!(error = %e, "plugin lookup failed");
            ptr::null_mut()
        }
    }
}

/// Free a string returned by plugininfo_describe_json().
#[no_mangle]
pub extern "C" fn plugininfo_free_string(s: *mut c_char) {
    free_c_char(s);
}

// ============================================================================
// Helper Functions
// ============================================================================

fn c_char_to_str<'a>(s: *const c_char) -> Option<&'a str> {
    if s.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(s) }.to_str().ok()
}

fn string_to_c_char(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(c_str) => c_str.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

fn free_c_char(s: *mut c_char) {
    if !s.is_null() {
        unsafe {
            let _ = CString::from_raw(s);
        }
    }
}
