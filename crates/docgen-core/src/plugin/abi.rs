//! Calling convention between the host and extension modules
//!
//! Strings cross the boundary as borrowed `(ptr, len)` pairs. The module hands
//! its result back through a host callback, so no allocation ever changes
//! sides.

use std::ffi::c_void;

/// Prefix of the exported entry point; the command name follows verbatim.
pub const ENTRY_PREFIX: &str = "docgen_command_";

/// A borrowed UTF-8 string passed across the C ABI
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct StrRef {
    pub ptr: *const u8,
    pub len: usize,
}

impl StrRef {
    /// Borrow `s`. The result must not outlive it.
    #[must_use]
    pub fn new(s: &str) -> Self {
        Self {
            ptr: s.as_ptr(),
            len: s.len(),
        }
    }

    /// Copy the referenced bytes into an owned string, replacing invalid UTF-8.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or valid for reads of `len` bytes.
    #[must_use]
    pub unsafe fn to_string_lossy(self) -> String {
        if self.ptr.is_null() || self.len == 0 {
            return String::new();
        }
        let bytes = std::slice::from_raw_parts(self.ptr, self.len);
        String::from_utf8_lossy(bytes).into_owned()
    }
}

/// Callback a module uses to append to the host's output buffer
pub type EmitFn = extern "C" fn(sink: *mut c_void, chunk: StrRef);

/// Signature of an exported command entry point. Returns 0 on success.
pub type EntryFn = unsafe extern "C" fn(
    code: StrRef,
    argv: *const StrRef,
    argc: usize,
    sink: *mut c_void,
    emit: EmitFn,
) -> i32;

/// Exported symbol name for the command `name`
#[must_use]
pub fn entry_symbol(name: &str) -> String {
    format!("{ENTRY_PREFIX}{name}")
}

/// [`EmitFn`] for a `sink` that points at a host `String`
pub extern "C" fn emit_into_string(sink: *mut c_void, chunk: StrRef) {
    if sink.is_null() {
        return;
    }
    // SAFETY: the host passes a live, exclusive `&mut String` as `sink` for
    // the duration of the call, and `chunk` borrows memory owned by the module
    // that stays valid until the callback returns.
    let (out, text) = unsafe { (&mut *sink.cast::<String>(), chunk.to_string_lossy()) };
    out.push_str(&text);
}
