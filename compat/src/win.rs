#[cfg(all(target_vendor = "uwp", not(feature = "uwp")))]
compile_error!("compat: uwp targets need the `uwp` feature");

#[cfg(not(any(target_vendor = "uwp", feature = "uwp")))]
mod ffi {
    use std::os::raw::c_int;

    extern "C" {
        // the classic `getpid` from `process.h`, as exported by the CRT
        pub fn _getpid() -> c_int;
    }
}

/// Native process identifier, the C `int` returned by `_getpid`.
#[cfg(not(any(target_vendor = "uwp", feature = "uwp")))]
pub type ProcessId = std::os::raw::c_int;

#[cfg(not(any(target_vendor = "uwp", feature = "uwp")))]
#[inline]
pub fn current_process_id() -> ProcessId {
    unsafe { ffi::_getpid() }
}

/// Native process identifier, the `DWORD` returned by `GetCurrentProcessId`.
#[cfg(any(target_vendor = "uwp", feature = "uwp"))]
pub type ProcessId = winapi::DWORD;

// `_getpid` is not part of the app container API surface.
#[cfg(any(target_vendor = "uwp", feature = "uwp"))]
#[inline]
pub fn current_process_id() -> ProcessId {
    unsafe { kernel32::GetCurrentProcessId() }
}
