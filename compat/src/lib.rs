//! Identity of the calling process.
//!
//! Exactly one platform module is compiled in. Each of them exports the
//! native `ProcessId` type and `current_process_id`, so callers see the same
//! name everywhere while the width and signedness stay whatever the platform
//! uses.

#[cfg(any(target_os = "wasi", test))]
mod wasi;
#[cfg(target_os = "wasi")]
pub use crate::wasi::*;

#[cfg(all(unix, not(target_os = "wasi")))]
mod unix;
#[cfg(all(unix, not(target_os = "wasi")))]
pub use crate::unix::*;

#[cfg(windows)]
mod win;
#[cfg(windows)]
pub use crate::win::*;

#[cfg(not(any(unix, windows, target_os = "wasi")))]
compile_error!("compat: no process identifier source for this target");
