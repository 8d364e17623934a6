//! Identity of the running process, and the small conveniences built on it.
//!
//! `current_process_id` is resolved at compile time; see the `compat` crate
//! for the per-platform sources.

pub mod identity;
pub mod pidfile;

pub use compat::{current_process_id, ProcessId};
#[cfg(target_os = "wasi")]
pub use compat::PLACEHOLDER_PROCESS_ID;
