/// There is no process table to index into, so this is a plain C `int`.
pub type ProcessId = i32;

/// Placeholder identity. It must stay non-zero: callers use it as a log tag
/// or seed, and some of them read zero as "unset".
pub const PLACEHOLDER_PROCESS_ID: ProcessId = 1;

#[inline]
pub fn current_process_id() -> ProcessId {
    PLACEHOLDER_PROCESS_ID
}
