/// Native process identifier, `pid_t` from `unistd.h`.
pub type ProcessId = libc::pid_t;

#[inline]
pub fn current_process_id() -> ProcessId {
    unsafe { libc::getpid() }
}
