//! Names and ids that are unique to the running process.

use std::sync::atomic::{AtomicUsize, Ordering};

use compat::current_process_id;
use lazy_static::lazy_static;
use util::get_random_hex_chars;

static NEXT_NAME: AtomicUsize = AtomicUsize::new(0);

lazy_static! {
    static ref RUN_ID: String = get_random_hex_chars(40);
}

/// Returns `<prefix>.<pid>.<n>`, where `n` counts the names handed out by
/// this process. No two calls return the same name, neither in this process
/// nor in any other one running at the same time.
///
/// # Examples
/// ```
/// # use pidprovider::identity::unique_name;
/// #
/// let a = unique_name("dump");
/// let b = unique_name("dump");
/// assert!(a.starts_with(&format!("dump.{}.", pidprovider::current_process_id())));
/// assert_ne!(a, b);
/// ```
pub fn unique_name(prefix: &str) -> String {
    let n = NEXT_NAME.fetch_add(1, Ordering::Relaxed);
    format!("{}.{}.{}", prefix, current_process_id(), n)
}

/// 40 random hex characters identifying this run of the process.
pub fn run_id() -> &'static str {
    &RUN_ID
}
