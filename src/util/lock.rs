use std::sync::{Mutex, MutexGuard};

use tracing::warn;

/// Lock a state container, recovering the data if a previous holder
/// panicked. State owners never leave partially written updates behind, so
/// the inner value is still consistent.
pub(crate) fn lock_state<'a, T>(lock: &'a Mutex<T>, owner: &'static str) -> MutexGuard<'a, T> {
    lock.lock().unwrap_or_else(|poisoned| {
        warn!(
            owner,
            result = "poisoned_recovered",
            "Recovered from poisoned state lock"
        );
        poisoned.into_inner()
    })
}
