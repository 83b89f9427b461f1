//! Identity registry for compiled patterns
//!
//! Every pattern the builder produces gets a process-unique id that stays
//! registered for as long as the pattern is alive. The registry answers
//! "was this pattern produced by the builder?" without holding on to the
//! pattern itself.

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

static LIVE: Lazy<Mutex<HashSet<u64>>> = Lazy::new(|| Mutex::new(HashSet::new()));

/// Allocate a fresh id and mark it live
pub fn register() -> u64 {
    let id = next_id();
    LIVE.lock().insert(id);
    id
}

/// Allocate a fresh id without marking it live
pub fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Whether `id` belongs to a live builder-produced pattern
pub fn contains(id: u64) -> bool {
    LIVE.lock().contains(&id)
}

/// Forget `id`; called when its pattern is dropped
pub fn unregister(id: u64) {
    LIVE.lock().remove(&id);
}
