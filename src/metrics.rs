//! Process-wide staging counters.
//! Reported by `bbsnet status` and useful in tests that need to observe retries.
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

static STAGED_LOCAL: AtomicU64 = AtomicU64::new(0);
static STAGED_REMOTE: AtomicU64 = AtomicU64::new(0);
static STAGE_FAILURES: AtomicU64 = AtomicU64::new(0);
static NAME_COLLISIONS: AtomicU64 = AtomicU64::new(0);

pub fn inc_staged(local: bool) {
    if local {
        STAGED_LOCAL.fetch_add(1, Ordering::Relaxed);
    } else {
        STAGED_REMOTE.fetch_add(1, Ordering::Relaxed);
    }
}

pub fn inc_stage_failures() {
    STAGE_FAILURES.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_name_collisions() {
    NAME_COLLISIONS.fetch_add(1, Ordering::Relaxed);
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub staged_local: u64,
    pub staged_remote: u64,
    pub stage_failures: u64,
    pub name_collisions: u64,
}

pub fn snapshot() -> Snapshot {
    Snapshot {
        staged_local: STAGED_LOCAL.load(Ordering::Relaxed),
        staged_remote: STAGED_REMOTE.load(Ordering::Relaxed),
        stage_failures: STAGE_FAILURES.load(Ordering::Relaxed),
        name_collisions: NAME_COLLISIONS.load(Ordering::Relaxed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_only_grow() {
        let before = snapshot();
        inc_staged(true);
        inc_staged(false);
        inc_stage_failures();
        let after = snapshot();
        // Other tests in the process may bump counters concurrently.
        assert!(after.staged_local >= before.staged_local + 1);
        assert!(after.staged_remote >= before.staged_remote + 1);
        assert!(after.stage_failures >= before.stage_failures + 1);
    }
}
