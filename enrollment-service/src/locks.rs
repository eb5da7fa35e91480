//! In-process lock registry.
//!
//! A named mutex per contended key (`course:<id>`, `student:<id>`,
//! `enrollment:<id>`). Callers acquire a batch of keys in ascending
//! lexicographic order via [`LockRegistry::acquire_sorted`]; the returned
//! guard releases them in reverse order on drop. Consistently applying that
//! order across every engine operation is what makes two operations that
//! touch overlapping keys unable to form a wait cycle.
//!
//! The map itself needs no separate guarding mutex: `DashMap::entry` already
//! performs an atomic get-or-insert under its own per-shard lock, which is
//! exactly the "create on first use under a guarding mutex" the map is
//! specified to do.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Default)]
pub struct LockRegistry {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

/// Holds every lock acquired by one call to [`LockRegistry::acquire_sorted`].
/// Dropping this releases them in reverse acquisition order.
pub struct LockGuard {
    guards: Vec<OwnedMutexGuard<()>>,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        while let Some(guard) = self.guards.pop() {
            drop(guard);
        }
    }
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry_for(&self, key: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Acquire the mutexes for `keys`, deduplicated and sorted ascending, in
    /// that order. The returned guard releases them in reverse order.
    pub async fn acquire_sorted(&self, keys: &[String]) -> LockGuard {
        let mut sorted: Vec<String> = keys.to_vec();
        sorted.sort();
        sorted.dedup();

        let mut guards = Vec::with_capacity(sorted.len());
        for key in &sorted {
            let mutex = self.entry_for(key);
            guards.push(mutex.lock_owned().await);
        }

        LockGuard { guards }
    }
}

pub fn course_key(id: i64) -> String {
    format!("course:{id}")
}

pub fn student_key(id: i64) -> String {
    format!("student:{id}")
}

pub fn enrollment_key(id: i64) -> String {
    format!("enrollment:{id}")
}
