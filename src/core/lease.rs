//! core::lease
//!
//! Per-record exclusive leases for concurrent mutation protection.
//!
//! # Architecture
//!
//! Mutations of a shared record (one instructor, say) must not race each
//! other: the second writer has to observe the first writer's fully applied
//! state. The lease table serializes writers per record identifier while
//! leaving plain reads untouched - readers never consult the table.
//!
//! The table is an in-memory map of `record id -> (holder token, expiry)`,
//! independent of the persistence engine, so timeout and force-release
//! behavior is controllable and testable without a real database.
//!
//! # Invariants
//!
//! - At most one live lease per record identifier at a time
//! - A lease is released on every exit path, including failure (RAII)
//! - Every lease carries a maximum hold duration; an expired lease is
//!   force-released by the next acquirer rather than blocking waiters
//!   indefinitely
//! - A stale guard never releases a successor's lease (holder token check)
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use registrar::core::lease::LeaseTable;
//!
//! let table: LeaseTable<u64> = LeaseTable::new();
//!
//! let lease = table.acquire(5, Duration::from_millis(50)).unwrap();
//! assert!(lease.is_held());
//!
//! // A second acquirer for the same record waits, then times out.
//! assert!(table.acquire(5, Duration::from_millis(50)).is_err());
//!
//! // Disjoint identifiers are independent.
//! assert!(table.acquire(6, Duration::from_millis(50)).is_ok());
//!
//! drop(lease); // released here
//! assert!(table.acquire(5, Duration::from_millis(50)).is_ok());
//! ```

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use uuid::Uuid;

/// Default timeout for lease acquisition (10 seconds).
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Default maximum hold duration before a lease is force-released (30 seconds).
pub const DEFAULT_MAX_HOLD: Duration = Duration::from_secs(30);

/// Default polling interval when waiting for a lease (25ms).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Errors from lease operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LeaseError {
    /// The lease was not acquired before the caller's deadline.
    ///
    /// The caller is guaranteed that no persisted side effect occurred; it
    /// may retry, the table itself never retries.
    #[error("exclusive lease not acquired within {waited_ms}ms")]
    Timeout {
        /// How long the caller waited before giving up.
        waited_ms: u64,
    },
}

/// A lease entry: who holds the record, and until when.
#[derive(Debug, Clone, Copy)]
struct Holder {
    token: Uuid,
    expires_at: Instant,
}

impl Holder {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Per-identifier exclusive lease table.
///
/// Cloning the table is cheap and shares the underlying entries; services
/// hold a clone each.
///
/// # Type parameter
///
/// `K` is the record identifier type. It only needs to be hashable and
/// copyable; the table imposes no other structure on it.
#[derive(Debug, Clone)]
pub struct LeaseTable<K: Copy + Eq + Hash> {
    entries: Arc<Mutex<HashMap<K, Holder>>>,
    max_hold: Duration,
    poll_interval: Duration,
}

impl<K: Copy + Eq + Hash> Default for LeaseTable<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy + Eq + Hash> LeaseTable<K> {
    /// Create a table with the default hold bound and polling interval.
    pub fn new() -> Self {
        Self::with_timing(DEFAULT_MAX_HOLD, DEFAULT_POLL_INTERVAL)
    }

    /// Create a table with explicit timing parameters.
    ///
    /// `max_hold` bounds how long any single lease may be held before it is
    /// force-released; `poll_interval` is how often a blocked acquirer
    /// re-checks the table.
    pub fn with_timing(max_hold: Duration, poll_interval: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            max_hold,
            poll_interval,
        }
    }

    /// Acquire the exclusive lease for `key`, blocking up to `timeout`.
    ///
    /// Blocks by polling while another unit of work holds the lease for the
    /// same identifier. An expired holder is evicted rather than waited on.
    ///
    /// # Errors
    ///
    /// Returns [`LeaseError::Timeout`] if the deadline passes first. A
    /// timeout has no side effect of any kind.
    pub fn acquire(&self, key: K, timeout: Duration) -> Result<RecordLease<K>, LeaseError> {
        let started = Instant::now();
        let deadline = started + timeout;

        loop {
            if let Some(lease) = self.try_acquire(key) {
                return Ok(lease);
            }
            if Instant::now() >= deadline {
                return Err(LeaseError::Timeout {
                    waited_ms: started.elapsed().as_millis() as u64,
                });
            }
            thread::sleep(self.poll_interval);
        }
    }

    /// Try to acquire the lease without blocking.
    ///
    /// Returns `None` if a live (unexpired) holder exists for `key`.
    pub fn try_acquire(&self, key: K) -> Option<RecordLease<K>> {
        let mut entries = self.lock_entries();
        let now = Instant::now();

        match entries.get(&key) {
            Some(holder) if !holder.is_expired(now) => None,
            // Vacant, or held past the hold bound: take (over) the lease.
            _ => {
                let holder = Holder {
                    token: Uuid::new_v4(),
                    expires_at: now + self.max_hold,
                };
                entries.insert(key, holder);
                Some(RecordLease {
                    entries: Arc::clone(&self.entries),
                    key,
                    token: holder.token,
                    expires_at: holder.expires_at,
                    held: true,
                })
            }
        }
    }

    /// Check whether a live lease currently exists for `key`.
    pub fn is_leased(&self, key: K) -> bool {
        let entries = self.lock_entries();
        entries
            .get(&key)
            .map(|holder| !holder.is_expired(Instant::now()))
            .unwrap_or(false)
    }

    /// The configured maximum hold duration.
    pub fn max_hold(&self) -> Duration {
        self.max_hold
    }

    /// Drop expired entries eagerly.
    ///
    /// Expired holders are also evicted lazily on acquisition; this keeps
    /// the table small when keys are never contended again.
    pub fn prune_expired(&self) {
        let now = Instant::now();
        self.lock_entries()
            .retain(|_, holder| !holder.is_expired(now));
    }

    fn lock_entries(&self) -> MutexGuard<'_, HashMap<K, Holder>> {
        // A poisoned mutex only means some holder panicked mid-operation;
        // the entry's expiry still bounds that hold, so recover the map.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// An exclusive lease on one record.
///
/// The lease is released automatically when the guard is dropped (RAII),
/// which covers early returns, `?` propagation, and panics alike.
#[derive(Debug)]
pub struct RecordLease<K: Copy + Eq + Hash> {
    entries: Arc<Mutex<HashMap<K, Holder>>>,
    key: K,
    token: Uuid,
    expires_at: Instant,
    held: bool,
}

impl<K: Copy + Eq + Hash> RecordLease<K> {
    /// The record identifier this lease covers.
    pub fn key(&self) -> K {
        self.key
    }

    /// Check if this guard still holds the lease.
    pub fn is_held(&self) -> bool {
        self.held
    }

    /// Whether the lease has outlived its maximum hold duration.
    ///
    /// An expired lease may already have been taken over by another
    /// acquirer; long-running holders can check this before committing.
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    /// Release the lease explicitly.
    ///
    /// Called automatically on drop; use this to release before the guard
    /// goes out of scope. Releasing twice is a no-op. If the lease expired
    /// and another holder took over, the successor's entry is left alone.
    pub fn release(&mut self) {
        if !self.held {
            return;
        }
        self.held = false;

        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(holder) = entries.get(&self.key) {
            if holder.token == self.token {
                entries.remove(&self.key);
            }
        }
    }
}

impl<K: Copy + Eq + Hash> Drop for RecordLease<K> {
    fn drop(&mut self) {
        self.release();
    }
}
