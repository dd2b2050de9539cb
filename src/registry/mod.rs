//! Filter Registry
//!
//! Reference counts per topic filter string. Every mutation goes through the
//! map's shard lock for that key, so create-or-increment, decrement and the
//! sweep's final zero check are atomic with respect to each other.
//!
//! Entries that drop to zero are kept around and only removed by `sweep`
//! once they have stayed at zero for the grace period, so a client that
//! resubscribes quickly does not cause the entry to be torn down and rebuilt.

use std::time::Duration;

use ahash::RandomState;
use dashmap::DashMap;
use tokio::time::Instant;
use tracing::debug;


/// Per-filter subscriber count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SubscriptionEntry {
    /// Number of live subscriptions for this exact filter string
    count: usize,
    /// When the count last reached zero; None while count > 0
    zero_since: Option<Instant>,
}

impl SubscriptionEntry {
    fn new() -> Self {
        Self {
            count: 0,
            zero_since: None,
        }
    }

    fn is_stale(&self, now: Instant, threshold: Duration) -> bool {
        match self.zero_since {
            Some(since) if self.count == 0 => now.saturating_duration_since(since) >= threshold,
            _ => false,
        }
    }
}

/// Concurrent map from topic filter to subscriber count
pub struct FilterRegistry {
    entries: DashMap<String, SubscriptionEntry, RandomState>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self {
            entries: DashMap::with_hasher(RandomState::new()),
        }
    }

    /// Add one subscriber to `filter`, creating the entry if needed
    ///
    /// Returns true if this call took the count from 0 to 1.
    pub fn increment(&self, filter: &str) -> bool {
        let mut entry = self
            .entries
            .entry(filter.to_string())
            .or_insert_with(SubscriptionEntry::new);
        entry.count += 1;
        entry.zero_since = None;
        entry.count == 1
    }

    /// Remove one subscriber from `filter`
    ///
    /// Unknown filters and filters already at zero are left alone, which
    /// absorbs duplicate or unmatched unsubscribe notifications. Returns true
    /// if this call took the count from 1 to 0.
    pub fn decrement(&self, filter: &str) -> bool {
        match self.entries.get_mut(filter) {
            Some(mut entry) if entry.count > 0 => {
                entry.count -= 1;
                if entry.count == 0 {
                    entry.zero_since = Some(Instant::now());
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    /// Number of entries held, including zero-count entries awaiting cleanup
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries with at least one subscriber
    pub fn active_count(&self) -> usize {
        self.entries.iter().filter(|e| e.count > 0).count()
    }

    /// Current count for an exact filter string, if tracked
    pub fn count(&self, filter: &str) -> Option<usize> {
        self.entries.get(filter).map(|e| e.count)
    }

    /// True if any filter with a nonzero count satisfies `predicate`
    pub fn any_active<P>(&self, mut predicate: P) -> bool
    where
        P: FnMut(&str) -> bool,
    {
        self.entries
            .iter()
            .any(|e| e.count > 0 && predicate(e.key().as_str()))
    }

    /// Drop every entry that has been at zero for at least `threshold` as of `now`
    ///
    /// Staleness is decided under the shard lock, so an increment that lands
    /// while the sweep is running always keeps its entry. Returns the number
    /// of entries removed.
    pub fn sweep(&self, now: Instant, threshold: Duration) -> usize {
        let mut removed = 0;
        self.entries.retain(|filter, entry| {
            let stale = entry.is_stale(now, threshold);
            if stale {
                debug!("Removing stale topic filter {}", filter);
                removed += 1;
            }
            !stale
        });
        removed
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
