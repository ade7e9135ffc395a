//! TTL cache with stale-while-revalidate for the two remote resources.
//!
//! Time is supplied by the caller in milliseconds so the same code runs in
//! the browser (`Date.now()`) and natively.

/// Freshness of a cached resource at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Never fetched, or invalidated.
    Missing,
    Fresh,
    /// Past the TTL but inside the stale window: serve and refetch.
    Stale,
    /// Past the stale window: must refetch before use.
    Expired,
}

impl Freshness {
    #[must_use]
    pub const fn needs_fetch(self) -> bool {
        !matches!(self, Self::Fresh)
    }

    #[must_use]
    pub const fn is_servable(self) -> bool {
        matches!(self, Self::Fresh | Self::Stale)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub ttl_ms: u64,
    pub stale_window_ms: u64,
}

#[derive(Debug, Clone)]
struct Entry<T> {
    value: T,
    fetched_at_ms: u64,
}

/// One cached value. Replacement is whole-value: a reader gets either the
/// previous snapshot or the new one.
#[derive(Debug, Clone)]
pub struct CachedResource<T> {
    key: &'static str,
    policy: CachePolicy,
    entry: Option<Entry<T>>,
    invalidated: bool,
    revalidating: bool,
    generation: u64,
}

impl<T> CachedResource<T> {
    #[must_use]
    pub const fn new(key: &'static str, policy: CachePolicy) -> Self {
        Self {
            key,
            policy,
            entry: None,
            invalidated: false,
            revalidating: false,
            generation: 0,
        }
    }

    #[must_use]
    pub const fn key(&self) -> &'static str {
        self.key
    }

    /// Bumped on every successful store; used as a memo key downstream.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn freshness(&self, now_ms: u64) -> Freshness {
        let Some(entry) = &self.entry else {
            return Freshness::Missing;
        };
        if self.invalidated {
            return Freshness::Missing;
        }
        let age = now_ms.saturating_sub(entry.fetched_at_ms);
        if age <= self.policy.ttl_ms {
            Freshness::Fresh
        } else if age <= self.policy.ttl_ms.saturating_add(self.policy.stale_window_ms) {
            Freshness::Stale
        } else {
            Freshness::Expired
        }
    }

    /// Last stored value regardless of age. Invalidation keeps the value
    /// visible until a replacement arrives.
    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        self.entry.as_ref().map(|entry| &entry.value)
    }

    /// Value if it may be shown at `now_ms` without waiting for a refetch.
    #[must_use]
    pub fn get(&self, now_ms: u64) -> Option<&T> {
        if self.freshness(now_ms).is_servable() {
            self.peek()
        } else {
            None
        }
    }

    pub fn store(&mut self, value: T, now_ms: u64) {
        self.entry = Some(Entry {
            value,
            fetched_at_ms: now_ms,
        });
        self.invalidated = false;
        self.revalidating = false;
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn invalidate(&mut self) {
        if self.entry.is_some() {
            log::debug!("invalidating cached resource '{}'", self.key);
        }
        self.invalidated = true;
    }

    /// Mark a refetch as started. Returns `false` if one is already running
    /// or the value is fresh.
    pub fn begin_revalidate(&mut self, now_ms: u64) -> bool {
        if self.revalidating || !self.freshness(now_ms).needs_fetch() {
            return false;
        }
        self.revalidating = true;
        true
    }

    /// A refetch failed; keep serving whatever is cached.
    pub fn abort_revalidate(&mut self) {
        self.revalidating = false;
    }

    #[must_use]
    pub const fn is_revalidating(&self) -> bool {
        self.revalidating
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> CachePolicy {
        CachePolicy {
            ttl_ms: 1_000,
            stale_window_ms: 4_000,
        }
    }

    #[test]
    fn freshness_walks_through_ttl_and_stale_window() {
        let mut cache = CachedResource::new("tiles", policy());
        assert_eq!(cache.freshness(0), Freshness::Missing);
        cache.store(vec![1, 2], 100);
        assert_eq!(cache.freshness(900), Freshness::Fresh);
        assert_eq!(cache.freshness(2_000), Freshness::Stale);
        assert_eq!(cache.get(2_000), Some(&vec![1, 2]));
        assert_eq!(cache.freshness(6_000), Freshness::Expired);
        assert!(cache.get(6_000).is_none());
        assert_eq!(cache.peek(), Some(&vec![1, 2]));
    }

    #[test]
    fn invalidate_forces_refetch_but_keeps_old_snapshot() {
        let mut cache = CachedResource::new("team-summary", policy());
        cache.store(5_u32, 0);
        cache.invalidate();
        assert_eq!(cache.freshness(10), Freshness::Missing);
        assert_eq!(cache.peek(), Some(&5));
        assert!(cache.begin_revalidate(10));
        assert!(!cache.begin_revalidate(11));
        cache.store(6, 20);
        assert_eq!(cache.get(20), Some(&6));
        assert_eq!(cache.generation(), 2);
    }

    #[test]
    fn fresh_values_skip_revalidation() {
        let mut cache = CachedResource::new("tiles", policy());
        cache.store("a", 0);
        assert!(!cache.begin_revalidate(500));
        assert!(cache.begin_revalidate(1_500));
        cache.abort_revalidate();
        assert!(!cache.is_revalidating());
    }
}
