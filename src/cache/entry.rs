//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::Duration;

use tokio::time::Instant;

/// Used when `now + ttl` does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

// == Cache Entry ==
/// Represents a single cache entry with its absolute expiration instant.
///
/// Timestamps come from `tokio::time::Instant`, which tracks the real clock
/// unless the Tokio clock is paused.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value, never inspected by the cache
    pub value: V,
    /// When the entry was written
    pub created_at: Instant,
    /// Instant after which the entry is logically absent
    pub expires_at: Instant,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry expiring `ttl` after `now`.
    pub fn new_at(value: V, ttl: Duration, now: Instant) -> Self {
        let expires_at = now
            .checked_add(ttl)
            .unwrap_or_else(|| now + FAR_FUTURE);

        Self {
            value,
            created_at: now,
            expires_at,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// Boundary condition: an entry is expired only once `now` is strictly
    /// after `expires_at`. At exactly `expires_at` it is still live.
    #[inline]
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now > self.expires_at
    }

    // == Time To Live ==
    /// Returns the lifetime remaining at `now`, or zero once expired.
    pub fn ttl_remaining_at(&self, now: Instant) -> Duration {
        self.expires_at.saturating_duration_since(now)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_creation() {
        let now = Instant::now();
        let entry = CacheEntry::new_at("test_value", Duration::from_secs(60), now);

        assert_eq!(entry.value, "test_value");
        assert_eq!(entry.created_at, now);
        assert_eq!(entry.expires_at - entry.created_at, Duration::from_secs(60));
        assert!(!entry.is_expired_at(now));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = Instant::now();
        let entry = CacheEntry::new_at("test", Duration::from_secs(1), now);

        assert!(!entry.is_expired_at(now));
        assert!(!entry.is_expired_at(entry.expires_at), "Still live at the boundary");
        assert!(entry.is_expired_at(entry.expires_at + Duration::from_nanos(1)));
    }

    #[test]
    fn test_huge_ttl_does_not_overflow() {
        let now = Instant::now();
        let entry = CacheEntry::new_at(1u8, Duration::MAX, now);
        assert!(!entry.is_expired_at(now));
        assert!(entry.ttl_remaining_at(now) > Duration::from_secs(86_400 * 365));
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expiration() {
        let entry = CacheEntry::new_at("test_value", Duration::from_secs(1), Instant::now());
        assert!(!entry.is_expired_at(Instant::now()));

        tokio::time::advance(Duration::from_millis(1100)).await;

        assert!(entry.is_expired_at(Instant::now()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_remaining() {
        let entry = CacheEntry::new_at("test_value", Duration::from_secs(10), Instant::now());
        assert_eq!(entry.ttl_remaining_at(Instant::now()), Duration::from_secs(10));

        tokio::time::advance(Duration::from_secs(4)).await;
        assert_eq!(entry.ttl_remaining_at(Instant::now()), Duration::from_secs(6));

        tokio::time::advance(Duration::from_secs(20)).await;
        assert_eq!(entry.ttl_remaining_at(Instant::now()), Duration::ZERO);
    }
}
