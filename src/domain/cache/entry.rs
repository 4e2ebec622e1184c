//! Cache entries and expiration policies

use std::time::{Duration, Instant};

use bytes::Bytes;

use crate::domain::DomainError;

/// Absolute plus optional sliding expiration
///
/// An entry expires at `inserted_at + absolute` no matter how often it is read. When a
/// sliding window is set, an entry that is not read for that long expires earlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpirationPolicy {
    absolute: Duration,
    sliding: Option<Duration>,
}

impl ExpirationPolicy {
    pub const DEFAULT_ABSOLUTE: Duration = Duration::from_secs(5 * 60);
    pub const DEFAULT_SLIDING: Duration = Duration::from_secs(2 * 60);

    /// Creates a policy with only an absolute TTL
    pub fn new(absolute: Duration) -> Self {
        Self {
            absolute,
            sliding: None,
        }
    }

    /// Adds a sliding window
    pub fn with_sliding(mut self, sliding: Duration) -> Self {
        self.sliding = Some(sliding);
        self
    }

    /// Removes the sliding window
    pub fn without_sliding(mut self) -> Self {
        self.sliding = None;
        self
    }

    pub fn absolute(&self) -> Duration {
        self.absolute
    }

    pub fn sliding(&self) -> Option<Duration> {
        self.sliding
    }

    /// Rejects zero durations
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.absolute.is_zero() {
            return Err(DomainError::validation("Cache TTL must be greater than zero"));
        }

        if self.sliding.is_some_and(|s| s.is_zero()) {
            return Err(DomainError::validation(
                "Cache sliding window must be greater than zero",
            ));
        }

        Ok(())
    }

    /// Lifetime granted on insertion
    pub fn initial_lifetime(&self) -> Duration {
        match self.sliding {
            Some(sliding) => sliding.min(self.absolute),
            None => self.absolute,
        }
    }
}

impl Default for ExpirationPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ABSOLUTE).with_sliding(Self::DEFAULT_SLIDING)
    }
}

/// A serialized payload with its expiration bookkeeping
///
/// Entries are never mutated; a second `set` of the same key replaces the entry.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    value: Bytes,
    inserted_at: Instant,
    absolute_expiry: Instant,
    sliding: Option<Duration>,
}

impl CacheEntry {
    /// Creates an entry inserted now
    pub fn new(value: Bytes, policy: &ExpirationPolicy) -> Self {
        Self::inserted_at(value, policy, Instant::now())
    }

    pub fn inserted_at(value: Bytes, policy: &ExpirationPolicy, now: Instant) -> Self {
        Self {
            value,
            inserted_at: now,
            absolute_expiry: now + policy.absolute(),
            sliding: policy.sliding(),
        }
    }

    pub fn value(&self) -> &Bytes {
        &self.value
    }

    pub fn insertion_time(&self) -> Instant {
        self.inserted_at
    }

    pub fn absolute_expiry(&self) -> Instant {
        self.absolute_expiry
    }

    pub fn sliding(&self) -> Option<Duration> {
        self.sliding
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.absolute_expiry
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Lifetime left after an access at `now`, capped by the absolute expiry
    pub fn lifetime_after_access(&self, now: Instant) -> Duration {
        let remaining = self.absolute_expiry.saturating_duration_since(now);

        match self.sliding {
            Some(sliding) => sliding.min(remaining),
            None => remaining,
        }
    }
}
