//! Time-boxed memoization for monthly reports.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
    time::{Duration, Instant},
};

use crate::{Error, MonthlyReport, YearMonth};

/// How long a cached report stays valid by default.
const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// A source of the current instant.
///
/// The cache reads time through this trait so tests can simulate the
/// passage of an hour without sleeping.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> Instant;
}

/// The system clock. What every caller outside of tests wants.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct CacheEntry {
    report: MonthlyReport,
    stored_at: Instant,
}

/// A time-boxed memoization cache for monthly reports.
///
/// Entries expire a fixed time after they are stored and are evicted
/// lazily, on the next lookup of their key. There is no capacity bound and
/// no eviction beyond expiry: a household produces a handful of distinct
/// (month, budget) keys an hour at most.
///
/// Construct one cache per running instance and hand it to whichever layer
/// orchestrates report building; nothing persists across restarts. The
/// entry map lives behind a mutex, and [ReportCache::get_or_compute] holds
/// the lock across its compute step, so callers sharing a cache across
/// threads compute each live key at most once.
pub struct ReportCache {
    ttl: Duration,
    clock: Box<dyn Clock>,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ReportCache {
    /// Create a cache with the default one-hour time-to-live.
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    /// Create a cache whose entries expire `ttl` after they are stored.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self::with_clock(ttl, Box::new(SystemClock))
    }

    /// Create a cache that reads time from `clock`.
    pub fn with_clock(ttl: Duration, clock: Box<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, CacheEntry>>, Error> {
        self.entries
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire report cache lock: {error}"))
            .map_err(|_| Error::CacheLock)
    }

    /// Look up an unexpired report.
    ///
    /// An entry past its time-to-live is evicted and reported as absent.
    ///
    /// # Errors
    /// Returns [Error::CacheLock] if the cache lock is poisoned.
    pub fn get(&self, key: &str) -> Result<Option<MonthlyReport>, Error> {
        let now = self.clock.now();
        let mut entries = self.lock()?;

        match entries.get(key) {
            Some(entry) if now.duration_since(entry.stored_at) <= self.ttl => {
                Ok(Some(entry.report.clone()))
            }
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Store a report under `key`, replacing any previous entry.
    ///
    /// # Errors
    /// Returns [Error::CacheLock] if the cache lock is poisoned.
    pub fn set(&self, key: impl Into<String>, report: MonthlyReport) -> Result<(), Error> {
        let stored_at = self.clock.now();
        let mut entries = self.lock()?;

        entries.insert(
            key.into(),
            CacheEntry { report, stored_at },
        );

        Ok(())
    }

    /// Drop every entry.
    ///
    /// # Errors
    /// Returns [Error::CacheLock] if the cache lock is poisoned.
    pub fn clear(&self) -> Result<(), Error> {
        self.lock()?.clear();
        Ok(())
    }

    /// Return the report cached under `key`, or compute and store it.
    ///
    /// On a hit the cached report is returned and `compute` is never
    /// invoked. The lock is held across the compute, so a second caller
    /// asking for the same key waits for the first result instead of
    /// repeating the work.
    ///
    /// # Errors
    /// Returns [Error::CacheLock] if the cache lock is poisoned.
    pub fn get_or_compute(
        &self,
        key: &str,
        compute: impl FnOnce() -> MonthlyReport,
    ) -> Result<MonthlyReport, Error> {
        let now = self.clock.now();
        let mut entries = self.lock()?;

        if let Some(entry) = entries.get(key) {
            if now.duration_since(entry.stored_at) <= self.ttl {
                tracing::debug!("report cache hit for {key}");
                return Ok(entry.report.clone());
            }
            entries.remove(key);
        }

        tracing::debug!("report cache miss for {key}");
        let report = compute();
        entries.insert(
            key.to_owned(),
            CacheEntry {
                report: report.clone(),
                stored_at: self.clock.now(),
            },
        );

        Ok(report)
    }
}

impl Default for ReportCache {
    fn default() -> Self {
        Self::new()
    }
}

/// The cache key for a monthly report request.
///
/// Budget-less requests share a sentinel, so asking for the same month
/// with and without a budget are distinct entries while repeated
/// budget-less requests hit the same one.
pub fn report_cache_key(month: YearMonth, budget: Option<i64>) -> String {
    match budget {
        Some(budget) => format!("{month}:{budget}"),
        None => format!("{month}:none"),
    }
}
