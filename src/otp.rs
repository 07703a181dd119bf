// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Short-lived, single-use secrets keyed by subject (typically an email
/// address). Entries move absent -> live -> {consumed | expired}; both
/// terminal states behave as absent for future lookups. This cache is
/// never persisted.
pub struct OneTimeCodeCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, OtpEntry>>,
}

struct OtpEntry {
    secret: String,
    expires_at: Instant,
}

impl OneTimeCodeCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Inserts or replaces the live entry for `subject`, discarding any
    /// previous unconsumed secret.
    pub fn store(&self, subject: &str, secret: &str) {
        let entry = OtpEntry {
            secret: secret.to_string(),
            expires_at: Instant::now() + self.ttl,
        };
        self.lock().insert(subject.to_string(), entry);
    }

    /// Single-use verification: false if no entry exists, the entry has
    /// expired, or the secret does not match; on success the entry is
    /// consumed so it can never verify twice.
    pub fn verify(&self, subject: &str, secret: &str) -> bool {
        self.verify_at(subject, secret, Instant::now())
    }

    /// `verify` against an explicit clock, so expiry is testable without
    /// sleeping.
    pub fn verify_at(&self, subject: &str, secret: &str, now: Instant) -> bool {
        let mut entries = self.lock();
        let Some(entry) = entries.get(subject) else {
            return false;
        };
        if now >= entry.expires_at {
            entries.remove(subject);
            return false;
        }
        if entry.secret != secret {
            return false;
        }
        entries.remove(subject);
        true
    }

    /// Removes expired-but-unconsumed entries; returns how many.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    pub fn sweep_at(&self, now: Instant) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, e| now < e.expires_at);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, OtpEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Background thread that sweeps a cache at a fixed interval. Stops when
/// the handle is dropped.
pub struct Sweeper {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Sweeper {
    pub fn spawn(cache: Arc<OneTimeCodeCache>, interval: Duration) -> Self {
        const TICK: Duration = Duration::from_millis(250);
        let stop = Arc::new(AtomicBool::new(false));
        let flag = stop.clone();
        let handle = std::thread::spawn(move || {
            let mut elapsed = Duration::ZERO;
            while !flag.load(Ordering::Relaxed) {
                std::thread::sleep(TICK.min(interval));
                elapsed += TICK.min(interval);
                if elapsed < interval {
                    continue;
                }
                elapsed = Duration::ZERO;
                let removed = cache.sweep();
                if removed > 0 {
                    tracing::debug!(removed, "swept expired one-time codes");
                }
            }
        });
        Self {
            stop,
            handle: Some(handle),
        }
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
