// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crowdcore::otp::{OneTimeCodeCache, Sweeper};
use std::sync::Arc;
use std::time::{Duration, Instant};

const TTL: Duration = Duration::from_secs(600);

#[test]
fn verify_consumes_the_entry() {
    let cache = OneTimeCodeCache::new(TTL);
    cache.store("a@b.com", "123456");

    assert!(cache.verify("a@b.com", "123456"));
    assert!(!cache.verify("a@b.com", "123456"));
    assert!(cache.is_empty());
}

#[test]
fn wrong_secret_is_rejected_and_entry_kept() {
    let cache = OneTimeCodeCache::new(TTL);
    cache.store("a@b.com", "123456");

    assert!(!cache.verify("a@b.com", "654321"));
    assert!(cache.verify("a@b.com", "123456"));
}

#[test]
fn unknown_subject_is_rejected() {
    let cache = OneTimeCodeCache::new(TTL);
    assert!(!cache.verify("nobody@b.com", "123456"));
}

#[test]
fn store_replaces_any_previous_secret() {
    let cache = OneTimeCodeCache::new(TTL);
    cache.store("a@b.com", "old");
    cache.store("a@b.com", "new");

    assert!(!cache.verify("a@b.com", "old"));
    assert!(cache.verify("a@b.com", "new"));
}

#[test]
fn expired_entry_fails_even_with_correct_secret() {
    let cache = OneTimeCodeCache::new(TTL);
    cache.store("a@b.com", "123456");

    // 11 minutes after issuance, one past the 10-minute TTL
    let later = Instant::now() + Duration::from_secs(11 * 60);
    assert!(!cache.verify_at("a@b.com", "123456", later));
    assert!(cache.is_empty());
}

#[test]
fn sweep_purges_expired_entries_only() {
    let cache = OneTimeCodeCache::new(TTL);
    cache.store("a@b.com", "111111");
    cache.store("c@d.com", "222222");

    assert_eq!(cache.sweep(), 0);
    assert_eq!(cache.len(), 2);

    let later = Instant::now() + TTL + Duration::from_secs(1);
    assert_eq!(cache.sweep_at(later), 2);
    assert!(cache.is_empty());
}

#[test]
fn background_sweeper_bounds_memory() {
    let cache = Arc::new(OneTimeCodeCache::new(Duration::from_millis(50)));
    cache.store("a@b.com", "123456");

    let sweeper = Sweeper::spawn(cache.clone(), Duration::from_millis(100));
    std::thread::sleep(Duration::from_millis(500));
    assert!(cache.is_empty());
    drop(sweeper);
}
