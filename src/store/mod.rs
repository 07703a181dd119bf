// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod collection;
pub mod snapshot;

pub use collection::Collection;

use crate::errors::Result;
use crate::models::{
    Investment, NewsPost, Project, RecordId, RecordMeta, User, Wallet, WalletTransaction,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::hash::Hash;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

/// A storable record type. The collection name doubles as the snapshot
/// file stem on disk.
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + 'static {
    const COLLECTION: &'static str;

    fn meta(&self) -> &RecordMeta;
    fn meta_mut(&mut self) -> &mut RecordMeta;

    /// Identity-level validation run before a record is admitted to its
    /// collection. Errors never reach the store.
    fn validate(&self) -> std::result::Result<(), String> {
        Ok(())
    }
}

/// One keyed collection per entity kind, plus a registry of per-record
/// critical sections used by the ledger and the funding workflow to
/// serialize their read-check-then-write sequences.
///
/// The store is explicitly constructed and passed by reference to every
/// workflow; there is no process-wide singleton.
pub struct Store {
    pub users: Collection<User>,
    pub projects: Collection<Project>,
    pub investments: Collection<Investment>,
    pub news: Collection<NewsPost>,
    pub wallets: Collection<Wallet>,
    pub wallet_txns: Collection<WalletTransaction>,
    gates: GateMap<RecordId>,
    credit_gates: GateMap<String>,
}

impl Store {
    /// Opens a store rooted at `dir`, loading each collection from its
    /// snapshot. A missing snapshot file is an empty collection.
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            users: Collection::open(dir)?,
            projects: Collection::open(dir)?,
            investments: Collection::open(dir)?,
            news: Collection::open(dir)?,
            wallets: Collection::open(dir)?,
            wallet_txns: Collection::open(dir)?,
            gates: GateMap::default(),
            credit_gates: GateMap::default(),
        })
    }

    /// An ephemeral store with no backing files. Nothing survives drop;
    /// the one-time-code cache aside, this is only useful for tests and
    /// tooling.
    pub fn open_in_memory() -> Self {
        Self {
            users: Collection::in_memory(),
            projects: Collection::in_memory(),
            investments: Collection::in_memory(),
            news: Collection::in_memory(),
            wallets: Collection::in_memory(),
            wallet_txns: Collection::in_memory(),
            gates: GateMap::default(),
            credit_gates: GateMap::default(),
        }
    }

    /// Rewrites every collection snapshot, surfacing any write error.
    pub fn flush(&self) -> Result<()> {
        self.users.flush()?;
        self.projects.flush()?;
        self.investments.flush()?;
        self.news.flush()?;
        self.wallets.flush()?;
        self.wallet_txns.flush()?;
        Ok(())
    }

    /// Flushes and consumes the store.
    pub fn close(self) -> Result<()> {
        self.flush()
    }

    /// Returns the critical-section mutex for `key`. Callers lock the
    /// returned handle for the duration of a read-check-then-write
    /// sequence on the record it names.
    pub fn gate(&self, key: RecordId) -> Arc<Mutex<()>> {
        self.gates.entry(key)
    }

    /// Returns the critical-section mutex for an external payment
    /// reference. The duplicate-credit invariant is global across all
    /// wallets, so the ledger serializes the check-then-insert for one
    /// reference here rather than through any owner's gate.
    pub fn credit_gate(&self, external_ref: &str) -> Arc<Mutex<()>> {
        self.credit_gates.entry(external_ref.to_string())
    }

    /// Number of live gate registry entries, across both registries.
    pub fn gate_count(&self) -> usize {
        self.gates.len() + self.credit_gates.len()
    }
}

struct GateMap<K> {
    inner: Mutex<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K> Default for GateMap<K> {
    fn default() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash> GateMap<K> {
    fn entry(&self, key: K) -> Arc<Mutex<()>> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        // A strong count of 1 means only the registry holds the gate;
        // evicting those on every lookup bounds the registry by the
        // number of gates currently held, not the number ever taken.
        inner.retain(|_, gate| Arc::strong_count(gate) > 1);
        inner.entry(key).or_default().clone()
    }

    fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
