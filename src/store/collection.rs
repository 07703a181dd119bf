// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::errors::{CoreError, Result};
use crate::models::{RecordId, RecordMeta};
use crate::store::{Entity, snapshot};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// In-memory keyed map with insertion order, mirrored to a snapshot file
/// after every mutation. All operations are synchronous: persistence
/// happens while the collection lock is held, so within one process
/// lifetime no caller can observe memory and disk diverging.
pub struct Collection<T: Entity> {
    path: Option<PathBuf>,
    inner: Mutex<Inner<T>>,
}

struct Inner<T> {
    order: Vec<RecordId>,
    items: HashMap<RecordId, T>,
}

impl<T: Entity> Collection<T> {
    /// Loads the collection from `dir/<name>.json`; a missing file is an
    /// empty collection, a corrupt one is an error.
    pub fn open(dir: &Path) -> Result<Self> {
        let path = dir.join(format!("{}.json", T::COLLECTION));
        let records = snapshot::load::<T>(&path)?;
        let mut inner = Inner {
            order: Vec::with_capacity(records.len()),
            items: HashMap::with_capacity(records.len()),
        };
        for record in records {
            let id = record.meta().id;
            inner.order.push(id);
            inner.items.insert(id, record);
        }
        Ok(Self {
            path: Some(path),
            inner: Mutex::new(inner),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            path: None,
            inner: Mutex::new(Inner {
                order: Vec::new(),
                items: HashMap::new(),
            }),
        }
    }

    /// Creates a record: assigns a fresh identifier and both timestamps,
    /// validates, inserts, persists, and returns the stored record.
    pub fn create_with(&self, build: impl FnOnce(RecordMeta) -> T) -> Result<T> {
        let record = build(RecordMeta::new());
        record.validate().map_err(CoreError::Validation)?;
        let mut inner = self.lock();
        let id = record.meta().id;
        inner.order.push(id);
        inner.items.insert(id, record.clone());
        self.persist(&inner);
        Ok(record)
    }

    /// Clone of the record, or None. No side effects.
    pub fn get(&self, id: RecordId) -> Option<T> {
        self.lock().items.get(&id).cloned()
    }

    /// Matching records in insertion order. The result is materialized
    /// under the lock, so the caller gets an owned, restartable sequence.
    pub fn find(&self, pred: impl Fn(&T) -> bool) -> Vec<T> {
        let inner = self.lock();
        inner
            .order
            .iter()
            .filter_map(|id| inner.items.get(id))
            .filter(|r| pred(r))
            .cloned()
            .collect()
    }

    pub fn all(&self) -> Vec<T> {
        self.find(|_| true)
    }

    /// Applies `patch` to the record, refreshes its last-modified
    /// timestamp, persists, and returns the updated record. Fields the
    /// patch assigns are replaced wholesale; nothing is deep-merged.
    pub fn update_with(&self, id: RecordId, patch: impl FnOnce(&mut T)) -> Result<T> {
        let mut inner = self.lock();
        let updated = {
            let record = inner.items.get_mut(&id).ok_or(CoreError::NotFound {
                collection: T::COLLECTION,
                id,
            })?;
            patch(record);
            record.meta_mut().touch();
            record.clone()
        };
        self.persist(&inner);
        Ok(updated)
    }

    /// Removes the record. Returns false if it was absent.
    pub fn remove(&self, id: RecordId) -> bool {
        let mut inner = self.lock();
        if inner.items.remove(&id).is_none() {
            return false;
        }
        inner.order.retain(|x| *x != id);
        self.persist(&inner);
        true
    }

    pub fn len(&self) -> usize {
        self.lock().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rewrites the snapshot, surfacing any write error to the caller.
    pub fn flush(&self) -> Result<()> {
        let inner = self.lock();
        if let Some(path) = &self.path {
            snapshot::save(path, inner.order.iter().filter_map(|id| inner.items.get(id)))?;
        }
        Ok(())
    }

    /// Post-mutation snapshot write. A failure here loses durability but
    /// not consistency: the in-memory state stays, the error is logged,
    /// and the operation that triggered it still succeeds.
    fn persist(&self, inner: &Inner<T>) {
        let Some(path) = &self.path else {
            return;
        };
        if let Err(e) = snapshot::save(path, inner.order.iter().filter_map(|id| inner.items.get(id)))
        {
            tracing::error!(
                collection = T::COLLECTION,
                error = %e,
                "snapshot write failed; in-memory state retained"
            );
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
