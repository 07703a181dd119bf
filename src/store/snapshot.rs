// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::errors::Result;
use crate::store::Entity;
use std::fs;
use std::io;
use std::path::Path;

/// Snapshot documents are JSON objects mapping identifier to full record,
/// in collection insertion order (serde_json is built with
/// `preserve_order`, so a load restores the same order a save wrote).

/// Reads a collection snapshot. A missing file is an empty collection.
pub fn load<T: Entity>(path: &Path) -> Result<Vec<T>> {
    let raw = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let doc: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&raw)?;
    let mut records = Vec::with_capacity(doc.len());
    for (_, value) in doc {
        records.push(serde_json::from_value(value)?);
    }
    Ok(records)
}

/// Writes a whole-collection snapshot: serialize to a sibling temp file,
/// then rename into place so readers only ever see a complete document.
pub fn save<'a, T: Entity + 'a>(
    path: &Path,
    records: impl Iterator<Item = &'a T>,
) -> Result<()> {
    let mut doc = serde_json::Map::new();
    for record in records {
        doc.insert(record.meta().id.to_string(), serde_json::to_value(record)?);
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_string_pretty(&doc)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
