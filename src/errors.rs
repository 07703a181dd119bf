// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::RecordId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

/// Typed failures surfaced by the store, the ledger, and the funding
/// workflow. Persistence write failures after a mutation are the one
/// exception: they are logged and the in-memory state is kept, so they
/// never reach a caller through this enum.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("no {collection} record with id {id}")]
    NotFound {
        collection: &'static str,
        id: RecordId,
    },

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("a project owner cannot invest in their own project")]
    SelfInvestment,

    #[error("funding window closed at {closed_at}")]
    WindowClosed { closed_at: DateTime<Utc> },

    #[error("investment exceeds remaining capacity of {remaining}")]
    CapacityExceeded { remaining: Decimal },

    #[error("external payment '{external_ref}' was already credited")]
    DuplicateTransaction { external_ref: String },

    #[error("insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds {
        balance: Decimal,
        requested: Decimal,
    },

    #[error("amount is below the minimum of {minimum}")]
    BelowMinimum { minimum: Decimal },

    #[error("persistence error: {0}")]
    Persistence(#[from] std::io::Error),

    #[error("snapshot encoding error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
