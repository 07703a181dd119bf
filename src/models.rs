// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store::Entity;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque record identifier, unique within a collection for the lifetime
/// of the store and stable across snapshot reloads.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for RecordId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Identity and bookkeeping shared by every stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMeta {
    pub id: RecordId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecordMeta {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: RecordId::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Default for RecordMeta {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Creator,
    Investor,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Creator => write!(f, "creator"),
            Role::Investor => write!(f, "investor"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "creator" => Ok(Role::Creator),
            "investor" => Ok(Role::Investor),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl Entity for User {
    const COLLECTION: &'static str = "users";

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("user name must not be empty".into());
        }
        if !self.email.contains('@') {
            return Err(format!("invalid email '{}'", self.email));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Open,
    Funded,
    Cancelled,
    Closed,
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectStatus::Open => write!(f, "open"),
            ProjectStatus::Funded => write!(f, "funded"),
            ProjectStatus::Cancelled => write!(f, "cancelled"),
            ProjectStatus::Closed => write!(f, "closed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub owner_id: RecordId,
    pub title: String,
    pub description: String,
    pub funding_target: Decimal,
    pub invested_total: Decimal,
    pub status: ProjectStatus,
    pub opened_at: DateTime<Utc>,
    pub closes_at: DateTime<Utc>,
}

impl Project {
    pub fn remaining(&self) -> Decimal {
        self.funding_target - self.invested_total
    }
}

impl Entity for Project {
    const COLLECTION: &'static str = "projects";

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("project title must not be empty".into());
        }
        if self.funding_target <= Decimal::ZERO {
            return Err("funding target must be positive".into());
        }
        if self.closes_at <= self.opened_at {
            return Err("close date must be after the open date".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Investment {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub investor_id: RecordId,
    pub project_id: RecordId,
    pub amount: Decimal,
    pub projected_return: Decimal,
    /// Whole percent, clamped to [50, 95] by the return policy.
    pub success_rate: u8,
}

impl Entity for Investment {
    const COLLECTION: &'static str = "investments";

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn validate(&self) -> Result<(), String> {
        if self.amount <= Decimal::ZERO {
            return Err("investment amount must be positive".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub owner_id: RecordId,
    pub balance: Decimal,
    pub currency: String,
}

impl Entity for Wallet {
    const COLLECTION: &'static str = "wallets";

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn validate(&self) -> Result<(), String> {
        if self.currency.trim().is_empty() {
            return Err("wallet currency must not be empty".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxDirection {
    Credit,
    Debit,
}

impl fmt::Display for TxDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxDirection::Credit => write!(f, "credit"),
            TxDirection::Debit => write!(f, "debit"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Pending,
    Completed,
    Failed,
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxStatus::Pending => write!(f, "pending"),
            TxStatus::Completed => write!(f, "completed"),
            TxStatus::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletTransaction {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub wallet_id: RecordId,
    pub direction: TxDirection,
    pub amount: Decimal,
    /// Reference token of the external payment that produced a credit.
    /// Unique among completed credits; None for debits.
    pub external_ref: Option<String>,
    pub status: TxStatus,
}

impl Entity for WalletTransaction {
    const COLLECTION: &'static str = "wallet_txns";

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn validate(&self) -> Result<(), String> {
        if self.amount <= Decimal::ZERO {
            return Err("transaction amount must be positive".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsPost {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub author_id: RecordId,
    pub title: String,
    pub body: String,
    pub published_at: DateTime<Utc>,
}

impl Entity for NewsPost {
    const COLLECTION: &'static str = "news";

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("news title must not be empty".into());
        }
        Ok(())
    }
}
