// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Config;
use crate::errors::{CoreError, Result};
use crate::models::{RecordId, TxDirection, TxStatus, Wallet, WalletTransaction};
use crate::store::Store;
use rust_decimal::Decimal;
use std::sync::PoisonError;

/// One wallet per user and an append-only transaction history. Every
/// mutating path runs inside the owner's gate so the balance
/// read-then-write is a critical section; the balance invariant (signed
/// sum of completed credits minus debits) holds under concurrent callers.
/// The duplicate-reference invariant spans wallets, so external credits
/// additionally serialize through a per-reference gate, taken before the
/// owner's gate (reference outer, owner inner, never the reverse).
pub struct WalletLedger<'a> {
    store: &'a Store,
    config: &'a Config,
}

impl<'a> WalletLedger<'a> {
    pub fn new(store: &'a Store, config: &'a Config) -> Self {
        Self { store, config }
    }

    /// Returns the user's wallet, lazily creating a zero-balance wallet
    /// in the platform base currency on first access.
    pub fn ensure_wallet(&self, user_id: RecordId) -> Result<Wallet> {
        let gate = self.store.gate(user_id);
        let _guard = gate.lock().unwrap_or_else(PoisonError::into_inner);
        self.wallet_for(user_id)
    }

    /// Credits the wallet from a verified external payment. The external
    /// reference token makes this idempotent: replaying the same payment
    /// confirmation fails with DuplicateTransaction and credits nothing,
    /// even when the replay targets a different user's wallet. The
    /// per-reference gate keeps the duplicate scan and the insert as one
    /// critical section across all wallets.
    pub fn credit_external(
        &self,
        user_id: RecordId,
        amount: Decimal,
        external_ref: &str,
    ) -> Result<WalletTransaction> {
        require_positive(amount)?;
        let ref_gate = self.store.credit_gate(external_ref);
        let _ref_guard = ref_gate.lock().unwrap_or_else(PoisonError::into_inner);

        let duplicate = self.store.wallet_txns.find(|t| {
            t.direction == TxDirection::Credit
                && t.status == TxStatus::Completed
                && t.external_ref.as_deref() == Some(external_ref)
        });
        if !duplicate.is_empty() {
            return Err(CoreError::DuplicateTransaction {
                external_ref: external_ref.to_string(),
            });
        }

        let gate = self.store.gate(user_id);
        let _guard = gate.lock().unwrap_or_else(PoisonError::into_inner);
        let wallet = self.wallet_for(user_id)?;
        let txn = self.store.wallet_txns.create_with(|meta| WalletTransaction {
            meta,
            wallet_id: wallet.meta.id,
            direction: TxDirection::Credit,
            amount,
            external_ref: Some(external_ref.to_string()),
            status: TxStatus::Completed,
        })?;
        self.store
            .wallets
            .update_with(wallet.meta.id, |w| w.balance += amount)?;
        Ok(txn)
    }

    /// Optimistic debit: the balance drops immediately and the
    /// transaction stays pending until an external settlement resolves it.
    pub fn debit(&self, user_id: RecordId, amount: Decimal) -> Result<WalletTransaction> {
        require_positive(amount)?;
        if amount < self.config.min_withdrawal {
            return Err(CoreError::BelowMinimum {
                minimum: self.config.min_withdrawal,
            });
        }
        let gate = self.store.gate(user_id);
        let _guard = gate.lock().unwrap_or_else(PoisonError::into_inner);

        let wallet = self.wallet_for(user_id)?;
        if amount > wallet.balance {
            return Err(CoreError::InsufficientFunds {
                balance: wallet.balance,
                requested: amount,
            });
        }
        let txn = self.store.wallet_txns.create_with(|meta| WalletTransaction {
            meta,
            wallet_id: wallet.meta.id,
            direction: TxDirection::Debit,
            amount,
            external_ref: None,
            status: TxStatus::Pending,
        })?;
        self.store
            .wallets
            .update_with(wallet.meta.id, |w| w.balance -= amount)?;
        Ok(txn)
    }

    pub fn balance(&self, user_id: RecordId) -> Result<Decimal> {
        Ok(self.ensure_wallet(user_id)?.balance)
    }

    /// The wallet's history in insertion order.
    pub fn transactions(&self, user_id: RecordId) -> Result<Vec<WalletTransaction>> {
        let wallet = self.ensure_wallet(user_id)?;
        Ok(self
            .store
            .wallet_txns
            .find(|t| t.wallet_id == wallet.meta.id))
    }

    // Lookup-or-create without gating; callers hold the owner's gate.
    fn wallet_for(&self, user_id: RecordId) -> Result<Wallet> {
        if let Some(wallet) = self
            .store
            .wallets
            .find(|w| w.owner_id == user_id)
            .into_iter()
            .next()
        {
            return Ok(wallet);
        }
        self.store.wallets.create_with(|meta| Wallet {
            meta,
            owner_id: user_id,
            balance: Decimal::ZERO,
            currency: self.config.base_currency.clone(),
        })
    }
}

fn require_positive(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(CoreError::Validation(format!(
            "amount must be positive, got {}",
            amount
        )));
    }
    Ok(())
}
