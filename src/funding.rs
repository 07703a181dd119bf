// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Config;
use crate::errors::{CoreError, Result};
use crate::models::{Investment, Project, ProjectStatus, RecordId, User};
use crate::store::{Entity, Store};
use chrono::Utc;
use rand::Rng;
use rust_decimal::Decimal;
use std::sync::PoisonError;

/// Outcome estimate attached to an accepted investment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnEstimate {
    /// Whole percent in [50, 95].
    pub success_rate: u8,
    pub projected_return: Decimal,
}

/// Business policy deriving a return estimate from an invested amount.
/// The default is randomized; tests inject a fixed policy, and any
/// deterministic replacement satisfies the same contract.
pub trait ReturnPolicy {
    fn assess(&self, amount: Decimal) -> ReturnEstimate;
}

/// Success rate drawn from [base_rate, 95], return multiplier from
/// [1.20, 1.50] in whole basis-point steps.
pub struct RandomizedPolicy {
    pub base_rate: u8,
}

impl ReturnPolicy for RandomizedPolicy {
    fn assess(&self, amount: Decimal) -> ReturnEstimate {
        let mut rng = rand::thread_rng();
        let floor = self.base_rate.clamp(50, 95);
        let success_rate = rng.gen_range(floor..=95);
        let multiplier_pct = rng.gen_range(120u32..=150);
        ReturnEstimate {
            success_rate,
            projected_return: amount * Decimal::new(multiplier_pct as i64, 2),
        }
    }
}

/// Fixed-outcome policy for tests and dry runs.
pub struct FixedPolicy {
    pub success_rate: u8,
    /// Return multiplier in percent, e.g. 135 for 1.35x.
    pub multiplier_pct: u32,
}

impl ReturnPolicy for FixedPolicy {
    fn assess(&self, amount: Decimal) -> ReturnEstimate {
        ReturnEstimate {
            success_rate: self.success_rate.clamp(50, 95),
            projected_return: amount * Decimal::new(self.multiplier_pct as i64, 2),
        }
    }
}

/// Confirmation side effects are best-effort: a failure is logged by the
/// caller and never rolls back a completed investment.
pub trait Notifier {
    fn investment_confirmed(
        &self,
        investor: &User,
        project: &Project,
        investment: &Investment,
    ) -> anyhow::Result<()>;
}

/// Default notifier: structured log line, nothing external.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn investment_confirmed(
        &self,
        investor: &User,
        project: &Project,
        investment: &Investment,
    ) -> anyhow::Result<()> {
        tracing::info!(
            investor = %investor.email,
            project = %project.title,
            amount = %investment.amount,
            "investment confirmed"
        );
        Ok(())
    }
}

/// The platform's one multi-entity invariant: fund a project without
/// overshooting its target, and transition it to Funded exactly once.
pub struct FundingDesk<'a> {
    store: &'a Store,
    config: &'a Config,
    policy: &'a dyn ReturnPolicy,
    notifier: &'a dyn Notifier,
}

impl<'a> FundingDesk<'a> {
    pub fn new(
        store: &'a Store,
        config: &'a Config,
        policy: &'a dyn ReturnPolicy,
        notifier: &'a dyn Notifier,
    ) -> Self {
        Self {
            store,
            config,
            policy,
            notifier,
        }
    }

    /// Records an investment. Validation aborts with no side effects; the
    /// capacity check, investment creation, total update, and Funded
    /// transition all run inside the project's gate, so a concurrent
    /// second investment observes the updated total and fails cleanly
    /// (first writer wins, overshoot is impossible).
    pub fn invest(
        &self,
        investor_id: RecordId,
        project_id: RecordId,
        amount: Decimal,
    ) -> Result<Investment> {
        if amount < self.config.min_investment || amount > self.config.max_investment {
            return Err(CoreError::Validation(format!(
                "investment must be between {} and {}",
                self.config.min_investment, self.config.max_investment
            )));
        }
        let investor = self
            .store
            .users
            .get(investor_id)
            .ok_or(CoreError::NotFound {
                collection: User::COLLECTION,
                id: investor_id,
            })?;

        let gate = self.store.gate(project_id);
        let _guard = gate.lock().unwrap_or_else(PoisonError::into_inner);

        let project = self
            .store
            .projects
            .get(project_id)
            .ok_or(CoreError::NotFound {
                collection: Project::COLLECTION,
                id: project_id,
            })?;
        if project.status != ProjectStatus::Open {
            return Err(CoreError::InvalidState(format!(
                "project is {}, not open for investment",
                project.status
            )));
        }
        if project.owner_id == investor_id {
            return Err(CoreError::SelfInvestment);
        }
        if Utc::now() > project.closes_at {
            return Err(CoreError::WindowClosed {
                closed_at: project.closes_at,
            });
        }

        let invested: Decimal = self
            .store
            .investments
            .find(|i| i.project_id == project_id)
            .iter()
            .map(|i| i.amount)
            .sum();
        let remaining = project.funding_target - invested;
        if amount > remaining {
            return Err(CoreError::CapacityExceeded { remaining });
        }

        let estimate = self.policy.assess(amount);
        let investment = self.store.investments.create_with(|meta| Investment {
            meta,
            investor_id,
            project_id,
            amount,
            projected_return: estimate.projected_return,
            success_rate: estimate.success_rate,
        })?;

        let new_total = invested + amount;
        let project = self.store.projects.update_with(project_id, |p| {
            p.invested_total = new_total;
            if new_total >= p.funding_target {
                p.status = ProjectStatus::Funded;
            }
        })?;
        drop(_guard);

        if let Err(e) = self
            .notifier
            .investment_confirmed(&investor, &project, &investment)
        {
            tracing::warn!(error = %e, "investment confirmation notification failed");
        }
        Ok(investment)
    }

    /// Open -> Cancelled. Any other starting state is rejected.
    pub fn cancel_project(&self, project_id: RecordId) -> Result<Project> {
        self.transition(project_id, ProjectStatus::Cancelled)
    }

    /// Open -> Closed. Any other starting state is rejected.
    pub fn close_project(&self, project_id: RecordId) -> Result<Project> {
        self.transition(project_id, ProjectStatus::Closed)
    }

    /// Deletes a project, permitted only while it has zero investments.
    pub fn remove_project(&self, project_id: RecordId) -> Result<()> {
        let gate = self.store.gate(project_id);
        let _guard = gate.lock().unwrap_or_else(PoisonError::into_inner);

        if self.store.projects.get(project_id).is_none() {
            return Err(CoreError::NotFound {
                collection: Project::COLLECTION,
                id: project_id,
            });
        }
        let backed = self
            .store
            .investments
            .find(|i| i.project_id == project_id);
        if !backed.is_empty() {
            return Err(CoreError::InvalidState(format!(
                "project has {} investments and cannot be deleted",
                backed.len()
            )));
        }
        self.store.projects.remove(project_id);
        Ok(())
    }

    fn transition(&self, project_id: RecordId, to: ProjectStatus) -> Result<Project> {
        let gate = self.store.gate(project_id);
        let _guard = gate.lock().unwrap_or_else(PoisonError::into_inner);

        let project = self
            .store
            .projects
            .get(project_id)
            .ok_or(CoreError::NotFound {
                collection: Project::COLLECTION,
                id: project_id,
            })?;
        if project.status != ProjectStatus::Open {
            return Err(CoreError::InvalidState(format!(
                "project is {} and cannot become {}",
                project.status, to
            )));
        }
        self.store.projects.update_with(project_id, |p| p.status = to)
    }
}
