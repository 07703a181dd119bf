// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Duration as ChronoDuration, Utc};
use crowdcore::config::Config;
use crowdcore::errors::CoreError;
use crowdcore::funding::{FixedPolicy, FundingDesk, LogNotifier};
use crowdcore::models::{Project, ProjectStatus, RecordId, Role, User};
use crowdcore::store::Store;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::time::Duration;

const POLICY: FixedPolicy = FixedPolicy {
    success_rate: 80,
    multiplier_pct: 135,
};

fn test_config() -> Config {
    Config {
        data_dir: PathBuf::new(),
        base_currency: "USD".into(),
        otp_ttl: Duration::from_secs(600),
        otp_sweep_interval: Duration::from_secs(60),
        min_investment: Decimal::ONE,
        max_investment: Decimal::from(1_000_000),
        min_withdrawal: Decimal::from(25),
        base_success_rate: 50,
    }
}

fn user(store: &Store, name: &str, role: Role) -> User {
    store
        .users
        .create_with(|meta| User {
            meta,
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            role,
        })
        .unwrap()
}

fn open_project(store: &Store, owner: &User, target: i64) -> Project {
    store
        .projects
        .create_with(|meta| Project {
            meta,
            owner_id: owner.meta.id,
            title: "Solar farm".into(),
            description: String::new(),
            funding_target: Decimal::from(target),
            invested_total: Decimal::ZERO,
            status: ProjectStatus::Open,
            opened_at: Utc::now(),
            closes_at: Utc::now() + ChronoDuration::days(30),
        })
        .unwrap()
}

#[test]
fn scenario_a_reaching_the_target_funds_the_project() {
    let store = Store::open_in_memory();
    let config = test_config();
    let desk = FundingDesk::new(&store, &config, &POLICY, &LogNotifier);
    let owner = user(&store, "Owner", Role::Creator);
    let alice = user(&store, "Alice", Role::Investor);
    let project = open_project(&store, &owner, 1000);

    let investment = desk
        .invest(alice.meta.id, project.meta.id, Decimal::from(1000))
        .unwrap();
    assert_eq!(investment.amount, Decimal::from(1000));

    let project = store.projects.get(project.meta.id).unwrap();
    assert_eq!(project.status, ProjectStatus::Funded);
    assert_eq!(project.invested_total, Decimal::from(1000));
}

#[test]
fn scenario_b_funded_project_rejects_further_investment() {
    let store = Store::open_in_memory();
    let config = test_config();
    let desk = FundingDesk::new(&store, &config, &POLICY, &LogNotifier);
    let owner = user(&store, "Owner", Role::Creator);
    let alice = user(&store, "Alice", Role::Investor);
    let bob = user(&store, "Bob", Role::Investor);
    let project = open_project(&store, &owner, 1000);

    desk.invest(alice.meta.id, project.meta.id, Decimal::from(1000))
        .unwrap();
    let err = desk
        .invest(bob.meta.id, project.meta.id, Decimal::ONE)
        .unwrap_err();

    assert!(matches!(err, CoreError::InvalidState(_)));
    let project = store.projects.get(project.meta.id).unwrap();
    assert_eq!(project.status, ProjectStatus::Funded);
}

#[test]
fn scenario_c_overshoot_reports_exact_headroom() {
    let store = Store::open_in_memory();
    let config = test_config();
    let desk = FundingDesk::new(&store, &config, &POLICY, &LogNotifier);
    let owner = user(&store, "Owner", Role::Creator);
    let bob = user(&store, "Bob", Role::Investor);
    let carol = user(&store, "Carol", Role::Investor);
    let project = open_project(&store, &owner, 1000);

    desk.invest(bob.meta.id, project.meta.id, Decimal::from(900))
        .unwrap();
    let err = desk
        .invest(carol.meta.id, project.meta.id, Decimal::from(200))
        .unwrap_err();

    assert!(matches!(
        err,
        CoreError::CapacityExceeded { remaining } if remaining == Decimal::from(100)
    ));
    let project = store.projects.get(project.meta.id).unwrap();
    assert_eq!(project.status, ProjectStatus::Open);
    assert_eq!(project.invested_total, Decimal::from(900));
}

#[test]
fn owners_cannot_back_their_own_project() {
    let store = Store::open_in_memory();
    let config = test_config();
    let desk = FundingDesk::new(&store, &config, &POLICY, &LogNotifier);
    let owner = user(&store, "Owner", Role::Creator);
    let project = open_project(&store, &owner, 1000);

    let err = desk
        .invest(owner.meta.id, project.meta.id, Decimal::from(100))
        .unwrap_err();
    assert!(matches!(err, CoreError::SelfInvestment));
    assert!(store.investments.is_empty());
}

#[test]
fn unknown_project_and_investor_are_not_found() {
    let store = Store::open_in_memory();
    let config = test_config();
    let desk = FundingDesk::new(&store, &config, &POLICY, &LogNotifier);
    let alice = user(&store, "Alice", Role::Investor);

    let err = desk
        .invest(alice.meta.id, RecordId::new(), Decimal::from(100))
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound { collection: "projects", .. }));

    let owner = user(&store, "Owner", Role::Creator);
    let project = open_project(&store, &owner, 1000);
    let err = desk
        .invest(RecordId::new(), project.meta.id, Decimal::from(100))
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound { collection: "users", .. }));
}

#[test]
fn investments_after_the_close_date_are_rejected() {
    let store = Store::open_in_memory();
    let config = test_config();
    let desk = FundingDesk::new(&store, &config, &POLICY, &LogNotifier);
    let owner = user(&store, "Owner", Role::Creator);
    let alice = user(&store, "Alice", Role::Investor);
    let project = store
        .projects
        .create_with(|meta| Project {
            meta,
            owner_id: owner.meta.id,
            title: "Expired drive".into(),
            description: String::new(),
            funding_target: Decimal::from(1000),
            invested_total: Decimal::ZERO,
            status: ProjectStatus::Open,
            opened_at: Utc::now() - ChronoDuration::days(40),
            closes_at: Utc::now() - ChronoDuration::days(1),
        })
        .unwrap();

    let err = desk
        .invest(alice.meta.id, project.meta.id, Decimal::from(100))
        .unwrap_err();
    assert!(matches!(err, CoreError::WindowClosed { .. }));
    assert!(store.investments.is_empty());
}

#[test]
fn amounts_outside_configured_bounds_are_rejected() {
    let store = Store::open_in_memory();
    let mut config = test_config();
    config.min_investment = Decimal::from(10);
    config.max_investment = Decimal::from(500);
    let desk = FundingDesk::new(&store, &config, &POLICY, &LogNotifier);
    let owner = user(&store, "Owner", Role::Creator);
    let alice = user(&store, "Alice", Role::Investor);
    let project = open_project(&store, &owner, 1000);

    for amount in [Decimal::from(5), Decimal::from(600)] {
        let err = desk
            .invest(alice.meta.id, project.meta.id, amount)
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }
    assert!(store.investments.is_empty());
}

#[test]
fn fixed_policy_yields_deterministic_outcomes() {
    let store = Store::open_in_memory();
    let config = test_config();
    let desk = FundingDesk::new(&store, &config, &POLICY, &LogNotifier);
    let owner = user(&store, "Owner", Role::Creator);
    let alice = user(&store, "Alice", Role::Investor);
    let project = open_project(&store, &owner, 1000);

    let investment = desk
        .invest(alice.meta.id, project.meta.id, Decimal::from(100))
        .unwrap();
    assert_eq!(investment.success_rate, 80);
    assert_eq!(investment.projected_return, Decimal::new(13500, 2));
}

#[test]
fn concurrent_investments_never_overshoot_the_target() {
    let store = Store::open_in_memory();
    let config = test_config();
    let owner = user(&store, "Owner", Role::Creator);
    let project = open_project(&store, &owner, 1000);
    let investors: Vec<RecordId> = (0..8)
        .map(|i| user(&store, &format!("Investor{}", i), Role::Investor).meta.id)
        .collect();

    let successes: usize = std::thread::scope(|scope| {
        let handles: Vec<_> = investors
            .iter()
            .map(|&investor| {
                let store = &store;
                let config = &config;
                let project_id = project.meta.id;
                scope.spawn(move || {
                    let desk = FundingDesk::new(store, config, &POLICY, &LogNotifier);
                    desk.invest(investor, project_id, Decimal::from(250)).is_ok()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|accepted| *accepted)
            .count()
    });

    assert_eq!(successes, 4);
    let project = store.projects.get(project.meta.id).unwrap();
    assert_eq!(project.status, ProjectStatus::Funded);
    assert_eq!(project.invested_total, Decimal::from(1000));

    let total: Decimal = store.investments.all().iter().map(|i| i.amount).sum();
    assert_eq!(total, Decimal::from(1000));
}

#[test]
fn project_deletion_requires_zero_investments() {
    let store = Store::open_in_memory();
    let config = test_config();
    let desk = FundingDesk::new(&store, &config, &POLICY, &LogNotifier);
    let owner = user(&store, "Owner", Role::Creator);
    let alice = user(&store, "Alice", Role::Investor);
    let backed = open_project(&store, &owner, 1000);
    let empty = open_project(&store, &owner, 1000);
    desk.invest(alice.meta.id, backed.meta.id, Decimal::from(100))
        .unwrap();

    let err = desk.remove_project(backed.meta.id).unwrap_err();
    assert!(matches!(err, CoreError::InvalidState(_)));
    assert!(store.projects.get(backed.meta.id).is_some());

    desk.remove_project(empty.meta.id).unwrap();
    assert!(store.projects.get(empty.meta.id).is_none());
}

#[test]
fn lifecycle_transitions_leave_open_exactly_once() {
    let store = Store::open_in_memory();
    let config = test_config();
    let desk = FundingDesk::new(&store, &config, &POLICY, &LogNotifier);
    let owner = user(&store, "Owner", Role::Creator);

    let a = open_project(&store, &owner, 1000);
    let cancelled = desk.cancel_project(a.meta.id).unwrap();
    assert_eq!(cancelled.status, ProjectStatus::Cancelled);
    let err = desk.close_project(a.meta.id).unwrap_err();
    assert!(matches!(err, CoreError::InvalidState(_)));

    let b = open_project(&store, &owner, 1000);
    let closed = desk.close_project(b.meta.id).unwrap();
    assert_eq!(closed.status, ProjectStatus::Closed);
    let err = desk.cancel_project(b.meta.id).unwrap_err();
    assert!(matches!(err, CoreError::InvalidState(_)));
}

#[test]
fn funding_state_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config();

    let project_id = {
        let store = Store::open(dir.path()).unwrap();
        let desk = FundingDesk::new(&store, &config, &POLICY, &LogNotifier);
        let owner = user(&store, "Owner", Role::Creator);
        let alice = user(&store, "Alice", Role::Investor);
        let project = open_project(&store, &owner, 1000);
        desk.invest(alice.meta.id, project.meta.id, Decimal::from(1000))
            .unwrap();
        store.close().unwrap();
        project.meta.id
    };

    let reopened = Store::open(dir.path()).unwrap();
    let project = reopened.projects.get(project_id).unwrap();
    assert_eq!(project.status, ProjectStatus::Funded);
    assert_eq!(project.invested_total, Decimal::from(1000));
    assert_eq!(reopened.investments.len(), 1);
}
