// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Duration, Utc};
use crowdcore::errors::CoreError;
use crowdcore::models::{Project, ProjectStatus, Role, User};
use crowdcore::store::Store;
use rust_decimal::Decimal;

fn sample_user(store: &Store, name: &str) -> User {
    store
        .users
        .create_with(|meta| User {
            meta,
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            role: Role::Creator,
        })
        .unwrap()
}

fn sample_project(store: &Store, owner: &User, title: &str) -> Project {
    store
        .projects
        .create_with(|meta| Project {
            meta,
            owner_id: owner.meta.id,
            title: title.to_string(),
            description: String::new(),
            funding_target: Decimal::from(1000),
            invested_total: Decimal::ZERO,
            status: ProjectStatus::Open,
            opened_at: Utc::now(),
            closes_at: Utc::now() + Duration::days(30),
        })
        .unwrap()
}

#[test]
fn create_assigns_identity_and_timestamps() {
    let store = Store::open_in_memory();
    let a = sample_user(&store, "Ada");
    let b = sample_user(&store, "Brin");

    assert_ne!(a.meta.id, b.meta.id);
    assert_eq!(a.meta.created_at, a.meta.updated_at);
    assert_eq!(store.users.len(), 2);
}

#[test]
fn create_rejects_invalid_records() {
    let store = Store::open_in_memory();
    let err = store
        .users
        .create_with(|meta| User {
            meta,
            name: "Ada".into(),
            email: "not-an-email".into(),
            role: Role::Investor,
        })
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
    assert!(store.users.is_empty());
}

#[test]
fn get_returns_none_for_unknown_id() {
    let store = Store::open_in_memory();
    let ghost = crowdcore::models::RecordId::new();
    assert!(store.users.get(ghost).is_none());
}

#[test]
fn update_patches_fields_and_refreshes_timestamp() {
    let store = Store::open_in_memory();
    let owner = sample_user(&store, "Ada");
    let project = sample_project(&store, &owner, "Solar farm");

    let updated = store
        .projects
        .update_with(project.meta.id, |p| p.title = "Solar farm II".into())
        .unwrap();

    assert_eq!(updated.title, "Solar farm II");
    assert_eq!(updated.funding_target, project.funding_target);
    assert_eq!(updated.meta.created_at, project.meta.created_at);
    assert!(updated.meta.updated_at >= project.meta.updated_at);
}

#[test]
fn update_unknown_id_is_not_found() {
    let store = Store::open_in_memory();
    let ghost = crowdcore::models::RecordId::new();
    let err = store
        .projects
        .update_with(ghost, |p| p.title = "x".into())
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound { collection: "projects", .. }));
}

#[test]
fn remove_is_false_for_absent_then_true() {
    let store = Store::open_in_memory();
    let owner = sample_user(&store, "Ada");
    let project = sample_project(&store, &owner, "Solar farm");

    assert!(!store.projects.remove(crowdcore::models::RecordId::new()));
    assert!(store.projects.remove(project.meta.id));
    assert!(!store.projects.remove(project.meta.id));
    assert!(store.projects.is_empty());
}

#[test]
fn find_preserves_insertion_order() {
    let store = Store::open_in_memory();
    let owner = sample_user(&store, "Ada");
    for title in ["First", "Second", "Third"] {
        sample_project(&store, &owner, title);
    }
    let titles: Vec<String> = store
        .projects
        .all()
        .into_iter()
        .map(|p| p.title)
        .collect();
    assert_eq!(titles, vec!["First", "Second", "Third"]);
}

#[test]
fn gate_registry_evicts_entries_nobody_holds() {
    let store = Store::open_in_memory();

    let held = store.gate(crowdcore::models::RecordId::new());
    let _guard = held.lock().unwrap();

    for _ in 0..100 {
        let _ = store.gate(crowdcore::models::RecordId::new());
        let _ = store.credit_gate("pay-transient");
    }

    // Only the held gate and at most the last transient lookup survive
    assert!(store.gate_count() <= 3);
}

#[test]
fn missing_snapshot_files_load_as_empty_collections() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path()).unwrap();
    assert!(store.users.is_empty());
    assert!(store.projects.is_empty());
    assert!(store.wallets.is_empty());
}

#[test]
fn snapshot_round_trip_reproduces_identical_records() {
    let dir = tempfile::tempdir().unwrap();

    let (users, projects) = {
        let store = Store::open(dir.path()).unwrap();
        let ada = sample_user(&store, "Ada");
        let brin = sample_user(&store, "Brin");
        sample_project(&store, &ada, "Solar farm");
        sample_project(&store, &brin, "Wind farm");
        let out = (store.users.all(), store.projects.all());
        store.close().unwrap();
        out
    };

    let reopened = Store::open(dir.path()).unwrap();
    assert_eq!(reopened.users.all(), users);
    assert_eq!(reopened.projects.all(), projects);
}

#[test]
fn removals_survive_reload() {
    let dir = tempfile::tempdir().unwrap();

    let keep_id = {
        let store = Store::open(dir.path()).unwrap();
        let owner = sample_user(&store, "Ada");
        let gone = sample_project(&store, &owner, "Doomed");
        let keep = sample_project(&store, &owner, "Kept");
        assert!(store.projects.remove(gone.meta.id));
        store.close().unwrap();
        keep.meta.id
    };

    let reopened = Store::open(dir.path()).unwrap();
    assert_eq!(reopened.projects.len(), 1);
    assert_eq!(reopened.projects.get(keep_id).unwrap().title, "Kept");
}

#[test]
fn updates_survive_reload() {
    let dir = tempfile::tempdir().unwrap();

    let id = {
        let store = Store::open(dir.path()).unwrap();
        let owner = sample_user(&store, "Ada");
        let project = sample_project(&store, &owner, "Solar farm");
        store
            .projects
            .update_with(project.meta.id, |p| {
                p.invested_total = Decimal::from(250);
            })
            .unwrap();
        store.close().unwrap();
        project.meta.id
    };

    let reopened = Store::open(dir.path()).unwrap();
    let project = reopened.projects.get(id).unwrap();
    assert_eq!(project.invested_total, Decimal::from(250));
}
