// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Config;
use crate::funding::{FundingDesk, LogNotifier, RandomizedPolicy};
use crate::models::{Project, ProjectStatus};
use crate::store::Store;
use crate::utils::{fmt_money, maybe_print_json, parse_close_date, parse_decimal, parse_id, pretty_table};
use anyhow::Result;
use chrono::Utc;

pub fn handle(store: &Store, config: &Config, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(store, config, sub)?,
        Some(("list", sub)) => list(store, config, sub)?,
        Some(("cancel", sub)) => {
            let id = parse_id(sub.get_one::<String>("id").unwrap())?;
            let project = desk(store, config, |d| d.cancel_project(id))?;
            println!("Cancelled '{}'", project.title);
        }
        Some(("close", sub)) => {
            let id = parse_id(sub.get_one::<String>("id").unwrap())?;
            let project = desk(store, config, |d| d.close_project(id))?;
            println!("Closed '{}'", project.title);
        }
        Some(("rm", sub)) => {
            let id = parse_id(sub.get_one::<String>("id").unwrap())?;
            desk(store, config, |d| d.remove_project(id))?;
            println!("Removed project {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn desk<T>(
    store: &Store,
    config: &Config,
    f: impl FnOnce(&FundingDesk<'_>) -> crate::errors::Result<T>,
) -> Result<T> {
    let policy = RandomizedPolicy {
        base_rate: config.base_success_rate,
    };
    let desk = FundingDesk::new(store, config, &policy, &LogNotifier);
    Ok(f(&desk)?)
}

fn add(store: &Store, config: &Config, sub: &clap::ArgMatches) -> Result<()> {
    let owner_id = parse_id(sub.get_one::<String>("owner").unwrap())?;
    let title = sub.get_one::<String>("title").unwrap().trim().to_string();
    let description = sub.get_one::<String>("description").unwrap().clone();
    let target = parse_decimal(sub.get_one::<String>("target").unwrap())?;
    let closes_at = parse_close_date(sub.get_one::<String>("closes").unwrap())?;

    let project = store.projects.create_with(|meta| Project {
        meta,
        owner_id,
        title,
        description,
        funding_target: target,
        invested_total: rust_decimal::Decimal::ZERO,
        status: ProjectStatus::Open,
        opened_at: Utc::now(),
        closes_at,
    })?;
    println!(
        "Opened '{}' seeking {} until {} ({})",
        project.title,
        fmt_money(&project.funding_target, &config.base_currency),
        project.closes_at.date_naive(),
        project.meta.id
    );
    Ok(())
}

fn list(store: &Store, config: &Config, sub: &clap::ArgMatches) -> Result<()> {
    let status = sub.get_one::<String>("status").map(|s| s.to_lowercase());
    let mut data = store.projects.find(|p| match status.as_deref() {
        Some(want) => p.status.to_string() == want,
        None => true,
    });
    if let Some(limit) = sub.get_one::<usize>("limit") {
        data.truncate(*limit);
    }
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|p| {
                vec![
                    p.meta.id.to_string(),
                    p.title.clone(),
                    p.status.to_string(),
                    fmt_money(&p.invested_total, &config.base_currency),
                    fmt_money(&p.funding_target, &config.base_currency),
                    p.closes_at.date_naive().to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Title", "Status", "Invested", "Target", "Closes"],
                rows,
            )
        );
    }
    Ok(())
}
