// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Config;
use crate::funding::{FundingDesk, LogNotifier, RandomizedPolicy};
use crate::store::Store;
use crate::utils::{fmt_money, parse_decimal, parse_id};
use anyhow::Result;

pub fn handle(store: &Store, config: &Config, m: &clap::ArgMatches) -> Result<()> {
    let investor = parse_id(m.get_one::<String>("investor").unwrap())?;
    let project = parse_id(m.get_one::<String>("project").unwrap())?;
    let amount = parse_decimal(m.get_one::<String>("amount").unwrap())?;

    let policy = RandomizedPolicy {
        base_rate: config.base_success_rate,
    };
    let desk = FundingDesk::new(store, config, &policy, &LogNotifier);
    let investment = desk.invest(investor, project, amount)?;

    println!(
        "Invested {} ({}% success, projected return {})",
        fmt_money(&investment.amount, &config.base_currency),
        investment.success_rate,
        fmt_money(&investment.projected_return, &config.base_currency),
    );
    Ok(())
}
