// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Config;
use crate::ledger::WalletLedger;
use crate::store::Store;
use crate::utils::{fmt_money, maybe_print_json, parse_decimal, parse_id, pretty_table};
use anyhow::Result;

pub fn handle(store: &Store, config: &Config, m: &clap::ArgMatches) -> Result<()> {
    let ledger = WalletLedger::new(store, config);
    match m.subcommand() {
        Some(("show", sub)) => {
            let user = parse_id(sub.get_one::<String>("user").unwrap())?;
            let wallet = ledger.ensure_wallet(user)?;
            println!(
                "Wallet {}: {}",
                wallet.meta.id,
                fmt_money(&wallet.balance, &wallet.currency)
            );
        }
        Some(("credit", sub)) => {
            let user = parse_id(sub.get_one::<String>("user").unwrap())?;
            let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
            let external_ref = sub.get_one::<String>("ref").unwrap();
            ledger.credit_external(user, amount, external_ref)?;
            let balance = ledger.balance(user)?;
            println!(
                "Credited {}; balance is now {}",
                fmt_money(&amount, &config.base_currency),
                fmt_money(&balance, &config.base_currency)
            );
        }
        Some(("debit", sub)) => {
            let user = parse_id(sub.get_one::<String>("user").unwrap())?;
            let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
            ledger.debit(user, amount)?;
            let balance = ledger.balance(user)?;
            println!(
                "Withdrawal of {} pending; balance is now {}",
                fmt_money(&amount, &config.base_currency),
                fmt_money(&balance, &config.base_currency)
            );
        }
        Some(("txns", sub)) => {
            let user = parse_id(sub.get_one::<String>("user").unwrap())?;
            let data = ledger.transactions(user)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|t| {
                        vec![
                            t.meta.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                            t.direction.to_string(),
                            fmt_money(&t.amount, &config.base_currency),
                            t.status.to_string(),
                            t.external_ref.clone().unwrap_or_default(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Date", "Direction", "Amount", "Status", "Ref"], rows)
                );
            }
        }
        _ => {}
    }
    Ok(())
}
