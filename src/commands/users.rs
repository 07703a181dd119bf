// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Role, User};
use crate::store::Store;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{Result, anyhow};

pub fn handle(store: &Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            let email = sub.get_one::<String>("email").unwrap();
            let role: Role = sub
                .get_one::<String>("role")
                .unwrap()
                .parse()
                .map_err(|e: String| anyhow!(e))?;
            let user = store.users.create_with(|meta| User {
                meta,
                name: name.trim().to_string(),
                email: email.trim().to_lowercase(),
                role,
            })?;
            println!("Added {} '{}' ({})", role, user.name, user.meta.id);
        }
        Some(("list", sub)) => {
            let data = store.users.all();
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|u| {
                        vec![
                            u.meta.id.to_string(),
                            u.name.clone(),
                            u.email.clone(),
                            u.role.to_string(),
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["Id", "Name", "Email", "Role"], rows));
            }
        }
        _ => {}
    }
    Ok(())
}
