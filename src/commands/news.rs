// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::NewsPost;
use crate::store::Store;
use crate::utils::{maybe_print_json, parse_id, pretty_table};
use anyhow::Result;
use chrono::Utc;

pub fn handle(store: &Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let author_id = parse_id(sub.get_one::<String>("author").unwrap())?;
            let title = sub.get_one::<String>("title").unwrap().trim().to_string();
            let body = sub.get_one::<String>("body").unwrap().clone();
            let post = store.news.create_with(|meta| NewsPost {
                meta,
                author_id,
                title,
                body,
                published_at: Utc::now(),
            })?;
            println!("Published '{}' ({})", post.title, post.meta.id);
        }
        Some(("list", sub)) => {
            let data = store.news.all();
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|n| {
                        vec![
                            n.published_at.format("%Y-%m-%d").to_string(),
                            n.title.clone(),
                            n.meta.id.to_string(),
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["Published", "Title", "Id"], rows));
            }
        }
        _ => {}
    }
    Ok(())
}
