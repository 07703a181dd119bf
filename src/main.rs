// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crowdcore::{cli, commands, config::Config, store::Store};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let config = Config::from_env()?;
    let store = Store::open(&config.data_dir)?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Store initialized at {}", config.data_dir.display());
        }
        Some(("user", sub)) => commands::users::handle(&store, sub)?,
        Some(("project", sub)) => commands::projects::handle(&store, &config, sub)?,
        Some(("invest", sub)) => commands::invest::handle(&store, &config, sub)?,
        Some(("wallet", sub)) => commands::wallets::handle(&store, &config, sub)?,
        Some(("news", sub)) => commands::news::handle(&store, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    store.close()?;
    Ok(())
}
