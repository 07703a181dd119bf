// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .help("Print results as pretty JSON")
            .action(ArgAction::SetTrue),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .help("Print results as JSON lines")
            .action(ArgAction::SetTrue),
    )
}

fn req(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).help(help).required(true)
}

fn opt(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).help(help)
}

pub fn build_cli() -> Command {
    Command::new("crowdcore")
        .version(crate_version!())
        .about("Record store, wallet ledger, and funding workflow for a crowdfunding platform")
        .subcommand(Command::new("init").about("Initialize the data directory"))
        .subcommand(
            Command::new("user")
                .about("Manage platform users")
                .subcommand(
                    Command::new("add")
                        .about("Add a user")
                        .arg(req("name", "Display name"))
                        .arg(req("email", "Email address"))
                        .arg(
                            opt("role", "Role: creator, investor, or admin")
                                .default_value("investor"),
                        ),
                )
                .subcommand(json_flags(Command::new("list").about("List users"))),
        )
        .subcommand(
            Command::new("project")
                .about("Manage projects")
                .subcommand(
                    Command::new("add")
                        .about("Open a project for funding")
                        .arg(req("owner", "Owner user id"))
                        .arg(req("title", "Project title"))
                        .arg(opt("description", "Project description").default_value(""))
                        .arg(req("target", "Funding target amount"))
                        .arg(req("closes", "Close date (YYYY-MM-DD)")),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .about("List projects")
                        .arg(opt("status", "Filter by status"))
                        .arg(
                            opt("limit", "Maximum rows to print")
                                .value_parser(clap::value_parser!(usize)),
                        ),
                ))
                .subcommand(
                    Command::new("cancel")
                        .about("Cancel an open project")
                        .arg(req("id", "Project id")),
                )
                .subcommand(
                    Command::new("close")
                        .about("Close an open project")
                        .arg(req("id", "Project id")),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Delete a project with no investments")
                        .arg(req("id", "Project id")),
                ),
        )
        .subcommand(
            Command::new("invest")
                .about("Invest in an open project")
                .arg(req("investor", "Investor user id"))
                .arg(req("project", "Project id"))
                .arg(req("amount", "Amount to invest")),
        )
        .subcommand(
            Command::new("wallet")
                .about("Wallet ledger operations")
                .subcommand(
                    Command::new("show")
                        .about("Show a user's wallet")
                        .arg(req("user", "User id")),
                )
                .subcommand(
                    Command::new("credit")
                        .about("Credit a wallet from a confirmed external payment")
                        .arg(req("user", "User id"))
                        .arg(req("amount", "Amount to credit"))
                        .arg(req("ref", "External payment reference token")),
                )
                .subcommand(
                    Command::new("debit")
                        .about("Withdraw from a wallet")
                        .arg(req("user", "User id"))
                        .arg(req("amount", "Amount to withdraw")),
                )
                .subcommand(json_flags(
                    Command::new("txns")
                        .about("List a wallet's transactions")
                        .arg(req("user", "User id")),
                )),
        )
        .subcommand(
            Command::new("news")
                .about("Platform news feed")
                .subcommand(
                    Command::new("add")
                        .about("Publish a news post")
                        .arg(req("author", "Author user id"))
                        .arg(req("title", "Post title"))
                        .arg(req("body", "Post body")),
                )
                .subcommand(json_flags(Command::new("list").about("List news posts"))),
        )
}
