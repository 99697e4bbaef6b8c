// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Copy a Postgres database, and follow it (spec §1, §6).

mod cli;
mod commands;
mod context;
mod env;
mod exit_error;
mod filter_ini;
mod logging;

use clap::Parser;

use cli::{Cli, Command};
use exit_error::ExitError;

#[tokio::main]
async fn main() {
    if let Err(error) = env::load_dotenv() {
        eprintln!("pgcopydb: failed to load .env: {error}");
    }
    logging::init();

    let cli = Cli::parse();
    if let Err(error) = dispatch(&cli.command).await {
        eprintln!("pgcopydb: {error}");
        std::process::exit(error.code.code());
    }
}

async fn dispatch(command: &Command) -> Result<(), ExitError> {
    match command {
        Command::Clone(common) => commands::clone::run(common).await,
        Command::Copy { command } => commands::copy::run(command).await,
        Command::Dump(common) => commands::dump::run(common).await,
        Command::Restore(common) => commands::restore::run(common).await,
        Command::List(common) => commands::list::run(common).await,
        Command::Stream { command } => commands::stream::run(command).await,
        Command::Snapshot(common) => commands::snapshot::run(common).await,
        Command::Compare(common) => commands::compare::run(common).await,
    }
}
