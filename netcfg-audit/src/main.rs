use std::time::Instant;

use anyhow::Result;
use clap::Parser;

mod classify_cmd;
mod cli;
mod compare_cmd;
mod extract_cmd;
mod logging;
mod networks_cmd;
mod path_guard;
mod run;
mod split_cmd;
mod tree_cmd;

use cli::{Cli, Command};
use run::Run;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.global.verbose)?;

    let started = Instant::now();
    let timing = cli.global.timing;
    let run = Run::new(cli.global)?;

    let outcome = match cli.command {
        Command::Extract(args) => extract_cmd::run_extract(args, &run),
        Command::Classify(args) => classify_cmd::run_classify(args, &run),
        Command::Networks(args) => networks_cmd::run_networks(args, &run),
        Command::Compare(args) => compare_cmd::run_compare(args, &run),
        Command::Tree(args) => tree_cmd::run_tree(args, &run),
        Command::Split(args) => split_cmd::run_split(args, &run),
    };

    if timing {
        eprintln!(
            "processing takes {:.3} seconds",
            started.elapsed().as_secs_f64()
        );
    }
    outcome
}
