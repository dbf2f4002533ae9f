// upmix-cli/src/main.rs
//
// Entry point for the `upmix` binary: parse arguments, set up logging,
// dispatch to the command and map failures to exit code 1.

use clap::Parser;
use console::style;
use std::process;
use upmix_cli::logging::init_logging;
use upmix_cli::{Cli, Commands, run_convert, run_plan};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.log_file.as_deref()) {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        process::exit(1);
    }

    let result = match cli.command {
        Commands::Plan(args) => run_plan(args),
        Commands::Convert(args) => run_convert(args),
    };

    if let Err(e) = result {
        log::debug!("Command failed: {e:?}");
        eprintln!("{} {}", style("Error:").red().bold(), e);
        process::exit(1);
    }
}
