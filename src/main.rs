mod automata;
mod cli;
mod commands;
mod config;
mod error_handling;
mod generator;
mod grammar;
mod ir;
mod ll1;
mod optimize;
mod parser;
mod render;
mod sdt;
mod solver;
mod trace;

use std::process::ExitCode;

use clap::Parser;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    match commands::run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            failure.report();
            ExitCode::FAILURE
        }
    }
}
