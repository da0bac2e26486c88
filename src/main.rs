//! Tracegen CLI entry point.

use clap::Parser;
use tracegen::cli::{self, Cli, Commands, EXIT_ERROR};
use tracegen::logging;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_json);

    let result = match &cli.command {
        Commands::Generate(args) => cli::run_generate(args),
        Commands::Check(args) => cli::run_check(args),
        Commands::List(args) => cli::run_list(args),
        Commands::Init(args) => cli::run_init(args),
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("Error: {:#}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}
