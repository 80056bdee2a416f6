use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use hostkit_cli::cli::{Cli, Command};
use hostkit_cli::commands;
use hostkit_cli::logging::{Logger, init_subscriber};

fn main() -> ExitCode {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();
    let name = args.command.log_name();
    init_subscriber(args.verbose, name);
    let log = Arc::new(Logger::new(name));

    let result = match args.command {
        Command::Install(opts) => commands::install::run(&args.global, &opts, &log),
        Command::Dotfiles(opts) => commands::dotfiles::run(&args.global, &opts, &log),
        Command::Services(opts) => commands::services::run(&args.global, &opts, &log),
        Command::Plugins => commands::plugins::run(&args.global, &log),
        Command::Check => commands::check::run(&args.global, &log),
        Command::Completions(opts) => {
            commands::completions::run(&opts);
            Ok(())
        }
        Command::Version => {
            commands::version::run();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            commands::report_error(log.as_ref(), &err);
            ExitCode::FAILURE
        }
    }
}
