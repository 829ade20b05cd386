use clap::{Arg, ArgAction, Command};
use std::env;
use std::io;
use std::process::ExitCode;

use cmm::error::CmmError;
use cmm::{logging, repl, runner, Options};

fn main() -> ExitCode {
    let matches = Command::new("cmm")
        .about("Interpreter for the cmm scripting language")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("file")
                .help("The script file to execute")
                .value_name("FILE")
                .index(1),
        )
        .arg(
            Arg::new("interactive")
                .short('i')
                .long("interactive")
                .help("Start in interactive REPL mode")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("ast")
                .long("ast")
                .help("Print the parsed program instead of evaluating it")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-banner")
                .long("no-banner")
                .help("Do not print the REPL greeting")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-color")
                .long("no-color")
                .help("Disable coloured diagnostics")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("FILTER")
                .help("Tracing filter directives, e.g. `cmm=debug` (overrides RUST_LOG)"),
        )
        .get_matches();

    logging::init(matches.get_one::<String>("log-level").map(String::as_str));

    let options = Options {
        print_ast: matches.get_flag("ast"),
        color: !matches.get_flag("no-color"),
    };

    match matches.get_one::<String>("file") {
        Some(path) if !matches.get_flag("interactive") => run_file(path, options),
        _ => {
            if !matches.get_flag("no-banner") {
                println!("{}", repl::banner(&current_user()));
            }
            let stdin = io::stdin();
            match repl::start(stdin.lock(), io::stdout(), options) {
                Ok(()) => ExitCode::SUCCESS,
                Err(error) => {
                    eprintln!("Error reading input: {}", error);
                    ExitCode::FAILURE
                }
            }
        }
    }
}

fn run_file(path: &str, options: Options) -> ExitCode {
    match runner::run_file(path, options) {
        Ok(_) => ExitCode::SUCCESS,
        Err(error @ CmmError::Runtime { .. }) => {
            eprintln!("ERROR: {}", error);
            ExitCode::FAILURE
        }
        Err(error) => {
            eprintln!("Error: {}", error);
            ExitCode::FAILURE
        }
    }
}

fn current_user() -> String {
    env::var("USER")
        .or_else(|_| env::var("USERNAME"))
        .unwrap_or_else(|_| "there".to_string())
}
