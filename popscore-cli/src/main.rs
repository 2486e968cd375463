//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use popscore_cli::CliError;

fn main() {
    match popscore_cli::run() {
        Ok(summary) => println!("{summary}"),
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("popscore: {err}");
            std::process::exit(1);
        }
    }
}
