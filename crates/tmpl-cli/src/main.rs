//! `tmpl`: command-line front end for document templates.

use clap::Parser;

mod cli;
mod commands;

use crate::cli::{Cli, Command};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match &cli.command {
        Command::Inspect { file } => commands::run_inspect(file),
        Command::Lint {
            file,
            document_type,
        } => commands::run_lint(file, *document_type),
        Command::Thumbnail { file, out, scale } => {
            commands::run_thumbnail(file, out.as_deref(), *scale)
        }
        Command::Starter { document_type, out } => {
            commands::run_starter(*document_type, out.as_deref())
        }
        Command::Fields { document_type } => commands::run_fields(*document_type),
    };

    let code = match result {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            2
        }
    };
    std::process::exit(code);
}

/// `RUST_LOG` when set, otherwise warn/debug/trace by `-v` count.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}
