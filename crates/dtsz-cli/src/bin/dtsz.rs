#![allow(clippy::print_stderr)]

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{IsTerminal, Write};

use dtsz_cli::args::CliArgs;
use dtsz_cli::reporter::Reporter;
use dtsz_cli::{driver, tracing_config};

const EXIT_SUCCESS: i32 = 0;
const EXIT_DIAGNOSTIC_ERRORS: i32 = 1;
const EXIT_FATAL: i32 = 2;

fn main() -> Result<()> {
    let args = CliArgs::parse();
    tracing_config::init_tracing(args.verbose);

    let cwd = std::env::current_dir().context("failed to resolve current directory")?;
    let result = match driver::run(&args, &cwd) {
        Ok(result) => result,
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(EXIT_FATAL);
        }
    };

    if !args.silent && !result.diagnostics.is_empty() {
        let color = args
            .pretty
            .unwrap_or_else(|| std::io::stderr().is_terminal());
        let mut reporter = Reporter::new(color);
        for entry in &result.entries {
            for (file, text) in &entry.sources {
                reporter.add_source(file.clone(), text.clone());
            }
        }
        eprintln!("{}", reporter.render(&result.diagnostics));
    }

    let mut stdout = std::io::stdout().lock();
    for entry in result.entries.iter().filter(|e| e.out_file.is_none()) {
        stdout
            .write_all(entry.text.as_bytes())
            .context("failed to write bundle to stdout")?;
    }
    stdout.flush().context("failed to flush stdout")?;

    let code = if result.has_errors() {
        EXIT_DIAGNOSTIC_ERRORS
    } else {
        EXIT_SUCCESS
    };
    std::process::exit(code);
}
