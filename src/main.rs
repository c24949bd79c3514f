//! Command line front end for the M-tree console.

use anyhow::{Context, Result};
use clap::Parser;
use log::debug;
use mtree::console::{self, ConsoleConfig};
use std::fs;
use std::io::{self, Read};

mod cli;

use crate::cli::Cli;

fn read_input(cli: &Cli) -> Result<String> {
    match &cli.input {
        Some(path) if path.as_os_str() != "-" => {
            debug!("reading script from {}", path.display());
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
        }
        _ => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("failed to read standard input")?;
            Ok(input)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _r = env_logger::builder()
        .filter_level(cli.log_level())
        .parse_default_env()
        .format_target(false)
        .format_timestamp(None)
        .try_init();

    let input = read_input(&cli)?;
    let config = ConsoleConfig {
        lookup: cli.lookup,
        wrap: cli.wrap,
    };

    let stdout = io::stdout();
    let tree = console::run(&input, config, stdout.lock()).context("failed to run script")?;

    if cli.dump_tree {
        let json = serde_json::to_string_pretty(&tree).context("failed to serialize tree")?;
        eprintln!("{}", json);
    }

    Ok(())
}
