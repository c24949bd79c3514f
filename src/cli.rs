use clap::Parser;
use mtree::console::{Lookup, DEFAULT_WRAP};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "mtree",
    about = "Drive an M-ary search tree with a script of insert, remove, find and rebuild commands.",
    version
)]
pub struct Cli {
    /// Script to execute. Reads standard input when absent or `-`.
    #[arg(env = "MTREE_INPUT")]
    pub input: Option<PathBuf>,

    /// Traversal used to answer `F` commands.
    #[arg(long, env = "MTREE_LOOKUP", value_enum, default_value_t = Lookup::Exhaustive)]
    pub lookup: Lookup,

    /// Number of values printed per line of the final list.
    #[arg(
        long,
        env = "MTREE_WRAP",
        default_value_t = DEFAULT_WRAP,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub wrap: usize,

    /// Print the final tree structure as JSON to standard error.
    #[arg(long)]
    pub dump_tree: bool,

    /// Increase log verbosity (`-v` info, `-vv` debug, `-vvv` trace).
    ///
    /// `RUST_LOG` takes precedence when set.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}
