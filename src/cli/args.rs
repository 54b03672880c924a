//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

/// Dynamic skyline tracking: maintain the Pareto frontier of a point set as points are scheduled in and out
#[derive(Parser, Debug)]
#[command(name = "dynsky")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Directory holding a local .dynsky.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Coordinate and lifetime inputs shared by replay commands.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Coordinate file: one point per line
    #[arg(value_hint = ValueHint::FilePath)]
    pub coords: PathBuf,

    /// Lifetime file: `insertion_time ejection_time` per line
    #[arg(value_hint = ValueHint::FilePath)]
    pub times: PathBuf,

    #[command(flatten)]
    pub records: RecordArgs,
}

/// Record interpretation overrides.
#[derive(Args, Debug, Clone, Default)]
pub struct RecordArgs {
    /// Number of coordinates per point (overrides config and file-name hints)
    #[arg(long)]
    pub dimension: Option<usize>,

    /// Skip malformed records instead of aborting
    #[arg(long)]
    pub lenient: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a schedule and write one skyline line per tick
    Run {
        #[command(flatten)]
        input: InputArgs,

        /// Output file (default from config: small.out)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,

        /// Write snapshots to stdout instead of a file
        #[arg(long, conflicts_with = "output")]
        stdout: bool,
    },

    /// Show the dominance hierarchy at a tick
    Tree {
        #[command(flatten)]
        input: InputArgs,

        /// Tick to stop at (default: last injection tick)
        #[arg(long, allow_negative_numbers = true)]
        at: Option<i64>,
    },

    /// Insertion-only frontier of a single point file
    Frontier {
        /// Point file: one point per line
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,

        #[command(flatten)]
        records: RecordArgs,
    },

    /// Print effective settings
    Config,

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
