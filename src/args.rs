//! Command line arguments

use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Number of seats at the table.
    #[arg(short, long, default_value_t = 4)]
    pub seats: usize,

    /// RNG seed for a reproducible game.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Per-call wall-clock budget for each bot, in milliseconds.
    #[arg(long)]
    pub deadline_ms: Option<u64>,

    /// Hard cap on engine steps.
    #[arg(long, default_value_t = 700)]
    pub max_steps: usize,

    /// Dump the final state as JSON instead of a report.
    #[arg(long)]
    pub json: bool,
}
