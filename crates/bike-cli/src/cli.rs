// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Command-line surface for `bikesim`.

use std::time::Duration;

use clap::Parser;

/// Output format for the end-of-run summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    Human,
    Json,
}

/// Run a bike-sharing rebalancing simulation.
#[derive(Debug, Parser)]
#[command(name = "bikesim", version, about)]
pub struct Cli {
    /// Number of distinct bike types (T).
    #[arg(long, default_value_t = 3)]
    pub bike_types: u8,

    /// Number of sites including the depot at index 0 (S).
    #[arg(long, default_value_t = 5)]
    pub sites: usize,

    /// Per-station slot count (BORNES / C).
    #[arg(long, default_value_t = 8)]
    pub capacity: usize,

    /// Maximum bikes the rebalancer van can carry at once.
    #[arg(long, default_value_t = 4)]
    pub van_capacity: usize,

    /// Bikes the rebalancer loads from the depot per cycle.
    #[arg(long, default_value_t = 2)]
    pub depot_load: usize,

    /// Number of person workers to run.
    #[arg(long, default_value_t = 6)]
    pub persons: usize,

    /// How long to run before every station is shut down.
    #[arg(long, value_parser = parse_duration, default_value = "5s")]
    pub run_for: Duration,

    /// Output format for the end-of-run summary.
    #[arg(long, value_enum, default_value_t = Format::Human)]
    pub format: Format,

    /// Seed the random source for a reproducible run instead of using
    /// the system generator.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Raise the tracing filter to debug level.
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_duration(raw: &str) -> Result<Duration, String> {
    let raw = raw.trim();
    let (number, suffix) = raw
        .find(|c: char| !c.is_ascii_digit())
        .map(|i| raw.split_at(i))
        .unwrap_or((raw, "s"));
    let value: u64 = number
        .parse()
        .map_err(|_| format!("invalid duration `{raw}`"))?;
    match suffix {
        "s" | "" => Ok(Duration::from_secs(value)),
        "ms" => Ok(Duration::from_millis(value)),
        "m" => Ok(Duration::from_secs(value * 60)),
        other => Err(format!("unknown duration suffix `{other}`, expected s/ms/m")),
    }
}
