//! CLI argument parsing for Intervalo

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Calculation strategy applied to the event stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Correlated checkpoint-to-checkpoint intervals (default)
    Interval,
    /// Extract precomputed latency/count fields named by the descriptors
    Latency,
    /// Cadence between repeats of the same event on the same thread
    ThreadInterval,
}

/// Output format for the computed report
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Classic per-pid text report (default)
    Text,
    /// CSV for spreadsheet analysis
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "intervalo")]
#[command(version)]
#[command(about = "Checkpoint interval calculator for trace event streams", long_about = None)]
pub struct Cli {
    /// Trace file, one JSON event object per line
    pub trace: PathBuf,

    /// Declared checkpoint descriptors, in order (base:sub[:qualifier]);
    /// repeat the flag or pass a comma-separated list
    #[arg(short = 'k', long = "checkpoint", value_name = "DESCRIPTOR", value_delimiter = ',')]
    pub checkpoints: Vec<String>,

    /// Calculation strategy
    #[arg(long = "mode", value_enum, default_value = "interval")]
    pub mode: Mode,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Print extended per-series statistics (percentiles) to stderr
    #[arg(long = "stats-extended")]
    pub stats_extended: bool,

    /// Compute means over non-zero samples only
    #[arg(long = "skip-zero-mean")]
    pub skip_zero_mean: bool,

    /// Stop at the first malformed trace line instead of skipping it
    #[arg(long = "strict")]
    pub strict: bool,

    /// Enable debug logging to stderr (RUST_LOG overrides)
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_minimal() {
        let cli = Cli::parse_from(["intervalo", "trace.jsonl"]);
        assert_eq!(cli.trace, PathBuf::from("trace.jsonl"));
        assert!(cli.checkpoints.is_empty());
        assert_eq!(cli.mode, Mode::Interval);
        assert!(!cli.strict);
    }

    #[test]
    fn test_cli_comma_separated_checkpoints() {
        let cli = Cli::parse_from(["intervalo", "-k", "a:x,a:y,a:z", "trace.jsonl"]);
        assert_eq!(cli.checkpoints, vec!["a:x", "a:y", "a:z"]);
    }

    #[test]
    fn test_cli_repeated_checkpoint_flags() {
        let cli = Cli::parse_from([
            "intervalo",
            "--checkpoint",
            "a:x",
            "--checkpoint",
            "a:z",
            "trace.jsonl",
        ]);
        assert_eq!(cli.checkpoints, vec!["a:x", "a:z"]);
    }

    #[test]
    fn test_cli_mode_values() {
        let cli = Cli::parse_from(["intervalo", "--mode", "thread-interval", "trace.jsonl"]);
        assert_eq!(cli.mode, Mode::ThreadInterval);
    }
}
