use anyhow::{Context, Result};
use clap::Parser;
use intervalo::calculator::{
    Calculator, CheckpointIntervalCalculator, LatencyCalculator, ThreadIntervalCalculator,
};
use intervalo::checkpoint::CheckpointIndex;
use intervalo::cli::{Cli, Mode, OutputFormat};
use intervalo::report;
use intervalo::source::{JsonlTraceSource, SourceError};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Pick the calculator variant for the requested mode
fn build_calculator(mode: Mode, index: CheckpointIndex) -> Result<Box<dyn Calculator>> {
    if index.is_empty() && mode != Mode::ThreadInterval {
        anyhow::bail!(
            "--mode {} needs at least one --checkpoint descriptor",
            match mode {
                Mode::Interval => "interval",
                Mode::Latency => "latency",
                Mode::ThreadInterval => unreachable!(),
            }
        );
    }
    Ok(match mode {
        Mode::Interval => Box::new(CheckpointIntervalCalculator::new(index)),
        Mode::Latency => Box::new(LatencyCalculator::new(index)),
        Mode::ThreadInterval => Box::new(ThreadIntervalCalculator::new(index)),
    })
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.debug);

    let index = CheckpointIndex::build(&args.checkpoints)
        .context("invalid checkpoint list")?;
    let mut calculator = build_calculator(args.mode, index)?;

    let source = JsonlTraceSource::open(&args.trace)
        .with_context(|| format!("cannot open trace {}", args.trace.display()))?;

    let mut skipped = 0usize;
    for item in source {
        match item {
            Ok(event) => calculator.observe(&event),
            Err(err @ SourceError::Parse { .. }) if !args.strict => {
                tracing::warn!(%err, "skipping malformed trace line");
                skipped += 1;
            }
            Err(err) => return Err(err.into()),
        }
    }
    if skipped > 0 {
        eprintln!("warning: skipped {} malformed trace line(s)", skipped);
    }

    let procs = calculator.processes();
    match args.format {
        OutputFormat::Text => print!("{}", report::render_text(procs, args.skip_zero_mean)),
        OutputFormat::Csv => print!("{}", report::render_csv(procs, args.skip_zero_mean)),
    }
    if args.stats_extended {
        eprint!("{}", report::render_extended_summary(procs));
    }

    Ok(())
}
