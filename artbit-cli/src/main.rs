// Artbit CLI - Pulse pipeline runner
// Copyright (c) 2025 EelisK
//
// Licensed under the MIT License.
// See LICENSE file for details.

//! # Artbit CLI
//!
//! Samples a source, detects the pulse period and writes the rate to one or
//! more outputs until Ctrl-C.
//!
//! ## Usage
//!
//! ```bash
//! # Plot a synthetic pulse in the terminal
//! artbit run --input random --output plot
//!
//! # Stream to a Unix socket and the terminal
//! artbit run --output uds --output plot --output-uds-socket /tmp/artbit.sock
//! ```

use artbit::{DetectorConfig, Kernel, KernelConfig, PipelineError, DEFAULT_THRESHOLD};
use artbit_plugins::{NullSink, PlotSink, WaveConfig, WaveSource};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

/// Artbit pulse pipeline
#[derive(Parser, Debug)]
#[command(name = "artbit", author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the pipeline until interrupted
    Run(RunArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Sample source
    #[arg(long, value_enum, default_value_t = InputKind::Random)]
    input: InputKind,

    /// Output sink, repeat for several
    #[arg(long = "output", value_enum, required = true)]
    outputs: Vec<OutputKind>,

    /// Socket path for the uds output
    #[arg(long, default_value = "/tmp/artbit.sock")]
    output_uds_socket: PathBuf,

    /// Transmit timeout of the uds output in milliseconds
    #[arg(long, default_value_t = 100)]
    output_uds_timeout_ms: u64,

    /// Bar width of the plot output
    #[arg(long, default_value_t = 40)]
    output_plot_width: usize,

    /// Sampling interval in milliseconds
    #[arg(long, default_value_t = 2)]
    interval_ms: u64,

    /// Normalized detection threshold
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: f64,

    /// Seed for the random input's noise
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum InputKind {
    /// Synthetic 1.3 Hz pulse with noise bursts
    Random,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputKind {
    /// Text bars on stdout
    Plot,
    /// Lines on a Unix domain socket
    Uds,
    /// Discard
    Null,
}

#[derive(Error, Debug)]
enum CliError {
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(not(unix))]
    #[error("output {0:?} is not supported on this platform")]
    UnsupportedOutput(OutputKind),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    info!("artbit v{}", env!("CARGO_PKG_VERSION"));

    let result = match cli.command {
        Command::Run(args) => run(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "artbit failed");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };
        EnvFilter::from_default_env().add_directive(level.into())
    });

    // stdout belongs to the plot output
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: RunArgs) -> Result<(), CliError> {
    let mut kernel = build_kernel(&args)?;
    kernel.start().await?;

    info!(outputs = ?args.outputs, "running, press Ctrl-C to stop");
    let interrupted = tokio::signal::ctrl_c().await;

    info!("shutting down");
    let stopped = kernel.stop().await;

    let snap = kernel.snapshot();
    info!(
        samples = snap.samples_read,
        read_errors = snap.read_errors,
        read_success = %format!("{:.1}%", snap.read_success_rate() * 100.0),
        periods = snap.periods_detected,
        dropped = snap.notifications_dropped,
        write_failures = snap.write_failures,
        "final counters"
    );

    interrupted?;
    stopped?;
    Ok(())
}

fn build_kernel(args: &RunArgs) -> Result<Kernel, CliError> {
    let config = KernelConfig {
        interval: Duration::from_millis(args.interval_ms),
        detector: DetectorConfig::with_threshold(args.threshold),
        ..Default::default()
    };
    config.validate()?;

    let source = match args.input {
        InputKind::Random => {
            let source = WaveSource::new(WaveConfig::default())
                .with_span(tracing::info_span!("source", input = "random"));
            match args.seed {
                Some(seed) => source.with_seed(seed),
                None => source,
            }
        }
    };

    let mut kernel = Kernel::with_config(source, config);
    for output in &args.outputs {
        match output {
            OutputKind::Plot => kernel.add_sink(PlotSink::stdout(args.output_plot_width)),
            OutputKind::Null => kernel.add_sink(NullSink::new()),
            #[cfg(unix)]
            OutputKind::Uds => kernel.add_sink(
                artbit_plugins::UdsSink::new(
                    &args.output_uds_socket,
                    Duration::from_millis(args.output_uds_timeout_ms),
                )
                .with_span(tracing::info_span!("sink", output = "uds")),
            ),
            #[cfg(not(unix))]
            OutputKind::Uds => return Err(CliError::UnsupportedOutput(*output)),
        }
    }

    Ok(kernel)
}
