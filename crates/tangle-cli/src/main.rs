#![forbid(unsafe_code)]

mod cmd;
mod definition;
mod output;
mod probes;

use clap::{Parser, Subcommand};
use output::{OutputMode, resolve_output_mode};
use std::env;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "tangle: dependency-aware component health",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Graph definition file.
    #[arg(long, global = true, env = "TANGLE_GRAPH", default_value = "tangle.toml")]
    graph: PathBuf,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Graph",
        about = "Validate the graph definition",
        long_about = "Load and validate the graph definition without running any probe.",
        after_help = "EXAMPLES:\n    # Validate ./tangle.toml\n    tangle check\n\n    # Validate another file\n    tangle --graph deploy/tangle.toml check"
    )]
    Check(cmd::check::CheckArgs),

    #[command(
        next_help_heading = "Health",
        about = "Probe every component and classify overall health",
        long_about = "Probe every component once, validate dependencies, collect cascades and cycles, and classify overall health.",
        after_help = "EXAMPLES:\n    # Full report\n    tangle report\n\n    # Fail CI when the system is degraded or worse\n    tangle report --fail-on degraded\n\n    # Emit machine-readable output\n    tangle report --format json"
    )]
    Report(cmd::report::ReportArgs),

    #[command(
        next_help_heading = "Health",
        about = "Check a component's direct dependencies",
        after_help = "EXAMPLES:\n    # Can the designer run?\n    tangle validate designer"
    )]
    Validate(cmd::validate::ValidateArgs),

    #[command(
        next_help_heading = "Health",
        about = "Run one component's own probe",
        after_help = "EXAMPLES:\n    # Probe the database\n    tangle health db"
    )]
    Health(cmd::health::HealthArgs),

    #[command(
        next_help_heading = "Graph",
        about = "Show components affected by a failure",
        after_help = "EXAMPLES:\n    # Direct dependents (or declared override)\n    tangle cascade architect\n\n    # Full blast radius\n    tangle cascade architect --transitive"
    )]
    Cascade(cmd::cascade::CascadeArgs),

    #[command(
        next_help_heading = "Graph",
        about = "List dependency cycles",
        after_help = "EXAMPLES:\n    # Show cycles\n    tangle cycles\n\n    # Emit machine-readable output\n    tangle cycles --json"
    )]
    Cycles(cmd::cycles::CyclesArgs),

    #[command(
        next_help_heading = "Recovery",
        about = "Order failed components for restoration",
        after_help = "EXAMPLES:\n    # Order every currently unhealthy component\n    tangle recovery\n\n    # Order an explicit set\n    tangle recovery designer architect"
    )]
    Recovery(cmd::recovery::RecoveryArgs),

    #[command(
        next_help_heading = "Recovery",
        about = "Check whether a component looks recovered",
        after_help = "EXAMPLES:\n    # Is the constructor back?\n    tangle verify constructor"
    )]
    Verify(cmd::verify::VerifyArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("TANGLE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "tangle=debug,info"
        } else {
            "tangle=info,warn"
        })
    });

    let format = env::var("TANGLE_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = cli.output_mode();
    debug!(graph = %cli.graph.display(), ?output, "starting");

    match &cli.command {
        Commands::Check(args) => cmd::check::run_check(args, output, &cli.graph),
        Commands::Report(args) => cmd::report::run_report(args, output, &cli.graph),
        Commands::Validate(args) => cmd::validate::run_validate(args, output, &cli.graph),
        Commands::Health(args) => cmd::health::run_health(args, output, &cli.graph),
        Commands::Cascade(args) => cmd::cascade::run_cascade(args, output, &cli.graph),
        Commands::Cycles(args) => cmd::cycles::run_cycles(args, output, &cli.graph),
        Commands::Recovery(args) => cmd::recovery::run_recovery(args, output, &cli.graph),
        Commands::Verify(args) => cmd::verify::run_verify(args, output, &cli.graph),
    }
}
