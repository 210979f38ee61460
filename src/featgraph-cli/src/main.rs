//! featgraph - check feature descriptor trees.

mod commands;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use featgraph_core::FeatureError;
use tracing::error;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Feature graph checker
#[derive(Debug, Parser)]
#[command(name = "featgraph")]
#[command(about = "Load feature descriptor trees and check their dependency rules")]
#[command(version)]
struct Cli {
    /// Configuration file path (defaults to featgraph.toml in the first root)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    /// Enable JSON logging
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load, verify and validate feature roots
    Check(CheckArgs),

    /// Show one feature and the auto features that activate it
    Show(ShowArgs),

    /// Print the sorted public versions of every base name
    Cohorts(CohortsArgs),

    /// Print transitive kind and edition conflicts
    Conflicts(ConflictsArgs),
}

/// Output format for reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// JSON document.
    Json,
}

#[derive(Debug, clap::Args)]
struct RootArgs {
    /// Feature root directories
    #[arg(required = true)]
    roots: Vec<PathBuf>,
}

#[derive(Debug, clap::Args)]
struct CheckArgs {
    #[command(flatten)]
    roots: RootArgs,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
}

#[derive(Debug, clap::Args)]
struct ShowArgs {
    #[command(flatten)]
    roots: RootArgs,

    /// Symbolic name of the feature
    #[arg(long, short = 'f')]
    feature: String,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
}

#[derive(Debug, clap::Args)]
struct CohortsArgs {
    #[command(flatten)]
    roots: RootArgs,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
}

#[derive(Debug, clap::Args)]
struct ConflictsArgs {
    #[command(flatten)]
    roots: RootArgs,

    /// Fold kind and edition violators into one set per feature
    #[arg(long)]
    merged: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
}

fn setup_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(&cli.log_level, cli.json_logs);

    match commands::run(cli) {
        Ok(outcome) => outcome.into(),
        Err(err) => {
            error!("{:#}", err);
            let code = err
                .chain()
                .find_map(|cause| cause.downcast_ref::<FeatureError>())
                .map(FeatureError::exit_code)
                .unwrap_or(1);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}
