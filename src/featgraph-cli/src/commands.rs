//! Subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use featgraph_core::prelude::*;
use tracing::{debug, info};

use crate::output;
use crate::{CheckArgs, Cli, CohortsArgs, Command, ConflictsArgs, OutputFormat, ShowArgs};

/// Result of a successful command run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing to report.
    Clean,
    /// The check found problems.
    Findings,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Clean => ExitCode::SUCCESS,
            Outcome::Findings => ExitCode::from(1),
        }
    }
}

pub fn run(cli: Cli) -> Result<Outcome> {
    let config_path = cli.config;
    match cli.command {
        Command::Check(args) => run_check(config_path, args),
        Command::Show(args) => run_show(config_path, args),
        Command::Cohorts(args) => run_cohorts(config_path, args),
        Command::Conflicts(args) => run_conflicts(config_path, args),
    }
}

/// Loads the explicit config file, or `featgraph.toml` from the first root.
fn resolve_config(config_path: Option<PathBuf>, roots: &[PathBuf]) -> Result<CheckConfig> {
    match config_path {
        Some(path) => CheckConfig::load(&path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => match roots.first() {
            Some(root) => CheckConfig::discover(root)
                .with_context(|| format!("Failed to read config in {}", root.display())),
            None => Ok(CheckConfig::default()),
        },
    }
}

fn load(config: &CheckConfig, roots: &[PathBuf]) -> Result<FeatureCatalog> {
    let catalog = load_catalog(roots.iter().cloned(), config)
        .context("Failed to load feature catalog")?;
    info!("Catalog holds {} features", catalog.len());
    Ok(catalog)
}

fn run_check(config_path: Option<PathBuf>, args: CheckArgs) -> Result<Outcome> {
    let roots = args.roots.roots;
    let config = resolve_config(config_path, &roots)?;
    let catalog = load(&config, &roots)?;

    let report = CatalogValidator::new(&config).validate(&catalog);
    debug!("Validation produced {} findings", report.len());

    match args.format {
        OutputFormat::Text => print!("{}", output::render_check_text(&catalog, &report)),
        OutputFormat::Json => println!("{}", output::render_check_json(&catalog, &report)?),
    }

    Ok(if report.is_empty() {
        Outcome::Clean
    } else {
        Outcome::Findings
    })
}

fn run_show(config_path: Option<PathBuf>, args: ShowArgs) -> Result<Outcome> {
    let roots = args.roots.roots;
    let config = resolve_config(config_path, &roots)?;
    let catalog = load(&config, &roots)?;

    let record = catalog
        .get(&args.feature)
        .ok_or_else(|| FeatureError::NotFound(args.feature.clone()))?;

    match args.format {
        OutputFormat::Text => print!("{}", output::render_feature_text(record)),
        OutputFormat::Json => println!("{}", output::render_feature_json(record)?),
    }
    Ok(Outcome::Clean)
}

fn run_cohorts(config_path: Option<PathBuf>, args: CohortsArgs) -> Result<Outcome> {
    let roots = args.roots.roots;
    let config = resolve_config(config_path, &roots)?;
    let catalog = load(&config, &roots)?;

    match args.format {
        OutputFormat::Text => print!("{}", output::render_cohorts_text(catalog.cohorts())),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(catalog.cohorts())?),
    }
    Ok(Outcome::Clean)
}

fn run_conflicts(config_path: Option<PathBuf>, args: ConflictsArgs) -> Result<Outcome> {
    let roots = args.roots.roots;
    let config = resolve_config(config_path, &roots)?;
    let catalog = load(&config, &roots)?;

    let report = verify_all(&catalog);

    match (args.format, args.merged) {
        (OutputFormat::Text, false) => print!("{}", output::render_conflicts_text(&report)),
        (OutputFormat::Text, true) => print!("{}", output::render_merged_text(&report.merged())),
        (OutputFormat::Json, false) => println!("{}", serde_json::to_string_pretty(&report)?),
        (OutputFormat::Json, true) => {
            println!("{}", serde_json::to_string_pretty(&report.merged())?)
        }
    }

    Ok(if report.is_empty() {
        Outcome::Clean
    } else {
        Outcome::Findings
    })
}
