use anyhow::Context;
use clap::Parser;
use epd_layout::{RuleOverrides, RuleSet, Validator, Violation};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

/// Validate e-paper layout documents against the layout rules.
///
/// Exits with 0 when every file is valid, 1 when any file has violations,
/// and 2 when a file or the rule overrides cannot be read.
#[derive(Parser, Debug)]
#[command(name = "layout-validate", version, about)]
struct Cli {
    /// Layout documents to check (YAML)
    #[arg(required = true, value_name = "FILE")]
    files: Vec<PathBuf>,

    /// YAML file with rule overrides (canvas, font_sizes, icon_modules, limits, max_lengths)
    #[arg(long, value_name = "FILE")]
    rules: Option<PathBuf>,

    /// Print a JSON report instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct FileReport<'a> {
    file: String,
    violations: &'a [Violation],
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let exit_code = match run(&cli) {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(e) => {
            eprintln!("error: {:#}", e);
            2
        }
    };
    process::exit(exit_code);
}

fn run(cli: &Cli) -> anyhow::Result<bool> {
    let rules = load_rules(cli.rules.as_deref())?;
    let validator = Validator::new(&rules);

    let mut results = Vec::with_capacity(cli.files.len());
    for path in &cli.files {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        tracing::debug!(file = %path.display(), "validating");
        results.push((path.display().to_string(), validator.validate_yaml(&content)));
    }

    if cli.json {
        let reports: Vec<FileReport> = results
            .iter()
            .map(|(file, violations)| FileReport {
                file: file.clone(),
                violations,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for (file, violations) in &results {
            print_report(file, violations);
        }
    }

    Ok(results.iter().all(|(_, violations)| violations.is_empty()))
}

fn load_rules(path: Option<&Path>) -> anyhow::Result<RuleSet> {
    match path {
        None => Ok(RuleSet::builtin().clone()),
        Some(path) => {
            let overrides = RuleOverrides::from_path(path)
                .with_context(|| format!("failed to load rule overrides from {}", path.display()))?;
            Ok(RuleSet::builtin().with_overrides(&overrides)?)
        }
    }
}

fn print_report(file: &str, violations: &[Violation]) {
    if violations.is_empty() {
        println!("✓ {} is valid", file);
        return;
    }

    eprintln!("✗ {} has {} violation(s):", file, violations.len());
    for (i, violation) in violations.iter().enumerate() {
        eprintln!("  {}. {}", i + 1, violation);
    }
}
