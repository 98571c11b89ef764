//! tracewrap - wrap TypeScript/JavaScript functions in an instrumentation call.
//!
//! Files are transformed one at a time; directories go through the parallel
//! batch engine. Nothing is written without `--write`.

mod cli;

use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use tracewrap_edit::{BatchConfig, BatchStats, PathTransform, Transformer};

use crate::cli::Cli;

/// Everything one invocation did, in argument order.
#[derive(Debug, Default, Serialize)]
struct Report {
    files: Vec<PathTransform>,
    directories: Vec<DirectoryReport>,
    errors: Vec<FileError>,
}

#[derive(Debug, Serialize)]
struct DirectoryReport {
    root: String,
    stats: BatchStats,
}

#[derive(Debug, Serialize)]
struct FileError {
    path: String,
    error: String,
}

impl Report {
    fn error_count(&self) -> usize {
        self.errors.len()
            + self
                .directories
                .iter()
                .map(|d| d.stats.errors.len())
                .sum::<usize>()
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        // Target prefix covers the binary and the tracewrap_* crates.
        EnvFilter::new(if cli.verbose {
            "tracewrap=debug"
        } else {
            "tracewrap=info"
        })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config = cli.wrap_config()?;
    let transformer = Transformer::new(config).context("invalid configuration")?;
    let preview_only = !cli.write;

    let mut report = Report::default();
    for path in &cli.paths {
        if path.is_dir() {
            report.directories.push(run_directory(&transformer, path, &cli));
        } else {
            match transformer.transform_path(path, preview_only) {
                Ok(outcome) => report.files.push(outcome),
                Err(e) => {
                    tracing::error!(path = %path.display(), error = %e, "transform failed");
                    report.errors.push(FileError {
                        path: path.display().to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }
    }

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("failed to serialize report")?
        );
    } else {
        print_human(&report, &cli);
    }

    Ok(if report.error_count() > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn run_directory(transformer: &Transformer, root: &Path, cli: &Cli) -> DirectoryReport {
    let config = BatchConfig {
        dry_run: !cli.write,
        workers: cli.workers,
        collect_diffs: cli.diff,
        max_file_size: transformer.max_file_size(),
        ..BatchConfig::default()
    };
    DirectoryReport {
        root: root.display().to_string(),
        stats: transformer.batch_transform(root, &config),
    }
}

fn print_human(report: &Report, cli: &Cli) {
    let verb = if cli.write { "wrote" } else { "would change" };

    for file in &report.files {
        let result = &file.result;
        if result.changed {
            println!(
                "{verb} {}: {} wrapped, {} skipped",
                file.path,
                result.wrapped_count,
                result.skipped.len()
            );
        } else {
            println!("unchanged {}: {} skipped", file.path, result.skipped.len());
        }
        for skip in &result.skipped {
            println!(
                "  skip {} (line {}): {}",
                skip.identifier.as_deref().unwrap_or("<anonymous>"),
                skip.line,
                skip.reason
            );
        }
        if cli.diff && !file.diff.is_empty() {
            print!("{}", file.diff);
        }
    }

    for dir in &report.directories {
        let stats = &dir.stats;
        println!(
            "{}: {} files scanned, {} {verb}, {} wrapped, {} skipped, {} errors",
            dir.root,
            stats.files_scanned,
            stats.files_changed,
            stats.wrapped,
            stats.skipped,
            stats.errors.len()
        );
        for path in &stats.modified_files {
            println!("  {path}");
            if let Some(diff) = stats.diffs.get(path) {
                print!("{diff}");
            }
        }
        let mut errors: Vec<_> = stats.errors.iter().collect();
        errors.sort();
        for (path, error) in errors {
            eprintln!("  error {path}: {error}");
        }
    }

    for err in &report.errors {
        eprintln!("error {}: {}", err.path, err.error);
    }
}
