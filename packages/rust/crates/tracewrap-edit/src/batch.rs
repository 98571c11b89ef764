//! Batch transformation engine.
//!
//! Walks a source tree with `ignore` (so `.gitignore` is honored), filters
//! by extension, and transforms every file in parallel with rayon. Results
//! are aggregated through atomics and a `DashMap`, so workers never lock.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use rayon::prelude::*;
use serde::Serialize;
use tracewrap_ast::Lang;

use crate::source_io::DEFAULT_MAX_FILE_SIZE;
use crate::transform::Transformer;

/// Statistics for a batch run.
#[derive(Debug, Default, Serialize)]
pub struct BatchStats {
    /// Number of files transformed (successfully or not).
    pub files_scanned: usize,
    /// Number of files with at least one wrap.
    pub files_changed: usize,
    /// Total number of wrapped nodes.
    pub wrapped: usize,
    /// Total number of skip records.
    pub skipped: usize,
    /// Errors encountered (path -> error message).
    pub errors: HashMap<String, String>,
    /// Changed files, sorted.
    pub modified_files: Vec<String>,
    /// Unified diff per changed file, when requested.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub diffs: HashMap<String, String>,
}

/// Configuration for a batch run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Preview only (true) or write changes back (false).
    pub dry_run: bool,
    /// Maximum file size in bytes (default 1MB).
    pub max_file_size: u64,
    /// Number of parallel workers (0 = auto-detect).
    pub workers: usize,
    /// Directory names never descended into.
    pub skip_dirs: Vec<String>,
    /// Extensions to process, without the dot.
    pub extensions: Vec<String>,
    /// Keep a unified diff for every changed file.
    pub collect_diffs: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            dry_run: true,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            workers: 0,
            skip_dirs: ["node_modules", ".git", "dist", "build"]
                .into_iter()
                .map(String::from)
                .collect(),
            extensions: Lang::all_extensions().into_iter().map(String::from).collect(),
            collect_diffs: false,
        }
    }
}

impl BatchConfig {
    /// Whether a file, given relative to the walk root, should be processed.
    fn accepts(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        // Declaration files carry no bodies.
        if name.ends_with(".d.ts") || name.ends_with(".d.mts") || name.ends_with(".d.cts") {
            return false;
        }
        let in_skipped_dir = path.parent().is_some_and(|parent| {
            parent.components().any(|c| match c {
                Component::Normal(part) => self.skip_dirs.iter().any(|d| part == d.as_str()),
                _ => false,
            })
        });
        if in_skipped_dir {
            return false;
        }
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|x| x == ext))
    }
}

impl Transformer {
    /// Transform every matching file under `root`.
    ///
    /// Per-file failures are collected in `BatchStats::errors`; the run
    /// itself never fails.
    pub fn batch_transform(&self, root: &Path, config: &BatchConfig) -> BatchStats {
        let files = collect_files(root, config);
        tracing::debug!(root = %root.display(), files = files.len(), "batch start");

        let engine = self.clone().with_max_file_size(config.max_file_size);
        let run = || engine.process_files(files, config);

        let stats = if config.workers > 0 {
            match rayon::ThreadPoolBuilder::new().num_threads(config.workers).build() {
                Ok(pool) => pool.install(run),
                Err(e) => {
                    tracing::warn!(error = %e, "could not build worker pool; using the global one");
                    run()
                }
            }
        } else {
            run()
        };

        tracing::info!(
            root = %root.display(),
            scanned = stats.files_scanned,
            changed = stats.files_changed,
            wrapped = stats.wrapped,
            skipped = stats.skipped,
            errors = stats.errors.len(),
            dry_run = config.dry_run,
            "batch complete"
        );
        stats
    }

    fn process_files(&self, files: Vec<PathBuf>, config: &BatchConfig) -> BatchStats {
        let files_scanned = AtomicUsize::new(0);
        let files_changed = AtomicUsize::new(0);
        let wrapped = AtomicUsize::new(0);
        let skipped = AtomicUsize::new(0);
        let modified_files: DashMap<String, usize> = DashMap::new();
        let errors: DashMap<String, String> = DashMap::new();
        let diffs: DashMap<String, String> = DashMap::new();

        files.into_par_iter().for_each(|path| {
            files_scanned.fetch_add(1, Ordering::Relaxed);

            match self.transform_path(&path, config.dry_run) {
                Ok(outcome) => {
                    let result = &outcome.result;
                    skipped.fetch_add(result.skipped.len(), Ordering::Relaxed);
                    if result.changed {
                        files_changed.fetch_add(1, Ordering::Relaxed);
                        wrapped.fetch_add(result.wrapped_count, Ordering::Relaxed);
                        if config.collect_diffs {
                            diffs.insert(outcome.path.clone(), outcome.diff);
                        }
                        modified_files.insert(outcome.path, result.wrapped_count);
                    }
                }
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "transform failed");
                    errors.insert(path.display().to_string(), e.to_string());
                }
            }
        });

        let mut modified_files: Vec<String> = modified_files.into_iter().map(|(k, _)| k).collect();
        modified_files.sort();

        BatchStats {
            files_scanned: files_scanned.load(Ordering::Relaxed),
            files_changed: files_changed.load(Ordering::Relaxed),
            wrapped: wrapped.load(Ordering::Relaxed),
            skipped: skipped.load(Ordering::Relaxed),
            errors: errors.into_iter().collect(),
            modified_files,
            diffs: diffs.into_iter().collect(),
        }
    }
}

/// Files under `root` accepted by `config`, in walk order.
fn collect_files(root: &Path, config: &BatchConfig) -> Vec<PathBuf> {
    ignore::WalkBuilder::new(root)
        .build()
        .filter_map(|result| match result {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!(error = %e, "walk error");
                None
            }
        })
        .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
        .map(ignore::DirEntry::into_path)
        .filter(|path| config.accepts(path.strip_prefix(root).unwrap_or(path)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_extensions() {
        let config = BatchConfig::default();
        assert!(config.accepts(Path::new("src/a.ts")));
        assert!(config.accepts(Path::new("src/a.cjs")));
        assert!(!config.accepts(Path::new("src/a.py")));
        assert!(!config.accepts(Path::new("src/types.d.ts")));
    }

    #[test]
    fn test_rejects_skip_dirs() {
        let config = BatchConfig::default();
        assert!(!config.accepts(Path::new("app/node_modules/pkg/index.js")));
        assert!(!config.accepts(Path::new("dist/bundle.js")));
        assert!(config.accepts(Path::new("app/distance.js")));
    }
}
