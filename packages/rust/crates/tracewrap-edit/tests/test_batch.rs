//! Tests for batch module - parallel directory transformation.

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use tracewrap_edit::{BatchConfig, Transformer, WrapConfig};

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Create parent dirs");
    }
    fs::write(path, content).expect("Write file");
}

fn transformer() -> Transformer {
    Transformer::new(WrapConfig::default()).expect("Default config is valid")
}

#[test]
fn test_batch_apply() {
    let dir = TempDir::new().expect("Create temp dir");
    write(dir.path(), "src/users.ts", "export function createUser() {}\n");
    write(dir.path(), "src/orders.js", "const list = () => [];\n");
    write(dir.path(), "src/consts.ts", "export const N = 1;\n");

    let stats = transformer().batch_transform(
        dir.path(),
        &BatchConfig {
            dry_run: false,
            ..Default::default()
        },
    );

    assert_eq!(stats.files_scanned, 3);
    assert_eq!(stats.files_changed, 2);
    assert_eq!(stats.wrapped, 2);
    assert!(stats.errors.is_empty());

    let users = fs::read_to_string(dir.path().join("src/users.ts")).expect("Read users");
    assert!(users.contains("export const createUser = traceCall('createUser', function createUser() {});"));
    let consts = fs::read_to_string(dir.path().join("src/consts.ts")).expect("Read consts");
    assert_eq!(consts, "export const N = 1;\n");
}

#[test]
fn test_batch_dry_run_leaves_files() {
    let dir = TempDir::new().expect("Create temp dir");
    let source = "function a() {}\n";
    write(dir.path(), "a.ts", source);

    let stats = transformer().batch_transform(dir.path(), &BatchConfig::default());

    assert_eq!(stats.files_changed, 1);
    assert_eq!(stats.modified_files.len(), 1);
    let after = fs::read_to_string(dir.path().join("a.ts")).expect("Read file");
    assert_eq!(after, source);
}

#[test]
fn test_batch_skips_dirs_and_foreign_files() {
    let dir = TempDir::new().expect("Create temp dir");
    write(dir.path(), "node_modules/pkg/index.js", "function dep() {}\n");
    write(dir.path(), "dist/bundle.js", "function built() {}\n");
    write(dir.path(), "notes.md", "function not_code() {}\n");
    write(dir.path(), "types.d.ts", "export declare function t(): void;\n");
    write(dir.path(), "app.mjs", "export function app() {}\n");

    let stats = transformer().batch_transform(dir.path(), &BatchConfig::default());

    assert_eq!(stats.files_scanned, 1);
    assert_eq!(stats.files_changed, 1);
    assert!(stats.modified_files[0].ends_with("app.mjs"));
}

#[test]
fn test_batch_collects_errors() {
    let dir = TempDir::new().expect("Create temp dir");
    write(dir.path(), "good.ts", "function ok() {}\n");
    write(dir.path(), "bad.ts", "function broken( {\n");

    let stats = transformer().batch_transform(
        dir.path(),
        &BatchConfig {
            workers: 2,
            ..Default::default()
        },
    );

    assert_eq!(stats.files_scanned, 2);
    assert_eq!(stats.files_changed, 1);
    assert_eq!(stats.errors.len(), 1);
    let (path, message) = stats.errors.iter().next().expect("One error");
    assert!(path.ends_with("bad.ts"));
    assert!(message.starts_with("Parse error at "));
}

#[test]
fn test_batch_modified_files_sorted() {
    let dir = TempDir::new().expect("Create temp dir");
    for name in ["c.ts", "a.ts", "b.ts"] {
        write(dir.path(), name, "function f() {}\n");
    }

    let stats = transformer().batch_transform(dir.path(), &BatchConfig::default());

    let names: Vec<_> = stats
        .modified_files
        .iter()
        .filter_map(|p| Path::new(p).file_name())
        .filter_map(|n| n.to_str())
        .collect();
    assert_eq!(names, vec!["a.ts", "b.ts", "c.ts"]);
}

#[test]
fn test_transform_path_diff_and_write() {
    let dir = TempDir::new().expect("Create temp dir");
    write(dir.path(), "job.ts", "const run = async () => 1;\n");
    let path = dir.path().join("job.ts");

    let preview = transformer().transform_path(&path, true).expect("Should preview");
    assert!(!preview.written);
    assert!(preview.diff.contains("+const run = traceCall('run', async () => 1);"));

    let applied = transformer().transform_path(&path, false).expect("Should apply");
    assert!(applied.written);
    let content = fs::read_to_string(&path).expect("Read file");
    assert_eq!(content, applied.result.modified);

    // Second pass is a no-op.
    let again = transformer().transform_path(&path, false).expect("Should run");
    assert!(!again.written);
    assert!(again.diff.is_empty());
}
