use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, ValueEnum};

use tracewrap_edit::{ImportStyle, WrapConfig};

/// Config file picked up from the working directory when `--config` is absent.
pub(crate) const DEFAULT_CONFIG_FILE: &str = "tracewrap.toml";

#[derive(Parser, Debug)]
#[command(name = "tracewrap")]
#[command(
    about = "Wrap TypeScript/JavaScript functions in an instrumentation call. Dry run unless --write."
)]
pub(crate) struct Cli {
    /// TOML config file (default: ./tracewrap.toml when present).
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,

    /// Skip identifiers matching this regex (repeatable; `/re/flags` accepted).
    #[arg(long = "skip", value_name = "REGEX")]
    pub(crate) skip: Vec<String>,

    /// Span-name template with `{name}` and `{file}` tokens.
    #[arg(long, value_name = "TEMPLATE")]
    pub(crate) name_pattern: Option<String>,

    /// Instrumentation function identifier (default: traceCall).
    #[arg(long = "function", value_name = "IDENT")]
    pub(crate) function_name: Option<String>,

    /// Module the instrumentation function is imported from (default: autotel).
    #[arg(long = "module", value_name = "PATH")]
    pub(crate) module_path: Option<String>,

    /// Syntax of the inserted import.
    #[arg(long, value_enum)]
    pub(crate) import_style: Option<ImportStyleArg>,

    /// Write changes back to disk.
    #[arg(long)]
    pub(crate) write: bool,

    /// Print a unified diff for every changed file.
    #[arg(long)]
    pub(crate) diff: bool,

    /// Print a JSON report on stdout.
    #[arg(long)]
    pub(crate) json: bool,

    /// Parallel workers for directories (0 = one per core).
    #[arg(long, default_value_t = 0)]
    pub(crate) workers: usize,

    /// Debug logging (overridden by RUST_LOG).
    #[arg(short, long)]
    pub(crate) verbose: bool,

    /// Files or directories to process.
    #[arg(required = true, value_name = "PATHS")]
    pub(crate) paths: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum ImportStyleArg {
    Auto,
    Esm,
    #[value(name = "commonjs", alias = "cjs")]
    CommonJs,
}

impl From<ImportStyleArg> for ImportStyle {
    fn from(arg: ImportStyleArg) -> Self {
        match arg {
            ImportStyleArg::Auto => Self::Auto,
            ImportStyleArg::Esm => Self::Esm,
            ImportStyleArg::CommonJs => Self::CommonJs,
        }
    }
}

impl Cli {
    /// Config file values with command-line flags layered on top.
    pub(crate) fn wrap_config(&self) -> anyhow::Result<WrapConfig> {
        let mut config = match &self.config {
            Some(path) => load(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => load(Path::new(DEFAULT_CONFIG_FILE))?,
            None => WrapConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut WrapConfig) {
        config.skip.extend(self.skip.iter().cloned());
        if let Some(pattern) = &self.name_pattern {
            config.name_pattern = Some(pattern.clone());
        }
        let instrumentation = &mut config.instrumentation;
        if let Some(function_name) = &self.function_name {
            instrumentation.function_name.clone_from(function_name);
        }
        if let Some(module_path) = &self.module_path {
            instrumentation.module_path.clone_from(module_path);
        }
        if let Some(style) = self.import_style {
            instrumentation.import_style = style.into();
        }
    }
}

fn load(path: &Path) -> anyhow::Result<WrapConfig> {
    tracing::debug!(path = %path.display(), "loading config");
    WrapConfig::load(path).with_context(|| format!("failed to load config {}", path.display()))
}
