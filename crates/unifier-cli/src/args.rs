use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use clap::Parser;
use unifier_core::config::{DEFAULT_REGISTRY, DEFAULT_TOOL};
use unifier_core::{Settings, TagStrategy, UnifierConfig};

#[derive(Debug, Parser)]
#[command(
    name = "unifier",
    about = "Build a unified Docker image and point the final deployment at it"
)]
#[command(version)]
pub struct Args {
    /// Directory holding {PROJECT} and {PROJECT}_final
    #[arg(long, default_value = ".")]
    pub base_dir: PathBuf,

    /// Project directory (contains the unified Dockerfile)
    #[arg(long)]
    pub project_dir: Option<PathBuf>,

    /// Final directory (contains Dockerfile and docker-compose.yml)
    #[arg(long)]
    pub final_dir: Option<PathBuf>,

    /// Logical project name; defaults to the project directory name
    #[arg(long)]
    pub project_name: Option<String>,

    /// Registry base path [default: vcp.ocir.io/ewnbfjunbic]
    #[arg(long)]
    pub registry: Option<String>,

    /// Tag strategy [default: latest]
    #[arg(long, value_name = "date|latest")]
    pub tag_strategy: Option<TagStrategy>,

    /// Date tag (YY-MM-DD) used with --tag-strategy date; defaults to today
    #[arg(long)]
    pub date_tag: Option<String>,

    /// Print actions without running them or writing files
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the base and unified image builds
    #[arg(long)]
    pub skip_build: bool,

    /// Leave the final directory files untouched
    #[arg(long)]
    pub skip_update_files: bool,

    /// Do not tag and push to the registry
    #[arg(long)]
    pub no_push: bool,

    /// Container tool to invoke [default: docker]
    #[arg(long)]
    pub tool: Option<String>,

    /// Abort any single command running longer than this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

impl Args {
    /// Merge flags with `unifier.toml` from the base directory.
    ///
    /// Flags win over the file, the file wins over built-in defaults.
    /// Paths are made absolute with `.` and `..` resolved, see [`resolve_path`].
    pub fn into_settings(self, today: NaiveDate) -> anyhow::Result<Settings> {
        let base_dir = resolve_path(&self.base_dir)?;
        let file = UnifierConfig::load(&base_dir)?;

        let project_dir = self.project_dir.as_deref().map(resolve_path).transpose()?;
        let final_dir = self.final_dir.as_deref().map(resolve_path).transpose()?;

        Ok(Settings {
            base_dir,
            project_dir,
            final_dir,
            project_name: self.project_name.or(file.project.name),
            registry: match self.registry.or(file.project.registry) {
                Some(registry) => registry,
                None => DEFAULT_REGISTRY.to_owned(),
            },
            tag_strategy: match self.tag_strategy.or(file.project.tag_strategy) {
                Some(strategy) => strategy,
                None => TagStrategy::default(),
            },
            date_tag: self.date_tag,
            today,
            dry_run: self.dry_run,
            skip_build: self.skip_build,
            skip_update_files: self.skip_update_files,
            do_push: !self.no_push,
            tool: match self.tool.or(file.docker.tool) {
                Some(tool) => tool,
                None => DEFAULT_TOOL.to_owned(),
            },
            command_timeout: self
                .timeout
                .or(file.docker.timeout_secs)
                .map(Duration::from_secs),
        })
    }
}

/// Absolute form of `path` with `.` and `..` resolved.
///
/// Existing paths are canonicalized. Paths that do not exist yet are joined
/// to the current directory and cleaned lexically, so `a/b/..` is `a`.
pub fn resolve_path(path: &Path) -> std::io::Result<PathBuf> {
    if path.exists() {
        return std::fs::canonicalize(path);
    }

    let mut resolved = PathBuf::new();
    for component in std::path::absolute(path)?.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other),
        }
    }
    Ok(resolved)
}
