use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::discovery;

/// Registry used when neither the CLI nor `unifier.toml` names one.
pub const DEFAULT_REGISTRY: &str = "vcp.ocir.io/ewnbfjunbic";

/// Container tool invoked when none is configured.
pub const DEFAULT_TOOL: &str = "docker";

/// Suffix appended to the project name to form the local unified image.
pub const UNIFIED_SUFFIX: &str = "_unificado";

/// `chrono` format of a date tag (`YY-MM-DD`).
pub const DATE_TAG_FORMAT: &str = "%y-%m-%d";

/// How the image tag is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagStrategy {
    /// Tag with the configured `YY-MM-DD` date.
    Date,
    /// Tag with the literal `latest`.
    #[default]
    Latest,
}

impl fmt::Display for TagStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date => f.write_str("date"),
            Self::Latest => f.write_str("latest"),
        }
    }
}

impl FromStr for TagStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(Self::Date),
            "latest" => Ok(Self::Latest),
            other => Err(format!("unknown tag strategy '{other}' (expected date or latest)")),
        }
    }
}

/// unifier.toml configuration, read from the base directory.
///
/// Every value is optional; command-line flags take precedence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnifierConfig {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub docker: DockerConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Logical project name (defaults to the project directory name)
    pub name: Option<String>,
    /// Registry base path, e.g. `registry.example/ns`
    pub registry: Option<String>,
    /// Tag strategy (`date` or `latest`)
    pub tag_strategy: Option<TagStrategy>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DockerConfig {
    /// Container tool binary (defaults to `docker`)
    pub tool: Option<String>,
    /// Per-command timeout in seconds; no timeout when absent
    pub timeout_secs: Option<u64>,
}

impl UnifierConfig {
    pub const FILE_NAME: &'static str = "unifier.toml";

    /// Load from unifier.toml in the given directory, or return defaults if not found.
    pub fn load(base_dir: &Path) -> crate::Result<Self> {
        let config_path = base_dir.join(Self::FILE_NAME);
        if config_path.exists() {
            let content =
                std::fs::read_to_string(&config_path).map_err(|e| crate::Error::ConfigLoad {
                    path: config_path.clone(),
                    source: e,
                })?;
            toml::from_str(&content).map_err(|e| crate::Error::ConfigParse {
                path: config_path,
                source: e,
            })
        } else {
            Ok(Self::default())
        }
    }
}

/// Resolved primitive inputs, as handed over by the command line layer.
///
/// `today` is the caller's notion of the current date; it is only used when
/// no explicit `date_tag` is given.
#[derive(Debug, Clone)]
pub struct Settings {
    pub base_dir: PathBuf,
    pub project_dir: Option<PathBuf>,
    pub final_dir: Option<PathBuf>,
    pub project_name: Option<String>,
    pub registry: String,
    pub tag_strategy: TagStrategy,
    pub date_tag: Option<String>,
    pub today: NaiveDate,
    pub dry_run: bool,
    pub skip_build: bool,
    pub skip_update_files: bool,
    pub do_push: bool,
    pub tool: String,
    pub command_timeout: Option<Duration>,
}

impl Settings {
    /// Settings for `base_dir` with every other value at its default.
    pub fn new(base_dir: impl Into<PathBuf>, today: NaiveDate) -> Self {
        Self {
            base_dir: base_dir.into(),
            project_dir: None,
            final_dir: None,
            project_name: None,
            registry: DEFAULT_REGISTRY.to_owned(),
            tag_strategy: TagStrategy::default(),
            date_tag: None,
            today,
            dry_run: false,
            skip_build: false,
            skip_update_files: false,
            do_push: true,
            tool: DEFAULT_TOOL.to_owned(),
            command_timeout: None,
        }
    }
}

/// Pipeline configuration. Built once per run and never mutated.
///
/// # Examples
///
/// ```
/// use unifier_core::{Config, TagStrategy};
///
/// let cfg = Config {
///     project_name: "demo".to_owned(),
///     registry: "reg.example/ns".to_owned(),
///     tag_strategy: TagStrategy::Date,
///     date_tag: "24-01-01".to_owned(),
///     ..Config::for_dirs("/work", "/work/demo", "/work/demo_final")
/// };
/// assert_eq!(cfg.unified_ref(), "demo_unificado:24-01-01");
/// assert_eq!(cfg.target_ref(), "reg.example/ns/demo:24-01-01");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_dir: PathBuf,
    pub project_dir: PathBuf,
    pub final_dir: PathBuf,
    pub project_name: String,
    /// Registry base path without trailing slash
    pub registry: String,
    pub tag_strategy: TagStrategy,
    /// `YY-MM-DD`; only meaningful with [`TagStrategy::Date`]
    pub date_tag: String,
    pub dry_run: bool,
    pub skip_build: bool,
    pub skip_update_files: bool,
    pub do_push: bool,
    pub tool: String,
    pub command_timeout: Option<Duration>,
}

impl Config {
    /// Resolve directories and derive the full configuration.
    ///
    /// # Errors
    ///
    /// - Directory resolution errors from [`discovery::resolve_dirs`]
    /// - [`Error::EmptyProjectName`](crate::Error::EmptyProjectName) if no usable name exists
    /// - [`Error::InvalidDateTag`](crate::Error::InvalidDateTag) if the date strategy
    ///   is selected with a tag that is not `YY-MM-DD`
    pub fn from_settings(settings: Settings) -> crate::Result<Self> {
        let (project_dir, final_dir) = discovery::resolve_dirs(
            &settings.base_dir,
            settings.project_dir.as_deref(),
            settings.final_dir.as_deref(),
        )?;

        let project_name = match settings.project_name {
            Some(name) => name,
            None => dir_name(&project_dir),
        };
        if project_name.trim().is_empty() {
            return Err(crate::Error::EmptyProjectName(project_dir));
        }

        let date_tag = match settings.date_tag {
            Some(tag) => tag,
            None => settings.today.format(DATE_TAG_FORMAT).to_string(),
        };
        if settings.tag_strategy == TagStrategy::Date && !is_valid_date_tag(&date_tag) {
            return Err(crate::Error::InvalidDateTag(date_tag));
        }

        Ok(Self {
            base_dir: settings.base_dir,
            project_dir,
            final_dir,
            project_name,
            registry: settings.registry.trim_end_matches('/').to_owned(),
            tag_strategy: settings.tag_strategy,
            date_tag,
            dry_run: settings.dry_run,
            skip_build: settings.skip_build,
            skip_update_files: settings.skip_update_files,
            do_push: settings.do_push,
            tool: settings.tool,
            command_timeout: settings.command_timeout,
        })
    }

    /// Configuration for an already-known directory pair, everything else default.
    ///
    /// The project name is taken from `project_dir`.
    pub fn for_dirs(
        base_dir: impl Into<PathBuf>,
        project_dir: impl Into<PathBuf>,
        final_dir: impl Into<PathBuf>,
    ) -> Self {
        let project_dir = project_dir.into();
        Self {
            base_dir: base_dir.into(),
            project_name: dir_name(&project_dir),
            project_dir,
            final_dir: final_dir.into(),
            registry: DEFAULT_REGISTRY.to_owned(),
            tag_strategy: TagStrategy::default(),
            date_tag: String::new(),
            dry_run: false,
            skip_build: false,
            skip_update_files: false,
            do_push: true,
            tool: DEFAULT_TOOL.to_owned(),
            command_timeout: None,
        }
    }

    /// `{project_name}_unificado`
    pub fn unified_image(&self) -> String {
        format!("{}{UNIFIED_SUFFIX}", self.project_name)
    }

    /// The date tag under [`TagStrategy::Date`], `latest` otherwise.
    pub fn tag_value(&self) -> &str {
        match self.tag_strategy {
            TagStrategy::Date => &self.date_tag,
            TagStrategy::Latest => "latest",
        }
    }

    /// Local reference of the unified image: `{unified_image}:{tag_value}`.
    pub fn unified_ref(&self) -> String {
        format!("{}:{}", self.unified_image(), self.tag_value())
    }

    /// Remote reference: `{registry}/{project_name}:{tag_value}`.
    pub fn target_ref(&self) -> String {
        format!(
            "{}/{}:{}",
            self.registry,
            self.project_name,
            self.tag_value()
        )
    }
}

/// Whether `tag` is a calendar date written as `YY-MM-DD`.
pub fn is_valid_date_tag(tag: &str) -> bool {
    tag.len() == 8 && NaiveDate::parse_from_str(tag, DATE_TAG_FORMAT).is_ok()
}

fn dir_name(path: &Path) -> String {
    match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => String::new(),
    }
}
